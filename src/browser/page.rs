//! Helpers for reading static HTML pages

use scraper::{ElementRef, Html, Selector};

/// Collapse runs of whitespace into single spaces and trim
pub(crate) fn normalize_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Rendered text of an element, whitespace-normalised. Text nodes are
/// joined as-is, so inline markup adds no spaces of its own.
pub(crate) fn element_text(el: ElementRef<'_>) -> String {
    normalize_ws(&el.text().collect::<String>())
}

pub(crate) fn selector(css: &str) -> Option<Selector> {
    Selector::parse(css).ok()
}

fn name_selector(name: &str) -> Option<Selector> {
    selector(&format!(r#"[name="{}"]"#, name.replace('"', "")))
}

/// Whether any element carries `name="<name>"`
pub(crate) fn has_named_element(html: &str, name: &str) -> bool {
    let Some(sel) = name_selector(name) else {
        return false;
    };
    Html::parse_document(html).select(&sel).next().is_some()
}

/// A form found on a page, with the values it would submit by default
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FormSpec {
    /// `action` attribute; `None` submits to the current page
    pub(crate) action: Option<String>,
    pub(crate) inputs: Vec<(String, String)>,
}

impl FormSpec {
    /// Set `name` to `value`, adding the field when the form lacks it
    pub(crate) fn fill(&mut self, name: &str, value: &str) {
        match self.inputs.iter_mut().find(|(n, _)| n == name) {
            Some(slot) => slot.1 = value.to_string(),
            None => self.inputs.push((name.to_string(), value.to_string())),
        }
    }
}

/// Locate the form containing the element named `field`.
///
/// Login pages sometimes render the inputs without a surrounding `<form>`;
/// in that case an empty spec posting back to the current page is returned.
pub(crate) fn find_form(html: &str, field: &str) -> Option<FormSpec> {
    let doc = Html::parse_document(html);
    let forms = selector("form")?;
    let named = name_selector(field)?;
    let inputs = selector("input[name], select[name], textarea[name]")?;

    for form in doc.select(&forms) {
        if form.select(&named).next().is_none() {
            continue;
        }
        let inputs = form
            .select(&inputs)
            .filter_map(|el| {
                let name = el.value().attr("name")?;
                let kind = el.value().attr("type").unwrap_or("text").to_ascii_lowercase();
                if matches!(kind.as_str(), "submit" | "button" | "image" | "reset") {
                    return None;
                }
                if matches!(kind.as_str(), "checkbox" | "radio")
                    && el.value().attr("checked").is_none()
                {
                    return None;
                }
                let value = el.value().attr("value").unwrap_or_default();
                Some((name.to_string(), value.to_string()))
            })
            .collect();
        let action = form
            .value()
            .attr("action")
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .map(str::to_string);
        return Some(FormSpec { action, inputs });
    }

    if doc.select(&named).next().is_some() {
        return Some(FormSpec {
            action: None,
            inputs: Vec::new(),
        });
    }
    None
}

/// Parse a `<meta http-equiv="refresh">` tag into (delay seconds, target)
pub(crate) fn meta_refresh(html: &str) -> Option<(u64, Option<String>)> {
    let doc = Html::parse_document(html);
    let sel = selector("meta[http-equiv]")?;
    let content = doc.select(&sel).find_map(|el| {
        let equiv = el.value().attr("http-equiv")?;
        if equiv.eq_ignore_ascii_case("refresh") {
            el.value().attr("content")
        } else {
            None
        }
    })?;

    let mut parts = content.splitn(2, [';', ',']);
    let delay = parts.next()?.trim().parse::<f64>().ok()?.max(0.0).ceil() as u64;
    let target = parts.next().and_then(|rest| {
        let rest = rest.trim();
        let lower = rest.to_ascii_lowercase();
        let url = if lower.starts_with("url") {
            rest[3..].trim_start().strip_prefix('=')?.trim()
        } else {
            rest
        };
        let url = url.trim_matches(|c| c == '\'' || c == '"');
        (!url.is_empty()).then(|| url.to_string())
    });
    Some((delay, target))
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOGIN_PAGE: &str = r#"
        <html><body>
          <form method="post" action="/login">
            <input type="hidden" name="csrf" value="abc123">
            <input type="text" name="login_username">
            <input type="password" name="login_password">
            <input type="checkbox" name="remember">
            <input type="submit" name="go" value="Log in">
          </form>
        </body></html>"#;

    #[test]
    fn normalize_ws_collapses_runs() {
        assert_eq!(normalize_ws("  Boot\n  Volume\t has  "), "Boot Volume has");
    }

    #[test]
    fn element_text_joins_inline_nodes_without_spaces() {
        let html = Html::parse_fragment("<div>CODAR <i>volume</i>:\n  [<b>48</b>% avail.]</div>");
        let div = html.select(&selector("div").unwrap()).next().unwrap();
        assert_eq!(element_text(div), "CODAR volume: [48% avail.]");
    }

    #[test]
    fn named_element_detection() {
        assert!(has_named_element(LOGIN_PAGE, "login_username"));
        assert!(!has_named_element(LOGIN_PAGE, "missing"));
        assert!(!has_named_element("<p>status</p>", "login_username"));
    }

    #[test]
    fn find_form_collects_default_inputs() {
        let form = find_form(LOGIN_PAGE, "login_username").unwrap();
        assert_eq!(form.action.as_deref(), Some("/login"));
        assert_eq!(
            form.inputs,
            vec![
                ("csrf".to_string(), "abc123".to_string()),
                ("login_username".to_string(), String::new()),
                ("login_password".to_string(), String::new()),
            ]
        );
    }

    #[test]
    fn fill_overwrites_or_appends() {
        let mut form = find_form(LOGIN_PAGE, "login_username").unwrap();
        form.fill("login_username", "operator");
        form.fill("extra", "1");
        assert!(form.inputs.contains(&("login_username".to_string(), "operator".to_string())));
        assert_eq!(form.inputs.last(), Some(&("extra".to_string(), "1".to_string())));
    }

    #[test]
    fn find_form_without_form_tag() {
        let html = r#"<div><input name="login_username"><input name="login_password"></div>"#;
        let form = find_form(html, "login_username").unwrap();
        assert_eq!(form.action, None);
        assert!(form.inputs.is_empty());
    }

    #[test]
    fn find_form_missing_field() {
        assert_eq!(find_form("<form><input name='q'></form>", "login_username"), None);
    }

    #[test]
    fn meta_refresh_parsing() {
        let html = r#"<head><meta http-equiv="Refresh" content="0; URL='/status'"></head>"#;
        assert_eq!(meta_refresh(html), Some((0, Some("/status".to_string()))));

        let html = r#"<head><meta http-equiv="refresh" content="3"></head>"#;
        assert_eq!(meta_refresh(html), Some((3, None)));

        assert_eq!(meta_refresh("<p>nothing</p>"), None);
    }
}
