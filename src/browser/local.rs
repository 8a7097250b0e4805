//! Station console served from a loopback socket, for exercising
//! [`HttpBrowser`](super::HttpBrowser) over real HTTP
//!
//! `/` and every protected page redirect to `/login` until the request
//! carries a valid `rws_session` cookie. A correct password POSTed to
//! `/login` issues a token and redirects to `/status`. `/logout` expires the
//! cookie with a past `Expires` date.

use std::collections::HashSet;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;

use super::fake::LOGIN_HTML;

pub(crate) use super::fake::SESSION_COOKIE;

const STATUS_HTML: &str = "<html><body><p>Radial Suite status</p></body></html>";
const DETAILS_HTML: &str = r#"<html><body>
<div class="notice ok">CODAR volume: [<b>48</b>% avail.]</div>
<div class="notice warn">Archive Disk 62% used</div>
</body></html>"#;

#[derive(Debug, Default)]
struct State {
    password: String,
    issued: u32,
    tokens: HashSet<String>,
    posts: usize,
}

struct Request {
    method: String,
    path: String,
    cookie: Option<String>,
    body: String,
}

impl Request {
    fn read(stream: &mut TcpStream) -> Option<Self> {
        let mut reader = BufReader::new(stream);
        let mut line = String::new();
        reader.read_line(&mut line).ok()?;
        let mut parts = line.split_whitespace();
        let method = parts.next()?.to_string();
        let path = parts.next()?.to_string();

        let mut cookie = None;
        let mut length = 0;
        loop {
            let mut header = String::new();
            if reader.read_line(&mut header).ok()? == 0 || header.trim().is_empty() {
                break;
            }
            let Some((name, value)) = header.split_once(':') else {
                continue;
            };
            match name.trim().to_ascii_lowercase().as_str() {
                "cookie" => cookie = Some(value.trim().to_string()),
                "content-length" => length = value.trim().parse().unwrap_or(0),
                _ => {}
            }
        }

        let mut body = vec![0; length];
        reader.read_exact(&mut body).ok()?;
        Some(Self {
            method,
            path,
            cookie,
            body: String::from_utf8_lossy(&body).into_owned(),
        })
    }

    fn token(&self) -> Option<&str> {
        self.cookie.as_deref()?.split(';').find_map(|pair| {
            let (name, value) = pair.trim().split_once('=')?;
            (name == SESSION_COOKIE).then_some(value)
        })
    }

    fn field(&self, name: &str) -> Option<&str> {
        self.body.split('&').find_map(|pair| {
            let (key, value) = pair.split_once('=')?;
            (key == name).then_some(value)
        })
    }
}

enum Reply {
    Page(&'static str),
    Redirect(&'static str, Option<String>),
}

fn respond(state: &Mutex<State>, request: &Request) -> Reply {
    let mut state = state.lock().unwrap();
    let authorized = request.token().is_some_and(|t| state.tokens.contains(t));

    match (request.method.as_str(), request.path.as_str()) {
        ("POST", "/login") => {
            state.posts += 1;
            if request.field("login_password") != Some(state.password.as_str()) {
                return Reply::Page(LOGIN_HTML);
            }
            state.issued += 1;
            let token = format!("tok-{}", state.issued);
            state.tokens.insert(token.clone());
            let cookie = format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly");
            Reply::Redirect("/status", Some(cookie))
        }
        (_, "/logout") => {
            if let Some(token) = request.token() {
                state.tokens.remove(token);
            }
            let cookie =
                format!("{SESSION_COOKIE}=deleted; Path=/; Expires=Thu, 01 Jan 1970 00:00:00 GMT");
            Reply::Redirect("/login", Some(cookie))
        }
        (_, "/" | "/login") if authorized => Reply::Redirect("/status", None),
        (_, "/login") => Reply::Page(LOGIN_HTML),
        (_, "/status") if authorized => Reply::Page(STATUS_HTML),
        (_, "/details") if authorized => Reply::Page(DETAILS_HTML),
        _ => Reply::Redirect("/login", None),
    }
}

fn serve(mut stream: TcpStream, state: &Mutex<State>) {
    let Some(request) = Request::read(&mut stream) else {
        return;
    };
    let head = match respond(state, &request) {
        Reply::Page(html) => format!(
            "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: {}\r\n\
             Connection: close\r\n\r\n{html}",
            html.len()
        ),
        Reply::Redirect(location, cookie) => {
            let set_cookie = cookie
                .map(|c| format!("Set-Cookie: {c}\r\n"))
                .unwrap_or_default();
            format!(
                "HTTP/1.1 302 Found\r\nLocation: {location}\r\n{set_cookie}\
                 Content-Length: 0\r\nConnection: close\r\n\r\n"
            )
        }
    };
    let _ = stream.write_all(head.as_bytes());
}

/// A console listening on `127.0.0.1`, one thread per test
pub(crate) struct LocalStation {
    addr: SocketAddr,
    state: Arc<Mutex<State>>,
}

impl LocalStation {
    pub(crate) fn start(password: &str) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let state = Arc::new(Mutex::new(State {
            password: password.to_string(),
            ..State::default()
        }));

        let shared = Arc::clone(&state);
        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                serve(stream, &shared);
            }
        });
        Self { addr, state }
    }

    /// URL of a port nothing listens on
    pub(crate) fn closed_url() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{addr}/")
    }

    /// `127.0.0.1:<port>`, usable as a site code with an `http://` prefix
    pub(crate) fn host(&self) -> String {
        self.addr.to_string()
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    /// Login form submissions received so far
    pub(crate) fn posts(&self) -> usize {
        self.state.lock().unwrap().posts
    }
}
