use crate::browser::HttpBrowser;
use crate::cli::Cli;
use crate::config::{Config, Settings};
use crate::core::{RunCoordinator, SessionStore};
use crate::credentials::Credentials;
use crate::error::AppError;
use crate::output::{output_summary_json, print_summary_table, render};
use crate::utils::init_logging;

/// Status lines go to stdout, except in JSON mode where stdout carries only
/// the summary
fn notice(json: bool, message: &str) {
    if json {
        eprintln!("{message}");
    } else {
        println!("{message}");
    }
}

fn load_config(cli: &Cli) -> Result<Config, AppError> {
    match cli.config.as_deref() {
        Some(path) => Config::load_from(path),
        None => Ok(Config::load()),
    }
}

/// One complete run: scrape every site, print the summary, save the chart
pub(crate) fn run(cli: Cli) -> Result<(), AppError> {
    let config = load_config(&cli)?;
    let cli = cli.with_config(&config);
    let settings = Settings::resolve(&cli, &config)?;
    init_logging(settings.debug);

    let credentials = Credentials::load(&settings.credentials_path)?;
    tracing::debug!(
        "Loaded credentials for {} site(s) from {}",
        credentials.site_count(),
        settings.credentials_path.display()
    );

    let store = SessionStore::new(settings.session_dir.clone());
    if cli.refresh_sessions {
        let removed = store.purge()?;
        notice(
            cli.json,
            &format!(
                "Deleted {removed} cached session(s) from {}",
                store.dir().display()
            ),
        );
    }

    let mut coordinator = RunCoordinator::new(HttpBrowser::new(), &settings, &store);
    let results = coordinator.run(&settings.sites, &credentials);

    if cli.json {
        println!("{}", output_summary_json(&results));
    } else {
        print_summary_table(&results, cli.use_color());
    }

    let path = render(
        &results,
        &settings.output_dir,
        settings.zone.stamp_now(),
        &settings.report,
    )?;
    notice(cli.json, &format!("Saved figure to {}", path.display()));
    Ok(())
}
