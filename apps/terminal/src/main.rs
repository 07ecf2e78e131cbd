//! Markpad terminal front end.
//!
//! Rendered panes go to stdout; logs go to stderr so output can be piped.
//! Set `RUST_LOG=markpad_core=debug` to trace every store intent.

mod app;
mod ui;

use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args = std::env::args().collect::<Vec<_>>();
    let parsed = match app::args::parse_args(&args) {
        Ok(value) => value,
        Err(message) => {
            if !message.is_empty() {
                eprintln!("{message}");
            }
            eprintln!("{}", app::args::USAGE);
            std::process::exit(2);
        }
    };

    if let Err(err) = app::run(parsed) {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
