//! wtf-backup - Back up the World of Warcraft WTF folder and restore addon settings
//!
//! Usage:
//!   wtf-backup backup [options]     Create a new backup
//!   wtf-backup restore [options]    Restore addons from the latest backup
//!   wtf-backup config [options]     Show or change config.yaml
//!   wtf-backup --help               Show help

use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod cli;

use cli::CliCommand;

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();

    let command = match cli::parse_args(&args) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!();
            cli::print_help();
            std::process::exit(1);
        }
    };

    if command == CliCommand::Help {
        cli::print_help();
        return;
    }

    init_logging();

    if let Err(e) = cli::run(command) {
        tracing::error!("{:#}", e);
        std::process::exit(1);
    }
}

/// Log to stdout at `info` unless `RUST_LOG` says otherwise
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stdout)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
