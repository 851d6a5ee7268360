mod check;
mod collectors;
mod config;
mod perfdata;
mod plugin;

use clap::Parser;
use config::Config;
use plugin::{CheckResult, JsonReport, Status};
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "check_linux_newkernel")]
#[command(version)]
#[command(about = "Reports whether a kernel newer than the running one has been installed")]
struct Cli {
    #[arg(long)]
    config: Option<String>,
    #[arg(long)]
    print_default_config: bool,
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() {
    init_tracing();

    let cli = Cli::parse();
    if cli.print_default_config {
        println!("{}", Config::example_yaml());
        return;
    }

    let result = match load_config(cli.config.as_deref()) {
        Ok(cfg) => check::run_check(&cfg).await,
        Err(err) => {
            error!(error = %err, "failed to load configuration");
            CheckResult::new(Status::Unknown, err.to_string(), Vec::new())
        }
    };

    if cli.json {
        match serde_json::to_string_pretty(&JsonReport::from(&result)) {
            Ok(text) => println!("{text}"),
            Err(err) => {
                error!(error = %err, "failed to serialize check result");
                std::process::exit(Status::Unknown.exit_code());
            }
        }
    } else {
        println!("{}", result.render());
    }

    std::process::exit(result.status.exit_code());
}

fn load_config(path: Option<&str>) -> Result<Config, config::ConfigError> {
    match path {
        Some(path) => Config::load_from_file(path),
        None => Ok(Config::default()),
    }
}

// Plugin output owns stdout; logs go to stderr.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
