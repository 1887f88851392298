//! servicekit binary entry point

use color_eyre::Result;
use serde_json::Value;
use servicekit::cli::{self, Cli};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Install error handler
    color_eyre::install()?;

    // Credentials may come from a .env file
    dotenv::dotenv().ok();

    let cli = Cli::parse_args();

    // Set up logging on stderr, keeping stdout for results
    let filter = if cli.verbose {
        EnvFilter::new("servicekit=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = cli::load_config(cli.config.as_deref())?;

    match cli::run(cli.command, &config).await? {
        Value::String(text) => println!("{text}"),
        result => println!("{}", serde_json::to_string_pretty(&result)?),
    }

    Ok(())
}
