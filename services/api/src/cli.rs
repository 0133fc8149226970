use crate::infra::build_service;
use crate::server;
use clap::{Args, Parser, Subcommand};
use listings_gateway::config::AppConfig;
use listings_gateway::error::AppError;
use listings_gateway::listings::presets;
use listings_gateway::telemetry;

#[derive(Parser, Debug)]
#[command(
    name = "Listings Gateway",
    about = "Serve and inspect the brokerage site's listings provider integration",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Fetch the home page featured listings and print them as JSON
    Featured(ProviderArgs),
    /// List the neighborhood preset slugs
    Neighborhoods,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    #[command(flatten)]
    pub(crate) provider: ProviderArgs,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ProviderArgs {
    /// Override the listings provider base URL
    #[arg(long)]
    pub(crate) provider_url: Option<String>,
}

impl ProviderArgs {
    pub(crate) fn apply(self, config: &mut AppConfig) {
        if let Some(url) = self.provider_url {
            config.provider.base_url = url.trim_end_matches('/').to_string();
        }
    }
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Featured(args) => print_featured(args).await,
        Command::Neighborhoods => {
            for slug in presets::slugs() {
                println!("{slug}");
            }
            Ok(())
        }
    }
}

async fn print_featured(args: ProviderArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;
    args.apply(&mut config);
    telemetry::init(&config.telemetry, config.environment)?;

    let service = build_service(&config)?;
    let listings = service.featured_listings().await?;
    let rendered = serde_json::to_string_pretty(&listings).map_err(std::io::Error::from)?;
    println!("{rendered}");
    Ok(())
}
