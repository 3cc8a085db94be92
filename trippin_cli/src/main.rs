mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use trippin_lib::ClientConfig;

use crate::commands::people::{NameArgs, SuffixArgs, UserNameArgs};
use crate::output::OutputFormat;

#[derive(Parser)]
#[command(name = "trippin")]
#[command(about = "Run query demonstrations against the TripPin OData sample service")]
struct Cli {
    /// Output format: table or json
    #[arg(long, default_value = "table", global = true)]
    output: String,

    /// Service root URL (overrides TRIPPIN_SERVICE_ROOT)
    #[arg(long, global = true)]
    service_root: Option<String>,

    /// Run a single demonstration instead of the whole sequence
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// All people, ordered by first name
    People,
    /// People with a given first name (filtered locally)
    Named(NameArgs),
    /// People whose first name ends with a suffix (filtered by the service)
    Suffix(SuffixArgs),
    /// Look up one person by user name
    Person(UserNameArgs),
    /// List every user name
    UserNames,
    /// The signed-in user and their trips
    MyTrips,
    /// People and airlines in a single batch request
    Batch,
    /// Number of people and airlines
    Counts,
    /// Male people with a given first name, ordered and projected
    Projection(NameArgs),
    /// People with a given first name and their trips, expanded in one request
    Trips(NameArgs),
}

impl Commands {
    /// Every demonstration, in the order the full run shows them.
    fn sequence() -> Vec<(&'static str, Commands)> {
        vec![
            ("All people ordered by first name", Commands::People),
            ("People named Vincent", Commands::Named(NameArgs::default())),
            ("People whose first name ends with Clyde", Commands::Suffix(SuffixArgs::default())),
            ("Person russellwhyte", Commands::Person(UserNameArgs::default())),
            ("All user names", Commands::UserNames),
            ("My trips", Commands::MyTrips),
            ("People and airlines in one batch", Commands::Batch),
            ("Entity counts", Commands::Counts),
            ("Male people named Vincent", Commands::Projection(NameArgs::default())),
            ("People named Vincent with their trips", Commands::Trips(NameArgs::default())),
        ]
    }
}

async fn dispatch(
    command: &Commands,
    client: &trippin_lib::TripPinClient,
    format: &OutputFormat,
) -> Result<()> {
    match command {
        Commands::People => commands::people::run_people(client, format).await,
        Commands::Named(args) => commands::people::run_named(args, client, format).await,
        Commands::Suffix(args) => commands::people::run_suffix(args, client, format).await,
        Commands::Person(args) => commands::people::run_person(args, client, format).await,
        Commands::UserNames => commands::people::run_user_names(client, format).await,
        Commands::MyTrips => commands::trips::run_my_trips(client, format).await,
        Commands::Batch => commands::batch::run_batch(client, format).await,
        Commands::Counts => commands::batch::run_counts(client, format).await,
        Commands::Projection(args) => commands::people::run_projection(args, client, format).await,
        Commands::Trips(args) => commands::trips::run_expanded(args, client, format).await,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("trippin=info".parse().unwrap()),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let format = match cli.output.as_str() {
        "json" => OutputFormat::Json,
        _ => OutputFormat::Table,
    };

    let mut config = ClientConfig::from_env()?;
    if let Some(root) = &cli.service_root {
        config = config.with_service_root(root.as_str());
    }
    let client = config.build_client()?;

    match &cli.command {
        Some(command) => dispatch(command, &client, &format).await?,
        None => {
            for (index, (title, command)) in Commands::sequence().iter().enumerate() {
                println!("\n== {}. {} ==", index + 1, title);
                if let Err(e) = dispatch(command, &client, &format).await {
                    eprintln!("Error: {:#}", e);
                }
            }
        }
    }

    Ok(())
}
