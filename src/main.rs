//! fleetop - command-line companion for the vehicle owner API

use clap::Parser;

use fleetop::cli::{self, Cli, Commands, VehicleCommands, args::GlobalOptions};
use fleetop::error::Result;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.debug);

    if let Err(err) = run(cli).await {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

/// Warnings by default, debug for this crate with `--debug`; `RUST_LOG` wins.
fn init_logging(debug: bool) {
    let default_filter = if debug { "warn,fleetop=debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp_millis()
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let opts = GlobalOptions::from_cli(&cli);

    match cli.command {
        Commands::Init => cli::init::run(&opts).await,
        Commands::Status => cli::status::run(&opts),
        Commands::Version => {
            println!("fleetop version {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::Vehicle(cmd) => match cmd {
            VehicleCommands::List => cli::vehicle::list(&opts).await,
            VehicleCommands::Get { group } => cli::vehicle::get(group, &opts).await,
            VehicleCommands::Watch {
                group,
                interval,
                count,
            } => cli::vehicle::watch(group, interval, count, &opts).await,
        },
    }
}
