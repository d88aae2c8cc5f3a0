use clap::Parser;
use surgefade::cli::commands::{Cli, Commands};
use surgefade::SurgeFade;

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let db_path = std::env::var("SURGEFADE_DB").unwrap_or_else(|_| "./surgefade.db".into());

    let agent = match SurgeFade::new(&db_path) {
        Ok(agent) => agent,
        Err(e) => {
            eprintln!("Error initializing surgefade: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = run_command(agent, cli.command).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run_command(agent: SurgeFade, cmd: Commands) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        Commands::Run => {
            agent.run_loop().await;
        }
        Commands::Once => {
            let state = agent.run_once().await;
            println!("{}", serde_json::to_string_pretty(&state)?);
        }
        Commands::Trades { limit } => {
            let trades = agent.trades(Some(limit))?;
            println!("{}", serde_json::to_string_pretty(&trades)?);
        }
        Commands::Health => {
            let health = agent.market_health().await?;
            println!("{}", serde_json::to_string_pretty(&health)?);
        }
    }
    Ok(())
}
