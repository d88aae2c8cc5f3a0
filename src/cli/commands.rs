use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "surgefade", about = "Post-earnings short-selling agent")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Continuous 7x24 loop: pipeline during market hours, idle otherwise
    Run,
    /// Execute one full pipeline pass and print the final run state
    Once,
    /// List journaled trades
    Trades {
        #[arg(long, default_value = "20")]
        limit: usize,
    },
    /// Check broad-market health (the surge gate's index check)
    Health,
}
