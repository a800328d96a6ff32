use clap::{Parser, Subcommand};

/// Time AI — chat backend server
#[derive(Parser)]
#[command(name = "timeai", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server
    Serve {
        /// Port to bind; falls back to the next free port when taken
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Write subscription-plan seed documents
    Seed {
        #[command(subcommand)]
        command: SeedCommands,
    },
}

#[derive(Subcommand)]
pub enum SeedCommands {
    /// Seed the plan_configs collection
    Plans,
    /// Seed the subscription_plans collection
    Subscriptions,
    /// Seed every collection
    All,
}
