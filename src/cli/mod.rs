pub mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "cashcard-api")]
#[command(about = "Cash Card API - owner-scoped cash card REST service")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP server (default)")]
    Serve(commands::serve::ServeArgs),

    #[command(about = "Print a bcrypt hash for a users file entry")]
    HashPassword {
        #[arg(help = "Plain-text password")]
        password: String,
        #[arg(long, default_value_t = bcrypt::DEFAULT_COST, help = "bcrypt cost factor")]
        cost: u32,
    },

    #[command(about = "List the configured user directory (usernames and roles only)")]
    Users {
        #[arg(long, help = "Users YAML file (defaults to SECURITY_USERS_FILE)")]
        file: Option<std::path::PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        None => commands::serve::handle(commands::serve::ServeArgs::default()).await,
        Some(Commands::Serve(args)) => commands::serve::handle(args).await,
        Some(Commands::HashPassword { password, cost }) => {
            commands::users::hash_password(&password, cost, output_format)
        }
        Some(Commands::Users { file }) => commands::users::list(file, output_format),
    }
}
