use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use brigade::Config;

mod cli;

#[derive(Parser)]
#[command(name = "brigade")]
#[command(about = "Brigade - XP, levels, achievements and kitchen tasks for restaurant teams")]
#[command(version)]
struct Cli {
    /// Path to the config file (defaults to ~/.brigade/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Path to the progression database (overrides the config)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record an activity for a user and award its XP
    Award {
        /// User identifier
        user: String,

        /// Activity kind (e.g. recipe_generation, campaign_dislike)
        activity: String,

        /// XP to apply instead of the reward table amount (negative for penalties)
        #[arg(long, allow_hyphen_values = true)]
        xp: Option<i64>,

        /// Number of activities in this batch
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        count: Option<u32>,
    },

    /// Show a user's level, XP and counters
    Profile {
        /// User identifier
        user: String,
    },

    /// Show a user's daily and weekly tasks
    Tasks {
        /// User identifier
        user: String,
    },

    /// Show every achievement and whether a user unlocked it
    Achievements {
        /// User identifier
        user: String,
    },

    /// Show the top users by XP
    Leaderboard {
        /// Number of entries
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },

    /// Show the XP needed for each level
    Levels {
        /// Last level to show
        #[arg(long, default_value_t = 20)]
        up_to: u32,
    },

    /// Write a default configuration file
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Commands::Init { force } = cli.command {
        let path = cli.config.unwrap_or_else(Config::global_config_path);
        return cli::init::init_command(&path, force).await;
    }
    if let Commands::Levels { up_to } = cli.command {
        return cli::levels::levels_command(up_to, cli.json).await;
    }

    let mut config = Config::load_or_default(cli.config.as_deref())?;
    if let Some(db) = cli.db {
        config.store.path = Some(db);
    }
    let timeout = config.engine.operation_timeout();
    let engine = brigade::progression::open_engine(&config).with_context(|| {
        format!(
            "Failed to open progression store: {}",
            config.store.resolved_path().display()
        )
    })?;

    match cli.command {
        Commands::Award {
            user,
            activity,
            xp,
            count,
        } => {
            cli::award::award_command(engine, timeout, user, activity, xp, count, cli.json).await?;
        }
        Commands::Profile { user } => {
            cli::profile::profile_command(engine, timeout, user, cli.json).await?;
        }
        Commands::Tasks { user } => {
            cli::tasks::tasks_command(engine, timeout, user, cli.json).await?;
        }
        Commands::Achievements { user } => {
            cli::achievements::achievements_command(engine, timeout, user, cli.json).await?;
        }
        Commands::Leaderboard { limit } => {
            cli::leaderboard::leaderboard_command(engine, timeout, limit, cli.json).await?;
        }
        Commands::Levels { .. } | Commands::Init { .. } => {}
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_award_count_must_be_positive() {
        assert!(Cli::try_parse_from(["brigade", "award", "u1", "recipe_generation", "--count", "0"]).is_err());

        let cli =
            Cli::try_parse_from(["brigade", "award", "u1", "campaign_dislike", "--xp", "-5", "--count", "2"])
                .unwrap();
        match cli.command {
            Commands::Award { xp, count, .. } => {
                assert_eq!(xp, Some(-5));
                assert_eq!(count, Some(2));
            }
            _ => panic!("expected award"),
        }
    }
}
