use clap::{Parser, Subcommand};

use crate::balancer::Profile;
use crate::models::BalanceOptions;

/// Macro balancer: adjust recipe ingredient quantities toward macro targets.
#[derive(Parser, Debug)]
#[command(name = "macro_balancer")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Balance a single recipe or a batch of recipes.
    Balance {
        /// Path to the request JSON file.
        #[arg(short, long)]
        request: String,

        /// Path to the food catalog (JSON, or CSV by extension).
        #[arg(short, long, default_value = "foods.json")]
        catalog: String,

        /// Dietary profile; overrides the request's options.
        #[arg(long, value_enum)]
        profile: Option<Profile>,

        /// Iteration budget; overrides the request's options.
        #[arg(long)]
        max_iterations: Option<usize>,

        /// Step for grams-based ingredients; overrides the request's options.
        #[arg(long)]
        step_grams: Option<f64>,

        /// Write the response JSON here instead of stdout.
        #[arg(short, long)]
        out: Option<String>,

        /// Also write (identifier, grams) update rows as CSV.
        #[arg(long)]
        updates: Option<String>,
    },

    /// Show the group each catalog food is classified into.
    Classify {
        /// Path to the food catalog (JSON, or CSV by extension).
        #[arg(short, long, default_value = "foods.json")]
        catalog: String,

        /// Only these food ids (default: all).
        ids: Vec<i64>,
    },
}

impl Command {
    /// Options given on the command line; these win over the request's.
    pub fn overrides(&self) -> BalanceOptions {
        match self {
            Command::Balance {
                profile,
                max_iterations,
                step_grams,
                ..
            } => BalanceOptions {
                profile: *profile,
                step_grams: *step_grams,
                max_iterations: *max_iterations,
            },
            Command::Classify { .. } => BalanceOptions::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_balance_overrides() {
        let cli = Cli::parse_from([
            "macro_balancer",
            "balance",
            "--request",
            "req.json",
            "--profile",
            "low-carb-satiety",
            "--max-iterations",
            "20",
        ]);
        let overrides = cli.command.overrides();
        assert_eq!(overrides.profile, Some(Profile::LowCarbSatiety));
        assert_eq!(overrides.max_iterations, Some(20));
        assert_eq!(overrides.step_grams, None);
    }

    #[test]
    fn test_parse_classify_ids() {
        let cli = Cli::parse_from(["macro_balancer", "classify", "--catalog", "f.csv", "3", "7"]);
        match cli.command {
            Command::Classify { catalog, ids } => {
                assert_eq!(catalog, "f.csv");
                assert_eq!(ids, vec![3, 7]);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
