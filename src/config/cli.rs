use clap::{Parser, Subcommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "absence-digest")]
#[command(about = "Publishes absence announcements as a per-day digest")]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(short, long, global = true, default_value = "absence-digest.toml")]
    pub config: String,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Use in-memory channels and state instead of the configured ones
    #[arg(long, global = true)]
    pub dry_run: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Record an absence and add it to the day digest
    Submit {
        /// Range such as "17.11.2025 09:00 - 18.11.2025 16:00"
        #[arg(long)]
        range: String,

        #[arg(long, default_value = "")]
        reason: String,

        /// Platform user id of the absent member
        #[arg(long)]
        reporter: String,
    },

    /// Create the day records of a month (defaults to the current month)
    EnsureMonth {
        #[arg(long)]
        year: Option<i32>,

        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
        month: Option<u32>,
    },

    /// Check a range without writing anything
    Parse {
        #[arg(long)]
        range: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_submit_arguments() {
        let cli = CliConfig::try_parse_from([
            "absence-digest",
            "--verbose",
            "submit",
            "--range",
            "17.11.2025",
            "--reporter",
            "42",
        ])
        .unwrap();

        assert!(cli.verbose);
        assert_eq!(cli.config, "absence-digest.toml");
        match cli.command {
            Command::Submit {
                range,
                reason,
                reporter,
            } => {
                assert_eq!(range, "17.11.2025");
                assert_eq!(reason, "");
                assert_eq!(reporter, "42");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_month_out_of_range() {
        assert!(
            CliConfig::try_parse_from(["absence-digest", "ensure-month", "--month", "13"]).is_err()
        );
    }
}
