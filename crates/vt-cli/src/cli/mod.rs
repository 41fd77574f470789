use chrono::NaiveDate;
use clap::Parser;

pub mod global;
pub mod root_commands;
pub mod subcommands;

pub use global::{GlobalFlags, OutputFormat};
pub use root_commands::Commands;

/// Top-level CLI parser for the `vt` binary.
#[derive(Debug, Parser)]
#[command(name = "vt", version, about = "valtrack - validator movement workflow")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format: json, table, raw
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Max results to return
    #[arg(short, long, global = true)]
    pub limit: Option<u32>,

    /// Quiet mode (suppress non-essential output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Actor recorded in the audit trail (defaults to general.default_actor)
    #[arg(short, long, global = true)]
    pub actor: Option<String>,

    /// Database path, overrides database.path
    #[arg(long, global = true)]
    pub db: Option<String>,

    /// Processing date (YYYY-MM-DD) used by the edit lock instead of the system date
    #[arg(long, global = true)]
    pub today: Option<NaiveDate>,
}

impl Cli {
    /// Extract ergonomic global flags struct for command handlers.
    #[must_use]
    pub fn global_flags(&self) -> GlobalFlags {
        GlobalFlags {
            format: self.format,
            limit: self.limit,
            quiet: self.quiet,
            verbose: self.verbose,
            actor: self.actor.clone(),
            db: self.db.clone(),
            today: self.today,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use clap::{CommandFactory, Parser};

    use super::subcommands::{MovementCommands, PreparationCommands, ReviewCommands};
    use super::{Cli, Commands, GlobalFlags, OutputFormat};

    #[test]
    fn clap_command_tree_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_parse_before_subcommand() {
        let cli = Cli::try_parse_from([
            "vt",
            "--format",
            "table",
            "--limit",
            "10",
            "--verbose",
            "validator",
            "list",
        ])
        .expect("cli should parse");

        assert_eq!(cli.format, OutputFormat::Table);
        assert_eq!(cli.limit, Some(10));
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Validator { .. }));
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from([
            "vt", "movement", "get", "mov-1", "--format", "raw", "--quiet",
        ])
        .expect("cli should parse");

        assert_eq!(cli.format, OutputFormat::Raw);
        assert!(cli.quiet);
        assert!(matches!(
            cli.command,
            Commands::Movement {
                action: MovementCommands::Get { .. }
            }
        ));
    }

    #[test]
    fn output_format_rejects_invalid_value() {
        let parsed = Cli::try_parse_from(["vt", "--format", "xml", "catalog", "list"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn today_must_be_a_calendar_date() {
        let cli = Cli::try_parse_from(["vt", "--today", "2024-02-29", "catalog", "list"])
            .expect("cli should parse");
        assert_eq!(cli.today, NaiveDate::from_ymd_opt(2024, 2, 29));

        let parsed = Cli::try_parse_from(["vt", "--today", "2023-02-29", "catalog", "list"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn global_flags_extraction_copies_values() {
        let cli = Cli::try_parse_from([
            "vt",
            "--actor",
            "sup-1",
            "--db",
            "/tmp/vt.db",
            "catalog",
            "list",
        ])
        .expect("cli should parse");
        let flags: GlobalFlags = cli.global_flags();
        assert_eq!(flags.actor.as_deref(), Some("sup-1"));
        assert_eq!(flags.db.as_deref(), Some("/tmp/vt.db"));
    }

    #[test]
    fn review_verdict_and_dates_parse() {
        let cli = Cli::try_parse_from([
            "vt",
            "review",
            "record",
            "mov-1",
            "--verdict",
            "not-ok",
            "--reviewed-on",
            "2024-01-03",
        ])
        .expect("cli should parse");

        let Commands::Review {
            action: ReviewCommands::Record {
                verdict,
                reviewed_on,
                create,
                ..
            },
        } = cli.command
        else {
            panic!("expected review record");
        };
        assert_eq!(verdict.as_deref(), Some("not-ok"));
        assert_eq!(reviewed_on, NaiveDate::from_ymd_opt(2024, 1, 3));
        assert!(!create);
    }

    #[test]
    fn preparation_flags_take_explicit_booleans() {
        let cli = Cli::try_parse_from([
            "vt",
            "preparation",
            "record",
            "mov-1",
            "--plate-changed",
            "true",
            "--final-plate",
            "PL-9",
            "--create",
        ])
        .expect("cli should parse");

        let Commands::Preparation {
            action:
                PreparationCommands::Record {
                    plate_changed,
                    final_plate,
                    create,
                    ..
                },
        } = cli.command
        else {
            panic!("expected preparation record");
        };
        assert_eq!(plate_changed, Some(true));
        assert_eq!(final_plate.as_deref(), Some("PL-9"));
        assert!(create);
    }

    #[test]
    fn movement_open_requires_validator_and_origin() {
        assert!(Cli::try_parse_from(["vt", "movement", "open", "--origin", "field"]).is_err());
        let cli = Cli::try_parse_from([
            "vt",
            "movement",
            "open",
            "val-1",
            "--origin",
            "warranty",
            "--intake-date",
            "2024-01-01",
        ])
        .expect("cli should parse");
        assert!(matches!(
            cli.command,
            Commands::Movement {
                action: MovementCommands::Open { .. }
            }
        ));
    }
}
