// tabrules-cli/src/main.rs
// ============================================================================
// Module: Tab Rules CLI Entry Point
// Description: `clap`-derived subcommand dispatcher over tabrules_cli's
//              library functions.
// Purpose: Demonstrate and exercise the engine from a terminal: list rules,
//          preview a rule's proposed actions, or run one for real against
//          the in-memory fake driver.
// Dependencies: clap, tabrules-cli, tabrules-config, tracing-subscriber
// ============================================================================

//! ## Overview
//! This binary is a demo host, not a browser extension: it seeds
//! [`tabrules_cli::fakes::FakeBrowserDriver`] with a handful of example tabs
//! and runs rules from a JSON file against them. The `tracing` subscriber
//! is configured here and nowhere else, with `EnvFilter` reading
//! `RUST_LOG` so verbosity stays the caller's choice.

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use clap::Subcommand;
use tabrules_cli::fakes::FakeBrowserDriver;
use tabrules_cli::fakes::FakeKvStore;
use tabrules_cli::rule_store::default_rules_path;

/// Tab-management rules engine demo CLI.
#[derive(Parser, Debug)]
#[command(name = "tabrules", about = "Run declarative tab-management rules against an in-memory browser")]
struct Cli {
    /// Path to the JSON rules file.
    #[arg(long, global = true, value_name = "PATH")]
    rules: Option<PathBuf>,
    /// Path to a TOML engine config file; falls back to defaults.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Selected subcommand.
    #[command(subcommand)]
    command: Commands,
}

/// Supported subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// List every rule defined in the rules file.
    List,
    /// Run one rule for real against a freshly seeded demo snapshot.
    Run {
        /// The rule id to run.
        rule_id: String,
    },
    /// Preview one rule's matches and proposed actions without mutating
    /// anything.
    Preview {
        /// The rule id to preview.
        rule_id: String,
    },
}

/// Seeds a small demo tab snapshot so `run`/`preview` have something to
/// match against.
fn seed_demo_tabs(driver: &FakeBrowserDriver) {
    driver.seed_window(
        &[
            ("https://news.example.com/a", "Breaking: Example Event"),
            ("https://news.example.com/b", "Breaking: Example Event"),
            ("https://docs.rs/tabrules", "tabrules docs"),
        ],
        tabrules_cli::now_ms() - 3_600_000,
    );
}

/// Writes a run result to stdout as pretty-printed `Debug` output.
///
/// `RuleRunResult` carries no `Serialize` impl (see `tabrules-core`'s model
/// module): it holds `RunError`, which is loggable but not wire-shaped.
/// `Debug` is the CLI's one human-readable rendering of it.
#[allow(clippy::use_debug, reason = "RuleRunResult has no Serialize impl; Debug is this CLI's only rendering of it.")]
fn print_result(result: &tabrules_core::RuleRunResult) {
    let _ = writeln!(std::io::stdout().lock(), "{result:#?}");
}

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let config = match tabrules_cli::load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(message) => {
            tracing::error!(%message, "failed to load engine config");
            return ExitCode::FAILURE;
        }
    };

    let rules_path = cli.rules.unwrap_or_else(default_rules_path);
    let rules = match tabrules_cli::load_rule_store(&rules_path) {
        Ok(rules) => rules,
        Err(message) => {
            tracing::error!(%message, path = %rules_path.display(), "failed to load rules file");
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Commands::List => match tabrules_cli::list_rules(&rules) {
            Ok(listed) => {
                let mut stdout = std::io::stdout().lock();
                for (id, name, enabled) in listed {
                    let _ = writeln!(stdout, "{id}\t{name}\t{}", if enabled { "enabled" } else { "disabled" });
                }
                ExitCode::SUCCESS
            }
            Err(message) => {
                tracing::error!(%message, "failed to list rules");
                ExitCode::FAILURE
            }
        },
        Commands::Run { rule_id } => {
            let driver = FakeBrowserDriver::new();
            seed_demo_tabs(&driver);
            let kv = FakeKvStore::new();
            match tabrules_cli::run_one(&rule_id, &rules, &driver, &kv, &config) {
                Ok(result) => {
                    print_result(&result);
                    ExitCode::SUCCESS
                }
                Err(error) => {
                    tracing::error!(%error, "rule run failed to start");
                    ExitCode::FAILURE
                }
            }
        }
        Commands::Preview { rule_id } => {
            let driver = FakeBrowserDriver::new();
            seed_demo_tabs(&driver);
            let kv = FakeKvStore::new();
            match tabrules_cli::preview_one(&rule_id, &rules, &driver, &kv, &config) {
                Ok(result) => {
                    print_result(&result);
                    ExitCode::SUCCESS
                }
                Err(error) => {
                    tracing::error!(%error, "rule preview failed to start");
                    ExitCode::FAILURE
                }
            }
        }
    }
}
