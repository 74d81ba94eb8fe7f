pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use trimscout_core::config::{AppConfig, ConfigOverrides, LoadOptions, LogFormat, LoggingConfig};

use crate::commands::recommend::BudgetArgs;

#[derive(Debug, Parser)]
#[command(
    name = "trimscout",
    about = "Trimscout variant recommendation CLI",
    long_about = "Load a vehicle variant catalog, inspect it, and ask for upgrade or budget recommendations.",
    after_help = "Examples:\n  trimscout seed\n  trimscout upgrades --make Maruti --model Swift --variant LXi\n  trimscout budget 750000 --margin 5 --feature sunroof"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Path to a trimscout.toml config file")]
    config: Option<PathBuf>,
    #[arg(long, global = true, help = "Override database.url")]
    database_url: Option<String>,
    #[arg(long, global = true, help = "Override logging.level")]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Apply pending database migrations")]
    Migrate,
    #[command(about = "Classify and store a catalog (demo data unless --file is given)")]
    Seed {
        #[arg(long, help = "JSON array of raw variant records")]
        file: Option<PathBuf>,
    },
    #[command(about = "List makes in the stored catalog")]
    Makes,
    #[command(about = "List models of a make")]
    Models {
        #[arg(long)]
        make: String,
    },
    #[command(about = "List the variants of a model in tier order")]
    Variants {
        #[arg(long)]
        make: String,
        #[arg(long)]
        model: String,
    },
    #[command(about = "Suggest higher trims of the same model with their feature differences")]
    Upgrades {
        #[arg(long)]
        make: String,
        #[arg(long)]
        model: String,
        #[arg(long = "variant")]
        variant_name: String,
        #[arg(long, help = "Number of upgrades (1-3, defaults to search.upgrade_count)")]
        count: Option<usize>,
    },
    #[command(about = "Find variants priced around a budget, ranked by required features")]
    Budget {
        #[arg(required_unless_present_any = ["price_min", "price_max"])]
        budget: Option<i64>,
        #[arg(long = "price-min", conflicts_with = "budget", help = "Lower end of a price range")]
        price_min: Option<i64>,
        #[arg(long = "price-max", conflicts_with = "budget", help = "Upper end of a price range")]
        price_max: Option<i64>,
        #[arg(long = "margin", help = "Initial margin in percent")]
        margin_pct: Option<u32>,
        #[arg(long)]
        make: Option<String>,
        #[arg(long)]
        model: Option<String>,
        #[arg(long = "min")]
        min_results: Option<usize>,
        #[arg(long = "max")]
        max_results: Option<usize>,
        #[arg(long = "brand", help = "Search across these makes (repeatable)")]
        brands: Vec<String>,
        #[arg(long = "feature", help = "Required feature keyword (repeatable)")]
        features: Vec<String>,
        #[arg(long = "fuel", help = "Only this fuel type")]
        fuel_type: Option<String>,
        #[arg(long = "body", help = "Only this body type")]
        body_type: Option<String>,
        #[arg(long = "seats", help = "Only this seating capacity")]
        seating_capacity: Option<u8>,
    },
    #[command(about = "Re-check stored model groups for tier and price anomalies")]
    Audit,
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let options = LoadOptions {
        require_file: cli.config.is_some(),
        config_path: cli.config.clone(),
        overrides: ConfigOverrides {
            database_url: cli.database_url,
            log_level: cli.log_level,
            ..ConfigOverrides::default()
        },
    };
    let config = match AppConfig::load(options) {
        Ok(config) => config,
        Err(error) => {
            let result = commands::CommandResult::failure(
                command_name(&cli.command),
                "config_validation",
                format!("configuration issue: {error}"),
                2,
            );
            println!("{}", result.output);
            return ExitCode::from(result.exit_code);
        }
    };
    init_logging(&config.logging);

    let result = match cli.command {
        Command::Migrate => commands::migrate::run(&config),
        Command::Seed { file } => commands::seed::run(&config, file.as_deref()),
        Command::Makes => commands::catalog::makes(&config),
        Command::Models { make } => commands::catalog::models(&config, &make),
        Command::Variants { make, model } => commands::catalog::variants(&config, &make, &model),
        Command::Upgrades { make, model, variant_name, count } => {
            commands::recommend::upgrades(&config, &make, &model, &variant_name, count)
        }
        Command::Budget {
            budget,
            price_min,
            price_max,
            margin_pct,
            make,
            model,
            min_results,
            max_results,
            brands,
            features,
            fuel_type,
            body_type,
            seating_capacity,
        } => commands::recommend::budget(
            &config,
            BudgetArgs {
                budget,
                price_min,
                price_max,
                margin_pct,
                make,
                model,
                min_results,
                max_results,
                brands,
                features,
                fuel_type,
                body_type,
                seating_capacity,
            },
        ),
        Command::Audit => commands::catalog::audit(&config),
        Command::Config => commands::CommandResult {
            exit_code: 0,
            output: commands::config::run(&config, cli.config.as_deref()),
        },
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

fn command_name(command: &Command) -> &'static str {
    match command {
        Command::Migrate => "migrate",
        Command::Seed { .. } => "seed",
        Command::Makes => "makes",
        Command::Models { .. } => "models",
        Command::Variants { .. } => "variants",
        Command::Upgrades { .. } => "upgrades",
        Command::Budget { .. } => "budget",
        Command::Audit => "audit",
        Command::Config => "config",
    }
}

/// Logs go to stderr so stdout stays a single JSON payload.
fn init_logging(config: &LoggingConfig) {
    if let Err(error) = try_init_logging(config) {
        // Only the first subscriber wins; later calls keep logging through it.
        tracing::debug!(
            event_name = "cli.logging.already_installed",
            error = %error,
            "global subscriber already installed"
        );
    }
}

fn try_init_logging(
    config: &LoggingConfig,
) -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.as_str()));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    match config.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use trimscout_core::config::{LogFormat, LoggingConfig};

    use super::{init_logging, try_init_logging, Cli, Command};

    #[test]
    fn budget_flags_parse_repeatable_lists() {
        let cli = Cli::try_parse_from([
            "trimscout",
            "budget",
            "750000",
            "--margin",
            "5",
            "--brand",
            "Kia",
            "--brand",
            "Tata",
            "--feature",
            "sunroof",
        ])
        .expect("parse");

        let Command::Budget { budget, margin_pct, brands, features, .. } = cli.command else {
            panic!("expected budget command");
        };
        assert_eq!(budget, Some(750_000));
        assert_eq!(margin_pct, Some(5));
        assert_eq!(brands, vec!["Kia", "Tata"]);
        assert_eq!(features, vec!["sunroof"]);
    }

    #[test]
    fn global_database_url_is_accepted_after_the_subcommand() {
        let cli = Cli::try_parse_from(["trimscout", "makes", "--database-url", "sqlite::memory:"])
            .expect("parse");

        assert_eq!(cli.database_url.as_deref(), Some("sqlite::memory:"));
        assert!(matches!(cli.command, Command::Makes));
    }

    #[test]
    fn budget_accepts_a_price_range_and_attribute_flags() {
        let cli = Cli::try_parse_from([
            "trimscout",
            "budget",
            "--price-min",
            "600000",
            "--price-max",
            "900000",
            "--fuel",
            "Diesel",
            "--seats",
            "7",
        ])
        .expect("parse");

        let Command::Budget { budget, price_min, price_max, fuel_type, seating_capacity, .. } =
            cli.command
        else {
            panic!("expected budget command");
        };
        assert_eq!(budget, None);
        assert_eq!((price_min, price_max), (Some(600_000), Some(900_000)));
        assert_eq!(fuel_type.as_deref(), Some("Diesel"));
        assert_eq!(seating_capacity, Some(7));
    }

    #[test]
    fn budget_requires_an_amount_or_a_range() {
        assert!(Cli::try_parse_from(["trimscout", "budget"]).is_err());
        assert!(Cli::try_parse_from(["trimscout", "budget", "750000", "--price-max", "800000"])
            .is_err());
    }

    #[test]
    fn second_logging_init_reports_instead_of_panicking() {
        let config = LoggingConfig { level: "warn".to_string(), format: LogFormat::Compact };

        init_logging(&config);

        assert!(try_init_logging(&config).is_err());
        init_logging(&config);
    }

    #[test]
    fn upgrades_requires_the_selected_variant() {
        let error =
            Cli::try_parse_from(["trimscout", "upgrades", "--make", "Maruti", "--model", "Swift"])
                .expect_err("missing --variant");

        assert!(error.to_string().contains("--variant"));
    }
}
