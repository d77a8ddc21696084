#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the Sinaloa homicide report generator.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use sinaloa_report_crime_models::CrimeType;
use sinaloa_report_generate::config::{Overrides, ReportConfig};
use sinaloa_report_generate::sections::section_names;
use sinaloa_report_source::registry::all_datasets;

#[derive(Parser)]
#[command(
    name = "sinaloa_report_generate",
    about = "Writes the Sinaloa homicide report sections"
)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args)]
struct GlobalArgs {
    /// Report configuration file (defaults to the embedded `report.toml`)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Directory holding the datasets
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    /// Base URL the datasets are fetched from (wins over `--data-dir`)
    #[arg(long, global = true)]
    base_url: Option<String>,
    /// Directory the section documents are written to
    #[arg(long, global = true)]
    output: Option<PathBuf>,
    /// Rows per ranking table
    #[arg(long, global = true)]
    top_n: Option<usize>,
    /// Crime shown on maps and rankings (e.g., `homicidio_doloso`)
    #[arg(long, global = true)]
    crime: Option<CrimeType>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write every section (the default)
    All,
    /// Write only the named sections
    Section {
        /// Section names (e.g., `national`, `profile_culiacan`)
        #[arg(required = true)]
        names: Vec<String>,
    },
    /// List the sections the current configuration produces
    Sections,
    /// List the registered datasets
    ListDatasets,
    /// Choose sections and parameters from a menu
    Interactive,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = sinaloa_report_cli_utils::init_logger();
    let cli = Cli::parse();

    let mut config = ReportConfig::load(cli.global.config.as_deref())?;
    config.apply(Overrides {
        data_dir: cli.global.data_dir,
        base_url: cli.global.base_url,
        output: cli.global.output,
        top_n: cli.global.top_n,
        crime: cli.global.crime,
    });

    match cli.command.unwrap_or(Commands::All) {
        Commands::All => {
            let names = section_names(&config);
            sinaloa_report_generate::run(&config, &names, &multi).await?;
        }
        Commands::Section { names } => {
            let known = section_names(&config);
            if let Some(unknown) = names.iter().find(|n| !known.contains(*n)) {
                return Err(format!(
                    "Unknown section: {unknown} (available: {})",
                    known.join(", ")
                )
                .into());
            }
            sinaloa_report_generate::run(&config, &names, &multi).await?;
        }
        Commands::Sections => {
            for name in section_names(&config) {
                println!("{name}");
            }
        }
        Commands::ListDatasets => {
            let datasets = all_datasets();
            println!("{:<28} {:<36} NAME", "ID", "FILE");
            println!("{}", "-".repeat(90));
            for dataset in &datasets {
                println!(
                    "{:<28} {:<36} {}{}",
                    dataset.id.as_ref(),
                    dataset.file,
                    dataset.name,
                    if dataset.optional { " (optional)" } else { "" }
                );
            }
        }
        Commands::Interactive => {
            sinaloa_report_generate::interactive::run(config, &multi).await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crime_flag_parses_snake_case_names() {
        let cli = Cli::try_parse_from(["sinaloa_report_generate", "--crime", "feminicidio"]).unwrap();
        assert_eq!(cli.global.crime, Some(CrimeType::Feminicidio));
        assert!(cli.command.is_none());
    }

    #[test]
    fn global_flags_follow_subcommands() {
        let cli = Cli::try_parse_from([
            "sinaloa_report_generate",
            "section",
            "national",
            "war",
            "--crime",
            "homicidio_doloso",
            "--top-n",
            "5",
        ])
        .unwrap();
        assert_eq!(cli.global.crime, Some(CrimeType::HomicidioDoloso));
        assert_eq!(cli.global.top_n, Some(5));
        assert!(matches!(
            cli.command,
            Some(Commands::Section { ref names }) if names == &["national", "war"]
        ));
    }

    #[test]
    fn unknown_crime_is_rejected() {
        assert!(Cli::try_parse_from(["sinaloa_report_generate", "--crime", "robo"]).is_err());
    }
}
