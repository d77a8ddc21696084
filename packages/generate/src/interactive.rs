//! Interactive menu for the generate tool.
//!
//! Provides a terminal-based UI using `dialoguer` that lets users pick
//! which sections to write and tweak the common parameters without
//! memorizing CLI flags.

use std::path::PathBuf;

use dialoguer::{Confirm, Input, MultiSelect, Select};
use sinaloa_report_cli_utils::MultiProgress;
use sinaloa_report_crime_models::CrimeType;

use crate::config::{Overrides, ReportConfig};
use crate::sections::section_names;
use crate::{resolve_output_dir, run as run_report};

/// Runs the interactive generation menu.
///
/// # Errors
///
/// Returns an error if user input fails or the report cannot be written.
pub async fn run(
    mut config: ReportConfig,
    multi: &MultiProgress,
) -> Result<(), Box<dyn std::error::Error>> {
    let all = section_names(&config);

    let choices = &["Generate all sections", "Choose sections"];
    let selection = Select::new()
        .with_prompt("What would you like to generate?")
        .items(choices)
        .default(0)
        .interact()?;

    let names: Vec<String> = match selection {
        0 => all,
        1 => {
            let picked = MultiSelect::new()
                .with_prompt("Sections (space to toggle)")
                .items(&all)
                .interact()?;
            picked.into_iter().map(|index| all[index].clone()).collect()
        }
        _ => unreachable!(),
    };

    if names.is_empty() {
        println!("No sections selected.");
        return Ok(());
    }

    let crimes: Vec<&str> = CrimeType::all().iter().map(|c| c.label()).collect();
    let current = CrimeType::all()
        .iter()
        .position(|c| *c == config.report.crime)
        .unwrap_or(0);
    let crime = Select::new()
        .with_prompt("Crime shown on maps and rankings")
        .items(&crimes)
        .default(current)
        .interact()?;

    let top_n: usize = Input::new()
        .with_prompt("Rows per ranking table")
        .default(config.report.top_n)
        .interact_text()?;

    let output: String = Input::new()
        .with_prompt("Output directory")
        .default(resolve_output_dir(&config).display().to_string())
        .interact_text()?;

    config.apply(Overrides {
        output: Some(PathBuf::from(output.trim())),
        top_n: Some(top_n),
        crime: Some(CrimeType::all()[crime]),
        ..Overrides::default()
    });

    let proceed = Confirm::new()
        .with_prompt(format!("Write {} sections?", names.len()))
        .default(true)
        .interact()?;
    if !proceed {
        return Ok(());
    }

    let manifest = run_report(&config, &names, multi).await?;
    println!(
        "{} sections written, {} failed",
        manifest.sections.len(),
        manifest.failures.len()
    );

    Ok(())
}
