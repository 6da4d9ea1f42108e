//! Distribution fitting command
//!
//! Fits the requested families to one dataset, prints the ranked table and
//! summarizes the best-ranked model.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use fraclen_fit::{
    distribution::FittedDistribution,
    export,
    family::all_distribution_families,
    fitter::{DistributionFitter, FitRecord, SortBy},
    metrics::InformationCriterion,
};

use crate::util::{self, Output};

#[derive(Debug, Clone, Args)]
pub(crate) struct FitArg {
    /// Path to the dataset JSON file
    pub dataset: PathBuf,

    /// Families to fit, by identifier or alias (comma-separated, default: all)
    #[arg(long, value_delimiter = ',')]
    pub families: Vec<String>,

    /// Information criterion used for ranking (aic, aicc, bic)
    #[arg(long, default_value = "aicc")]
    pub criterion: InformationCriterion,

    /// Column to order the printed table by
    #[arg(long, default_value = "criterion")]
    pub sort_by: SortBy,

    /// Write the result table to this CSV file
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Field delimiter of the CSV file
    #[arg(long, default_value_t = ',')]
    pub delimiter: char,

    /// Decimal places in the printed table
    #[arg(long, default_value_t = 4)]
    pub decimals: usize,
}

pub(crate) fn run(arg: &FitArg) -> anyhow::Result<()> {
    let delimiter = u8::try_from(arg.delimiter)
        .ok()
        .filter(u8::is_ascii)
        .with_context(|| format!("Delimiter must be an ASCII character: {:?}", arg.delimiter))?;

    let sample = util::read_dataset_file(&arg.dataset)?;
    let names = if arg.families.is_empty() {
        all_distribution_families()
            .iter()
            .map(|family| family.id().to_owned())
            .collect()
    } else {
        arg.families.clone()
    };

    let mut fitter = DistributionFitter::with_criterion(sample, arg.criterion);
    for name in &names {
        eprintln!("Fitting {name}...");
        if let Err(err) = fitter.fit(name) {
            eprintln!("  failed: {err}");
        }
    }
    eprintln!(
        "Fitted {} of {} families",
        fitter.len(),
        fitter.len() + fitter.failures().len()
    );
    anyhow::ensure!(!fitter.is_empty(), "No family could be fitted");

    println!("Fit Results (ranked by {})", fitter.criterion());
    println!("==========================================\n");
    print!("{}", export::format_table(&fitter, arg.decimals));
    if arg.sort_by != SortBy::Criterion {
        println!("\nOrder by {:?}:", arg.sort_by);
        let order = fitter
            .fit_records(arg.sort_by)
            .iter()
            .map(|record| record.name)
            .collect::<Vec<_>>();
        println!("  {}", order.join(", "));
    }
    println!();

    match fitter.best_fit() {
        Some(best) => print_best_fit(best),
        None => println!(
            "Best fit: none ({} undefined for every family at n = {})",
            fitter.criterion(),
            fitter.sample().len()
        ),
    }

    if let Some(path) = &arg.output {
        let mut output = Output::open(path.clone())?;
        export::write_csv(&fitter, &mut output, delimiter)
            .with_context(|| format!("Failed to write CSV to {}", output.display_path()))?;
        println!("\nResult table saved to: {}", path.display());
    }

    Ok(())
}

fn print_best_fit(best: &FitRecord) {
    let fitted = &best.fitted;
    println!("Best fit: {} ({})", fitted.family().name(), best.name);
    print_parameters(fitted);

    let mode = fitted.mode().map_or_else(
        |err| {
            log::warn!("mode of {} not found: {err}", best.name);
            "N/A".to_owned()
        },
        |mode| format!("{mode:.4}"),
    );
    println!(
        "  {:>10} {:>10} {:>10} {:>10} {:>10}",
        "Mean", "Median", "Mode", "B5", "B95"
    );
    println!("  {}", "-".repeat(54));
    println!(
        "  {:>10} {:>10.4} {:>10} {:>10.4} {:>10.4}",
        fitted
            .mean()
            .map_or_else(|| "undefined".to_owned(), |mean| format!("{mean:.4}")),
        fitted.median(),
        mode,
        fitted.b5(),
        fitted.b95(),
    );
}

fn print_parameters(fitted: &FittedDistribution) {
    let parameters = fitted
        .family()
        .parameter_names()
        .iter()
        .zip(fitted.parameters())
        .map(|(name, value)| format!("{name}={value:.6}"))
        .collect::<Vec<_>>();
    println!("  {}", parameters.join(", "));
}
