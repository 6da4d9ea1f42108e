//! Dataset summary command
//!
//! Reports how much of the sample is censored, the face-value statistics of
//! the measured lengths and the censoring-aware Kaplan-Meier median.

use std::{
    fmt::Write as _,
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use clap::Args;
use fraclen_fit::sample::CensoredSample;
use fraclen_stats::percentiles::Percentiles;

use crate::util;

#[derive(Debug, Clone, Args)]
pub(crate) struct SummaryArg {
    /// Path to the dataset JSON file
    pub dataset: PathBuf,

    /// Percentiles of the measured lengths to report (comma-separated, 0-100)
    #[arg(long, value_delimiter = ',', default_values_t = [5.0, 25.0, 50.0, 75.0, 95.0])]
    pub percentiles: Vec<f64>,

    /// Write the Kaplan-Meier curve to this CSV file
    #[arg(long)]
    pub km_output: Option<PathBuf>,
}

pub(crate) fn run(arg: &SummaryArg) -> anyhow::Result<()> {
    let sample = util::read_dataset_file(&arg.dataset)?;

    println!("Length Summary ({})", arg.dataset.display());
    println!("==========================================\n");

    print_counts(&sample);
    println!();
    print_descriptive_stats(&sample);
    println!();
    print_percentiles(&sample, &arg.percentiles);
    println!();

    match sample.empirical_cdf().median() {
        Some(median) => println!("Kaplan-Meier median: {median:.4}"),
        None => println!("Kaplan-Meier median: N/A (curve never reaches 0.5)"),
    }

    if let Some(path) = &arg.km_output {
        save_km_curve(path, &sample)?;
    }

    Ok(())
}

fn print_counts(sample: &CensoredSample) {
    println!("Observations:");
    println!(
        "  {} total, {} complete, {} censored ({:.1}%)",
        sample.len(),
        sample.complete_count(),
        sample.censored_count(),
        sample.censoring_percentage()
    );
}

fn print_descriptive_stats(sample: &CensoredSample) {
    let stats = sample.descriptive_stats();
    println!("Measured lengths (censoring ignored):");
    println!(
        "  {:>10} {:>10} {:>10} {:>10} {:>10} {:>10}",
        "Min", "Max", "Mean", "Median", "Mode", "Std"
    );
    println!("  {}", "-".repeat(65));
    println!(
        "  {:>10.4} {:>10.4} {:>10.4} {:>10.4} {:>10.4} {:>10.4}",
        stats.min, stats.max, stats.mean, stats.median, stats.mode, stats.std_dev
    );
}

fn print_percentiles(sample: &CensoredSample, points: &[f64]) {
    let percentiles = Percentiles::from_sorted(sample.lengths(), points);
    println!("Percentiles of measured lengths:");
    for (p, value) in percentiles.iter() {
        println!("  P{p:<6} {value:>10.4}");
    }
}

fn save_km_curve(path: &Path, sample: &CensoredSample) -> anyhow::Result<()> {
    let cdf = sample.empirical_cdf();
    let mut csv_content = String::from("length,cdf,survival\n");
    for (length, probability) in cdf.iter() {
        writeln!(&mut csv_content, "{length},{probability},{}", 1.0 - probability)
            .with_context(|| format!("Failed to format CSV row for length {length}"))?;
    }

    fs::write(path, csv_content)
        .with_context(|| format!("Failed to write CSV file: {}", path.display()))?;
    println!("KM curve saved to: {}", path.display());

    Ok(())
}
