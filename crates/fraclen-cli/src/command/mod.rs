use clap::{Parser, Subcommand};

use self::{fit::FitArg, generate::GenerateArg, summary::SummaryArg};

mod fit;
mod generate;
mod summary;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// What to do with the length data
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Print descriptive and Kaplan-Meier statistics of a dataset
    Summary(#[clap(flatten)] SummaryArg),
    /// Fit distribution families and rank them
    Fit(#[clap(flatten)] FitArg),
    /// Generate a synthetic censored dataset
    Generate(#[clap(flatten)] GenerateArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::Summary(arg) => summary::run(&arg)?,
        Mode::Fit(arg) => fit::run(&arg)?,
        Mode::Generate(arg) => generate::run(&arg)?,
    }
    Ok(())
}
