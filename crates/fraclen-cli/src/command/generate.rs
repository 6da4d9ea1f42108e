use std::path::PathBuf;

use fraclen_fit::{
    generate::{SyntheticSpec, generate_censored_sample},
    sample::LengthDataset,
};
use rand::SeedableRng as _;
use rand_pcg::Pcg64;

use crate::util::Output;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct GenerateArg {
    /// Number of lengths to generate
    #[arg(long, default_value_t = 200)]
    count: usize,
    /// Random seed
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Mean of the log of the true length
    #[arg(long, default_value_t = 0.0)]
    mu: f64,
    /// Standard deviation of the log of the true length
    #[arg(long, default_value_t = 0.75)]
    sigma: f64,
    /// Width of the survey window
    #[arg(long, default_value_t = 10.0)]
    window: f64,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &GenerateArg) -> anyhow::Result<()> {
    let spec = SyntheticSpec {
        count: arg.count,
        mu: arg.mu,
        sigma: arg.sigma,
        window: arg.window,
    };
    let mut rng = Pcg64::seed_from_u64(arg.seed);
    let sample = generate_censored_sample(&mut rng, &spec)?;
    eprintln!(
        "Generated {} lengths, {} censored ({:.1}%)",
        sample.len(),
        sample.censored_count(),
        sample.censoring_percentage()
    );

    Output::save_json(&LengthDataset::from(&sample), arg.output.clone())?;
    Ok(())
}
