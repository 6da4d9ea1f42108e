//! Tabular export of a [`DistributionFitter`] result table.
//!
//! The column set is fixed so that exported files round-trip through
//! spreadsheet tools:
//!
//! ```text
//! name, <IC>, delta_i, w_i, log_likelihood, KS_distance, KG_distance,
//! AD_distance, <IC>_rank, KS_rank, KG_rank, AD_rank, Mean_rank
//! ```
//!
//! where `<IC>` is `AIC`, `AICc` or `BIC`. Rows are in criterion order.

use std::io;

use crate::fitter::{DistributionFitter, FitRecord, SortBy};

/// Column names for a fitter ranked by `criterion` (e.g. `"AICc"`).
#[must_use]
pub fn column_names(criterion: &str) -> Vec<String> {
    vec![
        "name".to_owned(),
        criterion.to_owned(),
        "delta_i".to_owned(),
        "w_i".to_owned(),
        "log_likelihood".to_owned(),
        "KS_distance".to_owned(),
        "KG_distance".to_owned(),
        "AD_distance".to_owned(),
        format!("{criterion}_rank"),
        "KS_rank".to_owned(),
        "KG_rank".to_owned(),
        "AD_rank".to_owned(),
        "Mean_rank".to_owned(),
    ]
}

fn record_fields(record: &FitRecord) -> Vec<String> {
    vec![
        record.name.to_owned(),
        record.criterion_value.to_string(),
        record.delta_i.to_string(),
        record.akaike_weight.to_string(),
        record.log_likelihood.to_string(),
        record.ks_distance.to_string(),
        record.kg_distance.to_string(),
        record.ad_distance.to_string(),
        record.criterion_rank.to_string(),
        record.ks_rank.to_string(),
        record.kg_rank.to_string(),
        record.ad_rank.to_string(),
        record.mean_rank.to_string(),
    ]
}

/// Writes the result table as delimited text at full precision.
///
/// # Errors
///
/// Returns [`csv::Error`] if writing fails.
pub fn write_csv<W>(fitter: &DistributionFitter, writer: W, delimiter: u8) -> Result<(), csv::Error>
where
    W: io::Write,
{
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(writer);
    writer.write_record(column_names(&fitter.criterion().to_string()))?;
    for record in fitter.fit_records(SortBy::Criterion) {
        writer.write_record(record_fields(record))?;
    }
    writer.flush()?;
    Ok(())
}

/// Renders the result table for terminals, rounding to `decimals` places.
#[must_use]
pub fn format_table(fitter: &DistributionFitter, decimals: usize) -> String {
    let criterion = fitter.criterion().to_string();
    let mut lines = vec![
        format!(
            "{:<12} {:>12} {:>10} {:>8} {:>14} {:>10} {:>10} {:>10} {:>6} {:>4} {:>4} {:>4} {:>6}",
            "name",
            criterion,
            "delta_i",
            "w_i",
            "log_likelihood",
            "KS",
            "KG",
            "AD",
            format!("{criterion}#"),
            "KS#",
            "KG#",
            "AD#",
            "mean#",
        ),
    ];
    lines.push("-".repeat(lines[0].len()));

    for record in fitter.fit_records(SortBy::Criterion) {
        let criterion_value = if record.criterion_valid {
            format!("{:.decimals$}", record.criterion_value)
        } else {
            "N/A".to_owned()
        };
        lines.push(format!(
            "{:<12} {:>12} {:>10.decimals$} {:>8.4} {:>14.decimals$} {:>10.decimals$} {:>10.decimals$} {:>10.decimals$} {:>6} {:>4} {:>4} {:>4} {:>6.2}",
            record.name,
            criterion_value,
            record.delta_i,
            record.akaike_weight,
            record.log_likelihood,
            record.ks_distance,
            record.kg_distance,
            record.ad_distance,
            record.criterion_rank,
            record.ks_rank,
            record.kg_rank,
            record.ad_rank,
            record.mean_rank,
        ));
    }

    let mut table = lines.join("\n");
    table.push('\n');
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{metrics::InformationCriterion, sample::CensoredSample};

    fn fitter(criterion: InformationCriterion) -> DistributionFitter {
        let sample = CensoredSample::new(
            &[0.5, 0.8, 1.1, 1.3, 1.9, 2.2, 2.7, 3.5, 4.2, 6.1],
            &[false, false, true, false, false, false, true, false, false, true],
        )
        .unwrap();
        let mut fitter = DistributionFitter::with_criterion(sample, criterion);
        fitter.fit_all(["expon", "lognorm", "norm"]);
        fitter
    }

    #[test]
    fn test_csv_header_and_rows() {
        let fitter = fitter(InformationCriterion::Aicc);
        let mut buf = vec![];
        write_csv(&fitter, &mut buf, b',').unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "name,AICc,delta_i,w_i,log_likelihood,KS_distance,KG_distance,AD_distance,AICc_rank,KS_rank,KG_rank,AD_rank,Mean_rank"
        );
        let rows = lines.collect::<Vec<_>>();
        assert_eq!(rows.len(), 3);
        let best = fitter.best_fit().unwrap().name;
        assert!(rows[0].starts_with(&format!("{best},")));
        assert!(rows.iter().all(|r| r.split(',').count() == 13));
    }

    #[test]
    fn test_csv_semicolon_and_full_precision() {
        let fitter = fitter(InformationCriterion::Bic);
        let mut buf = vec![];
        write_csv(&fitter, &mut buf, b';').unwrap();
        let text = String::from_utf8(buf).unwrap();
        let header = text.lines().next().unwrap();
        assert!(header.starts_with("name;BIC;delta_i"));
        assert!(header.contains(";BIC_rank;"));

        let record = fitter.fit_records(SortBy::Criterion)[0];
        let row = text.lines().nth(1).unwrap();
        let value: f64 = row.split(';').nth(1).unwrap().parse().unwrap();
        assert_eq!(value, record.criterion_value);
    }

    #[test]
    fn test_format_table_rounds() {
        let fitter = fitter(InformationCriterion::Aic);
        let table = format_table(&fitter, 2);
        let lines = table.lines().collect::<Vec<_>>();
        assert_eq!(lines.len(), 2 + 3);
        assert!(lines[0].contains("AIC"));
        assert!(lines[2].starts_with(fitter.best_fit().unwrap().name));
    }
}
