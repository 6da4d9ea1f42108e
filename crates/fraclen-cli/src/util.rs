use std::{
    fs::File,
    io::{self, BufWriter, StdoutLock, Write as _},
    path::{Path, PathBuf},
};

use anyhow::Context;
use fraclen_fit::sample::{CensoredSample, LengthDataset};

#[derive(Debug)]
pub enum Output {
    Stdout {
        writer: StdoutLock<'static>,
    },
    File {
        writer: BufWriter<File>,
        path: PathBuf,
    },
}

impl Output {
    /// Writes `value` as pretty JSON to `output_path`, or to stdout if `None`.
    pub fn save_json<T>(value: &T, output_path: Option<PathBuf>) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        let mut output = match output_path {
            Some(path) => Output::open(path)?,
            None => Output::Stdout {
                writer: io::stdout().lock(),
            },
        };
        output.write_json(value)
    }

    pub fn open(path: PathBuf) -> anyhow::Result<Self> {
        let file = File::create(&path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        Ok(Output::File {
            writer: BufWriter::new(file),
            path,
        })
    }

    pub fn display_path(&self) -> String {
        match self {
            Output::Stdout { .. } => "stdout".to_string(),
            Output::File { path, .. } => path.display().to_string(),
        }
    }

    fn write_json<T>(&mut self, value: &T) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        serde_json::to_writer_pretty(&mut *self, value)
            .with_context(|| format!("Failed to write JSON to {}", self.display_path()))?;
        writeln!(&mut *self).with_context(|| {
            format!(
                "Failed to write newline after JSON to {}",
                self.display_path()
            )
        })?;
        self.flush()
            .with_context(|| format!("Failed to flush output to {}", self.display_path()))?;
        Ok(())
    }
}

impl io::Write for Output {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Output::Stdout { writer } => writer.write(buf),
            Output::File { writer, .. } => writer.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Output::Stdout { writer } => writer.flush(),
            Output::File { writer, .. } => writer.flush(),
        }
    }
}

pub fn read_json_file<T, P>(file_kind: &str, path: P) -> anyhow::Result<T>
where
    T: serde::de::DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open {} file: {}", file_kind, path.display()))?;

    let reader = io::BufReader::new(file);
    let value = serde_json::from_reader(reader).with_context(|| {
        format!(
            "Failed to parse {} JSON file: {}",
            file_kind,
            path.display()
        )
    })?;

    Ok(value)
}

/// Read a length dataset and validate it into a censored sample
///
/// # Errors
///
/// Returns error if the file cannot be read or the lengths/flags are invalid
pub fn read_dataset_file<P>(path: P) -> anyhow::Result<CensoredSample>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let dataset: LengthDataset = read_json_file("dataset", path)?;
    let sample = CensoredSample::try_from(&dataset)
        .with_context(|| format!("Invalid dataset: {}", path.display()))?;
    eprintln!(
        "Loaded {} lengths ({} censored) from {}",
        sample.len(),
        sample.censored_count(),
        path.display()
    );
    Ok(sample)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_saved_dataset_reads_back() {
        let path = std::env::temp_dir().join(format!("fraclen-util-{}.json", std::process::id()));
        let sample = CensoredSample::new(&[2.0, 0.5, 1.25], &[true, false, false]).unwrap();
        Output::save_json(&LengthDataset::from(&sample), Some(path.clone())).unwrap();

        let loaded = read_dataset_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(loaded.lengths(), sample.lengths());
        assert_eq!(loaded.is_censored(), sample.is_censored());
    }

    #[test]
    fn test_invalid_dataset_is_rejected() {
        let path = std::env::temp_dir().join(format!("fraclen-bad-{}.json", std::process::id()));
        std::fs::write(&path, r#"{"lengths": [1.0, -2.0], "censored": [0, 0]}"#).unwrap();
        let err = read_dataset_file(&path).unwrap_err();
        std::fs::remove_file(&path).unwrap();
        assert!(err.to_string().contains("Invalid dataset"));
    }
}
