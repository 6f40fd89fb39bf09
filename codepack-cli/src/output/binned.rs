//! Length-binned output
//!
//! Instances are grouped by framed length into `target / bin_size` bins,
//! each written to its own `bin_{k}.{ext}` file.

use super::{OutputFormat, OutputFormatter};
use crate::error::CliError;
use anyhow::{Context, Result};
use codepack_engine::Instance;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

/// Bin layout derived from the bin width and the target length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Binning {
    bin_size: usize,
    nbins: usize,
}

impl Binning {
    /// Validate `bin_size` against `target_seq_length`
    pub fn new(bin_size: usize, target_seq_length: usize) -> Result<Self, CliError> {
        if bin_size == 0 || bin_size > target_seq_length || target_seq_length % bin_size != 0 {
            return Err(CliError::InvalidBinSize {
                bin_size,
                target_seq_length,
            });
        }
        Ok(Self {
            bin_size,
            nbins: target_seq_length / bin_size,
        })
    }

    /// Number of bins
    pub fn nbins(&self) -> usize {
        self.nbins
    }

    /// Bin of an instance with `num_tokens` framed tokens
    pub fn bin_of(&self, num_tokens: usize) -> usize {
        (num_tokens.saturating_sub(1) / self.bin_size).min(self.nbins - 1)
    }
}

/// Writes each bin to its own file inside a directory
pub struct BinnedWriter {
    dir: PathBuf,
    binning: Binning,
    format: OutputFormat,
    writers: Vec<Option<Box<dyn OutputFormatter>>>,
}

impl BinnedWriter {
    /// Create the output directory
    pub fn new(dir: &Path, binning: Binning, format: OutputFormat) -> Result<Self> {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;
        Ok(Self {
            dir: dir.to_path_buf(),
            binning,
            format,
            writers: (0..binning.nbins()).map(|_| None).collect(),
        })
    }

    /// Path of bin `k`
    pub fn bin_path(&self, k: usize) -> PathBuf {
        self.dir.join(bin_file_name(k, self.format))
    }

    /// Append an instance to its bin file, creating the file on first use
    pub fn write(&mut self, instance: &Instance) -> Result<()> {
        let bin = self.binning.bin_of(instance.num_tokens());
        let writer = match &mut self.writers[bin] {
            Some(writer) => writer,
            slot => {
                let path = self.dir.join(bin_file_name(bin, self.format));
                let file = File::create(&path)
                    .with_context(|| format!("Failed to create {}", path.display()))?;
                slot.insert(self.format.formatter(BufWriter::new(file)))
            }
        };
        writer.write_instance(instance, Some(bin))
    }

    /// Flush every open bin file and return how many were written
    pub fn finish(&mut self) -> Result<usize> {
        let mut written = 0;
        for writer in self.writers.iter_mut().flatten() {
            writer.finish()?;
            written += 1;
        }
        Ok(written)
    }
}

fn bin_file_name(k: usize, format: OutputFormat) -> String {
    format!("bin_{k}.{}", format.extension())
}

#[cfg(test)]
mod tests {
    use super::*;
    use codepack_engine::TrainingInstance;
    use tempfile::TempDir;

    fn instance(num_tokens: usize) -> Instance {
        Instance::Plain(TrainingInstance {
            id: format!("doc_{num_tokens}"),
            description: Vec::new(),
            body: vec!["x".to_string(); num_tokens - 2],
            num_tokens,
        })
    }

    #[test]
    fn test_bin_size_validation() {
        assert!(Binning::new(32, 128).is_ok());
        assert!(Binning::new(128, 128).is_ok());
        assert!(Binning::new(256, 128).is_err());
        assert!(Binning::new(48, 128).is_err());
        assert!(Binning::new(0, 128).is_err());
    }

    #[test]
    fn test_bin_assignment() {
        let binning = Binning::new(32, 128).unwrap();
        assert_eq!(binning.nbins(), 4);
        assert_eq!(binning.bin_of(1), 0);
        assert_eq!(binning.bin_of(32), 0);
        assert_eq!(binning.bin_of(33), 1);
        assert_eq!(binning.bin_of(128), 3);
        assert_eq!(binning.bin_of(200), 3);
        assert_eq!(binning.bin_of(0), 0);
    }

    #[test]
    fn test_writes_one_file_per_used_bin() {
        let dir = TempDir::new().unwrap();
        let binning = Binning::new(16, 64).unwrap();
        let mut writer = BinnedWriter::new(dir.path(), binning, OutputFormat::Jsonl).unwrap();

        for n in [5, 10, 40, 64] {
            writer.write(&instance(n)).unwrap();
        }
        assert_eq!(writer.finish().unwrap(), 3);

        let bin0 = fs::read_to_string(writer.bin_path(0)).unwrap();
        assert_eq!(bin0.lines().count(), 2);
        assert!(bin0.contains("\"bin_id\":0"));
        assert!(!writer.bin_path(1).exists());
        assert!(writer.bin_path(2).exists());
        assert!(fs::read_to_string(writer.bin_path(3))
            .unwrap()
            .contains("doc_64"));
    }
}
