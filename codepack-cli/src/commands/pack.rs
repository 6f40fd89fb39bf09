//! Pack command implementation

use crate::config::CliConfig;
use crate::error::CliError;
use crate::input::{resolve_patterns, FileReader};
use crate::output::{BinnedWriter, Binning, OutputFormat};
use crate::progress::ProgressReporter;
use anyhow::{Context, Result};
use clap::Args;
use codepack_engine::{load_tokenizer, CodePairBuilder, PackOutput, Pipeline};
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;

/// Arguments for the pack command
#[derive(Debug, Args)]
pub struct PackArgs {
    /// Input JSON-lines files or patterns (supports glob)
    #[arg(short, long, value_name = "FILE/PATTERN", required = true)]
    pub input: Vec<String>,

    /// Tokenizer: a `tokenizer.json`, or a vocabulary file with one token per line
    #[arg(
        long,
        visible_alias = "vocab",
        value_name = "FILE",
        env = "CODEPACK_TOKENIZER"
    )]
    pub tokenizer: PathBuf,

    /// Output file, or directory when binning (default: stdout)
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Output format (overrides the configuration file)
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Maximum framed length of an instance
    #[arg(long, value_name = "N")]
    pub target_seq_length: Option<usize>,

    /// Probability of keeping only the first description sentence
    #[arg(long, value_name = "P")]
    pub short_seq_prob: Option<f64>,

    /// Emit masked-LM instances
    #[arg(short, long)]
    pub masking: bool,

    /// Fraction of framed positions to predict (implies --masking)
    #[arg(long, value_name = "RATIO")]
    pub mask_ratio: Option<f64>,

    /// Number of passes over every document
    #[arg(long, value_name = "N")]
    pub duplicate_factor: Option<usize>,

    /// Base random seed
    #[arg(long)]
    pub seed: Option<u64>,

    /// Group instances into length bins of this width
    #[arg(long, value_name = "N")]
    pub bin_size: Option<usize>,

    /// Trim overlong sequences from the back only
    #[arg(long)]
    pub deterministic_trim: bool,

    /// Keep letter case when tokenizing with a plain vocabulary
    #[arg(long)]
    pub cased: bool,

    /// Drop malformed records instead of failing
    #[arg(long)]
    pub skip_invalid: bool,

    /// Force parallel packing
    #[arg(short, long, conflicts_with = "sequential")]
    pub parallel: bool,

    /// Force sequential packing
    #[arg(long)]
    pub sequential: bool,

    /// Number of worker threads
    #[arg(short, long, value_name = "N")]
    pub threads: Option<usize>,

    /// Documents per partition
    #[arg(long, value_name = "N")]
    pub partition_size: Option<usize>,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,

    /// Increase verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl PackArgs {
    /// Execute the pack command
    pub fn execute(&self) -> Result<()> {
        self.init_logging()?;

        log::info!("Starting corpus packing");
        log::debug!("Arguments: {:?}", self);

        let config = self.effective_config()?;
        let engine_config = config.to_engine_config()?;
        let format = self.output_format(&config)?;
        let binning = config
            .output
            .bin_size
            .map(|size| Binning::new(size, engine_config.packer.target_seq_length))
            .transpose()?;

        let tokenizer = load_tokenizer(&self.tokenizer, config.packing.lowercase)
            .with_context(|| format!("Failed to load tokenizer: {}", self.tokenizer.display()))?;
        log::info!("Loaded {} vocabulary tokens", tokenizer.vocabulary().len());

        let files = resolve_patterns(&self.input)?;
        let mut progress = ProgressReporter::new(self.quiet);
        progress.init_files(files.len() as u64);

        let builder = CodePairBuilder::from_config(tokenizer.as_ref(), &engine_config);
        let mut pairs = Vec::new();
        for path in &files {
            let size = FileReader::file_size(path)?;
            log::debug!("Reading {} ({} bytes)", path.display(), size);
            let records = FileReader::read_records(path, self.skip_invalid)?;
            let built = builder
                .build_all(&records)
                .with_context(|| format!("Failed to tokenize records in {}", path.display()))?;
            pairs.extend(built);
            progress.file_completed(&path.display().to_string());
        }

        progress.packing(pairs.len());
        let output = Pipeline::from_tokenizer(engine_config, tokenizer.as_ref())?.run(&pairs)?;
        self.write_output(&output, format, binning)?;
        progress.finish(output.instances.len());

        let stats = &output.stats;
        log::info!(
            "{} documents, {} skipped, {} instances, mean length {:.1}, {:?} mode",
            stats.documents,
            stats.skipped_documents,
            stats.instances,
            stats.mean_tokens(),
            output.mode
        );
        if stats.skipped_documents > 0 {
            log::warn!(
                "{} packing attempts skipped: description left no room for the body",
                stats.skipped_documents
            );
        }

        Ok(())
    }

    /// Configuration file values with command-line overrides applied
    pub fn effective_config(&self) -> Result<CliConfig> {
        let mut config = CliConfig::load(self.config.as_deref())?;

        let packing = &mut config.packing;
        if let Some(length) = self.target_seq_length {
            packing.target_seq_length = length;
        }
        if let Some(prob) = self.short_seq_prob {
            packing.short_seq_prob = prob;
        }
        if let Some(factor) = self.duplicate_factor {
            packing.duplicate_factor = factor;
        }
        if let Some(seed) = self.seed {
            packing.seed = seed;
        }
        packing.deterministic_trim |= self.deterministic_trim;
        if self.cased {
            packing.lowercase = false;
        }

        if self.masking || self.mask_ratio.is_some() {
            config.masking.enabled = true;
        }
        if let Some(ratio) = self.mask_ratio {
            config.masking.mask_ratio = ratio;
        }

        if self.bin_size.is_some() {
            config.output.bin_size = self.bin_size;
        }

        let performance = &mut config.performance;
        if self.parallel {
            performance.execution_mode = "parallel".to_string();
        } else if self.sequential {
            performance.execution_mode = "sequential".to_string();
        }
        if let Some(threads) = self.threads {
            performance.worker_threads = threads;
        }
        if let Some(size) = self.partition_size {
            performance.partition_size = size;
        }

        Ok(config)
    }

    fn output_format(&self, config: &CliConfig) -> Result<OutputFormat> {
        if let Some(format) = self.format {
            return Ok(format);
        }
        OutputFormat::from_name(&config.output.format).ok_or_else(|| {
            CliError::ConfigError(format!("unknown output format '{}'", config.output.format))
                .into()
        })
    }

    fn write_output(
        &self,
        output: &PackOutput,
        format: OutputFormat,
        binning: Option<Binning>,
    ) -> Result<()> {
        if let Some(binning) = binning {
            let dir = self.output.as_ref().ok_or(CliError::MissingOutputDir)?;
            let mut writer = BinnedWriter::new(dir, binning, format)?;
            for instance in &output.instances {
                writer.write(instance)?;
            }
            let files = writer.finish()?;
            log::info!("Wrote {} bin files to {}", files, dir.display());
            return Ok(());
        }

        let mut formatter = match &self.output {
            Some(path) => {
                let file = File::create(path)
                    .with_context(|| format!("Failed to create {}", path.display()))?;
                format.formatter(BufWriter::new(file))
            }
            None => format.formatter(BufWriter::new(io::stdout())),
        };
        for instance in &output.instances {
            formatter.write_instance(instance, None)?;
        }
        formatter.finish()
    }

    /// Initialize logging based on verbosity level
    fn init_logging(&self) -> Result<()> {
        let log_level = match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        };

        if !self.quiet {
            env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
                .init();
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Debug, Parser)]
    struct TestCli {
        #[command(flatten)]
        args: PackArgs,
    }

    fn parse(extra: &[&str]) -> PackArgs {
        let mut argv = vec!["codepack", "-i", "corpus.jsonl", "--vocab", "vocab.txt"];
        argv.extend_from_slice(extra);
        TestCli::parse_from(argv).args
    }

    #[test]
    fn test_defaults_without_overrides() {
        let config = parse(&[]).effective_config().unwrap();
        assert_eq!(config, CliConfig::default());
    }

    #[test]
    fn test_overrides_apply() {
        let args = parse(&[
            "--target-seq-length",
            "256",
            "--mask-ratio",
            "0.2",
            "--seed",
            "9",
            "--bin-size",
            "64",
            "--cased",
            "-p",
            "-t",
            "2",
        ]);
        let config = args.effective_config().unwrap();

        assert_eq!(config.packing.target_seq_length, 256);
        assert_eq!(config.packing.seed, 9);
        assert!(!config.packing.lowercase);
        assert!(config.masking.enabled);
        assert_eq!(config.masking.mask_ratio, 0.2);
        assert_eq!(config.output.bin_size, Some(64));
        assert_eq!(config.performance.execution_mode, "parallel");
        assert_eq!(config.performance.worker_threads, 2);
    }

    #[test]
    fn test_parallel_conflicts_with_sequential() {
        let result = TestCli::try_parse_from([
            "codepack",
            "-i",
            "a.jsonl",
            "--vocab",
            "v.txt",
            "--parallel",
            "--sequential",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_tokenizer_flag_and_vocab_alias() {
        let args = TestCli::parse_from([
            "codepack",
            "-i",
            "a.jsonl",
            "--tokenizer",
            "tokenizer.json",
        ])
        .args;
        assert_eq!(args.tokenizer, PathBuf::from("tokenizer.json"));
        assert_eq!(parse(&[]).tokenizer, PathBuf::from("vocab.txt"));
    }

    #[test]
    fn test_format_flag_wins_over_config() {
        let args = parse(&["-f", "text"]);
        let config = args.effective_config().unwrap();
        assert_eq!(args.output_format(&config).unwrap(), OutputFormat::Text);
        assert_eq!(parse(&[]).output_format(&config).unwrap(), OutputFormat::Jsonl);
    }
}
