//! Validate command implementation

use crate::config::CliConfig;
use crate::error::CliError;
use crate::output::{Binning, OutputFormat};
use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

/// Arguments for the validate command
#[derive(Debug, Args)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short = 'c', long, value_name = "FILE", required = true)]
    pub config: PathBuf,
}

impl ValidateArgs {
    /// Execute the validate command
    pub fn execute(&self) -> Result<()> {
        println!("Validating configuration: {}", self.config.display());

        match Self::check(&CliConfig::from_file(&self.config)?) {
            Ok(summary) => {
                println!("✓ Configuration is valid!");
                for line in summary {
                    println!("  {line}");
                }
                Ok(())
            }
            Err(e) => {
                println!("✗ Configuration is invalid!");
                println!("  Error: {e}");
                Err(anyhow::anyhow!("Validation failed: {}", e))
            }
        }
    }

    /// Run every check `pack` would run before reading the corpus
    fn check(config: &CliConfig) -> Result<Vec<String>> {
        let engine = config.to_engine_config()?;
        let format = OutputFormat::from_name(&config.output.format).ok_or_else(|| {
            CliError::ConfigError(format!("unknown output format '{}'", config.output.format))
        })?;
        if let Some(bin_size) = config.output.bin_size {
            Binning::new(bin_size, engine.packer.target_seq_length)?;
        }

        let masking = match engine.masking {
            Some(masking) => format!("enabled (ratio {})", masking.mask_ratio),
            None => "disabled".to_string(),
        };
        Ok(vec![
            format!("Target sequence length: {}", engine.packer.target_seq_length),
            format!("Masking: {masking}"),
            format!("Output format: {format:?}"),
            format!("Execution mode: {:?}", engine.execution_mode),
        ])
    }
}
