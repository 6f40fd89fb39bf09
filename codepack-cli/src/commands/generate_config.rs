//! Generate config command implementation

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

/// Arguments for the generate-config command
#[derive(Debug, Args)]
pub struct GenerateConfigArgs {
    /// Output file path
    #[arg(short, long, value_name = "FILE", required = true)]
    pub output: PathBuf,

    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

impl GenerateConfigArgs {
    /// Execute the generate-config command
    pub fn execute(&self) -> Result<()> {
        use std::fs;

        if self.output.exists() && !self.force {
            anyhow::bail!(
                "{} already exists (use --force to overwrite)",
                self.output.display()
            );
        }

        fs::write(&self.output, Self::template())
            .with_context(|| format!("Failed to write to {}", self.output.display()))?;

        println!("✓ Configuration template written to {}", self.output.display());
        println!();
        println!("Next steps:");
        println!("1. Edit the values to match your corpus and model");
        println!("2. Validate your configuration:");
        println!("   codepack validate --config {}", self.output.display());
        println!("3. Use it for packing:");
        println!(
            "   codepack pack -i 'corpus/*.jsonl' --tokenizer tokenizer.json --config {}",
            self.output.display()
        );

        Ok(())
    }

    /// Commented configuration template with default values
    pub fn template() -> &'static str {
        r#"# codepack configuration

[packing]
# Maximum framed length of an instance, markers included
target_seq_length = 128
# Probability of keeping only the first description sentence
short_seq_prob = 0.1
# Number of passes over every document
duplicate_factor = 1
# Base seed; partition i is packed with seed + i
seed = 12345
# Trim overlong sequences from the back only instead of a random end
deterministic_trim = false
# Token cap for one tokenized line
max_segment_tokens = 512
# Separator between sentences in raw text
segment_separator = "\n"
# Lowercase text before tokenizing
lowercase = true

[masking]
# Emit masked-LM instances
enabled = false
# Fraction of framed positions selected for prediction
mask_ratio = 0.15

[output]
# "jsonl" or "text"
format = "jsonl"
# Group instances into length bins of this width (must divide target_seq_length)
# bin_size = 32

[performance]
# "adaptive", "sequential" or "parallel"
execution_mode = "adaptive"
# Worker threads (0 = auto)
worker_threads = 0
# Documents per partition
partition_size = 256
"#
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CliConfig;
    use tempfile::TempDir;

    #[test]
    fn test_template_parses_to_defaults() {
        let parsed: CliConfig = toml::from_str(GenerateConfigArgs::template()).unwrap();
        assert_eq!(parsed, CliConfig::default());
    }

    #[test]
    fn test_execute_success() {
        let temp_dir = TempDir::new().unwrap();
        let output_path = temp_dir.path().join("codepack.toml");

        let args = GenerateConfigArgs {
            output: output_path.clone(),
            force: false,
        };

        assert!(args.execute().is_ok());
        let content = std::fs::read_to_string(&output_path).unwrap();
        assert!(content.contains("[packing]"));
        assert!(content.contains("[performance]"));
    }

    #[test]
    fn test_refuses_to_overwrite() {
        let temp_dir = TempDir::new().unwrap();
        let output_path = temp_dir.path().join("codepack.toml");
        std::fs::write(&output_path, "keep me").unwrap();

        let args = GenerateConfigArgs {
            output: output_path.clone(),
            force: false,
        };
        assert!(args.execute().is_err());
        assert_eq!(std::fs::read_to_string(&output_path).unwrap(), "keep me");

        let forced = GenerateConfigArgs {
            output: output_path.clone(),
            force: true,
        };
        assert!(forced.execute().is_ok());
    }
}
