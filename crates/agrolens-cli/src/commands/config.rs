use std::path::PathBuf;

use agrolens_core::config::EngineConfig;
use anyhow::{Context, Result};
use clap::Args;

#[derive(Args)]
pub struct ConfigArgs {
    /// Validate an existing config file instead of printing the defaults
    #[arg(long, value_name = "FILE", conflicts_with = "output")]
    pub check: Option<PathBuf>,

    /// Write the default config to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Print, save or validate an engine config.
pub fn run(args: &ConfigArgs) -> Result<()> {
    if let Some(ref path) = args.check {
        let config = EngineConfig::load(path)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        println!(
            "{} is valid ({} concurrent fetches, {} forecast trees)",
            path.display(),
            config.series.max_concurrent_fetches,
            config.forecast.n_estimators
        );
        return Ok(());
    }

    let toml_str = toml::to_string_pretty(&EngineConfig::default())?;
    match args.output {
        Some(ref path) => {
            std::fs::write(path, &toml_str)
                .with_context(|| format!("Failed to write config to {}", path.display()))?;
            println!("Default engine config saved to {}", path.display());
        }
        None => print!("{toml_str}"),
    }
    Ok(())
}
