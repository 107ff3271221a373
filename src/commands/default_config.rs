use crate::config::AnalysisConfig;
use anyhow::Result;

pub fn print_default_config() -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&AnalysisConfig::default())?);
    Ok(())
}
