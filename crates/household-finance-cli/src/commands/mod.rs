pub mod growth;
pub mod household;
pub mod pension;

use serde::de::DeserializeOwned;

use household_finance_core::{Engine, EngineConfig};

use crate::input;

/// Engine built from `--config` (JSON or YAML), or the built-in defaults.
pub fn build_engine(config_path: Option<&str>) -> Result<Engine, Box<dyn std::error::Error>> {
    let config: EngineConfig = match config_path {
        Some(path) => {
            log::debug!("loading engine configuration from {}", path);
            input::file::read_document(path)?
        }
        None => EngineConfig::default(),
    };
    Ok(Engine::new(config)?)
}

/// Typed command input from `--input`, falling back to piped stdin.
pub fn read_input<T: DeserializeOwned>(
    path: Option<&str>,
    what: &str,
) -> Result<T, Box<dyn std::error::Error>> {
    if let Some(path) = path {
        input::file::read_document(path)
    } else if let Some(data) = input::stdin::read_piped()? {
        Ok(data)
    } else {
        Err(format!("--input <file> or stdin required for {what}").into())
    }
}
