use serde::de::DeserializeOwned;
use std::io::{self, Read};

/// Household document piped on stdin, or None when stdin is a terminal or
/// carries nothing.
pub fn read_piped<T: DeserializeOwned>() -> Result<Option<T>, Box<dyn std::error::Error>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }
    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;
    parse_piped(&buffer)
}

/// Piped text has no extension to go by: a leading brace or bracket means
/// JSON, anything else is read as YAML.
fn parse_piped<T: DeserializeOwned>(text: &str) -> Result<Option<T>, Box<dyn std::error::Error>> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    log::debug!("read {} bytes from stdin", trimmed.len());
    let parsed = if trimmed.starts_with('{') || trimmed.starts_with('[') {
        serde_json::from_str(trimmed).map_err(|e| format!("Failed to parse stdin as JSON: {e}"))?
    } else {
        serde_yaml::from_str(trimmed).map_err(|e| format!("Failed to parse stdin as YAML: {e}"))?
    };
    Ok(Some(parsed))
}
