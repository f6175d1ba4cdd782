//! Building host parameter items from CLI input
//!
//! The binary plays the host: each item is a JSON object keyed by the host's
//! parameter names (`downloadUrl`, `uploadUrl`, `method`, ...).

use std::path::Path;

use anyhow::{bail, Context};
use serde_json::{Map, Value};
use stream_relay::{parse_headers, HeaderInput};

/// Load a JSON array of parameter objects
pub fn load_items(path: &Path) -> anyhow::Result<Vec<Map<String, Value>>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read items file {}", path.display()))?;
    let value: Value = serde_json::from_str(&text)
        .with_context(|| format!("Items file {} is not valid JSON", path.display()))?;

    let Value::Array(entries) = value else {
        bail!("Items file {} must contain a JSON array", path.display());
    };

    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| match entry {
            Value::Object(map) => Ok(map),
            other => bail!("Item {index} must be a JSON object, got {other}"),
        })
        .collect()
}

/// Parse `NAME:VALUE` header flags
pub fn parse_header_flags(flags: &[String]) -> anyhow::Result<Map<String, Value>> {
    let mut headers = Map::new();
    for flag in flags {
        let Some((name, value)) = flag.split_once(':') else {
            bail!("Invalid header '{flag}': expected NAME:VALUE");
        };
        let name = name.trim();
        if name.is_empty() {
            bail!("Invalid header '{flag}': empty name");
        }
        headers.insert(name.to_string(), Value::String(value.trim().to_string()));
    }
    Ok(headers)
}

/// Combine a JSON header parameter with individual header flags; flags win
pub fn header_parameter(json: Option<&str>, flags: &[String]) -> anyhow::Result<Value> {
    if flags.is_empty() {
        return Ok(Value::String(json.unwrap_or("{}").to_string()));
    }

    let mut merged: Map<String, Value> = json
        .map(|text| parse_headers(&HeaderInput::from(text)))
        .unwrap_or_default()
        .into_iter()
        .map(|(name, value)| (name, Value::String(value)))
        .collect();
    merged.extend(parse_header_flags(flags)?);
    Ok(Value::Object(merged))
}
