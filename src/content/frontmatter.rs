//! Front-matter extraction
//!
//! Splits a content file into its raw (untyped) front-matter and body.
//! Typing the front-matter is the job of a [`Schema`](super::Schema).

use serde_yaml::Value;
use std::path::Path;
use thiserror::Error;

/// Front-matter extraction errors
#[derive(Error, Debug)]
pub enum FrontMatterError {
    #[error("Failed to parse YAML front-matter: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON front-matter: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unterminated front-matter: missing closing `{0}`")]
    Unterminated(&'static str),

    #[error("Unsupported data file: {0}")]
    UnsupportedDataFile(String),
}

/// Extract front-matter from content
/// Returns (raw_front_matter, remaining_content)
///
/// `None` means the file has no front-matter block at all.
pub fn extract(content: &str) -> Result<(Option<Value>, &str), FrontMatterError> {
    let content = content.trim_start_matches('\u{feff}').trim_start();

    if content.starts_with("---") {
        return extract_yaml(content);
    }

    if content.starts_with(";;;") || content.starts_with('{') {
        return extract_json(content);
    }

    Ok((None, content))
}

fn extract_yaml(content: &str) -> Result<(Option<Value>, &str), FrontMatterError> {
    let rest = &content[3..];
    let rest = rest.trim_start_matches(['\n', '\r']);

    // `---` immediately followed by the closing fence
    if let Some(remaining) = rest.strip_prefix("---") {
        return Ok((Some(Value::Null), remaining.trim_start_matches(['\n', '\r'])));
    }

    let Some(end_pos) = rest.find("\n---") else {
        return Err(FrontMatterError::Unterminated("---"));
    };

    let yaml_content = &rest[..end_pos];
    let remaining = &rest[end_pos + 4..];
    let remaining = remaining.trim_start_matches(['\n', '\r']);

    if yaml_content.trim().is_empty() {
        return Ok((Some(Value::Null), remaining));
    }

    // Any mapping or sequence is front-matter; anything else only counts when
    // it reads as `key: value` lines, otherwise the fence is a thematic break
    match serde_yaml::from_str::<Value>(yaml_content) {
        Ok(value @ (Value::Mapping(_) | Value::Sequence(_) | Value::Tagged(_))) => {
            Ok((Some(value), remaining))
        }
        Ok(value) if looks_like_yaml(yaml_content) => Ok((Some(value), remaining)),
        Err(e) if looks_like_yaml(yaml_content) => Err(e.into()),
        _ => Ok((None, content)),
    }
}

fn extract_json(content: &str) -> Result<(Option<Value>, &str), FrontMatterError> {
    // JSON front-matter ends with ;;;
    if let Some(rest) = content.strip_prefix(";;;") {
        let Some(end_pos) = rest.find(";;;") else {
            return Err(FrontMatterError::Unterminated(";;;"));
        };
        let json_content = &rest[..end_pos];
        let remaining = rest[end_pos + 3..].trim_start_matches(['\n', '\r']);

        let value: Value = serde_json::from_str(json_content)?;
        return Ok((Some(value), remaining));
    }

    // A bare JSON object at the start; find the matching closing brace
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    let mut end_pos = None;
    for (i, c) in content.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    end_pos = Some(i + 1);
                    break;
                }
            }
            _ => {}
        }
    }

    let Some(end_pos) = end_pos else {
        return Err(FrontMatterError::Unterminated("}"));
    };

    let json_content = &content[..end_pos];
    let remaining = content[end_pos..].trim_start_matches(['\n', '\r']);

    let value: Value = serde_json::from_str(json_content)?;
    Ok((Some(value), remaining))
}

/// Whether a fenced block has at least one `key: value` line
fn looks_like_yaml(block: &str) -> bool {
    block.lines().any(|line| {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return false;
        }
        let Some(colon_pos) = trimmed.find(':') else {
            return false;
        };
        let key = trimmed[..colon_pos].trim_matches(['"', '\'']);
        let is_valid_key = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_alphanumeric() || c == '_' || c == '-')
            && !matches!(key, "http" | "https" | "ftp");
        let after_colon = &trimmed[colon_pos + 1..];
        is_valid_key && (after_colon.is_empty() || after_colon.starts_with(' '))
    })
}

/// Parse a data-collection file, where the whole file is the entry
pub fn parse_data(path: &Path, content: &str) -> Result<Value, FrontMatterError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "yml" | "yaml" => Ok(serde_yaml::from_str(content)?),
        "json" => Ok(serde_json::from_str(content)?),
        _ => Err(FrontMatterError::UnsupportedDataFile(
            path.display().to_string(),
        )),
    }
}
