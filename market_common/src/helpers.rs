use thiserror::Error;

/// Parse a boolean flag from a string value, or return the given default value otherwise.
pub fn parse_boolean_flag(value: Option<String>, default: bool) -> bool {
    let value = match value {
        Some(v) => v,
        None => return default,
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => default,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("The list '{0}' does not contain any entries")]
pub struct ListParseError(pub String);

/// Split a comma-separated configuration value into its trimmed, non-empty entries.
///
/// A value that contains nothing but separators and whitespace is an error, so that a misconfigured variable cannot
/// silently turn into an empty allow-list.
pub fn parse_list(value: &str) -> Result<Vec<String>, ListParseError> {
    let entries = value.split(',').map(str::trim).filter(|s| !s.is_empty()).map(String::from).collect::<Vec<_>>();
    if entries.is_empty() {
        Err(ListParseError(value.to_string()))
    } else {
        Ok(entries)
    }
}
