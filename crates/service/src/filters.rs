//! Query-string parsing for list filters.

use crate::errors::ServiceError;

/// Parse a comma-separated list of integer ids such as `"1, 2,,3"`.
/// Blank tokens are skipped; an absent or empty value yields an empty list.
pub fn parse_id_list(param: &str, raw: Option<&str>) -> Result<Vec<i32>, ServiceError> {
    let Some(raw) = raw else { return Ok(Vec::new()) };
    let mut ids = Vec::new();
    for token in raw.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        let id = token
            .parse::<i32>()
            .map_err(|_| ServiceError::field(param, format!("\"{token}\" is not a valid integer id.")))?;
        ids.push(id);
    }
    Ok(ids)
}

/// Parse a boolean flag; integers count as true when non-zero.
pub fn parse_flag(param: &str, raw: Option<&str>) -> Result<bool, ServiceError> {
    let Some(raw) = raw else { return Ok(false) };
    let value = raw.trim().to_ascii_lowercase();
    match value.as_str() {
        "" | "false" | "no" | "off" => Ok(false),
        "true" | "yes" | "on" => Ok(true),
        other => other
            .parse::<i64>()
            .map(|n| n != 0)
            .map_err(|_| ServiceError::field(param, "Must be a valid boolean.")),
    }
}
