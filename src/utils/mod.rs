use itertools::Itertools;
use reqwest::header::{HeaderName, HeaderValue};

pub fn parse_header(raw: &str) -> Result<(HeaderName, HeaderValue), String> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| "expected format 'Key: Value'".to_string())?;
    let name = name.trim();
    if name.is_empty() {
        return Err("header name is empty".to_string());
    }
    let name = HeaderName::from_bytes(name.as_bytes())
        .map_err(|_| format!("invalid header name '{name}'"))?;
    let value = HeaderValue::from_str(value.trim())
        .map_err(|_| "header value contains invalid characters".to_string())?;
    Ok((name, value))
}

// returns None for blank lines and `#` comments
pub fn clean_path_line(line: &str) -> Option<String> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return None;
    }
    Some(trimmed.to_string())
}

// keeps the first occurrence of each path
pub fn dedupe_paths<I>(paths: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    paths
        .into_iter()
        .filter_map(|p| clean_path_line(&p))
        .unique()
        .collect()
}

pub fn parse_query_param_name(value: &str) -> Result<String, String> {
    let name = value.trim();
    if name.is_empty() {
        return Err("parameter name is empty".to_string());
    }
    if name.contains(['&', '=', '?', '#']) || name.chars().any(char::is_whitespace) {
        return Err(format!("invalid parameter name '{name}'"));
    }
    Ok(name.to_string())
}
