use anyhow::{anyhow, Result};

/// Accepts a bare ClickHouse identifier, since table names are spliced into SQL.
pub fn validate_identifier(kind: &str, value: &str) -> Result<()> {
    let mut chars = value.chars();
    let Some(first) = chars.next() else {
        return Err(anyhow!("{} is empty", kind));
    };
    if !(first.is_ascii_alphabetic() || first == '_') {
        return Err(anyhow!("{} must start with a letter or underscore", kind));
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(anyhow!("{} contains invalid characters: {}", kind, value));
    }
    Ok(())
}
