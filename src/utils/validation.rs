use crate::utils::error::{CoverageError, Result};

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn invalid(field: &str, value: impl Into<String>, reason: impl Into<String>) -> CoverageError {
    CoverageError::InvalidConfigValueError {
        field: field.to_string(),
        value: value.into(),
        reason: reason.into(),
    }
}

/// Directory settings: must name something, and must be passable to the OS.
pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    match path {
        "" => Err(invalid(field_name, path, "Path cannot be empty")),
        p if p.contains('\0') => Err(invalid(field_name, p, "Path contains null bytes")),
        _ => Ok(()),
    }
}

pub fn validate_at_least(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value >= min_value {
        return Ok(());
    }
    Err(invalid(
        field_name,
        value.to_string(),
        format!("Value must be at least {}", min_value),
    ))
}

/// Extensions are matched as a `.<ext>` file-name suffix, so they are written bare.
pub fn validate_extensions(field_name: &str, extensions: &[String]) -> Result<()> {
    if extensions.is_empty() {
        return Err(invalid(field_name, "", "At least one extension is required"));
    }

    extensions.iter().try_for_each(|ext| {
        validate_non_empty_string(field_name, ext)?;
        if ext.starts_with('.') || ext.contains(['/', '\\']) {
            return Err(invalid(
                field_name,
                ext.as_str(),
                "Extension must not start with '.' or contain path separators",
            ));
        }
        Ok(())
    })
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(invalid(field_name, value, "Value cannot be empty or whitespace-only"));
    }
    Ok(())
}
