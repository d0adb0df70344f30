use crate::utils::error::{EntrypointError, Result};
use std::path::Path;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_path(field_name: &str, path: &Path) -> Result<()> {
    let rendered = path.to_string_lossy();
    if rendered.is_empty() {
        return Err(EntrypointError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: rendered.into_owned(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if rendered.contains('\0') {
        return Err(EntrypointError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: rendered.into_owned(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: u64, min_value: u64) -> Result<()> {
    if value < min_value {
        return Err(EntrypointError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(EntrypointError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

/// Fails on the first variable that is unset or empty.
pub fn validate_required_env<F>(names: &[String], lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    for name in names {
        match lookup(name) {
            Some(value) if !value.is_empty() => {}
            _ => {
                return Err(EntrypointError::MissingEnvironment { name: name.clone() });
            }
        }
    }
    Ok(())
}
