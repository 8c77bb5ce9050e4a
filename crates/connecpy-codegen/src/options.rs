//! Generator options parsed from the plugin parameter string.

use crate::error::{CodegenError, Result};

pub const DEFAULT_SUFFIX: &str = "_connecpy.py";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorOptions {
    /// Appended to the file name stem of every generated unit.
    pub suffix: String,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            suffix: DEFAULT_SUFFIX.to_string(),
        }
    }
}

impl GeneratorOptions {
    /// Defaults with `suffix` replaced, validated the same way `parse` does.
    pub fn with_suffix(suffix: &str) -> Result<Self> {
        validate_suffix(suffix, suffix)?;
        Ok(Self {
            suffix: suffix.to_string(),
        })
    }

    /// Parse `key=value` pairs separated by commas (`--connecpy_opt=suffix=_rpc.py`).
    pub fn parse(parameter: Option<&str>) -> Result<Self> {
        let mut opts = Self::default();
        let Some(parameter) = parameter else {
            return Ok(opts);
        };

        for part in parameter.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (key, value) = part.split_once('=').unwrap_or((part, ""));
            match key {
                "suffix" => {
                    validate_suffix(part, value)?;
                    opts.suffix = value.to_string();
                }
                _ => return Err(invalid(part, "unknown parameter")),
            }
        }
        Ok(opts)
    }
}

fn validate_suffix(parameter: &str, suffix: &str) -> Result<()> {
    if suffix.is_empty() || suffix.contains('/') {
        return Err(invalid(parameter, "suffix must be a non-empty file name suffix"));
    }
    Ok(())
}

fn invalid(parameter: &str, message: &str) -> CodegenError {
    CodegenError::InvalidParameter {
        parameter: parameter.to_string(),
        message: message.to_string(),
    }
}
