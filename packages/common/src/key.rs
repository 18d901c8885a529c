use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum KeyError {
    #[error("invalid {field}: {reason}")]
    InvalidSegment {
        field: &'static str,
        reason: String,
    },
}

/// Identifies one deployed project. Both segments become storage key path
/// components, so they are validated up front.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeployKey {
    owner_id: String,
    project_id: String,
}

impl DeployKey {
    pub fn new(owner_id: impl Into<String>, project_id: impl Into<String>) -> Result<Self, KeyError> {
        let owner_id = owner_id.into();
        let project_id = project_id.into();
        validate_segment("owner_id", &owner_id)?;
        validate_segment("project_id", &project_id)?;
        Ok(Self {
            owner_id,
            project_id,
        })
    }

    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// Storage key prefix for this project: `users/{owner}/{project}`.
    pub fn prefix(&self) -> String {
        format!("users/{}/{}", self.owner_id, self.project_id)
    }

    /// Full storage key for a path within this project. An empty relative
    /// path resolves to `index.html`.
    pub fn object_key(&self, relative_path: &str) -> String {
        let rel = relative_path.trim_matches('/');
        if rel.is_empty() {
            format!("{}/index.html", self.prefix())
        } else {
            format!("{}/{}", self.prefix(), rel)
        }
    }
}

impl fmt::Display for DeployKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner_id, self.project_id)
    }
}

fn validate_segment(field: &'static str, value: &str) -> Result<(), KeyError> {
    let invalid = |reason: &str| KeyError::InvalidSegment {
        field,
        reason: reason.to_string(),
    };

    if value.is_empty() {
        return Err(invalid("must not be empty"));
    }
    if value.len() > 64 {
        return Err(invalid("must be at most 64 characters"));
    }
    if value.starts_with('.') {
        return Err(invalid("must not start with '.'"));
    }
    if !value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
    {
        return Err(invalid(
            "may only contain ASCII letters, digits, '-', '_' and '.'",
        ));
    }
    Ok(())
}
