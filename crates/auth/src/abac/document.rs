//! Versioned export/import envelope for an organization's policy set.

use serde::{Deserialize, Serialize};

use super::policy::AbacPolicy;
use super::validate::{PolicyValidationError, validate_policy_set};

pub const POLICY_DOCUMENT_VERSION: u32 = 1;

/// `{ "version": 1, "policies": [...] }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PolicyDocument {
    pub version: u32,
    pub policies: Vec<AbacPolicy>,
}

impl PolicyDocument {
    pub fn new(policies: Vec<AbacPolicy>) -> Self {
        Self {
            version: POLICY_DOCUMENT_VERSION,
            policies,
        }
    }

    /// Parse an exported document and validate its policies as a set.
    pub fn parse(json: &str) -> Result<Vec<AbacPolicy>, PolicyValidationError> {
        let document: PolicyDocument =
            serde_json::from_str(json).map_err(|e| PolicyValidationError::Malformed(e.to_string()))?;
        document.into_validated()
    }

    pub fn into_validated(self) -> Result<Vec<AbacPolicy>, PolicyValidationError> {
        if self.version != POLICY_DOCUMENT_VERSION {
            return Err(PolicyValidationError::UnsupportedVersion(self.version));
        }
        validate_policy_set(self.policies)
    }
}
