use serde::{Deserialize, Serialize};

use orgadmin_auth::abac::{AbacPolicy, AttributeSet, DecisionTrace};
use orgadmin_auth::{AccessDecision, RegistryWarning, Role};

// -------------------------
// Request DTOs
// -------------------------

/// Dry-run evaluation with caller-supplied attributes.
///
/// `policies` evaluates a draft set instead of the stored one.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulateRequest {
    pub action: String,
    pub resource_type: String,
    #[serde(default)]
    pub subject: AttributeSet,
    #[serde(default)]
    pub resource: AttributeSet,
    #[serde(default)]
    pub policies: Option<Vec<AbacPolicy>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckAccessRequest {
    pub action: String,
    pub resource_type: String,
    #[serde(default)]
    pub resource_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PutMemberRequest {
    #[serde(default)]
    pub roles: Vec<Role>,
    #[serde(default)]
    pub department_id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub attributes: AttributeSet,
}

#[derive(Debug, Deserialize)]
pub struct PutResourceRequest {
    #[serde(default)]
    pub attributes: AttributeSet,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct PolicyListResponse {
    pub policies: Vec<AbacPolicy>,
}

#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub imported: usize,
    pub policies: Vec<AbacPolicy>,
    pub warnings: Vec<RegistryWarning>,
}

#[derive(Debug, Serialize)]
pub struct SimulateResponse {
    #[serde(flatten)]
    pub trace: DecisionTrace,
    pub warnings: Vec<RegistryWarning>,
}

#[derive(Debug, Serialize)]
pub struct CheckAccessResponse {
    #[serde(flatten)]
    pub decision: AccessDecision,
    pub action: String,
    #[serde(rename = "resourceType")]
    pub resource_type: String,
}
