//! `orgadmin-auth` — pure authentication/authorization boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage: policies and
//! attributes are passed in, decisions come out.

pub mod abac;
pub mod authorize;
pub mod claims;
pub mod guard;
pub mod permissions;
pub mod principal;
pub mod registry;
pub mod roles;

pub use authorize::{AuthzError, Principal, RoleDefinition, authorize, default_role_permissions, role_catalog};
pub use claims::{Hs256JwtValidator, JwtClaims, JwtValidator, TokenValidationError, validate_claims};
pub use guard::{AccessDecision, AccessReason, check_access};
pub use permissions::Permission;
pub use principal::OrgMembership;
pub use registry::{RegistryWarning, ResourceDefinition, ResourceRegistry};
pub use roles::Role;
