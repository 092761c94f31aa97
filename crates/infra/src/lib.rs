//! Infrastructure layer: policy persistence, directory data, read models.

pub mod directory;
pub mod policy_store;
pub mod read_model;
