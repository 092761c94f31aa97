//! Attribute-based access control: policy model, validation, and evaluation.
//!
//! Components, leaves first:
//! - [`resolver`]: where subject/resource attributes come from
//! - [`condition`]: predicate evaluation over attributes
//! - [`pattern`] + [`policy`]: which policies apply to a request
//! - [`evaluator`]: combining active policies into one decision
//!
//! Nothing in here performs I/O.

pub mod attribute;
pub mod condition;
pub mod document;
pub mod evaluator;
pub mod pattern;
pub mod policy;
pub mod resolver;
pub mod validate;

pub use attribute::{AbacAttribute, AttributeSet};
pub use condition::{ConditionBlock, EvalContext, Operand, Operator, PolicyCondition, Predicate, Side};
pub use document::{POLICY_DOCUMENT_VERSION, PolicyDocument};
pub use evaluator::{Decision, DecisionReason, DecisionTrace, evaluate, explain};
pub use pattern::{PatternError, any_matches, check_pattern, pattern_matches};
pub use policy::{AbacPolicy, AccessRequest, DEFAULT_PRIORITY, Effect};
pub use resolver::{AttributeResolver, ResolvedAttributes, ResourceRef, StaticAttributes, SubjectRef};
pub use validate::{
    PolicyValidationError, normalize_policy, parse_policy_set, validate_policy, validate_policy_set,
};
