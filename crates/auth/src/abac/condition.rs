//! Condition predicates and their evaluation.
//!
//! A condition block maps an attribute key to a [`Predicate`]. On the wire a
//! bare literal is shorthand for an `eq` predicate:
//!
//! ```json
//! { "subject": { "departmentId": "$resource.departmentId", "level": { "op": "gt", "value": 3 } } }
//! ```
//!
//! Predicates never fail: a missing attribute, a missing reference target, or
//! a type mismatch makes the predicate `false`.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::attribute::{AbacAttribute, AttributeSet};

const SUBJECT_PREFIX: &str = "$subject.";
const RESOURCE_PREFIX: &str = "$resource.";

/// Comparison operator of a predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operator {
    Eq,
    Ne,
    In,
    Gt,
    Lt,
}

/// Which attribute set a key or reference is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Subject,
    Resource,
}

impl Side {
    fn prefix(self) -> &'static str {
        match self {
            Self::Subject => SUBJECT_PREFIX,
            Self::Resource => RESOURCE_PREFIX,
        }
    }
}

/// Right-hand side of a predicate: either a literal or a late-bound reference
/// into one of the attribute sets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "AbacAttribute", into = "AbacAttribute")]
pub enum Operand {
    Literal(AbacAttribute),
    Reference { side: Side, path: String },
}

impl Operand {
    pub fn reference(side: Side, path: impl Into<String>) -> Self {
        Self::Reference {
            side,
            path: path.into(),
        }
    }

    /// Resolve the operand against the evaluation context.
    ///
    /// `None` means the reference target is absent.
    pub fn resolve<'a>(&'a self, ctx: &EvalContext<'a>) -> Option<&'a AbacAttribute> {
        match self {
            Self::Literal(value) => Some(value),
            Self::Reference { side, path } => ctx.side(*side).get(path),
        }
    }
}

impl From<AbacAttribute> for Operand {
    fn from(value: AbacAttribute) -> Self {
        if let AbacAttribute::String(s) = &value {
            for side in [Side::Subject, Side::Resource] {
                if let Some(path) = s.strip_prefix(side.prefix()) {
                    return Self::reference(side, path);
                }
            }
        }
        Self::Literal(value)
    }
}

impl From<Operand> for AbacAttribute {
    fn from(value: Operand) -> Self {
        match value {
            Operand::Literal(v) => v,
            Operand::Reference { side, path } => {
                AbacAttribute::String(format!("{}{}", side.prefix(), path))
            }
        }
    }
}

/// The two attribute sets a condition is evaluated against.
#[derive(Debug, Clone, Copy)]
pub struct EvalContext<'a> {
    pub subject: &'a AttributeSet,
    pub resource: &'a AttributeSet,
}

impl<'a> EvalContext<'a> {
    pub fn new(subject: &'a AttributeSet, resource: &'a AttributeSet) -> Self {
        Self { subject, resource }
    }

    pub fn side(&self, side: Side) -> &'a AttributeSet {
        match side {
            Side::Subject => self.subject,
            Side::Resource => self.resource,
        }
    }
}

/// `{ op, value }` predicate over one attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawPredicate")]
pub struct Predicate {
    pub op: Operator,
    pub value: Operand,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPredicate {
    Explicit(ExplicitPredicate),
    Shorthand(AbacAttribute),
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ExplicitPredicate {
    op: Operator,
    value: AbacAttribute,
}

impl From<RawPredicate> for Predicate {
    fn from(raw: RawPredicate) -> Self {
        match raw {
            RawPredicate::Explicit(ExplicitPredicate { op, value }) => Self::new(op, value),
            RawPredicate::Shorthand(value) => Self::new(Operator::Eq, value),
        }
    }
}

impl Predicate {
    /// Build a predicate; `$subject.`/`$resource.` strings become references.
    pub fn new(op: Operator, value: impl Into<AbacAttribute>) -> Self {
        Self {
            op,
            value: Operand::from(value.into()),
        }
    }

    pub fn equals(value: impl Into<AbacAttribute>) -> Self {
        Self::new(Operator::Eq, value)
    }

    pub fn not_equals(value: impl Into<AbacAttribute>) -> Self {
        Self::new(Operator::Ne, value)
    }

    pub fn one_of(value: impl Into<AbacAttribute>) -> Self {
        Self::new(Operator::In, value)
    }

    pub fn greater_than(value: impl Into<AbacAttribute>) -> Self {
        Self::new(Operator::Gt, value)
    }

    pub fn less_than(value: impl Into<AbacAttribute>) -> Self {
        Self::new(Operator::Lt, value)
    }

    /// Evaluate this predicate for attribute `key` read from `side`.
    pub fn evaluate(&self, key: &str, side: Side, ctx: &EvalContext<'_>) -> bool {
        let Some(actual) = ctx.side(side).get(key) else {
            return false;
        };
        let Some(expected) = self.value.resolve(ctx) else {
            return false;
        };
        compare(self.op, actual, expected)
    }
}

fn compare(op: Operator, actual: &AbacAttribute, expected: &AbacAttribute) -> bool {
    match op {
        Operator::Eq => actual == expected,
        Operator::Ne => actual != expected,
        Operator::In => match expected {
            AbacAttribute::List(items) => actual.is_primitive() && items.contains(actual),
            _ => false,
        },
        Operator::Gt => actual.cmp_number(expected) == Some(Ordering::Greater),
        Operator::Lt => actual.cmp_number(expected) == Some(Ordering::Less),
    }
}

/// Conjunction of predicates keyed by attribute name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConditionBlock(BTreeMap<String, Predicate>);

impl ConditionBlock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, predicate: Predicate) -> Self {
        self.0.insert(key.into(), predicate);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Predicate)> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// All predicates hold when read from `side`.
    pub fn holds(&self, side: Side, ctx: &EvalContext<'_>) -> bool {
        self.0.iter().all(|(key, p)| p.evaluate(key, side, ctx))
    }
}

/// Optional subject and resource condition blocks of a policy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PolicyCondition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<ConditionBlock>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<ConditionBlock>,
}

impl PolicyCondition {
    /// Both blocks, when present, must hold.
    pub fn holds(&self, ctx: &EvalContext<'_>) -> bool {
        let subject_ok = self
            .subject
            .as_ref()
            .is_none_or(|b| b.holds(Side::Subject, ctx));
        let resource_ok = self
            .resource
            .as_ref()
            .is_none_or(|b| b.holds(Side::Resource, ctx));
        subject_ok && resource_ok
    }

    /// Iterate all predicates together with the side their key is read from.
    pub fn predicates(&self) -> impl Iterator<Item = (Side, &String, &Predicate)> {
        let subject = self
            .subject
            .iter()
            .flat_map(|b| b.iter().map(|(k, p)| (Side::Subject, k, p)));
        let resource = self
            .resource
            .iter()
            .flat_map(|b| b.iter().map(|(k, p)| (Side::Resource, k, p)));
        subject.chain(resource)
    }
}
