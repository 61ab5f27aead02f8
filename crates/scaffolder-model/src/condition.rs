//! Recursive boolean conditions attached to components and variations.
//!
//! A condition is a tree over string-valued variables (e.g. `BOARD`, `SOC`,
//! `BUILD_VARIANT`). Documents spell it as one of:
//!
//! ```text
//! {"var": "SOC", "op": "equals", "value": "h7"}
//! {"var": "SOC", "op": "in", "value": ["h7", "f4"]}
//! {"and": [...]}   {"or": [...]}   {"not": {...}}   {"default": true}
//! ```

use serde::{Deserialize, Serialize};

/// Comparison operator of an atom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operator {
    Equals,
    In,
    NotIn,
    /// An operator the schema does not define. Kept so that evaluation can
    /// fail closed instead of rejecting the document.
    Other(String),
}

impl Operator {
    /// Map a document operator name to an operator.
    pub fn parse(name: &str) -> Self {
        match name {
            "equals" => Self::Equals,
            "in" => Self::In,
            "not_in" => Self::NotIn,
            other => Self::Other(other.to_string()),
        }
    }

    /// The document spelling of this operator.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Equals => "equals",
            Self::In => "in",
            Self::NotIn => "not_in",
            Self::Other(name) => name,
        }
    }
}

/// Right-hand side of an atom: a single literal or a list of literals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Operand {
    Scalar(String),
    List(Vec<String>),
}

/// A node of a condition tree. Every child is owned by its parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ConditionDoc", into = "ConditionDoc")]
pub enum Condition {
    /// Compare a variable against an operand.
    Atom {
        var: String,
        op: Operator,
        value: Operand,
    },
    /// True iff every child is true. An empty list is true.
    And(Vec<Condition>),
    /// True iff any child is true. An empty list is false.
    Or(Vec<Condition>),
    Not(Box<Condition>),
    /// Unconditionally true.
    Default,
}

impl Condition {
    /// `var == value`.
    pub fn equals(var: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Atom {
            var: var.into(),
            op: Operator::Equals,
            value: Operand::Scalar(value.into()),
        }
    }

    /// `var` is one of `values`.
    pub fn one_of<I, S>(var: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Atom {
            var: var.into(),
            op: Operator::In,
            value: Operand::List(values.into_iter().map(Into::into).collect()),
        }
    }

    /// `var` is none of `values`.
    pub fn none_of<I, S>(var: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Atom {
            var: var.into(),
            op: Operator::NotIn,
            value: Operand::List(values.into_iter().map(Into::into).collect()),
        }
    }

    /// Logical negation of `inner`.
    pub fn negate(inner: Condition) -> Self {
        Self::Not(Box::new(inner))
    }

    /// A condition that never holds, used for nodes that carry no usable test.
    pub fn never() -> Self {
        Self::Or(Vec::new())
    }
}

/// Document shape of a condition node: a bag of optional keys.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConditionDoc {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    var: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    op: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    value: Option<Operand>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    and: Option<Vec<Condition>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    or: Option<Vec<Condition>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    not: Option<Box<Condition>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    default: Option<bool>,
}

impl From<ConditionDoc> for Condition {
    fn from(doc: ConditionDoc) -> Self {
        if doc.default == Some(true) {
            return Self::Default;
        }
        if let Some(children) = doc.and {
            return Self::And(children);
        }
        if let Some(children) = doc.or {
            return Self::Or(children);
        }
        if let Some(child) = doc.not {
            return Self::Not(child);
        }
        match (doc.var, doc.op, doc.value) {
            (Some(var), Some(op), Some(value)) => Self::Atom {
                var,
                op: Operator::parse(&op),
                value,
            },
            _ => Self::never(),
        }
    }
}

impl From<Condition> for ConditionDoc {
    fn from(cond: Condition) -> Self {
        match cond {
            Condition::Atom { var, op, value } => Self {
                var: Some(var),
                op: Some(op.as_str().to_string()),
                value: Some(value),
                ..Self::default()
            },
            Condition::And(children) => Self {
                and: Some(children),
                ..Self::default()
            },
            Condition::Or(children) => Self {
                or: Some(children),
                ..Self::default()
            },
            Condition::Not(child) => Self {
                not: Some(child),
                ..Self::default()
            },
            Condition::Default => Self {
                default: Some(true),
                ..Self::default()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Condition {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn parse_equals_atom() {
        let cond = parse(r#"{"var": "SOC", "op": "equals", "value": "h7"}"#);
        assert_eq!(cond, Condition::equals("SOC", "h7"));
    }

    #[test]
    fn parse_list_atom() {
        let cond = parse(r#"{"var": "BOARD", "op": "not_in", "value": ["a", "b"]}"#);
        assert_eq!(cond, Condition::none_of("BOARD", ["a", "b"]));
    }

    #[test]
    fn parse_nested_tree() {
        let cond = parse(
            r#"{"and": [
                {"var": "SOC", "op": "in", "value": ["h7"]},
                {"not": {"or": [{"var": "V", "op": "equals", "value": "debug"}]}}
            ]}"#,
        );
        assert_eq!(
            cond,
            Condition::And(vec![
                Condition::one_of("SOC", ["h7"]),
                Condition::negate(Condition::Or(vec![Condition::equals("V", "debug")])),
            ])
        );
    }

    #[test]
    fn parse_default() {
        assert_eq!(parse(r#"{"default": true}"#), Condition::Default);
    }

    #[test]
    fn default_true_wins_over_other_keys() {
        let cond = parse(r#"{"default": true, "and": [{"default": false}]}"#);
        assert_eq!(cond, Condition::Default);
    }

    #[test]
    fn default_false_falls_through() {
        assert_eq!(parse(r#"{"default": false}"#), Condition::never());
        let cond = parse(r#"{"default": false, "var": "A", "op": "equals", "value": "x"}"#);
        assert_eq!(cond, Condition::equals("A", "x"));
    }

    #[test]
    fn unknown_operator_is_kept() {
        let cond = parse(r#"{"var": "A", "op": "matches", "value": "x.*"}"#);
        match cond {
            Condition::Atom { op, .. } => assert_eq!(op, Operator::Other("matches".into())),
            other => panic!("expected atom, got {other:?}"),
        }
    }

    #[test]
    fn incomplete_atom_never_holds() {
        assert_eq!(parse(r#"{"var": "A", "op": "equals"}"#), Condition::never());
        assert_eq!(parse("{}"), Condition::never());
    }

    #[test]
    fn serializes_back_to_document_shape() {
        let cond = Condition::negate(Condition::equals("SOC", "f4"));
        let value = serde_json::to_value(&cond).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"not": {"var": "SOC", "op": "equals", "value": "f4"}})
        );
    }
}
