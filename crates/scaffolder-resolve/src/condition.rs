//! Condition evaluation and compilation.
//!
//! [`evaluate`] decides a condition against known variable values.
//! [`compile`] renders the same condition as a CMake `if()` expression so the
//! decision can be deferred to configure time. Both are exhaustive matches
//! over [`Condition`] and must agree on every variant:
//!
//! | node | evaluate | compile |
//! |---|---|---|
//! | `Default` | true | `TRUE` |
//! | `And([])` | true | `TRUE` |
//! | `Or([])` | false | `FALSE` |
//! | `in []` | false | `FALSE` |
//! | `not_in []` | true | `TRUE` |
//! | unknown operator or operand shape | false | `FALSE` |

use std::collections::{BTreeMap, HashMap};

use scaffolder_model::{Condition, Operand, Operator, Variation};

const CMAKE_TRUE: &str = "TRUE";
const CMAKE_FALSE: &str = "FALSE";

/// Variable values a condition is evaluated against.
///
/// An unset variable reads as the empty string.
pub trait Environment {
    fn get(&self, name: &str) -> Option<&str>;
}

impl Environment for HashMap<String, String> {
    fn get(&self, name: &str) -> Option<&str> {
        HashMap::get(self, name).map(String::as_str)
    }
}

impl Environment for BTreeMap<String, String> {
    fn get(&self, name: &str) -> Option<&str> {
        BTreeMap::get(self, name).map(String::as_str)
    }
}

/// Evaluate `cond` against `env`.
pub fn evaluate<E: Environment + ?Sized>(cond: &Condition, env: &E) -> bool {
    match cond {
        Condition::Default => true,
        Condition::And(children) => children.iter().all(|c| evaluate(c, env)),
        Condition::Or(children) => children.iter().any(|c| evaluate(c, env)),
        Condition::Not(child) => !evaluate(child, env),
        Condition::Atom { var, op, value } => {
            let actual = env.get(var).unwrap_or("");
            match (op, value) {
                (Operator::Equals, Operand::Scalar(expected)) => actual == expected,
                (Operator::In, Operand::List(values)) => values.iter().any(|v| v == actual),
                (Operator::NotIn, Operand::List(values)) => !values.iter().any(|v| v == actual),
                _ => false,
            }
        }
    }
}

/// Compile `cond` into a CMake `if()` expression.
///
/// Every operand of `AND`/`OR` is parenthesized, so the result can be nested
/// anywhere without relying on CMake's operator precedence.
pub fn compile(cond: &Condition) -> String {
    match cond {
        Condition::Default => CMAKE_TRUE.to_string(),
        Condition::And(children) => join_parenthesized(children, " AND ", CMAKE_TRUE),
        Condition::Or(children) => join_parenthesized(children, " OR ", CMAKE_FALSE),
        Condition::Not(child) => format!("NOT ({})", compile(child)),
        Condition::Atom { var, op, value } => match (op, value) {
            (Operator::Equals, Operand::Scalar(expected)) => str_equal(var, expected),
            (Operator::In, Operand::List(values)) => {
                if values.is_empty() {
                    return CMAKE_FALSE.to_string();
                }
                let tests: Vec<String> = values.iter().map(|v| str_equal(var, v)).collect();
                format!("({})", tests.join(" OR "))
            }
            (Operator::NotIn, Operand::List(values)) => {
                if values.is_empty() {
                    return CMAKE_TRUE.to_string();
                }
                let tests: Vec<String> = values
                    .iter()
                    .map(|v| format!("NOT ({})", str_equal(var, v)))
                    .collect();
                format!("({})", tests.join(" AND "))
            }
            _ => CMAKE_FALSE.to_string(),
        },
    }
}

fn join_parenthesized(children: &[Condition], op: &str, empty: &str) -> String {
    if children.is_empty() {
        return empty.to_string();
    }
    children
        .iter()
        .map(|c| format!("({})", compile(c)))
        .collect::<Vec<_>>()
        .join(op)
}

fn str_equal(var: &str, literal: &str) -> String {
    format!("{var} STREQUAL \"{}\"", quote(literal))
}

// Escapes for a CMake quoted argument.
fn quote(literal: &str) -> String {
    let mut out = String::with_capacity(literal.len());
    for ch in literal.chars() {
        if matches!(ch, '\\' | '"' | '$') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// The first variation whose condition holds under `env`.
pub fn select_variation<'a, E: Environment + ?Sized>(
    variations: &'a [Variation],
    env: &E,
) -> Option<&'a Variation> {
    variations.iter().find(|v| evaluate(&v.condition, env))
}

/// `(subdir, expression)` per variation, in declaration order: the branches
/// of the `if()/elseif()` chain a variant component generates.
pub fn variation_branches(variations: &[Variation]) -> Vec<(String, String)> {
    variations
        .iter()
        .map(|v| (v.subdir.clone(), compile(&v.condition)))
        .collect()
}
