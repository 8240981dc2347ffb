//! Structured-rule input.
//!
//! The upstream natural-language extraction step (outside this crate) emits
//! JSON of the form
//!
//! ```json
//! {
//!   "entry": [
//!     { "left": "close", "operator": ">", "right": "sma(close,20)" },
//!     { "left": "volume", "operator": ">", "right": 1000000 }
//!   ],
//!   "exit": [
//!     { "left": "rsi(close,14)", "operator": "<", "right": 30 }
//!   ]
//! }
//! ```
//!
//! where each term is a column name, a number, or an indicator-call string.
//! This module renders that into DSL text with a deterministic template —
//! clauses joined with `AND`, operators mapped one-to-one — and leaves all
//! actual parsing and validation to the DSL pipeline.

use crate::domain::error::RulebenchError;
use serde::{Deserialize, Serialize};

/// One side of a triple: a bare number, or text holding a column name or an
/// indicator-call string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Term {
    Number(f64),
    Text(String),
}

impl Term {
    fn render(&self) -> String {
        match self {
            Term::Number(v) => format!("{}", v),
            Term::Text(s) => s.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleTriple {
    pub left: Term,
    pub operator: String,
    pub right: Term,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredRules {
    pub entry: Vec<RuleTriple>,
    pub exit: Vec<RuleTriple>,
}

impl StructuredRules {
    pub fn from_json(json: &str) -> Result<Self, RulebenchError> {
        serde_json::from_str(json).map_err(|e| RulebenchError::Render {
            reason: format!("invalid structured rules JSON: {}", e),
        })
    }

    /// Render to DSL text. The grammar has no empty-rule form, so an empty
    /// section is an error rather than a `True`/`False` placeholder.
    pub fn to_dsl(&self) -> Result<String, RulebenchError> {
        let entry = render_section("entry", &self.entry)?;
        let exit = render_section("exit", &self.exit)?;
        Ok(format!("ENTRY: {}\nEXIT: {}", entry, exit))
    }
}

fn render_section(name: &str, triples: &[RuleTriple]) -> Result<String, RulebenchError> {
    if triples.is_empty() {
        return Err(RulebenchError::Render {
            reason: format!("section '{}' has no rules", name),
        });
    }
    let clauses: Vec<String> = triples
        .iter()
        .map(|t| -> Result<String, RulebenchError> {
            let op = render_operator(&t.operator)?;
            Ok(format!("{} {} {}", t.left.render(), op, t.right.render()))
        })
        .collect::<Result<_, RulebenchError>>()?;
    Ok(clauses.join(" AND "))
}

fn render_operator(operator: &str) -> Result<&'static str, RulebenchError> {
    match operator {
        ">" => Ok(">"),
        "<" => Ok("<"),
        ">=" => Ok(">="),
        "<=" => Ok("<="),
        "crosses_above" => Ok("CROSSES ABOVE"),
        "crosses_below" => Ok("CROSSES BELOW"),
        other => Err(RulebenchError::Render {
            reason: format!("unknown operator '{}'", other),
        }),
    }
}
