//! Per-field exclusion rules.
//!
//! An exclusion rule drops matching records from the map before a point is
//! built. Evaluation is pure and total: the only thing a malformed rule can
//! do is fail normalization and become no rule at all.

use std::fmt;

use serde::{Deserialize, Serialize};

use geopin_common::CellValue;

use crate::text::cell_text;

/// Comparison applied by an exclusion rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExcludeOperator {
    Contains,
    NotContains,
    Equals,
    NotEquals,
    IsEmpty,
    NotEmpty,
}

impl ExcludeOperator {
    /// Operators that compare against an operand rather than testing
    /// emptiness.
    pub fn needs_operand(self) -> bool {
        !matches!(self, Self::IsEmpty | Self::NotEmpty)
    }

    /// Parse the persisted operator name. Unknown names yield `None` so a
    /// malformed rule can normalize to "no rule" instead of guessing.
    pub fn parse(s: &str) -> Option<Self> {
        Some(match s.trim() {
            "contains" => Self::Contains,
            "notContains" => Self::NotContains,
            "equals" => Self::Equals,
            "notEquals" => Self::NotEquals,
            "isEmpty" => Self::IsEmpty,
            "notEmpty" => Self::NotEmpty,
            _ => return None,
        })
    }
}

impl fmt::Display for ExcludeOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Contains => "contains",
            Self::NotContains => "notContains",
            Self::Equals => "equals",
            Self::NotEquals => "notEquals",
            Self::IsEmpty => "isEmpty",
            Self::NotEmpty => "notEmpty",
        })
    }
}

/// A user-configured filter that drops matching records from the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExclusionRule {
    pub field_id: String,
    pub operator: ExcludeOperator,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl ExclusionRule {
    /// Enforce the rule validity invariant: comparison operators demand a
    /// non-empty trimmed operand, emptiness operators carry none, and the
    /// target field must be named. A rule failing any of these is no rule
    /// at all, never a coerced one.
    pub fn normalized(self) -> Option<Self> {
        if self.field_id.trim().is_empty() {
            return None;
        }
        if self.operator.needs_operand() {
            let operand = self.value.as_deref().map(str::trim).unwrap_or("").to_string();
            if operand.is_empty() {
                return None;
            }
            Some(Self {
                value: Some(operand),
                ..self
            })
        } else {
            Some(Self {
                value: None,
                ..self
            })
        }
    }

    /// Whether `raw` (the rule's target field on some record) matches.
    pub fn matches(&self, raw: &CellValue) -> bool {
        should_exclude(raw, self.operator, self.value.as_deref())
    }
}

/// Evaluate one exclusion comparison.
///
/// Pure and total. Cell and operand are both trimmed and case-folded before
/// comparison; a comparison operator with an empty operand never matches.
pub fn should_exclude(
    raw: &CellValue,
    operator: ExcludeOperator,
    operand: Option<&str>,
) -> bool {
    let text = cell_text(raw);
    let text = text.trim().to_lowercase();
    match operator {
        ExcludeOperator::IsEmpty => text.is_empty(),
        ExcludeOperator::NotEmpty => !text.is_empty(),
        op => {
            let operand = operand.map(str::trim).unwrap_or_default().to_lowercase();
            if operand.is_empty() {
                return false;
            }
            match op {
                ExcludeOperator::Contains => text.contains(&operand),
                ExcludeOperator::NotContains => !text.contains(&operand),
                ExcludeOperator::Equals => text == operand,
                ExcludeOperator::NotEquals => text != operand,
                ExcludeOperator::IsEmpty | ExcludeOperator::NotEmpty => false,
            }
        }
    }
}
