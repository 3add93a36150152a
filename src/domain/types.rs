// ==========================================
// Estimate reconciliation engine - domain types
// ==========================================
// Every status family is a closed enum with an explicit stored string form.
// Stored form == serde form == Display form (lowercase snake, as persisted).
// Parsing is fallible: an unknown stored string is a data error, never a
// silent default.
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// Estimate type
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EstimateType {
    Local,        // local estimate
    Object,       // object estimate
    Summary,      // summary estimate (roll-up target)
    Consolidated, // consolidated estimate calculation
}

impl EstimateType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EstimateType::Local => "local",
            EstimateType::Object => "object",
            EstimateType::Summary => "summary",
            EstimateType::Consolidated => "consolidated",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "local" => Some(EstimateType::Local),
            "object" => Some(EstimateType::Object),
            "summary" => Some(EstimateType::Summary),
            "consolidated" => Some(EstimateType::Consolidated),
            _ => None,
        }
    }
}

impl fmt::Display for EstimateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// Match status (volume match level)
// ==========================================
// Thresholds: 0 -> passed, (0, 10] -> warning, > 10 -> failed (absolute %).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    Passed,
    Warning,
    Failed,
}

impl MatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStatus::Passed => "passed",
            MatchStatus::Warning => "warning",
            MatchStatus::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "passed" => Some(MatchStatus::Passed),
            "warning" => Some(MatchStatus::Warning),
            "failed" => Some(MatchStatus::Failed),
            _ => None,
        }
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// Validation status (estimate rule level)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationStatus {
    Pending,
    InProgress,
    Passed,
    Failed,
    NeedsReview,
}

impl ValidationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationStatus::Pending => "pending",
            ValidationStatus::InProgress => "in_progress",
            ValidationStatus::Passed => "passed",
            ValidationStatus::Failed => "failed",
            ValidationStatus::NeedsReview => "needs_review",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(ValidationStatus::Pending),
            "in_progress" => Some(ValidationStatus::InProgress),
            "passed" => Some(ValidationStatus::Passed),
            "failed" => Some(ValidationStatus::Failed),
            "needs_review" => Some(ValidationStatus::NeedsReview),
            _ => None,
        }
    }
}

impl fmt::Display for ValidationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// Validation rule
// ==========================================
// The automatic reconciliation emits VolumeMatch and CostRange; the remaining
// rules belong to manual review workflows feeding the same table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationRule {
    VolumeMatch,
    SpecificationMatch,
    CostRange,
    ConstructComplete,
    DocumentationComplete,
}

impl ValidationRule {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationRule::VolumeMatch => "volume_match",
            ValidationRule::SpecificationMatch => "specification_match",
            ValidationRule::CostRange => "cost_range",
            ValidationRule::ConstructComplete => "construct_complete",
            ValidationRule::DocumentationComplete => "documentation_complete",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "volume_match" => Some(ValidationRule::VolumeMatch),
            "specification_match" => Some(ValidationRule::SpecificationMatch),
            "cost_range" => Some(ValidationRule::CostRange),
            "construct_complete" => Some(ValidationRule::ConstructComplete),
            "documentation_complete" => Some(ValidationRule::DocumentationComplete),
            _ => None,
        }
    }
}

impl fmt::Display for ValidationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// Cost control status
// ==========================================
// Thresholds: |dev%| <= 5 -> normal, <= 10 -> warning, > 10 -> critical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CostControlStatus {
    Normal,
    Warning,
    Critical,
}

impl CostControlStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CostControlStatus::Normal => "normal",
            CostControlStatus::Warning => "warning",
            CostControlStatus::Critical => "critical",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "normal" => Some(CostControlStatus::Normal),
            "warning" => Some(CostControlStatus::Warning),
            "critical" => Some(CostControlStatus::Critical),
            _ => None,
        }
    }
}

impl fmt::Display for CostControlStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
