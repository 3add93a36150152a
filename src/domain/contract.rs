// ==========================================
// Estimate reconciliation engine - contract link model
// ==========================================
// Contracts themselves are a read-only collaborator; the engine only
// maintains the estimate-contract links and the single-primary invariant.
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contract {
    pub id: i64,
    pub number: String,
    pub name: String,
}

// Invariant: at most one link with is_primary = true per contract_id.
// Enforced by a transactional clear-then-set plus a partial unique index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimateContractLink {
    pub id: i64, // 0 until persisted
    pub estimate_id: i64,
    pub contract_id: i64,
    pub is_primary: bool,
    pub usage_type: Option<String>, // basis / control / comparison by convention
    pub created_at: NaiveDateTime,
}
