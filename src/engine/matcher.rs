// ==========================================
// Estimate reconciliation engine - work name matcher
// ==========================================
// Pairs work-volume ledger rows with estimate line items by free-text name.
// Exact lookup on the normalized name first; otherwise token-overlap fuzzy
// matching, where every key scoring strictly above 0.5 contributes its
// aggregated quantity (cumulative, not best-match-wins).
//
// The index is built fresh per recompute from local inputs only; iteration
// follows item insertion order so repeated runs see the same sequence.
// ==========================================

use crate::domain::estimate::EstimateItem;
use std::collections::{HashMap, HashSet};

/// Similarity threshold. A score of exactly 0.5 does NOT match.
pub const FUZZY_MATCH_THRESHOLD: f64 = 0.5;

// ==========================================
// EstimateItemIndex
// ==========================================
/// Normalized multimap over an estimate's items:
/// key = lowercased, trimmed work_name; value = summed quantity.
/// Name collisions aggregate. Key order is first occurrence.
pub struct EstimateItemIndex {
    keys: Vec<String>,
    totals: HashMap<String, f64>,
}

impl EstimateItemIndex {
    /// Build the index from items in their stored (insertion) order.
    pub fn build(items: &[EstimateItem]) -> Self {
        let mut keys = Vec::new();
        let mut totals: HashMap<String, f64> = HashMap::new();

        for item in items {
            let key = normalize_work_name(&item.work_name);
            match totals.get_mut(&key) {
                Some(total) => *total += item.quantity,
                None => {
                    totals.insert(key.clone(), item.quantity);
                    keys.push(key);
                }
            }
        }

        Self { keys, totals }
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Aggregated quantity for an exact normalized name.
    pub fn exact_quantity(&self, normalized_name: &str) -> Option<f64> {
        self.totals.get(normalized_name).copied()
    }

    /// (key, aggregated quantity) pairs in first-occurrence order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.keys
            .iter()
            .map(move |k| (k.as_str(), self.totals[k]))
    }
}

/// Normalization used for both sides of the match.
pub fn normalize_work_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Token-overlap similarity between two normalized labels:
/// |intersection of word sets| / max(|A|, |B|).
///
/// Tokens are whitespace-separated; punctuation stays part of its token
/// ("-" counts as a word), matching how the descriptions are authored.
pub fn token_overlap_score(a: &str, b: &str) -> f64 {
    let words_a: HashSet<&str> = a.split_whitespace().collect();
    let words_b: HashSet<&str> = b.split_whitespace().collect();
    let max_len = words_a.len().max(words_b.len());
    if max_len == 0 {
        return 0.0;
    }
    let common = words_a.intersection(&words_b).count();
    common as f64 / max_len as f64
}

/// Estimated volume covered by the estimate for one ledger work name.
///
/// Exact hit wins outright; otherwise every fuzzy-qualifying key adds its
/// quantity. An estimate item may therefore be counted toward more than one
/// ledger row, and one ledger row may double-count overlapping entries -
/// the historical behavior, kept deliberately. No match at all yields 0.
pub fn estimated_volume_for(index: &EstimateItemIndex, work_name: &str) -> f64 {
    let target = normalize_work_name(work_name);

    if let Some(quantity) = index.exact_quantity(&target) {
        return quantity;
    }

    let mut estimated = 0.0;
    for (key, quantity) in index.entries() {
        let score = token_overlap_score(&target, key);
        if score > FUZZY_MATCH_THRESHOLD {
            estimated += quantity;
        }
    }
    estimated
}
