// tabrules-core/src/index.rs
// ============================================================================
// Module: Index Builder
// Description: Enriches a tab snapshot and builds the derived multi-maps.
// Purpose: Pure transformation from raw driver tabs to `(EnrichedTab[],
//          Indices)`, with no I/O.
// Dependencies: crate::model, crate::normalize
// ============================================================================

//! ## Overview
//! `build_indices` is the sole place a raw [`crate::model::Tab`] becomes an
//! [`crate::model::EnrichedTab`]. It is pure and referentially transparent:
//! the same tabs, category map, and `now` always produce the same output.

use std::collections::HashMap;

use crate::model::EnrichedTab;
use crate::model::Indices;
use crate::model::Tab;
use crate::model::TimestampMs;
use crate::model::Window;
use crate::normalize;

/// Builds enriched tabs and derived indices from a raw snapshot.
///
/// `categories` maps a domain (or parent domain, for subdomain fallback) to
/// a category tag; unresolved domains get `"unknown"`.
#[must_use]
pub fn build_indices(
    tabs: &[Tab],
    windows: &[Window],
    categories: &HashMap<String, String>,
    now: TimestampMs,
) -> (Vec<EnrichedTab>, Indices) {
    let mut dupe_counts: HashMap<String, usize> = HashMap::new();
    let mut enriched: Vec<EnrichedTab> = tabs
        .iter()
        .map(|tab| {
            let domain = normalize::domain(&tab.url);
            let dupe_key = normalize::normalize(&tab.url);
            *dupe_counts.entry(dupe_key.clone()).or_insert(0) += 1;
            let category = lookup_category(categories, &domain);
            let age_ms = now - tab.last_accessed.unwrap_or(tab.created_at);
            EnrichedTab {
                tab: tab.clone(),
                domain,
                origin: String::new(),
                dupe_key,
                category,
                age_ms,
                is_dupe: false,
            }
        })
        .collect();

    for tab in &mut enriched {
        tab.is_dupe = dupe_counts.get(&tab.dupe_key).copied().unwrap_or(0) > 1;
    }

    let mut indices = Indices::default();
    for tab in &enriched {
        indices
            .by_domain
            .entry(tab.domain.clone())
            .or_default()
            .push(tab.tab.id);
        indices
            .by_origin
            .entry(tab.origin.clone())
            .or_default()
            .push(tab.tab.id);
        indices
            .by_dupe_key
            .entry(tab.dupe_key.clone())
            .or_default()
            .push(tab.tab.id);
        indices
            .by_category
            .entry(tab.category.clone())
            .or_default()
            .push(tab.tab.id);
    }
    for window in windows {
        indices
            .tab_count_by_window
            .insert(window.id, window.tab_ids.len());
    }

    (enriched, indices)
}

/// Looks up a domain's category, falling back to the parent domain
/// (`a.b.c` → `b.c`) once before giving up and returning `"unknown"`.
fn lookup_category(categories: &HashMap<String, String>, domain: &str) -> String {
    if let Some(category) = categories.get(domain) {
        return category.clone();
    }
    if let Some((_, parent)) = domain.split_once('.') {
        if let Some(category) = categories.get(parent) {
            return category.clone();
        }
    }
    "unknown".to_string()
}
