//! Execution bundle handed to the backend on every save.

use serde::{Deserialize, Serialize};

use crate::row::RowState;
use crate::tags::normalize_tag;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleEntry {
    pub selection: String,
    pub enabled: bool,
    pub strength_primary: f64,
    pub strength_secondary: f64,
    pub trigger_text: String,
    pub tag: String,
    pub auto_populated: bool,
}

impl From<&RowState> for BundleEntry {
    fn from(row: &RowState) -> Self {
        Self {
            selection: row.selection.clone(),
            enabled: row.enabled,
            strength_primary: row.strength_primary,
            strength_secondary: row.strength_secondary,
            trigger_text: row.trigger_text.clone(),
            tag: row.tag.clone(),
            auto_populated: row.auto_populated,
        }
    }
}

impl BundleEntry {
    /// Rebuilds row state from a stored entry, as when loading a template.
    pub fn to_row_state(&self) -> RowState {
        RowState {
            selection: self.selection.clone(),
            enabled: self.enabled,
            strength_primary: self.strength_primary,
            strength_secondary: self.strength_secondary,
            trigger_text: self.trigger_text.clone(),
            tag: normalize_tag(&self.tag),
            auto_populated: self.auto_populated,
            fetch_attempted: self.auto_populated,
        }
    }
}

/// Every row with a real selection, in list order. Disabled rows are kept
/// and carry `enabled: false`.
pub fn execution_bundle<'a>(rows: impl IntoIterator<Item = &'a RowState>) -> Vec<BundleEntry> {
    rows.into_iter()
        .filter(|row| row.has_selection())
        .map(BundleEntry::from)
        .collect()
}
