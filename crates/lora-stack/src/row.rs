use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_TAG, NONE_SELECTION, STRENGTH_MAX, STRENGTH_MIN, STRENGTH_STEP};
use crate::tags::normalize_tag;

/// Runtime handle for a live row. Never persisted.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct RowId(u64);

impl RowId {
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row-{}", self.0)
    }
}

/// Monotonic allocator for [`RowId`]s, owned by the node.
#[derive(Debug, Default)]
pub struct RowIds {
    next: u64,
}

impl RowIds {
    pub fn next_id(&mut self) -> RowId {
        self.next += 1;
        RowId(self.next)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum StrengthChannel {
    /// Model strength.
    Primary,
    /// CLIP strength; only independent while strengths are separated.
    Secondary,
}

/// Where the current trigger-word text came from, for the status dot.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TriggerStatus {
    Auto,
    Edited,
    AttemptedEmpty,
    Neutral,
}

/// Editable state of one LoRA entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RowState {
    #[serde(rename = "lora", alias = "selection")]
    pub selection: String,
    pub enabled: bool,
    #[serde(rename = "strength", alias = "strengthPrimary")]
    pub strength_primary: f64,
    #[serde(rename = "strengthClip", alias = "strengthSecondary")]
    pub strength_secondary: f64,
    #[serde(rename = "triggerWords", alias = "triggerText")]
    pub trigger_text: String,
    pub tag: String,
    pub auto_populated: bool,
    pub fetch_attempted: bool,
}

impl Default for RowState {
    fn default() -> Self {
        Self {
            selection: NONE_SELECTION.to_string(),
            enabled: true,
            strength_primary: 1.0,
            strength_secondary: 1.0,
            trigger_text: String::new(),
            tag: DEFAULT_TAG.to_string(),
            auto_populated: false,
            fetch_attempted: false,
        }
    }
}

/// True for the "no LoRA chosen" sentinel, an empty string, or any casing
/// of `none`.
pub fn is_none_selection(selection: &str) -> bool {
    let trimmed = selection.trim();
    trimmed.is_empty() || trimmed.eq_ignore_ascii_case(NONE_SELECTION)
}

/// Rounds to two decimals and clamps into the strength range. Non-finite
/// input yields `None`.
pub fn normalize_strength(value: f64) -> Option<f64> {
    if !value.is_finite() {
        return None;
    }
    let clamped = value.clamp(STRENGTH_MIN, STRENGTH_MAX);
    Some((clamped * 100.0).round() / 100.0)
}

impl RowState {
    pub fn new(selection: impl Into<String>) -> Self {
        Self {
            selection: selection.into(),
            ..Self::default()
        }
    }

    pub fn has_selection(&self) -> bool {
        !is_none_selection(&self.selection)
    }

    /// File stem of the selection, without directories or extension.
    pub fn display_name(&self) -> &str {
        if !self.has_selection() {
            return NONE_SELECTION;
        }
        let file = self
            .selection
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(&self.selection);
        match file.rfind('.') {
            Some(dot) if dot > 0 => &file[..dot],
            _ => file,
        }
    }

    pub fn strength(&self, channel: StrengthChannel) -> f64 {
        match channel {
            StrengthChannel::Primary => self.strength_primary,
            StrengthChannel::Secondary => self.strength_secondary,
        }
    }

    /// Writes a strength. Unless `separate` is set, both channels receive
    /// the value. Returns false when the value was rejected.
    pub fn set_strength(&mut self, channel: StrengthChannel, value: f64, separate: bool) -> bool {
        let Some(value) = normalize_strength(value) else {
            return false;
        };
        if !separate {
            self.strength_primary = value;
            self.strength_secondary = value;
            return true;
        }
        match channel {
            StrengthChannel::Primary => self.strength_primary = value,
            StrengthChannel::Secondary => self.strength_secondary = value,
        }
        true
    }

    pub fn step_strength(&mut self, channel: StrengthChannel, steps: i32, separate: bool) -> bool {
        let next = self.strength(channel) + f64::from(steps) * STRENGTH_STEP;
        self.set_strength(channel, next, separate)
    }

    /// Brings state read from outside (a saved node, a template) back under
    /// the live editing rules: strengths rounded and clamped, the secondary
    /// mirroring the primary unless `separate`, and a normalized tag.
    pub fn normalize(&mut self, separate: bool) {
        let default = Self::default();
        self.strength_primary =
            normalize_strength(self.strength_primary).unwrap_or(default.strength_primary);
        self.strength_secondary =
            normalize_strength(self.strength_secondary).unwrap_or(default.strength_secondary);
        if !separate {
            self.sync_secondary();
        }
        self.tag = normalize_tag(&self.tag);
    }

    /// Copies the primary strength into the secondary channel.
    pub fn sync_secondary(&mut self) {
        self.strength_secondary = self.strength_primary;
    }

    pub fn set_tag(&mut self, tag: &str) {
        self.tag = normalize_tag(tag);
    }

    /// Replaces the selection. Auto-fetched trigger words belong to the old
    /// file and are dropped; user-entered text stays.
    pub fn replace_selection(&mut self, selection: impl Into<String>) {
        self.selection = selection.into();
        if self.auto_populated {
            self.trigger_text.clear();
        }
        self.auto_populated = false;
        self.fetch_attempted = false;
    }

    pub fn set_user_trigger_text(&mut self, text: &str) {
        self.trigger_text = text.trim().to_string();
        self.auto_populated = false;
    }

    /// Applies a trigger-word lookup result. Existing non-empty text is only
    /// replaced when `overwrite` is set. Returns whether the text changed.
    pub fn apply_fetched_trigger_words(
        &mut self,
        words: &[String],
        max_words: usize,
        separator: &str,
        overwrite: bool,
    ) -> bool {
        self.fetch_attempted = true;
        let joined = words
            .iter()
            .map(|word| word.trim())
            .filter(|word| !word.is_empty())
            .take(max_words)
            .collect::<Vec<_>>()
            .join(separator);

        if joined.is_empty() {
            self.auto_populated = false;
            return false;
        }
        if !overwrite && !self.trigger_text.trim().is_empty() {
            return false;
        }
        self.trigger_text = joined;
        self.auto_populated = true;
        true
    }

    pub fn trigger_status(&self) -> TriggerStatus {
        let has_text = !self.trigger_text.trim().is_empty();
        if self.auto_populated && has_text {
            TriggerStatus::Auto
        } else if has_text {
            TriggerStatus::Edited
        } else if self.fetch_attempted {
            TriggerStatus::AttemptedEmpty
        } else {
            TriggerStatus::Neutral
        }
    }
}
