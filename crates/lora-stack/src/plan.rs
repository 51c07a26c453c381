//! Backend side of the execution bundle: which LoRA files to apply, at what
//! strengths, and the combined trigger-word prompt.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::bundle::BundleEntry;
use crate::constants::{DEFAULT_TAG, DEFAULT_TRIGGER_SEPARATOR};
use crate::error::{Result, StackError};
use crate::row::is_none_selection;

/// Accepts both bundle field names and the older workflow names.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEntry {
    #[serde(alias = "lora")]
    selection: Option<String>,
    enabled: Option<bool>,
    #[serde(alias = "strength")]
    strength_primary: Option<f64>,
    #[serde(alias = "strengthClip")]
    strength_secondary: Option<f64>,
    #[serde(alias = "triggerWords")]
    trigger_text: Option<String>,
    tag: Option<String>,
    auto_populated: Option<bool>,
}

impl From<RawEntry> for BundleEntry {
    fn from(raw: RawEntry) -> Self {
        let primary = raw.strength_primary.unwrap_or(1.0);
        Self {
            selection: raw.selection.unwrap_or_default(),
            enabled: raw.enabled.unwrap_or(true),
            strength_primary: primary,
            strength_secondary: raw.strength_secondary.unwrap_or(primary),
            trigger_text: raw.trigger_text.unwrap_or_default(),
            tag: raw.tag.unwrap_or_else(|| DEFAULT_TAG.to_string()),
            auto_populated: raw.auto_populated.unwrap_or(false),
        }
    }
}

pub fn validate_entry(entry: &BundleEntry) -> Result<()> {
    for (name, value) in [
        ("strengthPrimary", entry.strength_primary),
        ("strengthSecondary", entry.strength_secondary),
    ] {
        if !value.is_finite() {
            return Err(StackError::InvalidEntry {
                selection: entry.selection.clone(),
                reason: format!("{name} is not a finite number"),
            });
        }
    }
    Ok(())
}

/// Parses a bundle JSON array. Missing fields take the same defaults the
/// backend has always used; the secondary strength defaults to the primary.
pub fn parse_bundle(raw: &str) -> Result<Vec<BundleEntry>> {
    let raw_entries: Vec<RawEntry> = serde_json::from_str(raw)?;
    let entries: Vec<BundleEntry> = raw_entries.into_iter().map(BundleEntry::from).collect();
    for entry in &entries {
        validate_entry(entry)?;
    }
    Ok(entries)
}

#[derive(Debug, Default)]
struct LegacySlot {
    selection: Option<String>,
    enabled: Option<bool>,
    strength: Option<f64>,
    trigger_text: Option<String>,
}

/// Slot number from a key like `"Strength 3"`; `words` is how many words
/// precede the number.
fn slot_number(key: &str, words: usize) -> Option<usize> {
    key.split(' ').nth(words)?.parse().ok()
}

/// Converts the flat `"LoRA N"` / `"Enable N"` / `"Strength N"` /
/// `"Trigger Words N"` widget format into bundle entries, in slot order.
/// Malformed keys are ignored and slots without a real selection dropped.
pub fn parse_legacy_slots(values: &Map<String, Value>) -> Vec<BundleEntry> {
    let mut slots: BTreeMap<usize, LegacySlot> = BTreeMap::new();
    for (key, value) in values {
        if key.starts_with("LoRA ") {
            if let (Some(slot), Some(name)) = (slot_number(key, 1), value.as_str()) {
                slots.entry(slot).or_default().selection = Some(name.to_string());
            }
        } else if key.starts_with("Enable ") {
            if let (Some(slot), Some(flag)) = (slot_number(key, 1), value.as_bool()) {
                slots.entry(slot).or_default().enabled = Some(flag);
            }
        } else if key.starts_with("Strength ") {
            let strength = value
                .as_f64()
                .or_else(|| value.as_str().and_then(|raw| raw.trim().parse().ok()));
            if let (Some(slot), Some(strength)) = (slot_number(key, 1), strength) {
                slots.entry(slot).or_default().strength = Some(strength);
            }
        } else if key.starts_with("Trigger Words ") {
            if let Some(slot) = slot_number(key, 2) {
                let text = match value {
                    Value::String(text) => text.clone(),
                    other => other.to_string(),
                };
                slots.entry(slot).or_default().trigger_text = Some(text);
            }
        }
    }

    slots
        .into_values()
        .filter_map(|slot| {
            let selection = slot.selection.filter(|name| !is_none_selection(name))?;
            let strength = slot.strength.unwrap_or(1.0);
            Some(BundleEntry {
                selection,
                enabled: slot.enabled.unwrap_or(true),
                strength_primary: strength,
                strength_secondary: strength,
                trigger_text: slot.trigger_text.unwrap_or_default(),
                tag: DEFAULT_TAG.to_string(),
                auto_populated: false,
            })
        })
        .collect()
}

/// Looks a file up in the catalog: exact match first, then ignoring case.
pub fn resolve_file<'a>(selection: &str, catalog: &'a [String]) -> Option<&'a str> {
    catalog
        .iter()
        .find(|file| file.as_str() == selection)
        .or_else(|| {
            catalog
                .iter()
                .find(|file| file.to_lowercase() == selection.to_lowercase())
        })
        .map(String::as_str)
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SkipReason {
    Disabled,
    NoSelection,
    ZeroStrength,
    NotFound,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedLora {
    /// Catalog file name, which may differ in case from the selection.
    pub file: String,
    pub strength_model: f64,
    pub strength_clip: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedEntry {
    pub selection: String,
    pub reason: SkipReason,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadPlan {
    pub loras: Vec<PlannedLora>,
    pub skipped: Vec<SkippedEntry>,
    pub trigger_words: String,
}

impl LoadPlan {
    pub fn build(entries: &[BundleEntry], catalog: &[String]) -> Self {
        let mut plan = Self::default();
        let mut trigger_words = Vec::new();

        for entry in entries {
            let reason = if is_none_selection(&entry.selection) {
                Some(SkipReason::NoSelection)
            } else if !entry.enabled {
                Some(SkipReason::Disabled)
            } else if entry.strength_primary == 0.0 {
                Some(SkipReason::ZeroStrength)
            } else {
                None
            };
            if let Some(reason) = reason {
                plan.skip(entry, reason);
                continue;
            }

            let Some(file) = resolve_file(&entry.selection, catalog) else {
                plan.skip(entry, SkipReason::NotFound);
                continue;
            };
            plan.loras.push(PlannedLora {
                file: file.to_string(),
                strength_model: entry.strength_primary,
                strength_clip: entry.strength_secondary,
            });
            let words = entry.trigger_text.trim();
            if !words.is_empty() {
                trigger_words.push(words);
            }
        }

        plan.trigger_words = trigger_words.join(DEFAULT_TRIGGER_SEPARATOR);
        plan
    }

    fn skip(&mut self, entry: &BundleEntry, reason: SkipReason) {
        debug!(selection = %entry.selection, ?reason, "skipping bundle entry");
        self.skipped.push(SkippedEntry {
            selection: entry.selection.clone(),
            reason,
        });
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn catalog() -> Vec<String> {
        vec!["Detail.safetensors".to_string(), "style/Ink.safetensors".to_string()]
    }

    fn entry(selection: &str) -> BundleEntry {
        BundleEntry {
            selection: selection.to_string(),
            enabled: true,
            strength_primary: 0.8,
            strength_secondary: 0.6,
            trigger_text: String::new(),
            tag: DEFAULT_TAG.to_string(),
            auto_populated: false,
        }
    }

    #[test]
    fn parse_bundle_accepts_legacy_field_names() {
        let entries = parse_bundle(
            r#"[
                {"lora": "a.safetensors", "strength": 0.5, "triggerWords": "ink"},
                {"selection": "b.safetensors", "strengthPrimary": 0.7, "strengthSecondary": 0.2, "enabled": false}
            ]"#,
        )
        .unwrap();
        assert_eq!(entries[0].selection, "a.safetensors");
        assert_eq!(entries[0].strength_secondary, 0.5);
        assert_eq!(entries[0].trigger_text, "ink");
        assert!(!entries[1].enabled);
        assert_eq!(entries[1].strength_secondary, 0.2);
    }

    #[test]
    fn parse_bundle_rejects_non_arrays() {
        assert!(matches!(
            parse_bundle(r#"{"lora": "a"}"#),
            Err(StackError::MalformedPayload(_))
        ));
    }

    #[test]
    fn validate_rejects_non_finite_strengths() {
        let mut bad = entry("a.safetensors");
        bad.strength_secondary = f64::INFINITY;
        assert!(matches!(
            validate_entry(&bad),
            Err(StackError::InvalidEntry { .. })
        ));
        assert!(validate_entry(&entry("a.safetensors")).is_ok());
    }

    #[test]
    fn legacy_slots_are_ordered_and_filtered() {
        let values = json!({
            "LoRA 2": "b.safetensors",
            "Strength 2": "0.4",
            "LoRA 1": "a.safetensors",
            "Enable 1": false,
            "Trigger Words 1": "ink, wash",
            "LoRA 3": "None",
            "LoRA x": "bogus.safetensors",
            "seed": 5
        });
        let entries = parse_legacy_slots(values.as_object().unwrap());
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].selection, "a.safetensors");
        assert!(!entries[0].enabled);
        assert_eq!(entries[0].trigger_text, "ink, wash");
        assert_eq!(entries[1].strength_primary, 0.4);
        assert_eq!(entries[1].strength_secondary, 0.4);
    }

    #[test]
    fn resolve_prefers_exact_then_case_insensitive() {
        let catalog = vec!["ink.safetensors".to_string(), "Ink.safetensors".to_string()];
        assert_eq!(resolve_file("Ink.safetensors", &catalog), Some("Ink.safetensors"));
        assert_eq!(resolve_file("INK.safetensors", &catalog), Some("ink.safetensors"));
        assert_eq!(resolve_file("missing", &catalog), None);
    }

    #[test]
    fn plan_skips_and_joins_trigger_words() {
        let mut ink = entry("STYLE/ink.safetensors");
        ink.trigger_text = "ink wash".to_string();
        let mut detail = entry("Detail.safetensors");
        detail.trigger_text = " sharp ".to_string();
        let mut disabled = entry("Detail.safetensors");
        disabled.enabled = false;
        let mut zero = entry("Detail.safetensors");
        zero.strength_primary = 0.0;

        let plan = LoadPlan::build(
            &[detail, ink, disabled, zero, entry("None"), entry("gone.safetensors")],
            &catalog(),
        );
        let files: Vec<_> = plan.loras.iter().map(|lora| lora.file.as_str()).collect();
        assert_eq!(files, vec!["Detail.safetensors", "style/Ink.safetensors"]);
        assert_eq!(plan.loras[0].strength_clip, 0.6);
        assert_eq!(plan.trigger_words, "sharp, ink wash");
        let reasons: Vec<_> = plan.skipped.iter().map(|skip| skip.reason).collect();
        assert_eq!(
            reasons,
            vec![
                SkipReason::Disabled,
                SkipReason::ZeroStrength,
                SkipReason::NoSelection,
                SkipReason::NotFound,
            ]
        );
    }
}
