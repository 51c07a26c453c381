use serde::{Deserialize, Serialize};

/// Per-node feature toggles, persisted with the node.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NodeProperties {
    pub enable_tags: bool,
    pub separate_strengths: bool,
    pub auto_fetch_trigger_words: bool,
    pub show_trigger_words: bool,
    pub show_move_arrows: bool,
    pub show_strength_buttons: bool,
    pub show_remove_button: bool,
}

impl Default for NodeProperties {
    fn default() -> Self {
        Self {
            enable_tags: false,
            separate_strengths: false,
            auto_fetch_trigger_words: true,
            show_trigger_words: true,
            show_move_arrows: true,
            show_strength_buttons: true,
            show_remove_button: true,
        }
    }
}

impl NodeProperties {
    pub fn get(&self, toggle: PropertyToggle) -> bool {
        match toggle {
            PropertyToggle::EnableTags => self.enable_tags,
            PropertyToggle::SeparateStrengths => self.separate_strengths,
            PropertyToggle::AutoFetchTriggerWords => self.auto_fetch_trigger_words,
            PropertyToggle::ShowTriggerWords => self.show_trigger_words,
            PropertyToggle::ShowMoveArrows => self.show_move_arrows,
            PropertyToggle::ShowStrengthButtons => self.show_strength_buttons,
            PropertyToggle::ShowRemoveButton => self.show_remove_button,
        }
    }

    pub fn set(&mut self, toggle: PropertyToggle, value: bool) {
        let slot = match toggle {
            PropertyToggle::EnableTags => &mut self.enable_tags,
            PropertyToggle::SeparateStrengths => &mut self.separate_strengths,
            PropertyToggle::AutoFetchTriggerWords => &mut self.auto_fetch_trigger_words,
            PropertyToggle::ShowTriggerWords => &mut self.show_trigger_words,
            PropertyToggle::ShowMoveArrows => &mut self.show_move_arrows,
            PropertyToggle::ShowStrengthButtons => &mut self.show_strength_buttons,
            PropertyToggle::ShowRemoveButton => &mut self.show_remove_button,
        };
        *slot = value;
    }
}

/// Node properties that can be flipped from the settings picker.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum PropertyToggle {
    EnableTags,
    SeparateStrengths,
    AutoFetchTriggerWords,
    ShowTriggerWords,
    ShowMoveArrows,
    ShowStrengthButtons,
    ShowRemoveButton,
}

impl PropertyToggle {
    pub const ALL: [PropertyToggle; 7] = [
        PropertyToggle::EnableTags,
        PropertyToggle::SeparateStrengths,
        PropertyToggle::AutoFetchTriggerWords,
        PropertyToggle::ShowTriggerWords,
        PropertyToggle::ShowMoveArrows,
        PropertyToggle::ShowStrengthButtons,
        PropertyToggle::ShowRemoveButton,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Self::EnableTags => "enableTags",
            Self::SeparateStrengths => "separateStrengths",
            Self::AutoFetchTriggerWords => "autoFetchTriggerWords",
            Self::ShowTriggerWords => "showTriggerWords",
            Self::ShowMoveArrows => "showMoveArrows",
            Self::ShowStrengthButtons => "showStrengthButtons",
            Self::ShowRemoveButton => "showRemoveButton",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::EnableTags => "Tag groups",
            Self::SeparateStrengths => "Separate model/CLIP strengths",
            Self::AutoFetchTriggerWords => "Auto-fetch trigger words",
            Self::ShowTriggerWords => "Trigger words column",
            Self::ShowMoveArrows => "Move arrows",
            Self::ShowStrengthButtons => "Strength buttons",
            Self::ShowRemoveButton => "Remove button",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|toggle| toggle.id() == id)
    }
}
