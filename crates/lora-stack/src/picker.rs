//! Request/response contract for the host's picker and prompt overlays.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Correlates an asynchronous host response with the request that caused it.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct RequestToken(u64);

impl RequestToken {
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "req-{}", self.0)
    }
}

#[derive(Debug, Default)]
pub(crate) struct RequestTokens {
    next: u64,
}

impl RequestTokens {
    pub(crate) fn next_token(&mut self) -> RequestToken {
        self.next += 1;
        RequestToken(self.next)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickerItem {
    pub id: String,
    pub label: String,
    pub disabled: bool,
}

impl PickerItem {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            disabled: false,
        }
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PickerConfig {
    pub title: String,
    pub placeholder: String,
    pub items: Vec<PickerItem>,
    pub allow_create: bool,
    pub multi_select: bool,
}

impl PickerConfig {
    pub fn new(title: impl Into<String>, items: Vec<PickerItem>) -> Self {
        Self {
            title: title.into(),
            items,
            ..Self::default()
        }
    }

    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    pub fn allow_create(mut self, allow_create: bool) -> Self {
        self.allow_create = allow_create;
        self
    }

    pub fn multi_select(mut self, multi_select: bool) -> Self {
        self.multi_select = multi_select;
        self
    }

    pub fn item(&self, id: &str) -> Option<&PickerItem> {
        self.items.iter().find(|item| item.id == id)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PickerChoice {
    One(String),
    Many(Vec<String>),
    Cancelled,
}

impl PickerChoice {
    pub fn into_ids(self) -> Vec<String> {
        match self {
            Self::One(id) => vec![id],
            Self::Many(ids) => ids,
            Self::Cancelled => Vec::new(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PromptConfig {
    pub title: String,
    pub initial: String,
    pub placeholder: String,
}

impl PromptConfig {
    pub fn new(title: impl Into<String>, initial: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            initial: initial.into(),
            placeholder: String::new(),
        }
    }

    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }
}
