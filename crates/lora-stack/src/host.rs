use lora_canvas::Size;
use thiserror::Error;

use crate::bundle::BundleEntry;
use crate::picker::{PickerConfig, PromptConfig, RequestToken};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// Transient, non-blocking message for the user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// Failure reported by a host collaborator.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum LookupError {
    #[error("{0} not found")]
    NotFound(String),
    #[error("lookup failed: {0}")]
    Failed(String),
}

/// Services the host editor provides to a node. Calls that take a token are
/// answered later through the matching `StackNode::resolve_*` method.
pub trait StackHost {
    fn show_picker(&mut self, token: RequestToken, config: PickerConfig);

    fn prompt_text(&mut self, token: RequestToken, config: PromptConfig);

    fn fetch_trigger_words(&mut self, token: RequestToken, selection: &str);

    fn load_template(&mut self, token: RequestToken, name: &str);

    fn save_template(&mut self, name: &str, entries: &[BundleEntry]) -> Result<(), LookupError>;

    fn template_names(&self) -> Vec<String>;

    fn lora_catalog(&self) -> Vec<String>;

    fn notify(&mut self, notice: Notice);

    fn request_redraw(&mut self, foreground: bool, background: bool);

    fn resize(&mut self, size: Size);
}
