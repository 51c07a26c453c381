//! In-memory [`StackHost`] that records every request instead of opening
//! dialogs or touching the network.
//!
//! This is the public headless host: the `lora-stack` CLI lays saved nodes
//! out through it, and integration tests use it to answer pickers, prompts
//! and lookups by token. Catalog and template lookups are served from the
//! `catalog` and `templates` fields.

use std::collections::BTreeMap;

use lora_canvas::Size;

use crate::bundle::BundleEntry;
use crate::host::{LookupError, Notice, StackHost};
use crate::picker::{PickerConfig, PromptConfig, RequestToken};

#[derive(Debug, Default)]
pub struct RecordingHost {
    pub catalog: Vec<String>,
    pub templates: BTreeMap<String, Vec<BundleEntry>>,
    pub fail_saves: bool,

    pub pickers: Vec<(RequestToken, PickerConfig)>,
    pub prompts: Vec<(RequestToken, PromptConfig)>,
    pub trigger_requests: Vec<(RequestToken, String)>,
    pub template_requests: Vec<(RequestToken, String)>,
    pub saved: Vec<(String, Vec<BundleEntry>)>,
    pub notices: Vec<Notice>,
    pub redraws: Vec<(bool, bool)>,
    pub sizes: Vec<Size>,
}

impl RecordingHost {
    pub fn with_catalog<S: AsRef<str>>(files: &[S]) -> Self {
        Self {
            catalog: files.iter().map(|file| file.as_ref().to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn last_picker(&self) -> Option<&(RequestToken, PickerConfig)> {
        self.pickers.last()
    }

    pub fn last_prompt(&self) -> Option<&(RequestToken, PromptConfig)> {
        self.prompts.last()
    }

    pub fn last_trigger_request(&self) -> Option<&(RequestToken, String)> {
        self.trigger_requests.last()
    }

    pub fn last_template_request(&self) -> Option<&(RequestToken, String)> {
        self.template_requests.last()
    }
}

impl StackHost for RecordingHost {
    fn show_picker(&mut self, token: RequestToken, config: PickerConfig) {
        self.pickers.push((token, config));
    }

    fn prompt_text(&mut self, token: RequestToken, config: PromptConfig) {
        self.prompts.push((token, config));
    }

    fn fetch_trigger_words(&mut self, token: RequestToken, selection: &str) {
        self.trigger_requests.push((token, selection.to_string()));
    }

    fn load_template(&mut self, token: RequestToken, name: &str) {
        self.template_requests.push((token, name.to_string()));
    }

    fn save_template(&mut self, name: &str, entries: &[BundleEntry]) -> Result<(), LookupError> {
        if self.fail_saves {
            return Err(LookupError::Failed("storage unavailable".to_string()));
        }
        self.saved.push((name.to_string(), entries.to_vec()));
        self.templates.insert(name.to_string(), entries.to_vec());
        Ok(())
    }

    fn template_names(&self) -> Vec<String> {
        self.templates.keys().cloned().collect()
    }

    fn lora_catalog(&self) -> Vec<String> {
        self.catalog.clone()
    }

    fn notify(&mut self, notice: Notice) {
        self.notices.push(notice);
    }

    fn request_redraw(&mut self, foreground: bool, background: bool) {
        self.redraws.push((foreground, background));
    }

    fn resize(&mut self, size: Size) {
        self.sizes.push(size);
    }
}
