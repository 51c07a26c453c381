//! The node entry points a host editor calls.
//!
//! `StackNode` owns all widget state. The host forwards lifecycle and
//! pointer events, and answers picker, prompt and lookup requests later by
//! calling the matching `resolve_*` method with the request token. Nothing
//! here returns an error or panics across the event boundary: broken
//! invariants and stale responses end in a logged no-op.

use std::collections::HashMap;

use lora_canvas::{Bounds, InputEvent, MouseButton, PaintContext, Point, Quad, Size, theme};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::bundle::{BundleEntry, execution_bundle};
use crate::config::StackConfig;
use crate::constants::DEFAULT_TAG;
use crate::host::{LookupError, Notice, StackHost};
use crate::hit_test;
use crate::layout::{compute_content_height, visible_widgets};
use crate::list::WidgetList;
use crate::picker::{
    PickerChoice, PickerConfig, PickerItem, PromptConfig, RequestToken, RequestTokens,
};
use crate::properties::{NodeProperties, PropertyToggle};
use crate::row::{RowId, RowIds, RowState, StrengthChannel, is_none_selection};
use crate::serialization::{self, SaveSnapshot};
use crate::tags::{self, MoveDirection, sorted_tags};
use crate::widgets::{Command, DrawEnv, Phase, WidgetFrame};

#[derive(Clone, Debug, PartialEq)]
enum PendingRequest {
    AddLoras,
    ReplaceLora(RowId),
    RetagRow(RowId),
    Settings,
    ChooseTemplate,
    TemplateContents { name: String },
    SaveTemplateName,
    EditTriggerWords(RowId),
    EditStrength { row: RowId, channel: StrengthChannel },
    TriggerWords { row: RowId, selection: String, overwrite: bool },
}

#[derive(Debug)]
pub struct StackNode {
    config: StackConfig,
    properties: NodeProperties,
    widgets: WidgetList,
    ids: RowIds,
    tokens: RequestTokens,
    pending: HashMap<RequestToken, PendingRequest>,
    size: Size,
}

impl StackNode {
    pub fn new(config: StackConfig) -> Self {
        let size = Size::new(config.layout.min_width, config.layout.min_height);
        Self {
            properties: config.defaults.clone(),
            config,
            widgets: WidgetList::new(),
            ids: RowIds::default(),
            tokens: RequestTokens::default(),
            pending: HashMap::new(),
            size,
        }
    }

    pub fn config(&self) -> &StackConfig {
        &self.config
    }

    pub fn properties(&self) -> &NodeProperties {
        &self.properties
    }

    pub fn widgets(&self) -> &WidgetList {
        &self.widgets
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn tagging(&self) -> bool {
        self.properties.enable_tags
    }

    pub fn pending_requests(&self) -> usize {
        self.pending.len()
    }

    pub fn row(&self, id: RowId) -> Option<&RowState> {
        self.widgets.row(id).map(|row| &row.state)
    }

    pub fn row_ids(&self) -> Vec<RowId> {
        self.widgets.rows().map(|row| row.id).collect()
    }

    pub fn bundle(&self) -> Vec<BundleEntry> {
        execution_bundle(self.widgets.row_states())
    }

    pub fn content_height(&self) -> f32 {
        compute_content_height(
            self.widgets.widgets(),
            self.tagging(),
            self.size.width,
            self.config.layout.min_height,
        )
    }

    // Lifecycle

    pub fn on_create(&mut self, host: &mut impl StackHost) {
        self.widgets.organize(self.tagging());
        self.commit(host);
    }

    /// Restores from a persisted payload. A missing or malformed payload
    /// resets to a lone header.
    pub fn on_configure(&mut self, host: &mut impl StackHost, payload: Option<&Value>) {
        let (properties, widgets) =
            serialization::deserialize(payload, &self.config.defaults, &mut self.ids);
        self.properties = properties;
        self.widgets = widgets;
        self.pending.clear();
        self.widgets.organize(self.tagging());
        self.commit(host);
    }

    pub fn on_serialize(&self) -> SaveSnapshot {
        serialization::snapshot(&self.properties, &self.widgets)
    }

    /// Paints every visible widget and refreshes their hit-area bounds.
    pub fn on_draw(&mut self, cx: &mut PaintContext) {
        let width = self.size.width;
        let tagging = self.tagging();
        cx.scene.draw_quad(
            Quad::new(Bounds::new(0.0, 0.0, width, self.size.height))
                .with_background(theme::bg::NODE)
                .with_corner_radius(6.0),
        );

        let visible = visible_widgets(self.widgets.widgets(), tagging, width);
        let moves: Vec<_> = visible
            .iter()
            .map(|v| tags::move_availability(self.widgets.widgets(), v.index, tagging))
            .collect();
        let properties = &self.properties;
        let widgets = self.widgets.widgets_mut();
        for (visible, moves) in visible.iter().zip(moves) {
            let env = DrawEnv {
                properties,
                can_move_up: moves.up,
                can_move_down: moves.down,
            };
            if let Some(widget) = widgets.get_mut(visible.index) {
                cx.scene
                    .set_layer(u32::try_from(visible.index).unwrap_or(u32::MAX));
                widget.draw(
                    cx,
                    WidgetFrame {
                        width,
                        top: visible.top,
                    },
                    &env,
                );
            }
        }
        cx.scene.set_layer(0);
    }

    /// Left press dispatches `Press`, a double click `Activate`. Returns
    /// whether the node consumed the event.
    pub fn on_pointer_down(&mut self, host: &mut impl StackHost, event: &InputEvent) -> bool {
        match *event {
            InputEvent::MouseDown {
                button: MouseButton::Left,
                x,
                y,
                ..
            } => self.dispatch(host, Point::new(x, y), Phase::Press),
            InputEvent::DoubleClick { x, y } => {
                self.dispatch(host, Point::new(x, y), Phase::Activate)
            }
            _ => false,
        }
    }

    pub fn on_activate(&mut self, host: &mut impl StackHost, position: Point) -> bool {
        self.dispatch(host, position, Phase::Activate)
    }

    /// User resize from the host. Width never drops below the configured
    /// minimum; height always follows the content.
    pub fn on_resize(&mut self, host: &mut impl StackHost, size: Size) {
        self.size.width = size.width.max(self.config.layout.min_width);
        self.auto_resize(host);
    }

    pub fn dispatch(&mut self, host: &mut impl StackHost, position: Point, phase: Phase) -> bool {
        let hit = hit_test::resolve(
            self.widgets.widgets(),
            self.tagging(),
            self.size.width,
            position,
            phase,
        );
        let Some(hit) = hit else {
            return false;
        };
        debug!(target_area = ?hit.target, index = hit.index, "dispatching hit");
        self.execute(host, hit.command);
        true
    }

    /// Runs a command as if its control had been pressed.
    pub fn execute(&mut self, host: &mut impl StackHost, command: Command) {
        match command {
            Command::ToggleAll => {
                let any_enabled = self.widgets.row_states().any(|row| row.enabled);
                for row in self.widgets.rows_mut() {
                    row.state.enabled = !any_enabled;
                }
                self.commit(host);
            }
            Command::AddLoras => self.open_add_picker(host),
            Command::SaveTemplate => {
                if self.bundle().is_empty() {
                    host.notify(Notice::warning("Nothing to save: the stack is empty"));
                    return;
                }
                let token = self.request(PendingRequest::SaveTemplateName);
                host.prompt_text(
                    token,
                    PromptConfig::new("Save LoRA set", "").placeholder("Set name"),
                );
            }
            Command::LoadTemplate => {
                let names = host.template_names();
                if names.is_empty() {
                    host.notify(Notice::info("No saved LoRA sets"));
                    return;
                }
                let items = names
                    .into_iter()
                    .map(|name| PickerItem::new(name.clone(), name))
                    .collect();
                let token = self.request(PendingRequest::ChooseTemplate);
                host.show_picker(
                    token,
                    PickerConfig::new("Load LoRA set", items).placeholder("Search sets"),
                );
            }
            Command::OpenSettings => {
                let items = PropertyToggle::ALL
                    .into_iter()
                    .map(|toggle| {
                        let mark = if self.properties.get(toggle) { "[x]" } else { "[ ]" };
                        PickerItem::new(toggle.id(), format!("{mark} {}", toggle.label()))
                    })
                    .collect();
                let token = self.request(PendingRequest::Settings);
                host.show_picker(token, PickerConfig::new("Node settings", items));
            }
            Command::ToggleCollapse(tag) => {
                if let Some(group) = self.widgets.tag_group_mut(&tag) {
                    group.toggle_collapsed();
                    self.commit(host);
                }
            }
            Command::ToggleEnabled(id) => {
                if let Some(row) = self.widgets.row_mut(id) {
                    row.state.enabled = !row.state.enabled;
                    self.commit(host);
                }
            }
            Command::ChangeLora(id) => self.open_replace_picker(host, id),
            Command::ChangeTag(id) => self.open_tag_picker(host, id),
            Command::EditTriggerWords(id) => {
                let Some(row) = self.widgets.row(id) else {
                    return;
                };
                let initial = row.state.trigger_text.clone();
                let token = self.request(PendingRequest::EditTriggerWords(id));
                host.prompt_text(
                    token,
                    PromptConfig::new("Trigger words", initial).placeholder("word, word"),
                );
            }
            Command::RefetchTriggerWords(id) => self.request_trigger_words(host, id, true),
            Command::StepStrength { row, channel, steps } => {
                let separate = self.properties.separate_strengths;
                let stepped = self
                    .widgets
                    .row_mut(row)
                    .is_some_and(|widget| widget.state.step_strength(channel, steps, separate));
                if stepped {
                    self.commit(host);
                }
            }
            Command::EditStrength { row, channel } => {
                let Some(widget) = self.widgets.row(row) else {
                    return;
                };
                let initial = format!("{:.2}", widget.state.strength(channel));
                let token = self.request(PendingRequest::EditStrength { row, channel });
                host.prompt_text(token, PromptConfig::new("Strength", initial));
            }
            Command::MoveUp(id) => self.move_row(host, id, MoveDirection::Up),
            Command::MoveDown(id) => self.move_row(host, id, MoveDirection::Down),
            Command::Remove(id) => {
                if self.widgets.remove_row(id).is_some() {
                    self.widgets.organize(self.tagging());
                    self.commit(host);
                }
            }
        }
    }

    // Collaborator responses

    pub fn resolve_picker(
        &mut self,
        host: &mut impl StackHost,
        token: RequestToken,
        choice: PickerChoice,
    ) {
        let Some(pending) = self.take_pending(token) else {
            return;
        };
        if choice == PickerChoice::Cancelled {
            debug!(%token, "picker cancelled");
            return;
        }
        let ids = choice.into_ids();
        match pending {
            PendingRequest::AddLoras => {
                self.add_loras(host, &ids);
            }
            PendingRequest::ReplaceLora(row) => {
                if let Some(selection) = ids.first() {
                    self.replace_lora(host, row, selection);
                }
            }
            PendingRequest::RetagRow(row) => {
                let Some(tag) = ids.first() else {
                    return;
                };
                let Some(widget) = self.widgets.row_mut(row) else {
                    debug!(%row, "retag target no longer present");
                    return;
                };
                widget.state.set_tag(tag);
                self.widgets.organize(self.tagging());
                self.commit(host);
            }
            PendingRequest::Settings => {
                for id in &ids {
                    if let Some(toggle) = PropertyToggle::from_id(id) {
                        let current = self.properties.get(toggle);
                        self.set_property(host, toggle, !current);
                    }
                }
            }
            PendingRequest::ChooseTemplate => {
                if let Some(name) = ids.into_iter().next() {
                    let token = self.request(PendingRequest::TemplateContents { name: name.clone() });
                    host.load_template(token, &name);
                }
            }
            other => debug!(%token, request = ?other, "picker answer for a non-picker request"),
        }
    }

    /// `None` means the prompt was dismissed.
    pub fn resolve_prompt(
        &mut self,
        host: &mut impl StackHost,
        token: RequestToken,
        value: Option<String>,
    ) {
        let Some(pending) = self.take_pending(token) else {
            return;
        };
        let Some(value) = value else {
            return;
        };
        match pending {
            PendingRequest::SaveTemplateName => self.save_template(host, value.trim()),
            PendingRequest::EditTriggerWords(row) => {
                if let Some(widget) = self.widgets.row_mut(row) {
                    widget.state.set_user_trigger_text(&value);
                    self.commit(host);
                }
            }
            PendingRequest::EditStrength { row, channel } => {
                let separate = self.properties.separate_strengths;
                let Some(widget) = self.widgets.row_mut(row) else {
                    return;
                };
                let accepted = value
                    .trim()
                    .parse::<f64>()
                    .is_ok_and(|parsed| widget.state.set_strength(channel, parsed, separate));
                if accepted {
                    self.commit(host);
                } else {
                    host.notify(Notice::warning(format!("'{}' is not a valid strength", value.trim())));
                }
            }
            other => debug!(%token, request = ?other, "prompt answer for a non-prompt request"),
        }
    }

    pub fn resolve_trigger_words(
        &mut self,
        host: &mut impl StackHost,
        token: RequestToken,
        result: Result<Vec<String>, LookupError>,
    ) {
        let Some(pending) = self.take_pending(token) else {
            return;
        };
        let PendingRequest::TriggerWords {
            row,
            selection,
            overwrite,
        } = pending
        else {
            debug!(%token, "trigger words for a different request");
            return;
        };
        let Some(widget) = self.widgets.row_mut(row) else {
            debug!(%row, "dropping trigger words for a removed row");
            return;
        };
        if widget.state.selection != selection {
            debug!(%row, %selection, "dropping trigger words for a replaced selection");
            return;
        }

        match result {
            Ok(words) => {
                let limits = &self.config.trigger_words;
                widget.state.apply_fetched_trigger_words(
                    &words,
                    limits.max_words,
                    &limits.separator,
                    overwrite,
                );
            }
            Err(error) => {
                widget.state.fetch_attempted = true;
                warn!(%row, %selection, %error, "trigger word lookup failed");
                host.notify(Notice::warning(format!(
                    "Could not fetch trigger words for {selection}"
                )));
            }
        }
        self.commit(host);
    }

    pub fn resolve_template(
        &mut self,
        host: &mut impl StackHost,
        token: RequestToken,
        result: Result<Vec<BundleEntry>, LookupError>,
    ) {
        let Some(pending) = self.take_pending(token) else {
            return;
        };
        let PendingRequest::TemplateContents { name } = pending else {
            debug!(%token, "template contents for a different request");
            return;
        };
        let entries = match result {
            Ok(entries) => entries,
            Err(error) => {
                warn!(template = %name, %error, "failed to load LoRA set");
                host.notify(Notice::error(format!("Could not load set '{name}'")));
                return;
            }
        };

        self.widgets.clear_rows();
        let mut loaded = 0usize;
        for entry in &entries {
            if is_none_selection(&entry.selection)
                || self.widgets.contains_selection(&entry.selection, None)
            {
                continue;
            }
            let mut state = entry.to_row_state();
            state.normalize(self.properties.separate_strengths);
            let id = self.ids.next_id();
            self.widgets.push_row(id, state);
            loaded += 1;
        }
        self.widgets.organize(self.tagging());
        info!(template = %name, rows = loaded, "loaded LoRA set");
        self.commit(host);
    }

    // Mutators shared by commands and responses

    /// Adds one row per new selection. Duplicates of live rows (or of an
    /// earlier id in the same batch) are rejected with a notice. Returns
    /// the ids of the added rows.
    pub fn add_loras(&mut self, host: &mut impl StackHost, selections: &[String]) -> Vec<RowId> {
        let mut added = Vec::new();
        for selection in selections {
            if is_none_selection(selection) {
                continue;
            }
            if self.widgets.contains_selection(selection, None) {
                info!(%selection, "rejecting duplicate LoRA");
                host.notify(Notice::info(format!("{selection} is already in the stack")));
                continue;
            }
            let id = self.ids.next_id();
            self.widgets.push_row(id, RowState::new(selection.clone()));
            added.push(id);
        }
        if added.is_empty() {
            return added;
        }
        self.widgets.organize(self.tagging());
        self.commit(host);
        for id in &added {
            self.auto_fetch(host, *id);
        }
        added
    }

    pub fn set_property(&mut self, host: &mut impl StackHost, toggle: PropertyToggle, value: bool) {
        if self.properties.get(toggle) == value {
            return;
        }
        self.properties.set(toggle, value);
        match toggle {
            PropertyToggle::SeparateStrengths => {
                for row in self.widgets.rows_mut() {
                    row.state.sync_secondary();
                }
            }
            PropertyToggle::EnableTags => self.widgets.organize(value),
            _ => {}
        }
        debug!(property = toggle.id(), value, "node property changed");
        self.commit(host);
    }

    fn replace_lora(&mut self, host: &mut impl StackHost, row: RowId, selection: &str) {
        if self.widgets.contains_selection(selection, Some(row)) {
            info!(%selection, "rejecting duplicate LoRA");
            host.notify(Notice::info(format!("{selection} is already in the stack")));
            return;
        }
        let Some(widget) = self.widgets.row_mut(row) else {
            debug!(%row, "replace target no longer present");
            return;
        };
        widget.state.replace_selection(selection);
        self.commit(host);
        self.auto_fetch(host, row);
    }

    fn move_row(&mut self, host: &mut impl StackHost, row: RowId, direction: MoveDirection) {
        if self.widgets.move_row(row, direction, self.tagging()) {
            self.commit(host);
        } else {
            debug!(%row, ?direction, "move at group boundary ignored");
        }
    }

    fn save_template(&mut self, host: &mut impl StackHost, name: &str) {
        if name.is_empty() {
            host.notify(Notice::warning("A set needs a name"));
            return;
        }
        let entries = self.bundle();
        match host.save_template(name, &entries) {
            Ok(()) => {
                info!(template = %name, rows = entries.len(), "saved LoRA set");
                host.notify(Notice::info(format!("Saved set '{name}'")));
            }
            Err(error) => {
                warn!(template = %name, %error, "failed to save LoRA set");
                host.notify(Notice::error(format!("Could not save set '{name}'")));
            }
        }
    }

    fn open_add_picker(&mut self, host: &mut impl StackHost) {
        let catalog = host.lora_catalog();
        if catalog.is_empty() {
            host.notify(Notice::info("No LoRA files available"));
            return;
        }
        let items = catalog
            .into_iter()
            .map(|file| {
                let present = self.widgets.contains_selection(&file, None);
                PickerItem::new(file.clone(), file).disabled(present)
            })
            .collect();
        let token = self.request(PendingRequest::AddLoras);
        host.show_picker(
            token,
            PickerConfig::new("Add LoRAs", items)
                .placeholder("Search LoRAs")
                .multi_select(true),
        );
    }

    fn open_replace_picker(&mut self, host: &mut impl StackHost, row: RowId) {
        if self.widgets.row(row).is_none() {
            return;
        }
        let items = host
            .lora_catalog()
            .into_iter()
            .map(|file| {
                let taken = self.widgets.contains_selection(&file, Some(row));
                PickerItem::new(file.clone(), file).disabled(taken)
            })
            .collect();
        let token = self.request(PendingRequest::ReplaceLora(row));
        host.show_picker(
            token,
            PickerConfig::new("Replace LoRA", items).placeholder("Search LoRAs"),
        );
    }

    fn open_tag_picker(&mut self, host: &mut impl StackHost, row: RowId) {
        if !self.tagging() || self.widgets.row(row).is_none() {
            return;
        }
        let tags = sorted_tags(
            self.widgets
                .row_states()
                .map(|state| state.tag.as_str())
                .chain([DEFAULT_TAG]),
        );
        let items = tags
            .into_iter()
            .map(|tag| PickerItem::new(tag.clone(), tag))
            .collect();
        let token = self.request(PendingRequest::RetagRow(row));
        host.show_picker(
            token,
            PickerConfig::new("Set tag", items)
                .placeholder("Tag name")
                .allow_create(true),
        );
    }

    fn auto_fetch(&mut self, host: &mut impl StackHost, row: RowId) {
        if !self.properties.auto_fetch_trigger_words {
            return;
        }
        let needs_words = self
            .widgets
            .row(row)
            .is_some_and(|widget| widget.state.trigger_text.trim().is_empty());
        if needs_words {
            self.request_trigger_words(host, row, false);
        }
    }

    fn request_trigger_words(&mut self, host: &mut impl StackHost, row: RowId, overwrite: bool) {
        let Some(widget) = self.widgets.row(row) else {
            return;
        };
        if !widget.state.has_selection() {
            return;
        }
        let selection = widget.state.selection.clone();
        let token = self.request(PendingRequest::TriggerWords {
            row,
            selection: selection.clone(),
            overwrite,
        });
        host.fetch_trigger_words(token, &selection);
    }

    fn request(&mut self, pending: PendingRequest) -> RequestToken {
        let token = self.tokens.next_token();
        self.pending.insert(token, pending);
        token
    }

    fn take_pending(&mut self, token: RequestToken) -> Option<PendingRequest> {
        let pending = self.pending.remove(&token);
        if pending.is_none() {
            debug!(%token, "dropping response for unknown request");
        }
        pending
    }

    fn commit(&mut self, host: &mut impl StackHost) {
        host.request_redraw(true, true);
        self.auto_resize(host);
    }

    fn auto_resize(&mut self, host: &mut impl StackHost) {
        let size = Size::new(
            self.size.width.max(self.config.layout.min_width),
            self.content_height(),
        );
        if size != self.size {
            self.size = size;
            host.resize(size);
        }
    }
}
