//! Custom-drawn widgets making up a node: one header, optional tag group
//! banners, and one row per LoRA entry.

mod header;
mod row;
mod tag_group;

use std::cmp::Reverse;

use lora_canvas::{Bounds, PaintContext, Point, Size};

use crate::properties::NodeProperties;
use crate::row::{RowId, RowState, StrengthChannel};

pub use header::{HeaderButton, HeaderWidget};
pub use row::{RowLayout, RowWidget};
pub use tag_group::{TagGroupState, TagGroupWidget};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum WidgetKind {
    Header,
    TagGroup,
    Row,
}

/// Which pointer phase is being dispatched. `Press` is a pointer-down,
/// `Activate` a double click.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Phase {
    Press,
    Activate,
}

/// Named control inside a widget.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum HitTarget {
    HeaderButton(HeaderButton),
    Banner,
    Background,
    Toggle,
    TagGlyph,
    Label,
    TriggerPill,
    StatusDot,
    StepDown(StrengthChannel),
    StepUp(StrengthChannel),
    StrengthValue(StrengthChannel),
    MoveUp,
    MoveDown,
    Remove,
}

/// What a hit area asks the node to do.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    ToggleAll,
    AddLoras,
    SaveTemplate,
    LoadTemplate,
    OpenSettings,
    ToggleCollapse(String),
    ToggleEnabled(RowId),
    ChangeLora(RowId),
    ChangeTag(RowId),
    EditTriggerWords(RowId),
    RefetchTriggerWords(RowId),
    StepStrength {
        row: RowId,
        channel: StrengthChannel,
        steps: i32,
    },
    EditStrength {
        row: RowId,
        channel: StrengthChannel,
    },
    MoveUp(RowId),
    MoveDown(RowId),
    Remove(RowId),
}

/// A prioritized region of a widget. `bounds` is widget-local (`y` is
/// relative to the widget top) and is only set by the latest draw; a
/// control that was not drawn has no bounds and cannot be hit.
#[derive(Clone, Debug, PartialEq)]
pub struct HitArea {
    pub target: HitTarget,
    pub priority: i32,
    pub bounds: Option<Bounds>,
    pub on_press: Option<Command>,
    pub on_activate: Option<Command>,
}

impl HitArea {
    pub fn new(target: HitTarget, priority: i32) -> Self {
        Self {
            target,
            priority,
            bounds: None,
            on_press: None,
            on_activate: None,
        }
    }

    pub fn on_press(mut self, command: Command) -> Self {
        self.on_press = Some(command);
        self
    }

    pub fn on_activate(mut self, command: Command) -> Self {
        self.on_activate = Some(command);
        self
    }

    /// Handler for `phase`, falling back to the other phase's handler.
    pub fn handler(&self, phase: Phase) -> Option<&Command> {
        match phase {
            Phase::Press => self.on_press.as_ref().or(self.on_activate.as_ref()),
            Phase::Activate => self.on_activate.as_ref().or(self.on_press.as_ref()),
        }
    }
}

/// Hit-area table of one widget, kept in descending priority order.
#[derive(Clone, Debug, Default)]
pub struct HitAreas {
    areas: Vec<HitArea>,
}

impl HitAreas {
    pub fn new(mut areas: Vec<HitArea>) -> Self {
        areas.sort_by_key(|area| Reverse(area.priority));
        Self { areas }
    }

    pub fn iter(&self) -> impl Iterator<Item = &HitArea> {
        self.areas.iter()
    }

    pub fn bounds(&self, target: HitTarget) -> Option<Bounds> {
        self.areas
            .iter()
            .find(|area| area.target == target)
            .and_then(|area| area.bounds)
    }

    pub fn set_bounds(&mut self, target: HitTarget, bounds: Option<Bounds>) {
        if let Some(area) = self.areas.iter_mut().find(|area| area.target == target) {
            area.bounds = bounds;
        }
    }

    pub fn clear_bounds(&mut self) {
        for area in &mut self.areas {
            area.bounds = None;
        }
    }

    /// First area, by descending priority, whose bounds contain `local`
    /// and which has a handler for `phase`.
    pub fn resolve(&self, local: Point, phase: Phase) -> Option<(HitTarget, &Command)> {
        self.areas.iter().find_map(|area| {
            let bounds = area.bounds?;
            if !bounds.contains(local) {
                return None;
            }
            area.handler(phase).map(|command| (area.target, command))
        })
    }
}

/// Vertical slot a widget is drawn into. `top` is node-local.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WidgetFrame {
    pub width: f32,
    pub top: f32,
}

/// Node state a widget needs while drawing.
#[derive(Clone, Copy, Debug)]
pub struct DrawEnv<'a> {
    pub properties: &'a NodeProperties,
    pub can_move_up: bool,
    pub can_move_down: bool,
}

impl<'a> DrawEnv<'a> {
    pub fn new(properties: &'a NodeProperties) -> Self {
        Self {
            properties,
            can_move_up: false,
            can_move_down: false,
        }
    }
}

#[derive(Clone, Debug)]
pub enum Widget {
    Header(HeaderWidget),
    TagGroup(TagGroupWidget),
    Row(RowWidget),
}

impl Widget {
    pub fn header() -> Self {
        Self::Header(HeaderWidget::new())
    }

    pub fn row(id: RowId, state: RowState) -> Self {
        Self::Row(RowWidget::new(id, state))
    }

    pub fn tag_group(state: TagGroupState) -> Self {
        Self::TagGroup(TagGroupWidget::new(state))
    }

    pub fn kind(&self) -> WidgetKind {
        match self {
            Self::Header(_) => WidgetKind::Header,
            Self::TagGroup(_) => WidgetKind::TagGroup,
            Self::Row(_) => WidgetKind::Row,
        }
    }

    pub fn compute_size(&self, width: f32) -> Size {
        match self {
            Self::Header(header) => header.compute_size(width),
            Self::TagGroup(group) => group.compute_size(width),
            Self::Row(row) => row.compute_size(width),
        }
    }

    pub fn hit_areas(&self) -> &HitAreas {
        match self {
            Self::Header(header) => &header.areas,
            Self::TagGroup(group) => &group.areas,
            Self::Row(row) => &row.areas,
        }
    }

    pub fn draw(&mut self, cx: &mut PaintContext, frame: WidgetFrame, env: &DrawEnv<'_>) {
        match self {
            Self::Header(header) => header.draw(cx, frame),
            Self::TagGroup(group) => group.draw(cx, frame),
            Self::Row(row) => row.draw(cx, frame, env),
        }
    }

    pub fn as_row(&self) -> Option<&RowWidget> {
        match self {
            Self::Row(row) => Some(row),
            _ => None,
        }
    }

    pub fn as_row_mut(&mut self) -> Option<&mut RowWidget> {
        match self {
            Self::Row(row) => Some(row),
            _ => None,
        }
    }

    pub fn as_tag_group(&self) -> Option<&TagGroupWidget> {
        match self {
            Self::TagGroup(group) => Some(group),
            _ => None,
        }
    }

    pub fn as_tag_group_mut(&mut self) -> Option<&mut TagGroupWidget> {
        match self {
            Self::TagGroup(group) => Some(group),
            _ => None,
        }
    }
}

/// Value equality: row ids, hit-area bounds and derived member counts are
/// runtime artifacts and do not take part.
impl PartialEq for Widget {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Header(_), Self::Header(_)) => true,
            (Self::TagGroup(a), Self::TagGroup(b)) => a.state == b.state,
            (Self::Row(a), Self::Row(b)) => a.state == b.state,
            _ => false,
        }
    }
}
