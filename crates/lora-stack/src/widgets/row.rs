use lora_canvas::theme;
use lora_canvas::{Bounds, Hsla, PaintContext, Point, Quad, Size};

use super::{Command, DrawEnv, HitArea, HitAreas, HitTarget, WidgetFrame};
use crate::constants::{
    CONTROL_GAP, CONTROL_HEIGHT, LABEL_MIN_WIDTH, MOVE_ARROW_WIDTH, NODE_MARGIN_X,
    PRIORITY_BACKGROUND, PRIORITY_LABEL, PRIORITY_MOVE, PRIORITY_REMOVE, PRIORITY_STATUS_DOT,
    PRIORITY_STEPPER, PRIORITY_TAG_GLYPH, PRIORITY_TOGGLE, PRIORITY_TRIGGER, REMOVE_WIDTH,
    ROW_HEIGHT, ROW_PADDING, STATUS_DOT_HIT_WIDTH, STATUS_DOT_SIZE, STEPPER_ARROW_WIDTH,
    STEPPER_VALUE_WIDTH, TAG_GLYPH_WIDTH, TOGGLE_SIZE, TRIGGER_MAX_WIDTH, TRIGGER_MIN_WIDTH,
    TRIGGER_SHARE,
};
use crate::properties::NodeProperties;
use crate::row::{RowId, RowState, StrengthChannel, TriggerStatus};

/// Strength control for one channel: `-`, value, `+`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepperLayout {
    pub channel: StrengthChannel,
    pub down: Option<Bounds>,
    pub value: Bounds,
    pub up: Option<Bounds>,
}

/// Widget-local control bounds of a row for a given width and feature set.
#[derive(Clone, Debug, PartialEq)]
pub struct RowLayout {
    pub background: Bounds,
    pub toggle: Bounds,
    pub tag_glyph: Option<Bounds>,
    pub label: Bounds,
    pub trigger: Option<Bounds>,
    pub status_dot: Option<Bounds>,
    pub steppers: Vec<StepperLayout>,
    pub move_up: Option<Bounds>,
    pub move_down: Option<Bounds>,
    pub remove: Option<Bounds>,
}

impl RowLayout {
    /// Packs controls right to left; the label takes whatever is left.
    pub fn compute(width: f32, properties: &NodeProperties) -> Self {
        let control_y = (ROW_HEIGHT - CONTROL_HEIGHT) * 0.5;
        let background = Bounds::new(
            NODE_MARGIN_X,
            0.0,
            (width - NODE_MARGIN_X * 2.0).max(0.0),
            ROW_HEIGHT,
        );
        let mut right = background.max_x() - ROW_PADDING;

        let remove = properties.show_remove_button.then(|| {
            let bounds = Bounds::new(right - REMOVE_WIDTH, control_y, REMOVE_WIDTH, CONTROL_HEIGHT);
            right = bounds.min_x() - CONTROL_GAP;
            bounds
        });

        let mut channels = vec![StrengthChannel::Primary];
        if properties.separate_strengths {
            channels.push(StrengthChannel::Secondary);
        }
        // Secondary sits right of primary, so it is packed first.
        let mut steppers = Vec::with_capacity(channels.len());
        for channel in channels.into_iter().rev() {
            let arrows = properties.show_strength_buttons;
            let up = arrows.then(|| {
                let bounds = Bounds::new(
                    right - STEPPER_ARROW_WIDTH,
                    control_y,
                    STEPPER_ARROW_WIDTH,
                    CONTROL_HEIGHT,
                );
                right = bounds.min_x();
                bounds
            });
            let value = Bounds::new(
                right - STEPPER_VALUE_WIDTH,
                control_y,
                STEPPER_VALUE_WIDTH,
                CONTROL_HEIGHT,
            );
            right = value.min_x();
            let down = arrows.then(|| {
                let bounds = Bounds::new(
                    right - STEPPER_ARROW_WIDTH,
                    control_y,
                    STEPPER_ARROW_WIDTH,
                    CONTROL_HEIGHT,
                );
                right = bounds.min_x();
                bounds
            });
            right -= CONTROL_GAP;
            steppers.push(StepperLayout {
                channel,
                down,
                value,
                up,
            });
        }
        steppers.reverse();

        let (move_up, move_down) = if properties.show_move_arrows {
            let down = Bounds::new(
                right - MOVE_ARROW_WIDTH,
                control_y,
                MOVE_ARROW_WIDTH,
                CONTROL_HEIGHT,
            );
            let up = Bounds::new(
                down.min_x() - MOVE_ARROW_WIDTH,
                control_y,
                MOVE_ARROW_WIDTH,
                CONTROL_HEIGHT,
            );
            right = up.min_x() - CONTROL_GAP;
            (Some(up), Some(down))
        } else {
            (None, None)
        };

        let mut left = background.min_x() + ROW_PADDING;
        let toggle = Bounds::new(left, (ROW_HEIGHT - TOGGLE_SIZE) * 0.5, TOGGLE_SIZE, TOGGLE_SIZE);
        left = toggle.max_x() + CONTROL_GAP;
        let tag_glyph = properties.enable_tags.then(|| {
            let bounds = Bounds::new(left, control_y, TAG_GLYPH_WIDTH, CONTROL_HEIGHT);
            left = bounds.max_x() + CONTROL_GAP;
            bounds
        });

        let remaining = (right - left).max(0.0);
        let trigger_width = if properties.show_trigger_words {
            let preferred = (remaining * TRIGGER_SHARE).clamp(TRIGGER_MIN_WIDTH, TRIGGER_MAX_WIDTH);
            let room = remaining - LABEL_MIN_WIDTH - CONTROL_GAP;
            let width = preferred.min(room);
            (width >= TRIGGER_MIN_WIDTH).then_some(width)
        } else {
            None
        };
        let trigger = trigger_width.map(|width| {
            let bounds = Bounds::new(right - width, control_y, width, CONTROL_HEIGHT);
            right = bounds.min_x() - CONTROL_GAP;
            bounds
        });
        let status_dot = trigger.map(|pill| {
            Bounds::new(pill.min_x(), control_y, STATUS_DOT_HIT_WIDTH, CONTROL_HEIGHT)
        });

        let label = Bounds::new(left, control_y, (right - left).max(0.0), CONTROL_HEIGHT);

        Self {
            background,
            toggle,
            tag_glyph,
            label,
            trigger,
            status_dot,
            steppers,
            move_up,
            move_down,
            remove,
        }
    }

    pub fn stepper(&self, channel: StrengthChannel) -> Option<&StepperLayout> {
        self.steppers.iter().find(|stepper| stepper.channel == channel)
    }
}

#[derive(Clone, Debug)]
pub struct RowWidget {
    pub id: RowId,
    pub state: RowState,
    pub(crate) areas: HitAreas,
}

fn hit_areas_for(id: RowId) -> HitAreas {
    let mut areas = vec![
        HitArea::new(HitTarget::Background, PRIORITY_BACKGROUND)
            .on_activate(Command::ChangeLora(id)),
        HitArea::new(HitTarget::Label, PRIORITY_LABEL).on_press(Command::ChangeLora(id)),
        HitArea::new(HitTarget::TriggerPill, PRIORITY_TRIGGER)
            .on_press(Command::EditTriggerWords(id)),
        HitArea::new(HitTarget::StatusDot, PRIORITY_STATUS_DOT)
            .on_press(Command::RefetchTriggerWords(id)),
        HitArea::new(HitTarget::Toggle, PRIORITY_TOGGLE).on_press(Command::ToggleEnabled(id)),
        HitArea::new(HitTarget::TagGlyph, PRIORITY_TAG_GLYPH).on_press(Command::ChangeTag(id)),
        HitArea::new(HitTarget::MoveUp, PRIORITY_MOVE).on_press(Command::MoveUp(id)),
        HitArea::new(HitTarget::MoveDown, PRIORITY_MOVE).on_press(Command::MoveDown(id)),
        HitArea::new(HitTarget::Remove, PRIORITY_REMOVE).on_press(Command::Remove(id)),
    ];
    for channel in [StrengthChannel::Primary, StrengthChannel::Secondary] {
        areas.push(
            HitArea::new(HitTarget::StepDown(channel), PRIORITY_STEPPER).on_press(
                Command::StepStrength {
                    row: id,
                    channel,
                    steps: -1,
                },
            ),
        );
        areas.push(
            HitArea::new(HitTarget::StepUp(channel), PRIORITY_STEPPER).on_press(
                Command::StepStrength {
                    row: id,
                    channel,
                    steps: 1,
                },
            ),
        );
        areas.push(
            HitArea::new(HitTarget::StrengthValue(channel), PRIORITY_STEPPER)
                .on_press(Command::EditStrength { row: id, channel }),
        );
    }
    HitAreas::new(areas)
}

impl RowWidget {
    pub fn new(id: RowId, state: RowState) -> Self {
        Self {
            id,
            state,
            areas: hit_areas_for(id),
        }
    }

    /// Fixed height; optional controls only change horizontal packing.
    pub fn compute_size(&self, width: f32) -> Size {
        Size::new(width, ROW_HEIGHT)
    }

    fn store_bounds(&mut self, layout: &RowLayout) {
        self.areas.clear_bounds();
        self.areas
            .set_bounds(HitTarget::Background, Some(layout.background));
        self.areas.set_bounds(HitTarget::Toggle, Some(layout.toggle));
        self.areas.set_bounds(HitTarget::TagGlyph, layout.tag_glyph);
        self.areas
            .set_bounds(HitTarget::Label, (!layout.label.is_empty()).then_some(layout.label));
        self.areas.set_bounds(HitTarget::TriggerPill, layout.trigger);
        self.areas.set_bounds(HitTarget::StatusDot, layout.status_dot);
        self.areas.set_bounds(HitTarget::MoveUp, layout.move_up);
        self.areas.set_bounds(HitTarget::MoveDown, layout.move_down);
        self.areas.set_bounds(HitTarget::Remove, layout.remove);
        for stepper in &layout.steppers {
            self.areas
                .set_bounds(HitTarget::StepDown(stepper.channel), stepper.down);
            self.areas
                .set_bounds(HitTarget::StepUp(stepper.channel), stepper.up);
            self.areas
                .set_bounds(HitTarget::StrengthValue(stepper.channel), Some(stepper.value));
        }
    }

    pub fn draw(&mut self, cx: &mut PaintContext, frame: WidgetFrame, env: &DrawEnv<'_>) {
        let layout = RowLayout::compute(frame.width, env.properties);
        self.store_bounds(&layout);

        let top = frame.top;
        let enabled = self.state.enabled;
        // Disabled rows dim everything except the remove control.
        let dim = |color: Hsla| {
            if enabled {
                color
            } else {
                color.fade(theme::DISABLED_ALPHA)
            }
        };

        let background = if enabled {
            theme::bg::ROW
        } else {
            theme::bg::ROW_DISABLED
        };
        cx.scene.draw_quad(
            Quad::new(layout.background.translate(0.0, top))
                .with_background(background)
                .with_corner_radius(4.0),
        );

        let toggle = layout.toggle.translate(0.0, top);
        let toggle_fill = if enabled {
            theme::accent::ENABLED
        } else {
            theme::accent::DISABLED
        };
        cx.scene.draw_quad(
            Quad::new(toggle)
                .with_background(dim(toggle_fill))
                .with_border(dim(theme::border::DEFAULT), 1.0)
                .with_corner_radius(TOGGLE_SIZE * 0.5),
        );

        if let Some(glyph) = layout.tag_glyph {
            let glyph = glyph.translate(0.0, top);
            let run = cx.text.layout_centered(
                "#",
                glyph.center(),
                theme::font_size::SM,
                dim(theme::accent::TAG),
            );
            cx.scene.draw_text(run);
        }

        let label = layout.label.translate(0.0, top);
        let name = cx.text.truncate(
            self.state.display_name(),
            label.size.width,
            theme::font_size::BASE,
        );
        let label_color = if self.state.has_selection() {
            theme::text::PRIMARY
        } else {
            theme::text::MUTED
        };
        let run = cx.text.layout(
            &name,
            Point::new(label.min_x(), label.center().y),
            theme::font_size::BASE,
            dim(label_color),
        );
        cx.scene.draw_text(run);

        if let Some(pill) = layout.trigger {
            self.draw_trigger_pill(cx, pill.translate(0.0, top), &dim);
        }

        for stepper in &layout.steppers {
            self.draw_stepper(cx, stepper, top, &dim);
        }

        if let (Some(up), Some(down)) = (layout.move_up, layout.move_down) {
            for (bounds, glyph, available) in [
                (up, "\u{25B2}", env.can_move_up),
                (down, "\u{25BC}", env.can_move_down),
            ] {
                let color = if available {
                    theme::text::SECONDARY
                } else {
                    theme::text::MUTED.fade(theme::DISABLED_ALPHA)
                };
                let run = cx.text.layout_centered(
                    glyph,
                    bounds.translate(0.0, top).center(),
                    theme::font_size::XS,
                    dim(color),
                );
                cx.scene.draw_text(run);
            }
        }

        if let Some(remove) = layout.remove {
            let remove = remove.translate(0.0, top);
            cx.scene.draw_quad(
                Quad::new(remove)
                    .with_background(theme::bg::BUTTON)
                    .with_corner_radius(3.0),
            );
            let run = cx.text.layout_centered(
                "\u{2715}",
                remove.center(),
                theme::font_size::SM,
                theme::accent::DANGER,
            );
            cx.scene.draw_text(run);
        }
    }

    fn draw_trigger_pill(&self, cx: &mut PaintContext, pill: Bounds, dim: &impl Fn(Hsla) -> Hsla) {
        cx.scene.draw_quad(
            Quad::new(pill)
                .with_background(dim(theme::bg::PILL))
                .with_corner_radius(pill.size.height * 0.5),
        );

        let dot_color = match self.state.trigger_status() {
            TriggerStatus::Auto => theme::status::AUTO,
            TriggerStatus::Edited => theme::status::EDITED,
            TriggerStatus::AttemptedEmpty => theme::status::EMPTY,
            TriggerStatus::Neutral => theme::status::NEUTRAL,
        };
        let dot_x = pill.min_x() + (STATUS_DOT_HIT_WIDTH - STATUS_DOT_SIZE) * 0.5;
        let dot = Bounds::new(
            dot_x,
            pill.center().y - STATUS_DOT_SIZE * 0.5,
            STATUS_DOT_SIZE,
            STATUS_DOT_SIZE,
        );
        cx.scene.draw_quad(
            Quad::new(dot)
                .with_background(dim(dot_color))
                .with_corner_radius(STATUS_DOT_SIZE * 0.5),
        );

        let text_x = pill.min_x() + STATUS_DOT_HIT_WIDTH;
        let text_width = (pill.max_x() - text_x - ROW_PADDING).max(0.0);
        let (text, color) = if self.state.trigger_text.trim().is_empty() {
            ("trigger words", theme::text::MUTED)
        } else {
            (self.state.trigger_text.as_str(), theme::text::SECONDARY)
        };
        let shown = cx.text.truncate(text, text_width, theme::font_size::XS);
        let run = cx.text.layout(
            &shown,
            Point::new(text_x, pill.center().y),
            theme::font_size::XS,
            dim(color),
        );
        cx.scene.draw_text(run);
    }

    fn draw_stepper(
        &self,
        cx: &mut PaintContext,
        stepper: &StepperLayout,
        top: f32,
        dim: &impl Fn(Hsla) -> Hsla,
    ) {
        let value = stepper.value.translate(0.0, top);
        cx.scene.draw_quad(
            Quad::new(value)
                .with_background(dim(theme::bg::BUTTON))
                .with_corner_radius(3.0),
        );
        let text = format!("{:.2}", self.state.strength(stepper.channel));
        let run = cx.text.layout_centered(
            &text,
            value.center(),
            theme::font_size::XS,
            dim(theme::text::PRIMARY),
        );
        cx.scene.draw_text(run);

        for (bounds, glyph) in [(stepper.down, "\u{2212}"), (stepper.up, "+")] {
            if let Some(bounds) = bounds {
                let run = cx.text.layout_centered(
                    glyph,
                    bounds.translate(0.0, top).center(),
                    theme::font_size::SM,
                    dim(theme::text::SECONDARY),
                );
                cx.scene.draw_text(run);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row::RowIds;
    use crate::widgets::Phase;

    fn row_widget() -> RowWidget {
        let mut ids = RowIds::default();
        RowWidget::new(ids.next_id(), RowState::new("loras/Detail.safetensors"))
    }

    fn draw(row: &mut RowWidget, width: f32, properties: &NodeProperties) -> PaintContext {
        let mut cx = PaintContext::new();
        row.draw(
            &mut cx,
            WidgetFrame { width, top: 100.0 },
            &DrawEnv::new(properties),
        );
        cx
    }

    #[test]
    fn controls_pack_right_to_left_without_overlap() {
        let mut properties = NodeProperties::default();
        properties.separate_strengths = true;
        properties.enable_tags = true;
        let layout = RowLayout::compute(520.0, &properties);

        let remove = layout.remove.unwrap();
        let secondary = layout.stepper(StrengthChannel::Secondary).unwrap();
        let primary = layout.stepper(StrengthChannel::Primary).unwrap();
        let move_down = layout.move_down.unwrap();
        let trigger = layout.trigger.unwrap();

        assert!(secondary.up.unwrap().max_x() <= remove.min_x());
        assert!(primary.up.unwrap().max_x() <= secondary.down.unwrap().min_x());
        assert!(move_down.max_x() <= primary.down.unwrap().min_x());
        assert!(trigger.max_x() <= layout.move_up.unwrap().min_x());
        assert!(layout.label.max_x() <= trigger.min_x());
        assert!(layout.tag_glyph.unwrap().max_x() <= layout.label.min_x());
        assert!(layout.label.size.width >= LABEL_MIN_WIDTH);
    }

    #[test]
    fn hidden_controls_free_space_for_the_label() {
        let full = RowLayout::compute(420.0, &NodeProperties::default());
        let mut properties = NodeProperties::default();
        properties.show_move_arrows = false;
        properties.show_remove_button = false;
        properties.show_strength_buttons = false;
        properties.show_trigger_words = false;
        let bare = RowLayout::compute(420.0, &properties);

        assert!(bare.remove.is_none() && bare.move_up.is_none() && bare.trigger.is_none());
        let stepper = bare.stepper(StrengthChannel::Primary).unwrap();
        assert!(stepper.down.is_none() && stepper.up.is_none());
        assert!(bare.label.size.width > full.label.size.width);
    }

    #[test]
    fn narrow_rows_drop_the_trigger_pill() {
        let layout = RowLayout::compute(260.0, &NodeProperties::default());
        assert!(layout.trigger.is_none());
        assert!(layout.status_dot.is_none());
    }

    #[test]
    fn draw_populates_bounds_and_resolves_specific_controls() {
        let mut row = row_widget();
        let id = row.id;
        let properties = NodeProperties::default();
        assert!(row.areas.resolve(Point::new(20.0, 15.0), Phase::Press).is_none());

        let cx = draw(&mut row, 420.0, &properties);
        assert!(cx.scene.find_text("Detail").is_some());

        let toggle = row.areas.bounds(HitTarget::Toggle).unwrap().center();
        let (target, command) = row.areas.resolve(toggle, Phase::Press).unwrap();
        assert_eq!(target, HitTarget::Toggle);
        assert_eq!(command, &Command::ToggleEnabled(id));

        let dot = row.areas.bounds(HitTarget::StatusDot).unwrap().center();
        let (target, _) = row.areas.resolve(dot, Phase::Press).unwrap();
        assert_eq!(target, HitTarget::StatusDot);

        let pill = row.areas.bounds(HitTarget::TriggerPill).unwrap();
        let inside_pill = Point::new(pill.max_x() - 2.0, pill.center().y);
        let (target, _) = row.areas.resolve(inside_pill, Phase::Press).unwrap();
        assert_eq!(target, HitTarget::TriggerPill);

        // The strip between controls only answers activation.
        let gap = Point::new(NODE_MARGIN_X + 1.0, 1.0);
        let (target, command) = row.areas.resolve(gap, Phase::Activate).unwrap();
        assert_eq!(target, HitTarget::Background);
        assert_eq!(command, &Command::ChangeLora(id));
    }

    #[test]
    fn tag_glyph_only_hittable_with_tagging() {
        let mut row = row_widget();
        draw(&mut row, 420.0, &NodeProperties::default());
        assert!(row.areas.bounds(HitTarget::TagGlyph).is_none());

        let mut properties = NodeProperties::default();
        properties.enable_tags = true;
        draw(&mut row, 420.0, &properties);
        let glyph = row.areas.bounds(HitTarget::TagGlyph).unwrap();
        let (target, _) = row.areas.resolve(glyph.center(), Phase::Press).unwrap();
        assert_eq!(target, HitTarget::TagGlyph);
    }

    #[test]
    fn disabled_row_dims_all_but_remove() {
        let mut row = row_widget();
        row.state.enabled = false;
        let cx = draw(&mut row, 420.0, &NodeProperties::default());

        let label = cx.scene.find_text("Detail").unwrap();
        assert!(label.color.a < 1.0);
        let remove = cx.scene.find_text("\u{2715}").unwrap();
        assert_eq!(remove.color.a, 1.0);
    }
}
