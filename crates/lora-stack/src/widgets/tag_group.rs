use lora_canvas::theme;
use lora_canvas::{Bounds, PaintContext, Point, Quad, Size};
use serde::{Deserialize, Serialize};

use super::{Command, HitArea, HitAreas, HitTarget, WidgetFrame};
use crate::constants::{DEFAULT_TAG, NODE_MARGIN_X, PRIORITY_BANNER, ROW_PADDING, TAG_GROUP_HEIGHT};

/// Persisted part of a tag group. Membership is derived from row tags.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TagGroupState {
    pub tag: String,
    pub collapsed: bool,
}

impl Default for TagGroupState {
    fn default() -> Self {
        Self {
            tag: DEFAULT_TAG.to_string(),
            collapsed: false,
        }
    }
}

impl TagGroupState {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            collapsed: false,
        }
    }
}

#[derive(Clone, Debug)]
pub struct TagGroupWidget {
    pub state: TagGroupState,
    /// Rows currently carrying this tag; refreshed by the organizer.
    pub member_count: usize,
    pub(crate) areas: HitAreas,
}

impl TagGroupWidget {
    pub fn new(state: TagGroupState) -> Self {
        let areas = HitAreas::new(vec![
            HitArea::new(HitTarget::Banner, PRIORITY_BANNER)
                .on_press(Command::ToggleCollapse(state.tag.clone())),
        ]);
        Self {
            state,
            member_count: 0,
            areas,
        }
    }

    pub fn tag(&self) -> &str {
        &self.state.tag
    }

    pub fn is_collapsed(&self) -> bool {
        self.state.collapsed
    }

    pub fn toggle_collapsed(&mut self) {
        self.state.collapsed = !self.state.collapsed;
    }

    /// An empty group takes no space.
    pub fn compute_size(&self, width: f32) -> Size {
        if self.member_count == 0 {
            Size::new(width, 0.0)
        } else {
            Size::new(width, TAG_GROUP_HEIGHT)
        }
    }

    pub fn draw(&mut self, cx: &mut PaintContext, frame: WidgetFrame) {
        let local = Bounds::new(
            NODE_MARGIN_X,
            0.0,
            (frame.width - NODE_MARGIN_X * 2.0).max(0.0),
            TAG_GROUP_HEIGHT,
        );
        self.areas
            .set_bounds(HitTarget::Banner, (!local.is_empty()).then_some(local));

        let banner = local.translate(0.0, frame.top);
        cx.scene.draw_quad(
            Quad::new(banner)
                .with_background(theme::bg::BANNER)
                .with_corner_radius(4.0),
        );

        let mid_y = banner.center().y;
        let arrow = if self.state.collapsed {
            "\u{25B8}"
        } else {
            "\u{25BE}"
        };
        let mut x = banner.min_x() + ROW_PADDING;
        let run = cx.text.layout(
            arrow,
            Point::new(x, mid_y),
            theme::font_size::SM,
            theme::accent::TAG,
        );
        cx.scene.draw_text(run);
        x += cx.text.measure(arrow, theme::font_size::SM) + ROW_PADDING;

        let count = format!("({})", self.member_count);
        let count_width = cx.text.measure(&count, theme::font_size::XS);
        let name_width = (banner.max_x() - ROW_PADDING * 2.0 - count_width - x).max(0.0);
        let name = cx
            .text
            .truncate(&self.state.tag, name_width, theme::font_size::BASE);
        let name_run = cx.text.layout(
            &name,
            Point::new(x, mid_y),
            theme::font_size::BASE,
            theme::text::PRIMARY,
        );
        cx.scene.draw_text(name_run);

        let count_run = cx.text.layout(
            &count,
            Point::new(banner.max_x() - ROW_PADDING - count_width, mid_y),
            theme::font_size::XS,
            theme::text::MUTED,
        );
        cx.scene.draw_text(count_run);
    }
}
