use lora_canvas::theme;
use lora_canvas::{Bounds, PaintContext, Point, Quad, Size};

use super::{Command, HitArea, HitAreas, HitTarget, WidgetFrame};
use crate::constants::{
    HEADER_BUTTON_GAP, HEADER_BUTTON_HEIGHT, HEADER_FULL_LABEL_MIN_WIDTH, HEADER_HEIGHT,
    HEADER_SHORT_LABEL_MIN_WIDTH, NODE_MARGIN_X, PRIORITY_HEADER_BUTTON,
};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum HeaderButton {
    ToggleAll,
    Add,
    SaveSet,
    LoadSet,
    Settings,
}

impl HeaderButton {
    pub const ALL: [HeaderButton; 5] = [
        HeaderButton::ToggleAll,
        HeaderButton::Add,
        HeaderButton::SaveSet,
        HeaderButton::LoadSet,
        HeaderButton::Settings,
    ];

    pub fn full_label(self) -> &'static str {
        match self {
            Self::ToggleAll => "Toggle All",
            Self::Add => "Add LoRA",
            Self::SaveSet => "Save Set",
            Self::LoadSet => "Load Set",
            Self::Settings => "Settings",
        }
    }

    pub fn short_label(self) -> &'static str {
        match self {
            Self::ToggleAll => "All",
            Self::Add => "Add",
            Self::SaveSet => "Save",
            Self::LoadSet => "Load",
            Self::Settings => "Opts",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Self::ToggleAll => "\u{25C9}",
            Self::Add => "+",
            Self::SaveSet => "\u{2193}",
            Self::LoadSet => "\u{2191}",
            Self::Settings => "\u{2699}",
        }
    }

    /// Label form that fits a button of `width`.
    pub fn label_for_width(self, width: f32) -> &'static str {
        if width >= HEADER_FULL_LABEL_MIN_WIDTH {
            self.full_label()
        } else if width >= HEADER_SHORT_LABEL_MIN_WIDTH {
            self.short_label()
        } else {
            self.icon()
        }
    }

    pub fn command(self) -> Command {
        match self {
            Self::ToggleAll => Command::ToggleAll,
            Self::Add => Command::AddLoras,
            Self::SaveSet => Command::SaveTemplate,
            Self::LoadSet => Command::LoadTemplate,
            Self::Settings => Command::OpenSettings,
        }
    }
}

/// Equal-width button bounds across the header, widget-local.
pub fn button_bounds(width: f32) -> Vec<(HeaderButton, Bounds)> {
    let count = HeaderButton::ALL.len() as f32;
    let available = (width - NODE_MARGIN_X * 2.0 - HEADER_BUTTON_GAP * (count - 1.0)).max(0.0);
    let button_width = available / count;
    let y = (HEADER_HEIGHT - HEADER_BUTTON_HEIGHT) * 0.5;
    HeaderButton::ALL
        .into_iter()
        .enumerate()
        .map(|(index, button)| {
            let x = NODE_MARGIN_X + index as f32 * (button_width + HEADER_BUTTON_GAP);
            (
                button,
                Bounds::new(x, y, button_width, HEADER_BUTTON_HEIGHT),
            )
        })
        .collect()
}

#[derive(Clone, Debug)]
pub struct HeaderWidget {
    pub(crate) areas: HitAreas,
}

impl Default for HeaderWidget {
    fn default() -> Self {
        Self::new()
    }
}

impl HeaderWidget {
    pub fn new() -> Self {
        let areas = HeaderButton::ALL
            .into_iter()
            .map(|button| {
                HitArea::new(HitTarget::HeaderButton(button), PRIORITY_HEADER_BUTTON)
                    .on_press(button.command())
            })
            .collect();
        Self {
            areas: HitAreas::new(areas),
        }
    }

    pub fn compute_size(&self, width: f32) -> Size {
        Size::new(width, HEADER_HEIGHT)
    }

    pub fn draw(&mut self, cx: &mut PaintContext, frame: WidgetFrame) {
        for (button, local) in button_bounds(frame.width) {
            let drawable = local.size.width > 0.0;
            self.areas
                .set_bounds(HitTarget::HeaderButton(button), drawable.then_some(local));
            if !drawable {
                continue;
            }

            let bounds = local.translate(0.0, frame.top);
            cx.scene.draw_quad(
                Quad::new(bounds)
                    .with_background(theme::bg::BUTTON)
                    .with_border(theme::border::DEFAULT, 1.0)
                    .with_corner_radius(4.0),
            );
            let label = button.label_for_width(local.size.width);
            let center = bounds.center();
            let run = cx.text.layout_centered(
                label,
                Point::new(center.x, center.y),
                theme::font_size::SM,
                theme::text::PRIMARY,
            );
            cx.scene.draw_text(run);
        }
    }
}
