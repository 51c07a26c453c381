use crate::scene::{TextAlign, TextRun};
use crate::{Hsla, Point};

const ELLIPSIS: char = '\u{2026}';

/// Fixed-advance text measurer.
///
/// Canvas hosts measure with their own font stack; widgets only need a
/// deterministic estimate to decide which label form fits, so every glyph
/// advances by `font_size * advance_ratio`.
#[derive(Clone, Debug)]
pub struct TextSystem {
    advance_ratio: f32,
}

impl Default for TextSystem {
    fn default() -> Self {
        Self { advance_ratio: 0.6 }
    }
}

impl TextSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_advance_ratio(advance_ratio: f32) -> Self {
        Self {
            advance_ratio: advance_ratio.max(0.1),
        }
    }

    pub fn char_width(&self, font_size: f32) -> f32 {
        font_size * self.advance_ratio
    }

    pub fn measure(&self, text: &str, font_size: f32) -> f32 {
        text.chars().count() as f32 * self.char_width(font_size)
    }

    /// Cuts `text` so it fits in `max_width`, ending with an ellipsis when
    /// anything was removed.
    pub fn truncate(&self, text: &str, max_width: f32, font_size: f32) -> String {
        if self.measure(text, font_size) <= max_width {
            return text.to_string();
        }
        let char_width = self.char_width(font_size);
        let fit = (max_width / char_width).floor() as usize;
        if fit == 0 {
            return String::new();
        }
        let mut out: String = text.chars().take(fit.saturating_sub(1)).collect();
        out.push(ELLIPSIS);
        out
    }

    pub fn layout(&self, text: &str, origin: Point, font_size: f32, color: Hsla) -> TextRun {
        TextRun {
            text: text.to_string(),
            origin,
            font_size,
            color,
            align: TextAlign::Left,
        }
    }

    /// Lays out `text` horizontally centred on `center`.
    pub fn layout_centered(
        &self,
        text: &str,
        center: Point,
        font_size: f32,
        color: Hsla,
    ) -> TextRun {
        let width = self.measure(text, font_size);
        TextRun {
            text: text.to_string(),
            origin: Point::new(center.x - width * 0.5, center.y),
            font_size,
            color,
            align: TextAlign::Center,
        }
    }
}
