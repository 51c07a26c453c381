use crate::{Bounds, Hsla, Point};

/// Filled rectangle with optional border and rounded corners.
#[derive(Clone, Debug, PartialEq)]
pub struct Quad {
    pub bounds: Bounds,
    pub background: Option<Hsla>,
    pub border_color: Hsla,
    pub border_width: f32,
    pub corner_radius: f32,
}

impl Quad {
    pub fn new(bounds: Bounds) -> Self {
        Self {
            bounds,
            background: None,
            border_color: Hsla::transparent(),
            border_width: 0.0,
            corner_radius: 0.0,
        }
    }

    pub fn with_background(mut self, background: Hsla) -> Self {
        self.background = Some(background);
        self
    }

    pub fn with_border(mut self, color: Hsla, width: f32) -> Self {
        self.border_color = color;
        self.border_width = width;
        self
    }

    pub fn with_corner_radius(mut self, radius: f32) -> Self {
        self.corner_radius = radius;
        self
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// A single line of text anchored at `origin` (left edge, vertical centre).
#[derive(Clone, Debug, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub origin: Point,
    pub font_size: f32,
    pub color: Hsla,
    pub align: TextAlign,
}

/// Draw list accumulated during one paint pass, grouped by layer.
#[derive(Debug, Default)]
pub struct Scene {
    layer: u32,
    quads: Vec<(u32, Quad)>,
    text_runs: Vec<(u32, TextRun)>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_layer(&mut self, layer: u32) {
        self.layer = layer;
    }

    pub fn layer(&self) -> u32 {
        self.layer
    }

    pub fn draw_quad(&mut self, quad: Quad) {
        self.quads.push((self.layer, quad));
    }

    pub fn draw_text(&mut self, run: TextRun) {
        self.text_runs.push((self.layer, run));
    }

    pub fn quads(&self) -> impl Iterator<Item = &Quad> {
        self.quads.iter().map(|(_, quad)| quad)
    }

    pub fn text_runs(&self) -> impl Iterator<Item = &TextRun> {
        self.text_runs.iter().map(|(_, run)| run)
    }

    pub fn find_text(&self, needle: &str) -> Option<&TextRun> {
        self.text_runs().find(|run| run.text == needle)
    }

    pub fn clear(&mut self) {
        self.layer = 0;
        self.quads.clear();
        self.text_runs.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.quads.is_empty() && self.text_runs.is_empty()
    }
}
