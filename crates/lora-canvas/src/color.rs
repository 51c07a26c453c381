/// Colour in hue (degrees), saturation, lightness and alpha.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Hsla {
    pub h: f32,
    pub s: f32,
    pub l: f32,
    pub a: f32,
}

impl Hsla {
    pub const fn new(h: f32, s: f32, l: f32, a: f32) -> Self {
        Self { h, s, l, a }
    }

    pub const fn transparent() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }

    pub fn with_alpha(self, alpha: f32) -> Self {
        Self {
            a: alpha.clamp(0.0, 1.0),
            ..self
        }
    }

    /// Multiplies the current alpha, used for disabled-state dimming.
    pub fn fade(self, factor: f32) -> Self {
        self.with_alpha(self.a * factor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fade_multiplies_alpha() {
        let color = Hsla::new(210.0, 0.5, 0.5, 0.8).fade(0.5);
        assert!((color.a - 0.4).abs() < f32::EPSILON);
        assert_eq!(color.h, 210.0);
    }

    #[test]
    fn with_alpha_clamps() {
        assert_eq!(Hsla::new(0.0, 0.0, 1.0, 1.0).with_alpha(3.0).a, 1.0);
    }
}
