//! Colour and font tokens for node widgets.

pub mod bg {
    use crate::Hsla;

    pub const NODE: Hsla = Hsla::new(0.0, 0.0, 0.13, 1.0);
    pub const ROW: Hsla = Hsla::new(0.0, 0.0, 0.17, 1.0);
    pub const ROW_DISABLED: Hsla = Hsla::new(0.0, 0.0, 0.15, 1.0);
    pub const BANNER: Hsla = Hsla::new(220.0, 0.12, 0.22, 1.0);
    pub const BUTTON: Hsla = Hsla::new(0.0, 0.0, 0.22, 1.0);
    pub const PILL: Hsla = Hsla::new(220.0, 0.1, 0.25, 1.0);
}

pub mod text {
    use crate::Hsla;

    pub const PRIMARY: Hsla = Hsla::new(0.0, 0.0, 0.92, 1.0);
    pub const SECONDARY: Hsla = Hsla::new(0.0, 0.0, 0.72, 1.0);
    pub const MUTED: Hsla = Hsla::new(0.0, 0.0, 0.5, 1.0);
}

pub mod border {
    use crate::Hsla;

    pub const DEFAULT: Hsla = Hsla::new(0.0, 0.0, 0.3, 1.0);
    pub const FOCUS: Hsla = Hsla::new(210.0, 0.6, 0.55, 1.0);
}

pub mod accent {
    use crate::Hsla;

    pub const ENABLED: Hsla = Hsla::new(140.0, 0.55, 0.45, 1.0);
    pub const DISABLED: Hsla = Hsla::new(0.0, 0.0, 0.35, 1.0);
    pub const DANGER: Hsla = Hsla::new(0.0, 0.65, 0.5, 1.0);
    pub const TAG: Hsla = Hsla::new(45.0, 0.7, 0.55, 1.0);
}

pub mod status {
    use crate::Hsla;

    pub const AUTO: Hsla = Hsla::new(140.0, 0.6, 0.5, 1.0);
    pub const EDITED: Hsla = Hsla::new(210.0, 0.7, 0.6, 1.0);
    pub const EMPTY: Hsla = Hsla::new(30.0, 0.8, 0.55, 1.0);
    pub const NEUTRAL: Hsla = Hsla::new(0.0, 0.0, 0.45, 1.0);
}

pub mod font_size {
    pub const XS: f32 = 10.0;
    pub const SM: f32 = 12.0;
    pub const BASE: f32 = 13.0;
}

/// Alpha multiplier applied to text and interactive layers of a disabled row.
pub const DISABLED_ALPHA: f32 = 0.45;
