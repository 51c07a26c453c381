pub const DEFAULT_TAG: &str = "General";
pub const NONE_SELECTION: &str = "None";

pub const CONTENT_TOP: f32 = 6.0;
pub const NODE_MARGIN_X: f32 = 10.0;
pub const WIDGET_MARGIN: f32 = 4.0;
pub const COLLAPSED_TRAILING_MARGIN: f32 = 12.0;
pub const BOTTOM_PADDING: f32 = 8.0;

pub const HEADER_HEIGHT: f32 = 32.0;
pub const TAG_GROUP_HEIGHT: f32 = 26.0;
pub const ROW_HEIGHT: f32 = 30.0;

pub const HEADER_BUTTON_GAP: f32 = 4.0;
pub const HEADER_BUTTON_HEIGHT: f32 = 24.0;
pub const HEADER_FULL_LABEL_MIN_WIDTH: f32 = 74.0;
pub const HEADER_SHORT_LABEL_MIN_WIDTH: f32 = 40.0;

pub const ROW_PADDING: f32 = 6.0;
pub const CONTROL_GAP: f32 = 4.0;
pub const CONTROL_HEIGHT: f32 = 20.0;
pub const TOGGLE_SIZE: f32 = 18.0;
pub const TAG_GLYPH_WIDTH: f32 = 18.0;
pub const REMOVE_WIDTH: f32 = 20.0;
pub const STEPPER_ARROW_WIDTH: f32 = 14.0;
pub const STEPPER_VALUE_WIDTH: f32 = 36.0;
pub const MOVE_ARROW_WIDTH: f32 = 14.0;
pub const LABEL_MIN_WIDTH: f32 = 40.0;
pub const TRIGGER_MIN_WIDTH: f32 = 60.0;
pub const TRIGGER_MAX_WIDTH: f32 = 180.0;
pub const TRIGGER_SHARE: f32 = 0.45;
pub const STATUS_DOT_SIZE: f32 = 6.0;
pub const STATUS_DOT_HIT_WIDTH: f32 = 14.0;

pub const PRIORITY_BACKGROUND: i32 = 0;
pub const PRIORITY_LABEL: i32 = 10;
pub const PRIORITY_BANNER: i32 = 10;
pub const PRIORITY_HEADER_BUTTON: i32 = 10;
pub const PRIORITY_TRIGGER: i32 = 20;
pub const PRIORITY_STATUS_DOT: i32 = 25;
pub const PRIORITY_TOGGLE: i32 = 30;
pub const PRIORITY_TAG_GLYPH: i32 = 30;
pub const PRIORITY_STEPPER: i32 = 40;
pub const PRIORITY_MOVE: i32 = 40;
pub const PRIORITY_REMOVE: i32 = 50;

pub const STRENGTH_STEP: f64 = 0.05;
pub const STRENGTH_MIN: f64 = -10.0;
pub const STRENGTH_MAX: f64 = 10.0;

pub const DEFAULT_MIN_WIDTH: f32 = 420.0;
pub const DEFAULT_MIN_HEIGHT: f32 = 60.0;
pub const DEFAULT_MAX_TRIGGER_WORDS: usize = 3;
pub const DEFAULT_TRIGGER_SEPARATOR: &str = ", ";
