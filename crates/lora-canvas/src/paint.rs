use crate::{Scene, TextSystem};

/// Surface handed to widgets while painting.
#[derive(Debug, Default)]
pub struct PaintContext {
    pub scene: Scene,
    pub text: TextSystem,
}

impl PaintContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text_system(text: TextSystem) -> Self {
        Self {
            scene: Scene::new(),
            text,
        }
    }
}
