//! Pointer dispatch: widget by vertical range, then control by priority.

use lora_canvas::Point;
use tracing::debug;

use crate::layout::visible_widgets;
use crate::widgets::{Command, HitTarget, Phase, Widget};

#[derive(Clone, Debug, PartialEq)]
pub struct Hit {
    /// Index of the owning widget in the list.
    pub index: usize,
    pub target: HitTarget,
    pub command: Command,
}

/// Resolves a node-local position. Uses the hit-area bounds stored by the
/// most recent draw; `None` lets the host's default handling proceed.
pub fn resolve(
    widgets: &[Widget],
    tagging: bool,
    width: f32,
    position: Point,
    phase: Phase,
) -> Option<Hit> {
    let Some(visible) = visible_widgets(widgets, tagging, width)
        .into_iter()
        .find(|visible| visible.contains_y(position.y))
    else {
        debug!(x = position.x, y = position.y, "pointer outside every widget");
        return None;
    };

    let widget = widgets.get(visible.index)?;
    let local = Point::new(position.x, position.y - visible.top);
    let Some((target, command)) = widget.hit_areas().resolve(local, phase) else {
        debug!(index = visible.index, ?phase, "no hit area under pointer");
        return None;
    };
    Some(Hit {
        index: visible.index,
        target,
        command: command.clone(),
    })
}

#[cfg(test)]
mod tests {
    use lora_canvas::PaintContext;

    use super::*;
    use crate::properties::NodeProperties;
    use crate::row::{RowIds, RowState};
    use crate::widgets::{DrawEnv, HeaderButton, WidgetFrame};

    fn drawn(widgets: &mut [Widget], width: f32) {
        let properties = NodeProperties::default();
        let env = DrawEnv::new(&properties);
        let mut cx = PaintContext::new();
        for visible in visible_widgets(widgets, false, width) {
            widgets[visible.index].draw(
                &mut cx,
                WidgetFrame {
                    width,
                    top: visible.top,
                },
                &env,
            );
        }
    }

    #[test]
    fn resolves_header_button_and_row_toggle() {
        let mut ids = RowIds::default();
        let id = ids.next_id();
        let mut widgets = vec![Widget::header(), Widget::row(id, RowState::new("a"))];
        drawn(&mut widgets, 420.0);
        let visible = visible_widgets(&widgets, false, 420.0);

        let add = widgets[0]
            .hit_areas()
            .bounds(HitTarget::HeaderButton(HeaderButton::Add))
            .unwrap()
            .center();
        let hit = resolve(
            &widgets,
            false,
            420.0,
            Point::new(add.x, add.y + visible[0].top),
            Phase::Press,
        )
        .unwrap();
        assert_eq!(hit.command, Command::AddLoras);

        let toggle = widgets[1]
            .hit_areas()
            .bounds(HitTarget::Toggle)
            .unwrap()
            .center();
        let hit = resolve(
            &widgets,
            false,
            420.0,
            Point::new(toggle.x, toggle.y + visible[1].top),
            Phase::Press,
        )
        .unwrap();
        assert_eq!(hit.index, 1);
        assert_eq!(hit.command, Command::ToggleEnabled(id));
    }

    #[test]
    fn margins_and_empty_space_miss() {
        let mut ids = RowIds::default();
        let mut widgets = vec![Widget::header(), Widget::row(ids.next_id(), RowState::new("a"))];
        drawn(&mut widgets, 420.0);
        let visible = visible_widgets(&widgets, false, 420.0);

        let in_margin = visible[0].bottom() + 1.0;
        assert!(resolve(&widgets, false, 420.0, Point::new(100.0, in_margin), Phase::Press).is_none());
        assert!(resolve(&widgets, false, 420.0, Point::new(100.0, 1.0), Phase::Press).is_none());
        let below = visible[1].bottom() + 50.0;
        assert!(resolve(&widgets, false, 420.0, Point::new(100.0, below), Phase::Press).is_none());
    }
}
