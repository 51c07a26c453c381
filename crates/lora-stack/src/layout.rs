//! Vertical layout of a node's widgets.
//!
//! Every pass (draw, hit-test, auto-resize) walks the list through
//! [`visible_widgets`], so they all agree on which widgets are shown and
//! where.

use crate::constants::{BOTTOM_PADDING, COLLAPSED_TRAILING_MARGIN, CONTENT_TOP, WIDGET_MARGIN};
use crate::widgets::Widget;

/// A widget that takes part in this layout pass. `top` is node-local.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VisibleWidget {
    pub index: usize,
    pub top: f32,
    pub height: f32,
}

impl VisibleWidget {
    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    /// Half-open vertical membership.
    pub fn contains_y(&self, y: f32) -> bool {
        y >= self.top && y < self.bottom()
    }
}

/// Visible widgets in order, with their tops. Rows under a collapsed tag
/// group (while tagging is on) and zero-height widgets are skipped.
pub fn visible_widgets(widgets: &[Widget], tagging: bool, width: f32) -> Vec<VisibleWidget> {
    let mut shown: Vec<(usize, f32, bool)> = Vec::with_capacity(widgets.len());
    let mut in_collapsed_group = false;

    for (index, widget) in widgets.iter().enumerate() {
        let collapsed_banner = match widget {
            Widget::TagGroup(group) => {
                in_collapsed_group = group.is_collapsed();
                group.is_collapsed()
            }
            Widget::Row(_) if tagging && in_collapsed_group => continue,
            _ => false,
        };
        let height = widget.compute_size(width).height;
        if height <= 0.0 {
            continue;
        }
        shown.push((index, height, collapsed_banner));
    }

    let last = shown.len().saturating_sub(1);
    let mut y = CONTENT_TOP;
    let mut out = Vec::with_capacity(shown.len());
    for (position, (index, height, collapsed_banner)) in shown.into_iter().enumerate() {
        out.push(VisibleWidget {
            index,
            top: y,
            height,
        });
        y += height + margin_after(collapsed_banner, position == last);
    }
    out
}

/// Content hugs a collapsed banner, except a trailing one, which keeps a
/// grab margin below it.
fn margin_after(collapsed_banner: bool, is_last: bool) -> f32 {
    match (collapsed_banner, is_last) {
        (true, true) => COLLAPSED_TRAILING_MARGIN,
        (true, false) => 0.0,
        (false, _) => WIDGET_MARGIN,
    }
}

pub fn for_each_visible(
    widgets: &[Widget],
    tagging: bool,
    width: f32,
    mut visitor: impl FnMut(&VisibleWidget, &Widget),
) {
    for visible in visible_widgets(widgets, tagging, width) {
        if let Some(widget) = widgets.get(visible.index) {
            visitor(&visible, widget);
        }
    }
}

/// Total height the node needs, floored at `min_height`.
pub fn compute_content_height(
    widgets: &[Widget],
    tagging: bool,
    width: f32,
    min_height: f32,
) -> f32 {
    let visible = visible_widgets(widgets, tagging, width);
    let end = match visible.len() {
        0 => CONTENT_TOP,
        len => {
            let last = visible[len - 1];
            let collapsed = widgets
                .get(last.index)
                .and_then(Widget::as_tag_group)
                .is_some_and(|group| group.is_collapsed());
            last.bottom() + margin_after(collapsed, true)
        }
    };
    (end + BOTTOM_PADDING).max(min_height)
}
