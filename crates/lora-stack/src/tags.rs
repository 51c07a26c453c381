//! Grouping rows under tag banners and group-scoped reordering.

use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use crate::constants::DEFAULT_TAG;
use crate::widgets::{TagGroupState, TagGroupWidget, Widget};

/// Trims a tag; an empty tag falls back to the default group.
pub fn normalize_tag(tag: &str) -> String {
    let trimmed = tag.trim();
    if trimmed.is_empty() {
        DEFAULT_TAG.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Distinct normalized tags, default tag first, the rest lexicographic.
pub fn sorted_tags<'a>(tags: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut seen: Vec<String> = tags.into_iter().map(normalize_tag).collect();
    seen.sort_by(|a, b| tag_order(a, b));
    seen.dedup();
    seen
}

fn tag_order(a: &str, b: &str) -> std::cmp::Ordering {
    (a != DEFAULT_TAG, a).cmp(&(b != DEFAULT_TAG, b))
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MoveDirection {
    Up,
    Down,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct MoveAvailability {
    pub up: bool,
    pub down: bool,
}

/// Rebuilds the list as header, then either the flat rows or, with tagging,
/// one banner per tag followed by its rows in their prior relative order.
/// Existing banners are reused so their collapsed flag survives.
pub fn organize(widgets: Vec<Widget>, tagging: bool) -> Vec<Widget> {
    let mut header = None;
    let mut rows = Vec::new();
    let mut groups: HashMap<String, TagGroupWidget> = HashMap::new();

    for widget in widgets {
        match widget {
            Widget::Header(existing) => {
                if header.is_none() {
                    header = Some(existing);
                }
            }
            Widget::TagGroup(group) => {
                let tag = normalize_tag(group.tag());
                groups.entry(tag).or_insert(group);
            }
            Widget::Row(row) => rows.push(row),
        }
    }

    let mut out = Vec::with_capacity(rows.len() + groups.len() + 1);
    out.push(Widget::Header(header.unwrap_or_default()));

    if !tagging {
        out.extend(rows.into_iter().map(Widget::Row));
        return out;
    }

    let mut buckets: BTreeMap<(bool, String), Vec<Widget>> = BTreeMap::new();
    for row in rows {
        let tag = normalize_tag(&row.state.tag);
        buckets
            .entry((tag != DEFAULT_TAG, tag))
            .or_default()
            .push(Widget::Row(row));
    }

    for ((_, tag), members) in buckets {
        let mut group = groups
            .remove(&tag)
            .unwrap_or_else(|| TagGroupWidget::new(TagGroupState::new(tag.clone())));
        if group.tag() != tag {
            // Reused under its normalized name; the banner command follows.
            let collapsed = group.is_collapsed();
            group = TagGroupWidget::new(TagGroupState { tag, collapsed });
        }
        group.member_count = members.len();
        out.push(Widget::TagGroup(group));
        out.extend(members);
    }

    debug!(widgets = out.len(), tagging, "rebuilt widget list");
    out
}

/// Recounts banner membership from row tags. Banners only occupy layout
/// space while they have members.
pub fn refresh_member_counts(widgets: &mut [Widget]) {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for row in widgets.iter().filter_map(Widget::as_row) {
        *counts.entry(normalize_tag(&row.state.tag)).or_default() += 1;
    }
    for group in widgets.iter_mut().filter_map(Widget::as_tag_group_mut) {
        group.member_count = counts
            .get(&normalize_tag(group.tag()))
            .copied()
            .unwrap_or(0);
    }
}

/// Indexes of the rows `index` may swap with: its tag group when tagging
/// is on, otherwise every row.
fn peers(widgets: &[Widget], index: usize, tagging: bool) -> Vec<usize> {
    let Some(target) = widgets.get(index).and_then(Widget::as_row) else {
        return Vec::new();
    };
    let tag = normalize_tag(&target.state.tag);
    widgets
        .iter()
        .enumerate()
        .filter_map(|(i, widget)| widget.as_row().map(|row| (i, row)))
        .filter(|(_, row)| !tagging || normalize_tag(&row.state.tag) == tag)
        .map(|(i, _)| i)
        .collect()
}

pub fn move_availability(widgets: &[Widget], index: usize, tagging: bool) -> MoveAvailability {
    let peers = peers(widgets, index, tagging);
    let Some(position) = peers.iter().position(|&i| i == index) else {
        return MoveAvailability::default();
    };
    MoveAvailability {
        up: position > 0,
        down: position + 1 < peers.len(),
    }
}

/// Swaps the row at `index` with its neighbour among its peers. Returns
/// the row's new index, or `None` at a boundary.
pub fn move_row(
    widgets: &mut [Widget],
    index: usize,
    direction: MoveDirection,
    tagging: bool,
) -> Option<usize> {
    let peers = peers(widgets, index, tagging);
    let position = peers.iter().position(|&i| i == index)?;
    let neighbour = match direction {
        MoveDirection::Up => position.checked_sub(1).and_then(|p| peers.get(p)),
        MoveDirection::Down => peers.get(position + 1),
    }
    .copied()?;
    widgets.swap(index, neighbour);
    Some(neighbour)
}
