use crate::row::{RowId, RowState};
use crate::tags::{self, MoveAvailability, MoveDirection};
use crate::widgets::{RowWidget, TagGroupWidget, Widget, WidgetKind};

/// Ordered widgets of one node. Always starts with exactly one header.
#[derive(Clone, Debug, PartialEq)]
pub struct WidgetList {
    widgets: Vec<Widget>,
}

impl Default for WidgetList {
    fn default() -> Self {
        Self::new()
    }
}

impl WidgetList {
    pub fn new() -> Self {
        Self {
            widgets: vec![Widget::header()],
        }
    }

    /// Takes arbitrary widgets, keeping the first header (or a fresh one) at
    /// the front and dropping any others.
    pub fn from_widgets(widgets: Vec<Widget>) -> Self {
        let mut header = None;
        let mut rest = Vec::with_capacity(widgets.len());
        for widget in widgets {
            match widget {
                Widget::Header(existing) => {
                    if header.is_none() {
                        header = Some(Widget::Header(existing));
                    }
                }
                other => rest.push(other),
            }
        }
        let mut list = vec![header.unwrap_or_else(Widget::header)];
        list.extend(rest);
        tags::refresh_member_counts(&mut list);
        Self { widgets: list }
    }

    pub fn widgets(&self) -> &[Widget] {
        &self.widgets
    }

    pub(crate) fn widgets_mut(&mut self) -> &mut [Widget] {
        &mut self.widgets
    }

    pub fn rows(&self) -> impl Iterator<Item = &RowWidget> {
        self.widgets.iter().filter_map(Widget::as_row)
    }

    pub fn rows_mut(&mut self) -> impl Iterator<Item = &mut RowWidget> {
        self.widgets.iter_mut().filter_map(Widget::as_row_mut)
    }

    pub fn row_states(&self) -> impl Iterator<Item = &RowState> {
        self.rows().map(|row| &row.state)
    }

    pub fn row_count(&self) -> usize {
        self.rows().count()
    }

    pub fn count(&self, kind: WidgetKind) -> usize {
        self.widgets
            .iter()
            .filter(|widget| widget.kind() == kind)
            .count()
    }

    pub fn index_of(&self, id: RowId) -> Option<usize> {
        self.widgets
            .iter()
            .position(|widget| widget.as_row().is_some_and(|row| row.id == id))
    }

    pub fn row(&self, id: RowId) -> Option<&RowWidget> {
        self.rows().find(|row| row.id == id)
    }

    pub fn row_mut(&mut self, id: RowId) -> Option<&mut RowWidget> {
        self.rows_mut().find(|row| row.id == id)
    }

    pub fn tag_group_mut(&mut self, tag: &str) -> Option<&mut TagGroupWidget> {
        self.widgets
            .iter_mut()
            .filter_map(Widget::as_tag_group_mut)
            .find(|group| group.tag() == tag)
    }

    /// True when another live row already uses `selection`. Sentinel
    /// selections never count as duplicates.
    pub fn contains_selection(&self, selection: &str, except: Option<RowId>) -> bool {
        !crate::row::is_none_selection(selection)
            && self
                .rows()
                .any(|row| Some(row.id) != except && row.state.selection == selection)
    }

    pub fn push_row(&mut self, id: RowId, state: RowState) {
        self.widgets.push(Widget::row(id, state));
    }

    pub fn remove_row(&mut self, id: RowId) -> Option<RowState> {
        let index = self.index_of(id)?;
        match self.widgets.remove(index) {
            Widget::Row(row) => Some(row.state),
            _ => None,
        }
    }

    pub fn clear_rows(&mut self) {
        self.widgets.retain(|widget| widget.kind() != WidgetKind::Row);
    }

    pub fn organize(&mut self, tagging: bool) {
        let widgets = std::mem::take(&mut self.widgets);
        self.widgets = tags::organize(widgets, tagging);
    }

    pub fn move_availability(&self, id: RowId, tagging: bool) -> MoveAvailability {
        self.index_of(id)
            .map(|index| tags::move_availability(&self.widgets, index, tagging))
            .unwrap_or_default()
    }

    pub fn move_row(&mut self, id: RowId, direction: MoveDirection, tagging: bool) -> bool {
        let Some(index) = self.index_of(id) else {
            return false;
        };
        tags::move_row(&mut self.widgets, index, direction, tagging).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row::RowIds;
    use crate::widgets::TagGroupState;

    #[test]
    fn from_widgets_keeps_a_single_leading_header() {
        let mut ids = RowIds::default();
        let list = WidgetList::from_widgets(vec![
            Widget::row(ids.next_id(), RowState::new("a")),
            Widget::header(),
            Widget::header(),
        ]);
        assert_eq!(list.count(WidgetKind::Header), 1);
        assert_eq!(list.widgets()[0].kind(), WidgetKind::Header);
        assert_eq!(list.row_count(), 1);
    }

    #[test]
    fn from_widgets_counts_banner_members() {
        let mut ids = RowIds::default();
        let mut styled = RowState::new("b");
        styled.tag = "Style".to_string();
        let list = WidgetList::from_widgets(vec![
            Widget::header(),
            Widget::tag_group(TagGroupState::new("Style")),
            Widget::row(ids.next_id(), styled),
            Widget::tag_group(TagGroupState::new("Empty")),
            Widget::row(ids.next_id(), RowState::new("a")),
        ]);

        let counts: Vec<_> = list
            .widgets()
            .iter()
            .filter_map(Widget::as_tag_group)
            .map(|group| (group.tag().to_string(), group.member_count))
            .collect();
        assert_eq!(
            counts,
            vec![("Style".to_string(), 1), ("Empty".to_string(), 0)]
        );
        assert!(list.widgets()[1].compute_size(420.0).height > 0.0);
        assert_eq!(list.widgets()[3].compute_size(420.0).height, 0.0);
    }

    #[test]
    fn duplicate_check_ignores_sentinel_and_self() {
        let mut ids = RowIds::default();
        let mut list = WidgetList::new();
        let a = ids.next_id();
        list.push_row(a, RowState::new("a.safetensors"));
        list.push_row(ids.next_id(), RowState::default());

        assert!(list.contains_selection("a.safetensors", None));
        assert!(!list.contains_selection("a.safetensors", Some(a)));
        assert!(!list.contains_selection("None", None));
    }

    #[test]
    fn remove_and_clear_leave_the_header() {
        let mut ids = RowIds::default();
        let mut list = WidgetList::new();
        let a = ids.next_id();
        list.push_row(a, RowState::new("a"));
        list.push_row(ids.next_id(), RowState::new("b"));

        assert_eq!(list.remove_row(a).unwrap().selection, "a");
        assert!(list.remove_row(a).is_none());
        list.clear_rows();
        assert_eq!(list.widgets().len(), 1);
    }
}
