//! Persisted node format and the save-time snapshot.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::bundle::{BundleEntry, execution_bundle};
use crate::error::{Result, StackError};
use crate::list::WidgetList;
use crate::properties::NodeProperties;
use crate::row::{RowIds, RowState};
use crate::widgets::{TagGroupState, Widget};

/// Header widgets persist no state.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderValue {}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum PersistedWidget {
    Header(HeaderValue),
    TagGroup(TagGroupState),
    Row(RowState),
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PersistedNode {
    #[serde(default)]
    pub properties: NodeProperties,
    #[serde(default)]
    pub widgets: Vec<PersistedWidget>,
}

/// What the host stores on save: the node itself plus the backend bundle,
/// regenerated every time and never edited by hand.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveSnapshot {
    #[serde(flatten)]
    pub node: PersistedNode,
    pub execution_bundle: Vec<BundleEntry>,
}

pub fn serialize(properties: &NodeProperties, widgets: &WidgetList) -> PersistedNode {
    let widgets = widgets
        .widgets()
        .iter()
        .map(|widget| match widget {
            Widget::Header(_) => PersistedWidget::Header(HeaderValue::default()),
            Widget::TagGroup(group) => PersistedWidget::TagGroup(group.state.clone()),
            Widget::Row(row) => PersistedWidget::Row(row.state.clone()),
        })
        .collect();
    PersistedNode {
        properties: properties.clone(),
        widgets,
    }
}

pub fn snapshot(properties: &NodeProperties, widgets: &WidgetList) -> SaveSnapshot {
    SaveSnapshot {
        node: serialize(properties, widgets),
        execution_bundle: execution_bundle(widgets.row_states()),
    }
}

/// Rebuilds widgets from a persisted node. Rows get fresh ids from `ids`.
pub fn restore(node: PersistedNode, ids: &mut RowIds) -> Result<(NodeProperties, WidgetList)> {
    let headers = node
        .widgets
        .iter()
        .filter(|widget| matches!(widget, PersistedWidget::Header(_)))
        .count();
    if headers > 1 {
        return Err(StackError::DuplicateHeader(headers));
    }

    let separate = node.properties.separate_strengths;
    let widgets = node
        .widgets
        .into_iter()
        .map(|widget| match widget {
            PersistedWidget::Header(_) => Widget::header(),
            PersistedWidget::TagGroup(state) => Widget::tag_group(state),
            PersistedWidget::Row(mut state) => {
                state.normalize(separate);
                Widget::row(ids.next_id(), state)
            }
        })
        .collect();
    Ok((node.properties, WidgetList::from_widgets(widgets)))
}

pub fn deserialize_strict(
    payload: &Value,
    ids: &mut RowIds,
) -> Result<(NodeProperties, WidgetList)> {
    let node = PersistedNode::deserialize(payload)?;
    restore(node, ids)
}

pub fn deserialize_str(raw: &str, ids: &mut RowIds) -> Result<(NodeProperties, WidgetList)> {
    let node: PersistedNode = serde_json::from_str(raw)?;
    restore(node, ids)
}

/// Like [`deserialize_strict`], but a missing or malformed payload resets to
/// a lone header with `fallback` properties instead of failing.
pub fn deserialize(
    payload: Option<&Value>,
    fallback: &NodeProperties,
    ids: &mut RowIds,
) -> (NodeProperties, WidgetList) {
    let Some(payload) = payload else {
        return (fallback.clone(), WidgetList::new());
    };
    match deserialize_strict(payload, ids) {
        Ok(restored) => restored,
        Err(error) => {
            warn!(%error, "discarding malformed node payload");
            (fallback.clone(), WidgetList::new())
        }
    }
}
