//! # lora-stack
//!
//! Widget engine for a node that edits an ordered stack of LoRA entries on
//! a host editor's canvas.
//!
//! - `row` - per-entry state, strengths and trigger-word provenance
//! - `widgets` - header, tag group and row widgets with prioritized hit areas
//! - `layout` - vertical layout shared by drawing, hit-testing and resizing
//! - `hit_test` - pointer dispatch to the owning widget and control
//! - `tags` - grouping rows under tag banners, group-scoped moves
//! - `serialization` - persisted node format and save snapshot
//! - `bundle` / `plan` - backend execution bundle and its load plan
//! - `node` - lifecycle entry points over a [`StackHost`]
//! - `testing` - recording headless host for tools and tests

#![cfg_attr(
    test,
    allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)
)]

pub mod bundle;
pub mod config;
pub mod constants;
pub mod error;
pub mod hit_test;
pub mod host;
pub mod layout;
pub mod list;
pub mod node;
pub mod picker;
pub mod plan;
pub mod properties;
pub mod row;
pub mod serialization;
pub mod tags;
pub mod testing;
pub mod widgets;


pub use bundle::{BundleEntry, execution_bundle};
pub use config::{ConfigError, StackConfig};
pub use error::{Result, StackError};
pub use hit_test::Hit;
pub use host::{LookupError, Notice, NoticeLevel, StackHost};
pub use layout::{VisibleWidget, compute_content_height, for_each_visible, visible_widgets};
pub use list::WidgetList;
pub use node::StackNode;
pub use picker::{PickerChoice, PickerConfig, PickerItem, PromptConfig, RequestToken};
pub use plan::{LoadPlan, parse_bundle, parse_legacy_slots, validate_entry};
pub use properties::{NodeProperties, PropertyToggle};
pub use row::{RowId, RowState, StrengthChannel, TriggerStatus};
pub use serialization::{PersistedNode, PersistedWidget, SaveSnapshot};
pub use tags::organize;
pub use widgets::{Command, HitTarget, Phase, Widget, WidgetKind};
