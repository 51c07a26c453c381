use anyhow::{Context, Result};
use lora_canvas::{InputEvent, Modifiers, MouseButton, PaintContext, Point, Size};
use lora_stack::testing::RecordingHost;
use lora_stack::{
    Command, HitTarget, LookupError, NoticeLevel, Phase, PickerChoice, PropertyToggle,
    RequestToken, RowId, StackConfig, StackNode, StrengthChannel, TriggerStatus, WidgetKind,
    visible_widgets,
};
use serde_json::json;

fn words(items: &[&str]) -> Vec<String> {
    items.iter().map(ToString::to_string).collect()
}

fn last_trigger_token(host: &RecordingHost) -> Result<RequestToken> {
    host.last_trigger_request()
        .map(|(token, _)| *token)
        .context("no trigger word request")
}

fn last_picker_token(host: &RecordingHost) -> Result<RequestToken> {
    host.last_picker()
        .map(|(token, _)| *token)
        .context("no picker request")
}

fn last_prompt_token(host: &RecordingHost) -> Result<RequestToken> {
    host.last_prompt()
        .map(|(token, _)| *token)
        .context("no prompt request")
}

fn single_row(node: &mut StackNode, host: &mut RecordingHost, selection: &str) -> Result<RowId> {
    node.add_loras(host, &[selection.to_string()])
        .first()
        .copied()
        .context("row was not added")
}

/// Node-space centre of `target` on the widget at `index`, as last drawn.
fn control_center(node: &StackNode, index: usize, target: HitTarget) -> Result<Point> {
    let top = visible_widgets(node.widgets().widgets(), node.tagging(), node.size().width)
        .into_iter()
        .find(|visible| visible.index == index)
        .context("widget not visible")?
        .top;
    let center = node.widgets().widgets()[index]
        .hit_areas()
        .bounds(target)
        .context("control has no bounds")?
        .center();
    Ok(Point::new(center.x, center.y + top))
}

#[test]
fn trigger_words_for_a_removed_row_are_dropped() -> Result<()> {
    let mut host = RecordingHost::default();
    let mut node = StackNode::new(StackConfig::default());
    let id = single_row(&mut node, &mut host, "ink.safetensors")?;
    let token = last_trigger_token(&host)?;

    node.execute(&mut host, Command::Remove(id));
    node.resolve_trigger_words(&mut host, token, Ok(words(&["ink"])));

    assert!(node.row(id).is_none());
    assert_eq!(node.pending_requests(), 0);
    assert!(node.bundle().is_empty());
    Ok(())
}

#[test]
fn trigger_words_for_a_replaced_selection_are_dropped() -> Result<()> {
    let mut host = RecordingHost::with_catalog(&["a.safetensors", "b.safetensors"]);
    let mut node = StackNode::new(StackConfig::default());
    let id = single_row(&mut node, &mut host, "a.safetensors")?;
    let stale = last_trigger_token(&host)?;

    node.execute(&mut host, Command::ChangeLora(id));
    let picker = last_picker_token(&host)?;
    node.resolve_picker(&mut host, picker, PickerChoice::One("b.safetensors".to_string()));
    let fresh = last_trigger_token(&host)?;
    assert_ne!(stale, fresh);

    node.resolve_trigger_words(&mut host, stale, Ok(words(&["old"])));
    let row = node.row(id).context("row missing")?;
    assert_eq!(row.selection, "b.safetensors");
    assert!(row.trigger_text.is_empty());

    node.resolve_trigger_words(&mut host, fresh, Ok(words(&["new"])));
    let row = node.row(id).context("row missing")?;
    assert_eq!(row.trigger_text, "new");
    assert_eq!(row.trigger_status(), TriggerStatus::Auto);
    Ok(())
}

#[test]
fn manual_trigger_words_survive_auto_fetch_until_refetch() -> Result<()> {
    let mut host = RecordingHost::default();
    let mut node = StackNode::new(StackConfig::default());
    let id = single_row(&mut node, &mut host, "ink.safetensors")?;
    let auto = last_trigger_token(&host)?;

    node.execute(&mut host, Command::EditTriggerWords(id));
    let prompt = last_prompt_token(&host)?;
    node.resolve_prompt(&mut host, prompt, Some("  my words ".to_string()));
    node.resolve_trigger_words(&mut host, auto, Ok(words(&["auto"])));

    let row = node.row(id).context("row missing")?;
    assert_eq!(row.trigger_text, "my words");
    assert_eq!(row.trigger_status(), TriggerStatus::Edited);

    node.execute(&mut host, Command::RefetchTriggerWords(id));
    let refetch = last_trigger_token(&host)?;
    node.resolve_trigger_words(&mut host, refetch, Ok(words(&["fresh", " ", "wash"])));

    let row = node.row(id).context("row missing")?;
    assert_eq!(row.trigger_text, "fresh, wash");
    assert!(row.auto_populated);
    Ok(())
}

#[test]
fn failed_lookup_marks_the_row_and_notifies() -> Result<()> {
    let mut host = RecordingHost::default();
    let mut node = StackNode::new(StackConfig::default());
    let id = single_row(&mut node, &mut host, "ink.safetensors")?;
    let token = last_trigger_token(&host)?;

    node.resolve_trigger_words(
        &mut host,
        token,
        Err(LookupError::Failed("offline".to_string())),
    );

    let row = node.row(id).context("row missing")?;
    assert!(row.fetch_attempted);
    assert_eq!(row.trigger_status(), TriggerStatus::AttemptedEmpty);
    let notice = host.notices.last().context("no notice")?;
    assert_eq!(notice.level, NoticeLevel::Warning);
    Ok(())
}

#[test]
fn auto_fetch_is_skipped_when_disabled() {
    let mut host = RecordingHost::default();
    let mut config = StackConfig::default();
    config.defaults.auto_fetch_trigger_words = false;
    let mut node = StackNode::new(config);

    node.add_loras(&mut host, &words(&["ink.safetensors"]));
    assert!(host.trigger_requests.is_empty());
    assert_eq!(node.pending_requests(), 0);
}

#[test]
fn saved_set_loads_into_another_node() -> Result<()> {
    let mut host = RecordingHost::default();
    let mut source = StackNode::new(StackConfig::default());
    source.add_loras(&mut host, &words(&["a.safetensors", "b.safetensors"]));
    let first = source.row_ids()[0];
    source.execute(&mut host, Command::ToggleEnabled(first));

    source.execute(&mut host, Command::SaveTemplate);
    let prompt = last_prompt_token(&host)?;
    source.resolve_prompt(&mut host, prompt, Some(" portraits ".to_string()));
    assert_eq!(host.saved.len(), 1);
    assert_eq!(host.saved[0].0, "portraits");

    let mut target = StackNode::new(StackConfig::default());
    target.add_loras(&mut host, &words(&["c.safetensors"]));
    target.execute(&mut host, Command::LoadTemplate);
    let picker = last_picker_token(&host)?;
    target.resolve_picker(&mut host, picker, PickerChoice::One("portraits".to_string()));

    let (token, name) = host
        .last_template_request()
        .cloned()
        .context("no template request")?;
    assert_eq!(name, "portraits");
    let entries = host.templates.get(&name).cloned().context("set missing")?;
    target.resolve_template(&mut host, token, Ok(entries));

    assert_eq!(target.bundle(), source.bundle());
    assert!(!target.bundle()[0].enabled);
    Ok(())
}

#[test]
fn save_failures_and_empty_stacks_notify() -> Result<()> {
    let mut host = RecordingHost::default();
    let mut node = StackNode::new(StackConfig::default());

    node.execute(&mut host, Command::SaveTemplate);
    assert!(host.prompts.is_empty());
    assert_eq!(
        host.notices.last().map(|notice| notice.level),
        Some(NoticeLevel::Warning)
    );

    node.add_loras(&mut host, &words(&["a.safetensors"]));
    host.fail_saves = true;
    node.execute(&mut host, Command::SaveTemplate);
    let prompt = last_prompt_token(&host)?;
    node.resolve_prompt(&mut host, prompt, Some("set".to_string()));

    assert!(host.saved.is_empty());
    assert_eq!(
        host.notices.last().map(|notice| notice.level),
        Some(NoticeLevel::Error)
    );
    Ok(())
}

#[test]
fn load_failure_keeps_existing_rows() -> Result<()> {
    let mut host = RecordingHost::default();
    host.templates.insert("set".to_string(), Vec::new());
    let mut node = StackNode::new(StackConfig::default());
    node.add_loras(&mut host, &words(&["a.safetensors"]));

    node.execute(&mut host, Command::LoadTemplate);
    let picker = last_picker_token(&host)?;
    node.resolve_picker(&mut host, picker, PickerChoice::One("set".to_string()));
    let (token, _) = host
        .last_template_request()
        .cloned()
        .context("no template request")?;
    node.resolve_template(&mut host, token, Err(LookupError::NotFound("set".to_string())));

    assert_eq!(node.bundle().len(), 1);
    assert_eq!(
        host.notices.last().map(|notice| notice.level),
        Some(NoticeLevel::Error)
    );
    Ok(())
}

#[test]
fn settings_picker_flips_chosen_properties() -> Result<()> {
    let mut host = RecordingHost::default();
    let mut node = StackNode::new(StackConfig::default());
    node.add_loras(&mut host, &words(&["a.safetensors"]));

    node.execute(&mut host, Command::OpenSettings);
    let (token, config) = host.last_picker().cloned().context("no settings picker")?;
    let tags = config
        .item(PropertyToggle::EnableTags.id())
        .context("tag toggle missing")?;
    assert!(tags.label.starts_with("[ ]"));

    node.resolve_picker(
        &mut host,
        token,
        PickerChoice::Many(vec![
            PropertyToggle::EnableTags.id().to_string(),
            PropertyToggle::ShowMoveArrows.id().to_string(),
            "unknown".to_string(),
        ]),
    );

    assert!(node.tagging());
    assert!(!node.properties().show_move_arrows);
    assert_eq!(node.widgets().count(WidgetKind::TagGroup), 1);
    Ok(())
}

#[test]
fn toggle_all_disables_then_enables() {
    let mut host = RecordingHost::default();
    let mut node = StackNode::new(StackConfig::default());
    node.add_loras(&mut host, &words(&["a.safetensors", "b.safetensors"]));
    let first = node.row_ids()[0];
    node.execute(&mut host, Command::ToggleEnabled(first));

    node.execute(&mut host, Command::ToggleAll);
    assert!(node.bundle().iter().all(|entry| !entry.enabled));

    node.execute(&mut host, Command::ToggleAll);
    assert!(node.bundle().iter().all(|entry| entry.enabled));
}

#[test]
fn configure_restores_saved_payload_and_resets_malformed_ones() -> Result<()> {
    let mut host = RecordingHost::default();
    let mut source = StackNode::new(StackConfig::default());
    source.set_property(&mut host, PropertyToggle::EnableTags, true);
    source.add_loras(&mut host, &words(&["a.safetensors", "b.safetensors"]));
    let saved = serde_json::to_value(source.on_serialize())?;
    assert_eq!(saved["executionBundle"].as_array().map(Vec::len), Some(2));

    let mut node = StackNode::new(StackConfig::default());
    node.on_configure(&mut host, Some(&saved));
    assert!(node.tagging());
    assert_eq!(node.bundle(), source.bundle());

    node.on_configure(&mut host, Some(&json!({"widgets": "not a list"})));
    assert_eq!(node.widgets().widgets().len(), 1);
    assert_eq!(node.widgets().count(WidgetKind::Header), 1);
    assert!(!node.tagging());

    let doubled = json!({"widgets": [
        {"type": "header", "value": {}},
        {"type": "header", "value": {}}
    ]});
    node.on_configure(&mut host, Some(&doubled));
    assert_eq!(node.widgets().widgets().len(), 1);
    Ok(())
}

#[test]
fn configure_applies_strength_rules_to_saved_rows() -> Result<()> {
    let mut host = RecordingHost::default();
    let mut node = StackNode::new(StackConfig::default());
    let saved = json!({"widgets": [
        {"type": "header", "value": {}},
        {"type": "row", "value": {"lora": "ink.safetensors", "strength": 0.5}},
        {"type": "row", "value": {"lora": "big.safetensors", "strength": 42.0, "strengthClip": -3.0}}
    ]});
    node.on_configure(&mut host, Some(&saved));

    let bundle = node.bundle();
    assert_eq!(bundle.len(), 2);
    assert_eq!(
        (bundle[0].strength_primary, bundle[0].strength_secondary),
        (0.5, 0.5)
    );
    assert_eq!(
        (bundle[1].strength_primary, bundle[1].strength_secondary),
        (10.0, 10.0)
    );
    Ok(())
}

#[test]
fn pointer_events_reach_drawn_controls() -> Result<()> {
    let mut host = RecordingHost::with_catalog(&["a.safetensors", "b.safetensors"]);
    let mut node = StackNode::new(StackConfig::default());
    let id = single_row(&mut node, &mut host, "a.safetensors")?;
    let index = node.widgets().index_of(id).context("row index")?;
    node.on_draw(&mut PaintContext::new());

    let toggle = control_center(&node, index, HitTarget::Toggle)?;
    let right = InputEvent::MouseDown {
        button: MouseButton::Right,
        x: toggle.x,
        y: toggle.y,
        modifiers: Modifiers::default(),
    };
    assert!(!node.on_pointer_down(&mut host, &right));

    let left = InputEvent::MouseDown {
        button: MouseButton::Left,
        x: toggle.x,
        y: toggle.y,
        modifiers: Modifiers::default(),
    };
    assert!(node.on_pointer_down(&mut host, &left));
    assert!(!node.row(id).context("row missing")?.enabled);

    let step_up = control_center(&node, index, HitTarget::StepUp(StrengthChannel::Primary))?;
    assert!(node.on_pointer_down(
        &mut host,
        &InputEvent::MouseDown {
            button: MouseButton::Left,
            x: step_up.x,
            y: step_up.y,
            modifiers: Modifiers::default(),
        }
    ));
    assert_eq!(node.row(id).context("row missing")?.strength_primary, 1.05);

    let pickers = host.pickers.len();
    let label = control_center(&node, index, HitTarget::Label)?;
    assert!(node.on_pointer_down(
        &mut host,
        &InputEvent::DoubleClick {
            x: label.x,
            y: label.y,
        }
    ));
    assert_eq!(host.pickers.len(), pickers + 1);

    assert!(!node.on_activate(&mut host, Point::new(5.0, 5000.0)));
    Ok(())
}

#[test]
fn resize_requests_follow_content_height() {
    let mut host = RecordingHost::default();
    let mut node = StackNode::new(StackConfig::default());
    node.on_create(&mut host);
    let sizes = host.sizes.len();

    node.add_loras(&mut host, &words(&["a.safetensors"]));
    assert_eq!(host.sizes.len(), sizes + 1);
    assert_eq!(node.size().height, node.content_height());

    let first = node.row_ids()[0];
    let redraws = host.redraws.len();
    node.execute(&mut host, Command::ToggleEnabled(first));
    assert_eq!(host.sizes.len(), sizes + 1);
    assert!(host.redraws.len() > redraws);

    node.on_resize(&mut host, Size::new(100.0, 900.0));
    assert_eq!(node.size().width, node.config().layout.min_width);
    assert_eq!(node.size().height, node.content_height());
}

#[test]
fn banner_press_collapses_and_expands_its_group() -> Result<()> {
    let mut host = RecordingHost::default();
    let mut config = StackConfig::default();
    config.defaults.enable_tags = true;
    let mut node = StackNode::new(config);
    node.add_loras(&mut host, &words(&["a.safetensors", "b.safetensors"]));
    node.on_draw(&mut PaintContext::new());

    let banner = node
        .widgets()
        .widgets()
        .iter()
        .position(|widget| widget.kind() == WidgetKind::TagGroup)
        .context("no banner")?;
    let open_height = node.content_height();
    let press = control_center(&node, banner, HitTarget::Banner)?;

    assert!(node.dispatch(&mut host, press, Phase::Press));
    assert!(node.content_height() < open_height);
    let visible = visible_widgets(node.widgets().widgets(), true, node.size().width);
    assert!(
        visible
            .iter()
            .all(|v| node.widgets().widgets()[v.index].kind() != WidgetKind::Row)
    );
    assert_eq!(node.bundle().len(), 2);

    assert!(node.dispatch(&mut host, press, Phase::Press));
    assert_eq!(node.content_height(), open_height);
    Ok(())
}
