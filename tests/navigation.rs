use brush_switch::item::Binding;
use brush_switch::{
    Brush, Coordinator, EventLog, Group, ItemId, ItemTree, MemoryHost, PresetId, SwitchError, SwitchEvent,
    Trigger,
};
use egui::{Key, KeyboardShortcut, Modifiers};

const NEXT: KeyboardShortcut = KeyboardShortcut::new(Modifiers::NONE, Key::N);
const PREVIOUS: KeyboardShortcut = KeyboardShortcut::new(Modifiers::SHIFT, Key::N);

struct Fixture {
    switcher: Coordinator<MemoryHost>,
    group: ItemId,
    members: Vec<ItemId>,
    outside: ItemId,
}

// Group [b1, [b2], b3] followed by a brush outside the group
fn create_fixture(reset_position: bool) -> Fixture {
    let _ = env_logger::builder().is_test(true).try_init();
    let host = MemoryHost::new()
        .with_preset("b1", 5.0, 1.0)
        .with_preset("b2", 10.0, 1.0)
        .with_preset("b3", 15.0, 1.0)
        .with_preset("outside", 50.0, 1.0);

    let b1 = Brush::new("b1");
    let b2 = Brush::new("b2");
    let b3 = Brush::new("b3");
    let outside = Brush::new("outside");
    let members = vec![b1.id, b2.id, b3.id];
    let outside_id = outside.id;

    let mut group = Group::new("Inking")
        .with_child(b1)
        .with_child(Group::new("Nested").with_child(b2))
        .with_child(b3);
    group.next_shortcut = Some(NEXT);
    group.previous_shortcut = Some(PREVIOUS);
    group.reset_position_on_external_activation = reset_position;
    let group_id = group.id;

    let tree = ItemTree::new(vec![group.into(), outside.into()]).unwrap();
    Fixture {
        switcher: Coordinator::new(host, tree),
        group: group_id,
        members,
        outside: outside_id,
    }
}

#[test]
fn test_next_wraps_around() {
    let Fixture {
        mut switcher,
        group,
        members,
        ..
    } = create_fixture(false);
    let log = EventLog::new();
    switcher.subscribe(Box::new(log.clone()));

    switcher.trigger(Trigger::Next(group)).unwrap();
    assert_eq!(switcher.active_item(), Some(members[0]));
    assert_eq!(switcher.tree().group(group).unwrap().cursor(), Some(0));
    assert_eq!(
        log.take(),
        vec![
            SwitchEvent::GroupCursorChanged { group, index: Some(0) },
            SwitchEvent::ActivationChanged { item: Some(members[0]) },
        ]
    );

    let mut visited = Vec::new();
    for _ in 0..3 {
        switcher.trigger(Trigger::Next(group)).unwrap();
        visited.push(switcher.active_item().unwrap());
    }
    assert_eq!(visited, vec![members[1], members[2], members[0]]);
}

#[test]
fn test_previous_shortcut_starts_from_last() {
    let Fixture {
        mut switcher,
        group,
        members,
        ..
    } = create_fixture(false);

    switcher.trigger(Trigger::Shortcut(PREVIOUS)).unwrap();
    assert_eq!(switcher.active_item(), Some(members[2]));
    switcher.trigger(Trigger::Shortcut(PREVIOUS)).unwrap();
    assert_eq!(switcher.active_item(), Some(members[1]));
    switcher.trigger(Trigger::Shortcut(NEXT)).unwrap();
    assert_eq!(switcher.active_item(), Some(members[2]));
    assert_eq!(switcher.shortcuts().lookup(&NEXT), Some(Binding::GroupNext(group)));
}

#[test]
fn test_navigation_never_toggles_off() {
    let _ = env_logger::builder().is_test(true).try_init();
    let only = Brush::new("b1");
    let only_id = only.id;
    let group = Group::new("Single").with_child(only);
    let group_id = group.id;
    let host = MemoryHost::new().with_preset("b1", 5.0, 1.0);
    let mut switcher = Coordinator::new(host, ItemTree::new(vec![group.into()]).unwrap());

    switcher.trigger(Trigger::Next(group_id)).unwrap();
    switcher.host_mut().clear_calls();
    switcher.trigger(Trigger::Next(group_id)).unwrap();

    assert_eq!(switcher.active_item(), Some(only_id));
    assert!(switcher.host().calls().is_empty());
}

#[test]
fn test_empty_group_reports_group_empty() {
    let _ = env_logger::builder().is_test(true).try_init();
    let brush = Brush::new("b1");
    let empty = Group::new("Empty");
    let empty_id = empty.id;
    let host = MemoryHost::new().with_preset("b1", 5.0, 1.0);
    let mut switcher = Coordinator::new(host, ItemTree::new(vec![brush.into(), empty.into()]).unwrap());

    assert!(matches!(
        switcher.trigger(Trigger::Next(empty_id)),
        Err(SwitchError::GroupEmpty(id)) if id == empty_id
    ));
    assert_eq!(switcher.active_item(), None);
}

#[test]
fn test_position_resumes_after_outside_activation() {
    let Fixture {
        mut switcher,
        group,
        members,
        outside,
    } = create_fixture(false);

    switcher.trigger(Trigger::Next(group)).unwrap();
    switcher.trigger(Trigger::Next(group)).unwrap();
    switcher.trigger(Trigger::Picker(outside)).unwrap();
    switcher.trigger(Trigger::Next(group)).unwrap();

    assert_eq!(switcher.active_item(), Some(members[2]));
}

#[test]
fn test_position_resets_after_outside_activation() {
    let Fixture {
        mut switcher,
        group,
        members,
        outside,
    } = create_fixture(true);
    let log = EventLog::new();
    switcher.subscribe(Box::new(log.clone()));

    switcher.trigger(Trigger::Next(group)).unwrap();
    switcher.trigger(Trigger::Next(group)).unwrap();
    switcher.trigger(Trigger::Picker(outside)).unwrap();
    assert!(log.events().contains(&SwitchEvent::GroupCursorChanged { group, index: None }));

    switcher.trigger(Trigger::Next(group)).unwrap();
    assert_eq!(switcher.active_item(), Some(members[0]));
}

#[test]
fn test_position_resets_when_host_preset_takes_over() {
    let Fixture {
        mut switcher,
        group,
        members,
        ..
    } = create_fixture(true);

    switcher.trigger(Trigger::Next(group)).unwrap();
    switcher.trigger(Trigger::Next(group)).unwrap();
    switcher.host_mut().user_selects_preset("outside");
    switcher
        .trigger(Trigger::HostPresetChanged(Some(PresetId::new("outside"))))
        .unwrap();
    assert_eq!(switcher.active_item(), None);

    switcher.trigger(Trigger::Previous(group)).unwrap();
    assert_eq!(switcher.active_item(), Some(members[2]));
}

#[test]
fn test_picking_a_group_activates_its_current_brush() {
    let Fixture {
        mut switcher,
        group,
        members,
        ..
    } = create_fixture(false);

    switcher.trigger(Trigger::Picker(group)).unwrap();
    assert_eq!(switcher.active_item(), Some(members[0]));

    switcher.trigger(Trigger::Next(group)).unwrap();
    switcher.trigger(Trigger::Next(group)).unwrap();
    switcher.trigger(Trigger::Deactivate).unwrap();
    switcher.trigger(Trigger::Picker(group)).unwrap();
    assert_eq!(switcher.active_item(), Some(members[1]));
}
