use brush_switch::persistence::{SettingsDocument, deserialize_setup_store, serialize_setup_store};
use brush_switch::{
    Brush, Coordinator, EventLog, ImportMode, ItemTree, MemoryHost, SetupId, SwitchError, SwitchEvent,
    ToolProperty, Trigger, TreeCommand,
};

fn create_coordinator() -> Coordinator<MemoryHost> {
    let _ = env_logger::builder().is_test(true).try_init();
    let host = MemoryHost::new()
        .with_preset("Basic-5 Size", 25.0, 1.0)
        .with_preset("Ink-2 Fineliner", 4.0, 0.9);
    let tree = ItemTree::new(vec![
        Brush::new("Basic-5 Size").with_size(40.0).into(),
        Brush::new("Ink-2 Fineliner").into(),
    ])
    .unwrap();
    Coordinator::new(host, tree)
}

#[test]
fn test_apply_restores_saved_tree() {
    let mut switcher = create_coordinator();
    let snapshot = switcher.tree().clone();
    let setup = switcher.save_setup("A", "", "daily inking");

    let first = switcher.tree().first_brush().unwrap().clone();
    switcher
        .edit(TreeCommand::UpdateBrush {
            brush: first.clone().with_size(99.0),
        })
        .unwrap();
    switcher
        .edit(TreeCommand::InsertItem {
            parent: None,
            index: 0,
            item: Brush::new("Ink-2 Fineliner").into(),
        })
        .unwrap();
    assert!(switcher.detect_drift(setup).unwrap());

    switcher.apply_setup(setup).unwrap();
    assert_eq!(switcher.tree(), &snapshot);
    assert!(!switcher.detect_drift(setup).unwrap());
    assert_eq!(switcher.setups().loaded(), Some(setup));
    assert!(!switcher.history().can_undo());
}

#[test]
fn test_apply_deactivates_first() {
    let mut switcher = create_coordinator();
    let setup = switcher.save_setup("A", "", "");
    let first = switcher.tree().first_brush().unwrap().id;
    let log = EventLog::new();
    switcher.subscribe(Box::new(log.clone()));

    switcher.trigger(Trigger::Picker(first)).unwrap();
    switcher.apply_setup(setup).unwrap();

    assert_eq!(switcher.active_item(), None);
    assert_eq!(switcher.host().number(ToolProperty::Size), Some(10.0));
    assert_eq!(
        log.take(),
        vec![
            SwitchEvent::ActivationChanged { item: Some(first) },
            SwitchEvent::ActivationChanged { item: None },
            SwitchEvent::TreeReplaced { setup: Some(setup) },
        ]
    );
}

#[test]
fn test_apply_unknown_setup() {
    let mut switcher = create_coordinator();
    let before = switcher.tree().clone();
    let missing = SetupId::new();
    assert!(matches!(
        switcher.apply_setup(missing),
        Err(SwitchError::SetupNotFound(id)) if id == missing
    ));
    assert_eq!(switcher.tree(), &before);
}

#[test]
fn test_drift_is_broadcast() {
    let mut switcher = create_coordinator();
    let setup = switcher.save_setup("A", "", "");
    let log = EventLog::new();
    switcher.subscribe(Box::new(log.clone()));

    assert!(!switcher.detect_drift(setup).unwrap());
    assert_eq!(
        log.take(),
        vec![SwitchEvent::DriftDetected {
            setup,
            drifted: false
        }]
    );
}

#[test]
fn test_import_append_new_only() {
    let mut source = create_coordinator();
    let a = source.save_setup("A", "", "");
    source.save_setup("B", "", "");
    let exported = source.export_setups().unwrap();

    let mut target = create_coordinator();
    target.save_setup("C", "", "");
    assert_eq!(target.import_setups(&exported, ImportMode::AppendNewOnly).unwrap(), 2);
    assert_eq!(target.setups().len(), 3);

    // already present setups are skipped
    assert_eq!(target.import_setups(&exported, ImportMode::AppendNewOnly).unwrap(), 0);

    // same name, different setup
    let mut other = create_coordinator();
    other.save_setup("A", "", "");
    let colliding = other.export_setups().unwrap();
    assert!(matches!(
        target.import_setups(&colliding, ImportMode::AppendNewOnly),
        Err(SwitchError::SetupNameCollision(name)) if name == "A"
    ));
    assert_eq!(target.setups().len(), 3);
    assert!(target.setups().get(a).is_ok());
}

#[test]
fn test_import_replace_all() {
    let mut source = create_coordinator();
    let a = source.save_setup("A", "", "");
    let exported = source.export_setups().unwrap();

    let mut target = create_coordinator();
    let c = target.save_setup("C", "", "");
    assert_eq!(target.import_setups(&exported, ImportMode::ReplaceAll).unwrap(), 1);

    assert!(target.setups().get(a).is_ok());
    assert!(matches!(target.setups().get(c), Err(SwitchError::SetupNotFound(_))));
    assert_eq!(target.setups().loaded(), None);
}

#[test]
fn test_rename_and_remove() {
    let mut switcher = create_coordinator();
    let setup = switcher.save_setup("A", "", "");
    switcher.rename_setup(setup, "Inking").unwrap();
    assert_eq!(switcher.setups().get(setup).unwrap().name, "Inking");

    switcher.remove_setup(setup).unwrap();
    assert!(switcher.setups().is_empty());
    assert!(matches!(switcher.remove_setup(setup), Err(SwitchError::SetupNotFound(_))));
}

#[test]
fn test_store_and_document_round_trip() {
    let mut switcher = create_coordinator();
    switcher.save_setup("A", "brush-icon", "");
    switcher.save_setup("B", "", "");

    let store = deserialize_setup_store(&serialize_setup_store(switcher.setups()).unwrap()).unwrap();
    assert_eq!(&store, switcher.setups());

    let json = switcher.settings_document().to_json().unwrap();
    let document = SettingsDocument::from_json(&json).unwrap();
    let restored = Coordinator::from_document(MemoryHost::new(), document);
    assert_eq!(restored.tree(), switcher.tree());
    assert_eq!(restored.setups(), switcher.setups());
}

#[test]
fn test_load_tree_replaces_live_tree() {
    let mut source = create_coordinator();
    let first = source.tree().first_brush().unwrap().id;
    let serialized = source.serialize_tree().unwrap();

    let mut target = create_coordinator();
    target.load_tree(&serialized).unwrap();
    assert!(target.tree().contains(first));
    assert_eq!(target.setups().loaded(), None);
}
