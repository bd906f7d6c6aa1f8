//! End-to-end canvas sessions: generate, edit on the canvas, persist, export.

use std::sync::Arc;

use blockdraft::{
    config::AppConfig,
    export::ExportFormat,
    geometry::Point,
    model::{Endpoint, SectionKind},
    reconciler::{CanvasEvent, EntityKind, Target},
    service::DiagramService,
    store::{FileStore, MemoryStore},
};

fn memory_service() -> Arc<DiagramService> {
    Arc::new(DiagramService::new(AppConfig::default(), Arc::new(MemoryStore::new())))
}

#[test]
fn test_recorded_session_is_persisted() {
    let service = memory_service();
    let diagram = service.generate("Smart lamp with battery, button, led and wifi").unwrap();
    let battery = diagram.blocks_in(SectionKind::Power).next().unwrap().id().to_string();
    let led = diagram.blocks_in(SectionKind::Outputs).next().unwrap().id().to_string();

    let events: Vec<CanvasEvent> = serde_json::from_value(serde_json::json!([
        {"type": "move", "target": battery, "x": 20.0, "y": 30.0},
        {"type": "edit_block", "target": battery, "specification": "3.7V LiPo"},
        {"type": "connect", "from": battery, "to": led, "label": "Power"},
        {"type": "add_annotation", "text": "keep under 500mA", "block": led},
    ]))
    .unwrap();

    let (mut canvas, _) = service.open_canvas(diagram.id()).unwrap();
    for event in events {
        canvas.handle(event).expect("event should apply");
    }

    let stored = service.get(diagram.id()).unwrap();
    let block = stored.block(&battery).unwrap();
    assert_eq!(block.position(), Point::new(20.0, 30.0));
    assert_eq!(block.specification(), Some("3.7V LiPo"));

    let added = stored.connections().last().unwrap();
    assert_eq!(added.from(), &Endpoint::Block(battery.clone()));
    assert_eq!(added.to(), &Endpoint::Block(led.clone()));
    assert_eq!(stored.connections().len(), diagram.connections().len() + 1);

    assert_eq!(stored.annotations().len(), 1);
    assert_eq!(stored.annotations()[0].block_id(), Some(led.as_str()));

    let xml = service.export(diagram.id(), ExportFormat::InterchangeFormat).unwrap();
    let xml = String::from_utf8(xml.into_bytes()).unwrap();
    assert_eq!(xml.matches("edge=\"1\"").count(), 1);
}

#[test]
fn test_rederive_without_edits_leaves_model_unchanged() {
    let service = memory_service();
    let diagram = service.generate("Weather station with solar panel and lcd").unwrap();

    let (canvas, _) = service.open_canvas(diagram.id()).unwrap();
    let first = canvas.rederive();
    let second = canvas.rederive();
    assert_eq!(first, second);

    let stored = service.apply(diagram.id(), &first.into()).unwrap();
    assert_eq!(stored.blocks(), diagram.blocks());
    assert_eq!(stored.connections(), diagram.connections());
    assert_eq!(stored.annotations(), diagram.annotations());
}

#[test]
fn test_deleted_block_keeps_its_connections() {
    let service = memory_service();
    let diagram = service.generate("Drone with gps, camera and lipo battery").unwrap();
    let (rebased, _) = service.rebase_connections(diagram.id()).unwrap();
    let first_power = rebased.blocks_in(SectionKind::Power).next().unwrap().id().to_string();

    let (mut canvas, _) = service.open_canvas(diagram.id()).unwrap();
    canvas
        .handle(CanvasEvent::Delete { target: Some(Target::Entity(first_power.clone())) })
        .unwrap();
    assert_eq!(canvas.handle_of(EntityKind::Block, &first_power), None);

    let stored = service.get(diagram.id()).unwrap();
    assert!(stored.block(&first_power).is_none());
    assert_eq!(stored.connections(), rebased.connections());

    // Dangling connections are skipped by the interchange exporter.
    let xml = service.export(diagram.id(), ExportFormat::InterchangeFormat).unwrap();
    let xml = String::from_utf8(xml.into_bytes()).unwrap();
    let dangling = rebased.connections().iter().filter(|c| c.touches_block(&first_power)).count();
    assert_eq!(xml.matches("edge=\"1\"").count(), 6 - dangling);
}

#[test]
fn test_file_store_survives_reopen() {
    let dir = tempfile::tempdir().expect("Failed to create temp directory");
    let id = {
        let store = Arc::new(FileStore::open(dir.path()).unwrap());
        let service = Arc::new(DiagramService::new(AppConfig::default(), store));
        let diagram = service.generate("usb fan with speed knob").unwrap();
        service.update(diagram.id(), &serde_json::json!({"title": "Desk Fan"})).unwrap();
        diagram.id()
    };

    let store = Arc::new(FileStore::open(dir.path()).unwrap());
    let service = DiagramService::new(AppConfig::default(), store);
    let stored = service.get(id).unwrap();
    assert_eq!(stored.title(), "Desk Fan");
    assert_eq!(service.list().unwrap().len(), 1);
}
