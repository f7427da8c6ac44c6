use kinship_core::{
    ConnectorRouter, Gender, GenerationIndex, LayoutConfig, LayoutEngine, NewPerson, Person,
    PersonRegistry, Relationships, TreeConfig,
};
use serde_json::json;

fn couple() -> PersonRegistry {
    let mut registry = PersonRegistry::in_memory();
    registry
        .add_person(NewPerson::new("Ahmed").with_id("p1"), 0, "main", Relationships::default())
        .expect("p1 should register");
    registry
        .add_person(
            NewPerson::new("Fatima").with_id("p2").with_gender(Gender::Female),
            0,
            "main",
            Relationships::default().with_spouse("p1"),
        )
        .expect("p2 should register");
    registry
}

#[test]
fn person_serializes_flat_with_snake_case_names() {
    let registry = couple();
    let p2 = registry
        .persons()
        .into_iter()
        .find(|person| person.id.as_str() == "p2")
        .expect("p2 exists");

    let value = serde_json::to_value(p2).expect("person should serialize");
    assert_eq!(value["id"], "p2");
    assert_eq!(value["name"], "Fatima");
    assert_eq!(value["gender"], "female");
    assert_eq!(value["family_unit"], "main");
    assert_eq!(value["generation"], 0);
    assert_eq!(value["relationships"]["spouse"], "p1");
    assert_eq!(value["relationships"]["parents"], json!([]));
}

#[test]
fn person_json_reads_back_with_defaults() {
    let person: Person = serde_json::from_value(json!({
        "id": "p9",
        "name": "Mariam",
        "generation": 1,
        "family_unit": "main_children"
    }))
    .expect("minimal person should deserialize");

    assert_eq!(person.details.gender, Gender::Unknown);
    assert_eq!(person.details.birth_year, None);
    assert!(person.relationships.is_empty());
}

#[test]
fn layout_and_connectors_use_snake_case_tags() {
    let registry = couple();
    let config = LayoutConfig::default();
    let layout = LayoutEngine::new(config.clone())
        .compute(&GenerationIndex::rebuild(&registry), &registry)
        .expect("layout should succeed");
    let connectors = ConnectorRouter::new(&config)
        .route(&layout, &registry)
        .expect("routing should succeed");

    let layout_json = serde_json::to_value(&layout).expect("layout should serialize");
    assert_eq!(layout_json["boxes"][0]["role"], "couple");
    assert_eq!(layout_json["boxes"][0]["person_id"], "p1");
    assert!(layout_json.get("lookup").is_none());

    let line_json = serde_json::to_value(&connectors[0]).expect("connector should serialize");
    assert_eq!(line_json["kind"], "marriage");
    assert_eq!(line_json["length"], 100.0);
    assert_eq!(line_json["family_unit"], serde_json::Value::Null);
}

#[test]
fn partial_config_json_keeps_defaults() {
    let config: TreeConfig = serde_json::from_value(json!({
        "stagger_delay_ms": 10,
        "layout": { "max_siblings_per_row": 4 }
    }))
    .expect("partial config should deserialize");

    assert_eq!(config.stagger_delay_ms, 10);
    assert_eq!(config.rearrange_duration_ms, 800);
    assert_eq!(config.layout.max_siblings_per_row, 4);
    assert_eq!(config.layout.person_width, 200.0);
    assert_eq!(config.layout.center.x, 2000.0);
}
