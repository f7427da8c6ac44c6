use kinship_core::{
    Connector, ConnectorKind, ConnectorRouter, GenerationIndex, LayoutConfig, LayoutEngine,
    NewPerson, PersonId, PersonRegistry, Point, Relationships,
};

fn add(
    registry: &mut PersonRegistry,
    person: &str,
    generation: i32,
    unit: &str,
    relationships: Relationships,
) {
    registry
        .add_person(NewPerson::new(person).with_id(person), generation, unit, relationships)
        .expect("person should register");
}

fn route(registry: &PersonRegistry) -> Vec<Connector> {
    let config = LayoutConfig::default();
    let layout = LayoutEngine::new(config.clone())
        .compute(&GenerationIndex::rebuild(registry), registry)
        .expect("layout should succeed");
    ConnectorRouter::new(&config)
        .route(&layout, registry)
        .expect("routing should succeed")
}

fn of_kind(connectors: &[Connector], kind: ConnectorKind) -> Vec<&Connector> {
    connectors.iter().filter(|line| line.kind == kind).collect()
}

#[test]
fn lone_root_has_no_lines() {
    let mut registry = PersonRegistry::in_memory();
    add(&mut registry, "p1", 0, "main", Relationships::default());
    assert!(route(&registry).is_empty());
}

#[test]
fn couple_gets_exactly_one_marriage_line_between_inner_edges() {
    let mut registry = PersonRegistry::in_memory();
    add(&mut registry, "p1", 0, "main", Relationships::default());
    add(&mut registry, "p2", 0, "main", Relationships::default().with_spouse("p1"));

    let connectors = route(&registry);
    assert_eq!(connectors.len(), 1);
    let marriage = &connectors[0];
    assert_eq!(marriage.kind, ConnectorKind::Marriage);
    assert_eq!(marriage.from, PersonId::from("p1"));
    assert_eq!(marriage.to, PersonId::from("p2"));
    assert_eq!(marriage.start, Point::new(1950.0, 1550.0));
    assert_eq!(marriage.end, Point::new(2050.0, 1550.0));
    assert_eq!(marriage.length, 100.0);
}

#[test]
fn marriage_line_count_ignores_registration_order() {
    let mut forward = PersonRegistry::in_memory();
    add(&mut forward, "p1", 0, "main", Relationships::default());
    add(&mut forward, "p2", 0, "main", Relationships::default().with_spouse("p1"));

    let mut backward = PersonRegistry::in_memory();
    add(&mut backward, "p2", 0, "main", Relationships::default());
    add(&mut backward, "p1", 0, "main", Relationships::default().with_spouse("p2"));

    assert_eq!(of_kind(&route(&forward), ConnectorKind::Marriage).len(), 1);
    assert_eq!(of_kind(&route(&backward), ConnectorKind::Marriage).len(), 1);
}

#[test]
fn couple_sharing_a_unit_with_siblings_keeps_its_marriage_line() {
    let mut registry = PersonRegistry::in_memory();
    add(&mut registry, "p1", 0, "main", Relationships::default());
    add(&mut registry, "p3", 0, "main", Relationships::default().with_sibling("p1"));
    add(&mut registry, "p4", 0, "main", Relationships::default().with_sibling("p1"));
    add(&mut registry, "p2", 0, "main", Relationships::default().with_spouse("p1"));

    let connectors = route(&registry);
    assert_eq!(connectors.len(), 2);

    let marriages = of_kind(&connectors, ConnectorKind::Marriage);
    assert_eq!(marriages.len(), 1);
    assert_eq!(marriages[0].from, PersonId::from("p1"));
    assert_eq!(marriages[0].to, PersonId::from("p2"));
    assert_eq!(marriages[0].start, Point::new(1650.0, 1550.0));
    assert_eq!(marriages[0].end, Point::new(1750.0, 1550.0));

    let brackets = of_kind(&connectors, ConnectorKind::Sibling);
    assert_eq!(brackets.len(), 1);
    assert_eq!(brackets[0].from, PersonId::from("p3"));
    assert_eq!(brackets[0].to, PersonId::from("p4"));
    assert_eq!(brackets[0].start, Point::new(2150.0, 1460.0));
    assert!(!brackets[0].involves(&PersonId::from("p2")));
}

#[test]
fn child_gets_one_line_per_listed_parent() {
    let mut registry = PersonRegistry::in_memory();
    add(&mut registry, "p1", 0, "main", Relationships::default());
    add(&mut registry, "p2", 0, "main", Relationships::default().with_spouse("p1"));
    add(
        &mut registry,
        "p3",
        1,
        "main_children",
        Relationships::default().with_parent("p1").with_parent("p2"),
    );

    let connectors = route(&registry);
    let parent_lines = of_kind(&connectors, ConnectorKind::ParentChild);
    assert_eq!(parent_lines.len(), 2);
    assert_eq!(connectors[0].kind, ConnectorKind::Marriage);

    let from_p1 = parent_lines[0];
    assert_eq!(from_p1.from, PersonId::from("p1"));
    assert_eq!(from_p1.start, Point::new(1850.0, 1600.0));
    assert_eq!(from_p1.end, Point::new(2000.0, 1700.0));
}

#[test]
fn sibling_bracket_spans_outermost_siblings_above_top_row() {
    let mut registry = PersonRegistry::in_memory();
    for n in 0..8 {
        add(&mut registry, &format!("s{n}"), 0, "main", Relationships::default());
    }

    let connectors = route(&registry);
    assert_eq!(connectors.len(), 1);
    let bracket = &connectors[0];
    assert_eq!(bracket.kind, ConnectorKind::Sibling);
    assert_eq!(bracket.family_unit.as_ref().map(|unit| unit.as_str()), Some("main"));
    assert_eq!(bracket.start, Point::new(1250.0, 1460.0));
    assert_eq!(bracket.end, Point::new(2750.0, 1460.0));
}

#[test]
fn single_child_gets_no_bracket() {
    let mut registry = PersonRegistry::in_memory();
    add(&mut registry, "p1", 0, "main", Relationships::default());
    add(&mut registry, "p3", 1, "main_children", Relationships::default().with_parent("p1"));

    let connectors = route(&registry);
    assert!(of_kind(&connectors, ConnectorKind::Sibling).is_empty());
    assert!(connectors[0].involves(&PersonId::from("p3")));
}
