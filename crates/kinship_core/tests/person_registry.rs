use kinship_core::{
    Gender, NewPerson, PersonDetails, PersonId, PersonRegistry, PersonValidationError,
    RegistryError, RelationKind, Relationships,
};

fn id(value: &str) -> PersonId {
    PersonId::from(value)
}

fn family() -> PersonRegistry {
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
        .add_person(
            NewPerson::new("Omar").with_id("p3"),
            1,
            "main_children",
            Relationships::default().with_parent("p1").with_parent("p2"),
        )
        .expect("p3 should register");
    registry
}

#[test]
fn add_person_links_relationships_on_both_ends() {
    let registry = family();

    let p1 = registry.get_person(&id("p1")).expect("p1 exists");
    let p2 = registry.get_person(&id("p2")).expect("p2 exists");
    let p3 = registry.get_person(&id("p3")).expect("p3 exists");

    assert_eq!(p1.spouse(), Some(&id("p2")));
    assert_eq!(p2.spouse(), Some(&id("p1")));
    assert!(p1.is_married_to(p2));
    assert_eq!(p1.relationships.children, vec![id("p3")]);
    assert_eq!(p2.relationships.children, vec![id("p3")]);
    assert_eq!(p3.relationships.parents, vec![id("p1"), id("p2")]);
    assert!(registry.dangling_references().is_empty());
}

#[test]
fn add_person_rejects_blank_name_and_writes_nothing() {
    let mut registry = PersonRegistry::in_memory();
    let err = registry
        .add_person(NewPerson::new("   "), 0, "main", Relationships::default())
        .expect_err("blank name must fail");

    assert_eq!(err, RegistryError::Validation(PersonValidationError::EmptyName));
    assert!(registry.is_empty());
}

#[test]
fn add_person_rejects_bad_references_before_writing() {
    let mut registry = family();

    let unknown = registry
        .add_person(
            NewPerson::new("Layla").with_id("p4"),
            1,
            "main_children",
            Relationships::default().with_sibling("p3").with_parent("ghost"),
        )
        .expect_err("unknown relative must fail");
    assert_eq!(unknown, RegistryError::UnknownRelative(id("ghost")));

    let own = registry
        .add_person(
            NewPerson::new("Layla").with_id("p4"),
            1,
            "main_children",
            Relationships::default().with_sibling("p4"),
        )
        .expect_err("self relation must fail");
    assert_eq!(own, RegistryError::SelfRelation(id("p4")));

    let conflicting = registry
        .add_person(
            NewPerson::new("Layla").with_id("p4"),
            1,
            "main_children",
            Relationships::default().with_parent("p1").with_child("p1"),
        )
        .expect_err("parent and child at once must fail");
    assert_eq!(conflicting, RegistryError::ConflictingRelation(id("p1")));

    assert!(!registry.contains(&id("p4")));
    let p3 = registry.get_person(&id("p3")).expect("p3 exists");
    assert!(p3.relationships.siblings.is_empty());
}

#[test]
fn duplicate_and_blank_ids_are_rejected() {
    let mut registry = family();

    let duplicate = registry
        .add_person(NewPerson::new("Other").with_id(" p1 "), 0, "main", Relationships::default())
        .expect_err("duplicate id must fail");
    assert_eq!(duplicate, RegistryError::DuplicateId(id("p1")));

    let blank = registry
        .add_person(NewPerson::new("Other").with_id("  "), 0, "main", Relationships::default())
        .expect_err("blank id must fail");
    assert_eq!(blank, RegistryError::Validation(PersonValidationError::BlankId));
    assert_eq!(registry.len(), 3);
}

#[test]
fn generated_ids_are_unique_and_prefixed() {
    let mut registry = PersonRegistry::in_memory();
    let first = registry
        .add_person(NewPerson::new("A"), 0, "main", Relationships::default())
        .expect("first should register");
    let second = registry
        .add_person(NewPerson::new("B"), 0, "main", Relationships::default())
        .expect("second should register");

    assert_ne!(first.id, second.id);
    assert!(first.id.as_str().starts_with("person_"));
}

#[test]
fn delete_scrubs_every_back_reference() {
    let mut registry = family();
    registry
        .link(RelationKind::Sibling, &id("p3"), &id("p1"))
        .expect("link should succeed");

    assert!(registry.delete_person(&id("p1")));

    assert!(registry.get_person(&id("p1")).is_none());
    let p2 = registry.get_person(&id("p2")).expect("p2 exists");
    let p3 = registry.get_person(&id("p3")).expect("p3 exists");
    assert_eq!(p2.spouse(), None);
    assert_eq!(p3.relationships.parents, vec![id("p2")]);
    assert!(p3.relationships.siblings.is_empty());
    assert!(registry.dangling_references().is_empty());
}

#[test]
fn unknown_ids_are_lenient_no_ops() {
    let mut registry = family();

    assert!(!registry.delete_person(&id("ghost")));
    assert!(!registry
        .edit_person(&id("ghost"), PersonDetails::new("Nobody"))
        .expect("unknown edit is not an error"));
    assert!(registry.get_person(&id("ghost")).is_none());
    assert_eq!(registry.len(), 3);
}

#[test]
fn edit_replaces_details_and_keeps_relationships() {
    let mut registry = family();
    let details = PersonDetails::new("  Ahmed bin Rashid ")
        .with_birth_year(1950)
        .with_title("Sheikh");

    assert!(registry
        .edit_person(&id("p1"), details)
        .expect("edit should succeed"));

    let p1 = registry.get_person(&id("p1")).expect("p1 exists");
    assert_eq!(p1.name(), "Ahmed bin Rashid");
    assert_eq!(p1.details.birth_year, Some(1950));
    assert_eq!(p1.details.title.as_deref(), Some("Sheikh"));
    assert_eq!(p1.spouse(), Some(&id("p2")));

    let reversed = PersonDetails::new("Ahmed")
        .with_birth_year(1950)
        .with_death_year(1940);
    let err = registry
        .edit_person(&id("p1"), reversed)
        .expect_err("reversed lifespan must fail");
    assert!(matches!(
        err,
        RegistryError::Validation(PersonValidationError::InvalidLifespan { .. })
    ));
}

#[test]
fn relinking_is_idempotent() {
    let mut registry = family();
    registry
        .link(RelationKind::ParentOf, &id("p1"), &id("p3"))
        .expect("relink should succeed");
    registry
        .link(RelationKind::Spouse, &id("p2"), &id("p1"))
        .expect("relink should succeed");

    let p1 = registry.get_person(&id("p1")).expect("p1 exists");
    let p3 = registry.get_person(&id("p3")).expect("p3 exists");
    assert_eq!(p1.relationships.children, vec![id("p3")]);
    assert_eq!(p3.relationships.parents, vec![id("p1"), id("p2")]);
    assert_eq!(p1.spouse(), Some(&id("p2")));
}

#[test]
fn persons_iterate_in_registration_order() {
    let registry = family();
    let ids: Vec<&str> = registry
        .persons()
        .iter()
        .map(|person| person.id.as_str())
        .collect();
    assert_eq!(ids, vec!["p1", "p2", "p3"]);
}
