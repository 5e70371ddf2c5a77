use crate::{
    BadgeConfig, BadgeReference, BadgeStore, Error, MemoryBadgeStore, resolve_badge,
    resolve_fragments,
};

const SHARED: &str = r#"<svg width="100px" height="100px"><g id="shared"/></svg>"#;
const OWNED: &str = r#"<svg width="200px" height="100px"><g id="owned"/></svg>"#;

fn store() -> MemoryBadgeStore {
    let store = MemoryBadgeStore::new();
    store.put("-default", "rust", SHARED).unwrap();
    store.put("-default", "go", SHARED).unwrap();
    store.put("alice", "rust", OWNED).unwrap();
    store
}

#[test]
fn owner_scope_takes_precedence() {
    let config = BadgeConfig::default();
    let found = resolve_badge(&store(), &BadgeReference::new(Some("alice"), "rust"), &config)
        .unwrap();
    assert_eq!(found.scope, "alice");
    assert_eq!(found.bytes, OWNED.as_bytes());
}

#[test]
fn missing_owner_badge_falls_back_to_default_scope() {
    let config = BadgeConfig::default();
    let found =
        resolve_badge(&store(), &BadgeReference::new(Some("alice"), "go"), &config).unwrap();
    assert_eq!(found.scope, "-default");

    let found = resolve_badge(&store(), &BadgeReference::new(None, "rust"), &config).unwrap();
    assert_eq!(found.scope, "-default");
}

#[test]
fn unknown_badge_is_not_found() {
    let config = BadgeConfig::default();
    let err = resolve_badge(&store(), &BadgeReference::new(Some("bob"), "zig"), &config)
        .unwrap_err();
    assert!(matches!(err, Error::FragmentNotFound { ref name } if name == "zig"));
}

#[test]
fn resolve_fragments_keeps_request_order() {
    let config = BadgeConfig::default();
    let refs = [
        BadgeReference::new(Some("alice"), "rust"),
        BadgeReference::new(Some("alice"), "go"),
    ];
    let fragments = resolve_fragments(&store(), &refs, &config).unwrap();
    assert_eq!(fragments.len(), 2);
    assert_eq!(fragments[0].width(), 200.0);
    assert_eq!(fragments[1].width(), 100.0);
}

#[test]
fn list_is_scoped_and_sorted() {
    assert_eq!(store().list("-default").unwrap(), vec!["go", "rust"]);
    assert_eq!(store().list("alice").unwrap(), vec!["rust"]);
    assert!(store().list("nobody").unwrap().is_empty());
}

#[test]
fn remove_only_touches_one_scope() {
    let store = store();
    assert!(store.remove("alice", "rust").unwrap());
    assert!(!store.remove("alice", "rust").unwrap());
    assert!(store.contains("-default", "rust").unwrap());

    let found = resolve_badge(
        &store,
        &BadgeReference::new(Some("alice"), "rust"),
        &BadgeConfig::default(),
    )
    .unwrap();
    assert_eq!(found.scope, "-default");
}
