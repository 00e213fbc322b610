use va_core::{Alias, FakeOplet};

use super::*;

fn alias(s: &str) -> Alias {
    Alias::new(s).unwrap()
}

#[test]
fn register_then_get_round_trips() {
    let mut registry = OpletRegistry::new();
    let oplet = Arc::new(FakeOplet::new(alias("foo")));
    registry.register(Arc::clone(&oplet)).unwrap();

    assert!(registry.contains(&alias("foo")));
    assert_eq!(registry.get(&alias("foo")).unwrap().alias(), &alias("foo"));
    assert_eq!(registry.len(), 1);
}

#[test]
fn double_registration_is_rejected() {
    let mut registry = OpletRegistry::new();
    registry.register(Arc::new(FakeOplet::new(alias("foo")))).unwrap();

    let err = registry.register(Arc::new(FakeOplet::new(alias("foo")))).unwrap_err();
    assert_eq!(err, RegistryError::AlreadyRegistered(alias("foo")));
}

#[test]
fn unregister_removes_entry() {
    let mut registry = OpletRegistry::new();
    registry.register(Arc::new(FakeOplet::new(alias("foo")))).unwrap();

    let removed = registry.unregister(&alias("foo"));
    assert!(removed.is_some());
    assert!(registry.is_empty());
    assert!(registry.unregister(&alias("foo")).is_none());
}

#[test]
fn assert_invariants_passes_for_consistent_registry() {
    let mut registry = OpletRegistry::new();
    registry.register(Arc::new(FakeOplet::new(alias("foo")))).unwrap();
    registry.register(Arc::new(FakeOplet::new(alias("bar")))).unwrap();
    registry.assert_invariants();
}

#[test]
fn aliases_lists_every_registered_key() {
    let mut registry = OpletRegistry::new();
    registry.register(Arc::new(FakeOplet::new(alias("foo")))).unwrap();
    registry.register(Arc::new(FakeOplet::new(alias("bar")))).unwrap();

    let mut aliases = registry.aliases();
    aliases.sort();
    assert_eq!(aliases, vec![alias("bar"), alias("foo")]);
}
