use std::collections::HashSet;

use hyformula::{
    connector::{Connector, Preferences},
    registry::Registry,
};
use uuid::Uuid;

const CONJUNCTION_UID: &str = "2b1b1e1c-6c4f-4c47-9a1e-5a0f3e1d2c3b";

#[test]
fn declaring_the_same_uid_returns_the_same_instance() {
    let registry = Registry::default();
    let uid = Uuid::new_v4();
    let a = registry.declare(Some(uid), "and");
    let b = registry.declare(Some(uid), "∧");
    assert!(a.ptr_eq(&b));
    assert_eq!(b.fallback_label(), "and");
    assert_eq!(registry.connector_count(), 1);
}

#[test]
fn fresh_declarations_are_distinct() {
    let registry = Registry::default();
    let a = registry.declare(None, "p");
    let b = registry.declare(None, "p");
    assert_ne!(a, b);
    assert_ne!(a.uid(), b.uid());
    assert_eq!(registry.connector_count(), 2);

    let set: HashSet<Connector> = [a.clone(), b, a].into_iter().collect();
    assert_eq!(set.len(), 2);
}

#[test]
fn textual_uids_match_parsed_uids() {
    let registry = Registry::default();
    let from_text = registry.declare_str(CONJUNCTION_UID, "and").unwrap();
    let parsed = Uuid::parse_str(CONJUNCTION_UID).unwrap();
    assert_eq!(from_text.uid(), parsed);
    assert!(registry.declare(Some(parsed), "other").ptr_eq(&from_text));
    assert!(registry.connector(&parsed).unwrap().ptr_eq(&from_text));
    assert!(registry.connector(&Uuid::new_v4()).is_none());
}

#[test]
fn equality_only_depends_on_uid() {
    // The same UID declared in two registries yields two instances that are still equal.
    let uid = Uuid::new_v4();
    let a = Registry::default().declare(Some(uid), "and");
    let b = Registry::default().declare(Some(uid), "or");
    assert!(!a.ptr_eq(&b));
    assert_eq!(a, b);
    assert_eq!(a.cmp(&b), std::cmp::Ordering::Equal);
}

#[test]
fn first_representation_wins() {
    let registry = Registry::default();
    let uid = Uuid::new_v4();
    let first = registry.declare_with_representation(Some(uid), "or", |_: &Connector, _: &Preferences| {
        Some("∨".to_string())
    });
    let second = registry.declare_with_representation(Some(uid), "or", |_: &Connector, _: &Preferences| {
        Some("|".to_string())
    });
    assert!(first.ptr_eq(&second));
    assert_eq!(second.represent(&Preferences::new()), "∨");

    let plain = registry.declare(None, "xor");
    assert_eq!(plain.represent(&Preferences::new()), "xor");
    assert_eq!(plain.to_string(), "xor");
}

#[test]
fn connector_sequences() {
    let registry = Registry::default();
    let and = registry.declare(None, "and");
    let p = registry.declare(None, "p");
    let q = registry.declare(None, "q");

    let s = registry
        .connector_sequence([and.clone(), p.clone(), q.clone()])
        .unwrap();
    let t = registry
        .connector_sequence(vec![and.clone(), p.clone(), q.clone()])
        .unwrap();
    assert!(s.ptr_eq(&t));
    assert_eq!(s.len(), 3);
    assert_eq!(s.get(1), Some(&p));
    assert_eq!(s[2], q);
    assert!(s.get(3).is_none());
    assert_eq!(s.to_string(), "(and, p, q)");
    assert_eq!(registry.connector_sequence_count(), 1);

    let head = registry.connector_sequence([and.clone()]).unwrap();
    let tail = registry.connector_sequence([p, q]).unwrap();
    let joined = registry.concatenate_connector_sequences(&head, &tail);
    assert!(joined.ptr_eq(&s));

    let err = registry.connector_sequence(Vec::<Connector>::new()).unwrap_err();
    assert!(err.is_empty_collection());
}
