use hyformula::{
    registry::Registry,
    structure::{Pointer, Structure},
    tree::Tree,
};

fn leaf(registry: &Registry, p: usize) -> Structure {
    registry.structure(p, [])
}

#[test]
fn root_must_be_p0() {
    let registry = Registry::default();
    assert!(leaf(&registry, 0).is_canonical());
    assert!(!leaf(&registry, 1).is_canonical());
    assert!(!registry.structure(1, [leaf(&registry, 0)]).is_canonical());
}

#[test]
fn pointers_may_repeat_and_must_not_skip() {
    let registry = Registry::default();
    let r = &registry;

    // p0(p1(p0, p2), p1, p3)
    let ok = r.structure(
        0,
        [
            r.structure(1, [leaf(r, 0), leaf(r, 2)]),
            leaf(r, 1),
            leaf(r, 3),
        ],
    );
    assert!(ok.is_canonical());
    assert_eq!(ok.pointers(), &[Pointer(0), Pointer(1), Pointer(2), Pointer(3)]);
    assert_eq!(ok.pointers_count(), 4);
    assert_eq!(ok.pointer_sequence().values(), &[0, 1, 0, 2, 1, 3]);
    assert_eq!(ok.size(), 6);
    assert_eq!(ok.to_string(), "p0(p1(p0, p2), p1, p3)");

    // p0(p1, p3): p3 skips p2.
    let skip = r.structure(0, [leaf(r, 1), leaf(r, 3)]);
    assert!(!skip.is_canonical());
    assert_eq!(skip.pointers_count(), 3);
}

#[test]
fn identical_structures_are_interned() {
    let registry = Registry::default();
    let build = || registry.structure(0, [leaf(&registry, 1), leaf(&registry, 0)]);
    let a = build();
    let b = build();
    assert!(a.ptr_eq(&b));
    assert!(a.sub_structures()[0].ptr_eq(&b.sub_structures()[0]));
    // p0, p1 and p0(p1, p0)
    assert_eq!(registry.structure_count(), 3);
}

#[test]
fn shape_ignores_pointers() {
    let registry = Registry::default();
    let r = &registry;
    let a = r.structure(0, [leaf(r, 1), leaf(r, 2)]);
    let b = r.structure(0, [leaf(r, 0), leaf(r, 0)]);
    assert_ne!(a, b);
    assert!(a.tree().is_shape_equivalent_to(b.tree()));
    assert_eq!(a.tree(), &Tree::new([Tree::leaf(), Tree::leaf()]));
}

#[test]
fn canonicalize_relabels_by_first_appearance() {
    let registry = Registry::default();
    let r = &registry;

    // p3(p5, p3(p1)) -> p0(p1, p0(p2))
    let raw = r.structure(3, [leaf(r, 5), r.structure(3, [leaf(r, 1)])]);
    assert!(!raw.is_canonical());

    let canonical = r.canonicalize_structure(&raw);
    assert!(canonical.is_canonical());
    assert_eq!(canonical.to_string(), "p0(p1, p0(p2))");
    assert!(canonical.tree().is_shape_equivalent_to(raw.tree()));
    assert!(
        raw.pointer_sequence()
            .is_canonically_equivalent_to(&canonical.pointer_sequence())
    );

    // Canonical structures are returned unchanged.
    assert!(r.canonicalize_structure(&canonical).ptr_eq(&canonical));
}

#[test]
fn depth_first_iteration() {
    let registry = Registry::default();
    let r = &registry;
    let s = r.structure(0, [r.structure(1, [leaf(r, 2)]), leaf(r, 0)]);
    let pointers: Vec<usize> = s.iter_depth_first().map(|s| s.pointer().index()).collect();
    assert_eq!(pointers, vec![0, 1, 2, 0]);
    assert!(s.iter_depth_first().last().unwrap().is_leaf());
}
