use std::collections::HashSet;

use hyformula::tree::Tree;
use num_bigint::BigUint;

fn leaf() -> Tree {
    Tree::leaf()
}

/// Every ordered tree with exactly `size` vertices.
fn trees_of_size(size: usize) -> Vec<Tree> {
    assert!(size >= 1);
    forests_of_size(size - 1)
        .into_iter()
        .map(Tree::new)
        .collect()
}

/// Every ordered sequence of trees with `size` vertices in total.
fn forests_of_size(size: usize) -> Vec<Vec<Tree>> {
    if size == 0 {
        return vec![vec![]];
    }
    let mut forests = Vec::new();
    for first in 1..=size {
        for head in trees_of_size(first) {
            for tail in forests_of_size(size - first) {
                let mut forest = vec![head.clone()];
                forest.extend(tail);
                forests.push(forest);
            }
        }
    }
    forests
}

#[test]
fn leaf_encoding() {
    let t = Tree::new([]);
    assert!(t.is_leaf());
    assert_eq!(t.canonical_string(), "()");
    assert_eq!(t.canonical_binary(), "10");
    assert_eq!(t.canonical_integer(), BigUint::from(2u32));
    assert_eq!(t.size(), 1);
}

#[test]
fn two_leaves() {
    let t = Tree::new([leaf(), leaf()]);
    assert_eq!(t.canonical_string(), "(()())");
    assert_eq!(t.canonical_binary(), "110100");
    assert_eq!(t.canonical_integer(), BigUint::from(52u32));
}

#[test]
fn reference_vectors() {
    let t2 = Tree::new([leaf()]);
    assert_eq!(t2.canonical_string(), "(())");
    assert_eq!(t2.canonical_binary(), "1100");
    assert_eq!(t2.canonical_integer(), BigUint::from(12u32));

    let t6 = Tree::new([leaf(), leaf(), leaf(), leaf(), leaf()]);
    assert_eq!(t6.canonical_string(), "(()()()()())");
    assert_eq!(t6.canonical_binary(), "110101010100");
    assert_eq!(t6.canonical_integer(), BigUint::from(3412u32));

    let t12 = Tree::new([leaf(), t2.clone(), t6.clone(), t2.clone()]);
    assert_eq!(t12.size(), 12);
    assert_eq!(t12.canonical_string(), "(()(())(()()()()())(()))");
    assert_eq!(t12.canonical_binary(), "110110011010101010011000");
    assert_eq!(t12.canonical_integer(), BigUint::from(14264984u32));
}

#[test]
fn canonical_integer_is_stable() {
    let t = Tree::new([Tree::new([leaf(), leaf()]), leaf()]);
    let first = t.canonical_integer();
    assert_eq!(t.canonical_integer(), first);
    assert!(t.is_shape_equivalent_to(&t));
    assert!(t.is_shape_equivalent_to(&Tree::new([Tree::new([leaf(), leaf()]), leaf()])));
}

#[test]
fn children_order_matters() {
    let a = Tree::new([Tree::new([leaf()]), leaf()]);
    let b = Tree::new([leaf(), Tree::new([leaf()])]);
    assert_eq!(a.size(), b.size());
    assert!(!a.is_shape_equivalent_to(&b));
    assert_ne!(a, b);
}

#[test]
fn shapes_of_same_size_have_distinct_integers() {
    // Catalan numbers C(n - 1).
    let expected_counts = [1, 1, 2, 5, 14, 42, 132, 429, 1430];
    for (index, &expected) in expected_counts.iter().enumerate() {
        let size = index + 1;
        let trees = trees_of_size(size);
        assert_eq!(trees.len(), expected, "trees of size {}", size);

        let integers: HashSet<BigUint> = trees.iter().map(Tree::canonical_integer).collect();
        assert_eq!(integers.len(), trees.len(), "collision among trees of size {}", size);

        let encodings: HashSet<String> = trees.iter().map(Tree::canonical_string).collect();
        assert_eq!(encodings.len(), trees.len());

        assert!(trees.iter().all(|t| t.size() == size));
    }
}

#[test]
fn select_follows_zero_based_paths() {
    let t = Tree::new([leaf(), Tree::new([leaf(), Tree::new([leaf()])])]);
    assert!(t.select(&[]).unwrap().ptr_eq(&t));
    assert_eq!(t.select(&[1, 1]).unwrap().canonical_string(), "(())");
    assert!(t.select(&[1, 1, 0]).unwrap().is_leaf());
    assert!(t.select(&[2]).is_none());
    assert!(t.select(&[0, 0]).is_none());
}

#[test]
fn depth_first_order() {
    let t = Tree::new([Tree::new([leaf(), leaf()]), leaf()]);
    let degrees: Vec<usize> = t.iter_depth_first().map(Tree::degree).collect();
    assert_eq!(degrees, vec![2, 2, 0, 0, 0]);
}

#[test]
fn display_uses_anonymous_function_notation() {
    assert_eq!(leaf().to_string(), "★");
    let t = Tree::new([Tree::new([leaf()]), leaf()]);
    assert_eq!(t.to_string(), "★(★(★), ★)");
    assert_eq!(format!("{:?}", t), "Tree(((())()))");
}
