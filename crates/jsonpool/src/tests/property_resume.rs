use std::vec::Vec;

use quickcheck::QuickCheck;
use quickcheck_macros::quickcheck;

use super::{
    arbitrary::Doc,
    utils::{render, render_windowed, text},
};
use crate::{Kind, Node, Pool, PoolError, Value};

fn tests() -> u64 {
    if is_ci::cached() { 10_000 } else { 1_000 }
}

/// Property: emitting through a window of any size, resuming from the
/// returned node each time, produces the same bytes as one unbounded call.
#[test]
fn windowed_emission_matches_unbounded() {
    #[allow(clippy::needless_pass_by_value)]
    fn prop(doc: Doc, window: u8) -> bool {
        let window = 1 + usize::from(window % 16);
        let mut storage = std::vec![Node::EMPTY; doc.size()];
        let mut pool = Pool::new(&mut storage);
        let root = doc.build(&mut pool).unwrap();

        let whole = render(&mut pool, root);
        pool.rewind(root);
        let pieces = render_windowed(&mut pool, root, window);

        pieces.sink == whole
            && text(whole.clone()) == pieces.window
            && whole.iter().filter(|&&b| b == 0).count() == 1
    }

    QuickCheck::new()
        .tests(tests())
        .quickcheck(prop as fn(Doc, u8) -> bool);
}

/// Property: the emitted text is JSON describing the same value as the serde
/// view of the tree.
#[test]
fn emission_agrees_with_serde_json() {
    #[allow(clippy::needless_pass_by_value)]
    fn prop(doc: Doc) -> bool {
        let mut storage = std::vec![Node::EMPTY; doc.size()];
        let mut pool = Pool::new(&mut storage);
        let root = doc.build(&mut pool).unwrap();

        let emitted = text(render(&mut pool, root));
        let parsed: serde_json::Value = serde_json::from_slice(&emitted).unwrap();
        parsed == serde_json::to_value(pool.tree(root)).unwrap()
    }

    QuickCheck::new()
        .tests(tests())
        .quickcheck(prop as fn(Doc) -> bool);
}

/// Property: a deep copy renders identically, and mutating it leaves the
/// original's output alone.
#[test]
fn deep_copy_is_independent() {
    #[allow(clippy::needless_pass_by_value)]
    fn prop(doc: Doc) -> bool {
        let mut storage = std::vec![Node::EMPTY; 2 * doc.size()];
        let mut pool = Pool::new(&mut storage);
        let root = doc.build(&mut pool).unwrap();
        let copy = pool.deep_copy(root).unwrap();
        assert_eq!(pool.available(), 0);

        let original = render(&mut pool, root);
        if render(&mut pool, copy) != original {
            return false;
        }

        let targets: Vec<_> = pool
            .descendants(copy)
            .filter(|&id| pool.kind(id) == Kind::Integer)
            .collect();
        for id in targets {
            if let Value::Integer(value) = pool.value(id) {
                pool.set_integer(id, value.wrapping_add(1)).unwrap();
            }
        }
        pool.rewind(root);
        render(&mut pool, root) == original
    }

    QuickCheck::new()
        .tests(tests())
        .quickcheck(prop as fn(Doc) -> bool);
}

/// Property: whatever was allocated before, a reset hands back the whole
/// storage and the allocation after the last node is the first to fail.
#[quickcheck]
fn reset_restores_full_capacity(capacity: u8, used: u8) -> bool {
    let capacity = usize::from(capacity);
    let mut storage = std::vec![Node::EMPTY; capacity];
    let mut pool = Pool::new(&mut storage);
    for _ in 0..used {
        let _ = pool.null();
    }
    assert_eq!(pool.in_use(), capacity.min(usize::from(used)));

    pool.reset();
    let refilled = (0..capacity).all(|_| pool.integer(1).is_ok());
    let exhausted = pool.null() == Err(PoolError::Exhausted);
    pool.reset();
    refilled && exhausted && pool.available() == capacity
}
