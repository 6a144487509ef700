use super::{algo, DynArray, NodeId, OrderedSet, RbTree};

use proptest::prelude::*;
use proptest::sample::Index;
use proptest_derive::Arbitrary;
use std::collections::BTreeMap;

#[derive(Clone, Debug)]
enum Op {
    Insert(u16, u64),
    InsertHinted(u16, u64),
    Remove(u16),
    Get(u16),
    Bounds(u16),
    Clear,
}

fn key_strategy() -> impl Strategy<Value = u16> + Clone {
    // A narrow key space so removals and duplicates actually hit.
    0u16..512
}

fn ops_strategy() -> impl Strategy<Value = Vec<Op>> {
    let key = key_strategy();
    let op = prop_oneof![
        40 => (key.clone(), any::<u64>()).prop_map(|(k, v)| Op::Insert(k, v)),
        15 => (key.clone(), any::<u64>()).prop_map(|(k, v)| Op::InsertHinted(k, v)),
        25 => key.clone().prop_map(Op::Remove),
        10 => key.clone().prop_map(Op::Get),
        9 => key.clone().prop_map(Op::Bounds),
        1 => Just(Op::Clear),
    ];
    prop::collection::vec(op, 0..=2000)
}

#[derive(Clone, Debug, Arbitrary)]
enum ArrayOp {
    PushBack(u16),
    PopBack,
    Insert(u8, u16),
    InsertN(u8, u8, u16),
    InsertRange(u8, Vec<u16>),
    Erase(u8),
    EraseRange(u8, u8),
    Resize(u8, u16),
    Reserve(u8),
    ShrinkToFit,
    Clear,
}

#[derive(Clone, Debug, Arbitrary)]
enum MultiOp {
    Insert(u8),
    InsertHinted(u8, Index),
    RemoveNode(Index),
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        max_shrink_iters: 50_000,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_tree_equivalence(ops in ops_strategy()) {
        let mut t: RbTree<u16, u64> = RbTree::new();
        let mut m: BTreeMap<u16, u64> = BTreeMap::new();

        for op in ops {
            match op {
                Op::Insert(key, value) => {
                    let (id, created) = t.insert(key, value, None).unwrap();
                    prop_assert_eq!(created, !m.contains_key(&key));
                    let kept = *m.entry(key).or_insert(value);
                    prop_assert_eq!(t.value(id), Some(&kept));
                }
                Op::InsertHinted(key, value) => {
                    let hint = t.lower_bound(&key);
                    let (_, created) = t.insert(key, value, Some(hint)).unwrap();
                    prop_assert_eq!(created, !m.contains_key(&key));
                    m.entry(key).or_insert(value);
                }
                Op::Remove(key) => {
                    prop_assert_eq!(t.take(&key), m.remove_entry(&key));
                }
                Op::Get(key) => {
                    let got = t.search(&key).and_then(|id| t.value(id));
                    prop_assert_eq!(got, m.get(&key));
                }
                Op::Bounds(key) => {
                    prop_assert_eq!(t.key(t.lower_bound(&key)), m.range(key..).next().map(|(k, _)| k));
                    prop_assert_eq!(t.key(t.upper_bound(&key)), m.range(key + 1..).next().map(|(k, _)| k));
                }
                Op::Clear => {
                    t.clear();
                    m.clear();
                }
            }

            prop_assert_eq!(t.len(), m.len());
        }

        t.validate();
        let got: Vec<(u16, u64)> = t.iter().map(|(k, v)| (*k, *v)).collect();
        let expected: Vec<(u16, u64)> = m.into_iter().collect();
        prop_assert_eq!(got, expected);
    }

    #[test]
    fn prop_multi_equivalence(keys in prop::collection::vec(0u8..32, 0..=500)) {
        let mut t: RbTree<u8, usize> = RbTree::new();
        let mut model: Vec<(u8, usize)> = Vec::new();

        for (i, key) in keys.into_iter().enumerate() {
            t.insert_multi(key, i, None).unwrap();
            model.push((key, i));
        }
        // Stable sort keeps insertion order among equal keys.
        model.sort_by_key(|&(k, _)| k);

        t.validate();
        let got: Vec<(u8, usize)> = t.iter().map(|(k, v)| (*k, *v)).collect();
        prop_assert_eq!(got, model);
    }

    #[test]
    fn prop_multi_hinted_equivalence(ops in prop::collection::vec(any::<MultiOp>(), 0..=300)) {
        let mut t: RbTree<u8, u32> = RbTree::new();
        // In-order model: key, value, handle of the node holding it.
        let mut model: Vec<(u8, u32, NodeId)> = Vec::new();
        // Every handle ever issued, removed ones included.
        let mut handles = vec![NodeId::NIL];
        let mut next = 0u32;

        for op in ops {
            match op {
                MultiOp::Insert(key) => {
                    let key = key % 16;
                    let id = t.insert_multi(key, next, None).unwrap();
                    let pos = model.partition_point(|e| e.0 <= key);
                    model.insert(pos, (key, next, id));
                    handles.push(id);
                    next += 1;
                }
                MultiOp::InsertHinted(key, pick) => {
                    let key = key % 16;
                    let hint = handles[pick.index(handles.len())];
                    let at_hint = if hint.is_nil() {
                        Some(model.len())
                    } else {
                        model.iter().position(|e| e.2 == hint)
                    };
                    // A usable hint puts the key right before it; anything
                    // else falls back to after the equal keys.
                    let pos = at_hint
                        .filter(|&p| {
                            (p == 0 || model[p - 1].0 <= key) && (p == model.len() || key <= model[p].0)
                        })
                        .unwrap_or_else(|| model.partition_point(|e| e.0 <= key));
                    let id = t.insert_multi(key, next, Some(hint)).unwrap();
                    model.insert(pos, (key, next, id));
                    handles.push(id);
                    next += 1;
                }
                MultiOp::RemoveNode(pick) => {
                    let id = handles[pick.index(handles.len())];
                    let expected = model.iter().position(|e| e.2 == id).map(|p| {
                        let (k, v, _) = model.remove(p);
                        (k, v)
                    });
                    prop_assert_eq!(t.remove_node(id), expected);
                }
            }

            t.validate();
            let got: Vec<(u8, u32)> = t.iter().map(|(k, v)| (*k, *v)).collect();
            let want: Vec<(u8, u32)> = model.iter().map(|&(k, v, _)| (k, v)).collect();
            prop_assert_eq!(got, want);
            for &(k, v, id) in &model {
                prop_assert_eq!(t.entry(id), Some((&k, &v)));
            }
        }
    }

    #[test]
    fn prop_array_equivalence(ops in prop::collection::vec(any::<ArrayOp>(), 0..=300)) {
        let mut a: DynArray<u16> = DynArray::new();
        let mut v: Vec<u16> = Vec::new();

        for op in ops {
            match op {
                ArrayOp::PushBack(x) => {
                    a.push_back(x).unwrap();
                    v.push(x);
                }
                ArrayOp::PopBack => {
                    prop_assert_eq!(a.pop_back(), v.pop());
                }
                ArrayOp::Insert(pos, x) => {
                    let pos = pos as usize % (v.len() + 1);
                    prop_assert_eq!(a.insert(pos, x).unwrap(), pos);
                    v.insert(pos, x);
                }
                ArrayOp::InsertN(pos, n, x) => {
                    let pos = pos as usize % (v.len() + 1);
                    let n = n as usize % 16;
                    prop_assert_eq!(a.insert_n(pos, n, &x).unwrap(), pos);
                    v.splice(pos..pos, std::iter::repeat(x).take(n));
                }
                ArrayOp::InsertRange(pos, xs) => {
                    let pos = pos as usize % (v.len() + 1);
                    prop_assert_eq!(a.insert_range(pos, xs.iter().copied()).unwrap(), pos);
                    v.splice(pos..pos, xs);
                }
                ArrayOp::Erase(pos) => {
                    if !v.is_empty() {
                        let pos = pos as usize % v.len();
                        prop_assert_eq!(a.erase(pos), pos);
                        v.remove(pos);
                    }
                }
                ArrayOp::EraseRange(start, len) => {
                    let start = start as usize % (v.len() + 1);
                    let end = (start + len as usize % 8).min(v.len());
                    prop_assert_eq!(a.erase_range(start..end), start);
                    v.drain(start..end);
                }
                ArrayOp::Resize(n, x) => {
                    a.resize(n as usize, x).unwrap();
                    v.resize(n as usize, x);
                }
                ArrayOp::Reserve(n) => {
                    let want = v.len() + n as usize;
                    a.reserve(want).unwrap();
                    prop_assert!(a.capacity() >= want);
                }
                ArrayOp::ShrinkToFit => {
                    a.shrink_to_fit().unwrap();
                    prop_assert_eq!(a.capacity(), a.len());
                }
                ArrayOp::Clear => {
                    a.clear();
                    v.clear();
                }
            }

            prop_assert!(a.len() <= a.capacity());
            prop_assert_eq!(a.as_slice(), v.as_slice());
        }
    }

    #[test]
    fn prop_lexicographical_matches_slices(
        a in prop::collection::vec(0u8..4, 0..8),
        b in prop::collection::vec(0u8..4, 0..8),
    ) {
        prop_assert_eq!(algo::lexicographical_compare(a.iter(), b.iter()), a < b);
        prop_assert_eq!(algo::equal(a.iter(), b.iter()), b.starts_with(&a));
    }
}

const SMALL_KEYS: [u32; 7] = [1, 2, 3, 4, 5, 6, 7];

/// Calls `f` with every ordering of `keys`, generated in place by Heap's
/// algorithm.
fn each_order<T: Copy>(keys: &[T], mut f: impl FnMut(&[T])) {
    let mut order = keys.to_vec();
    let mut counters = vec![0usize; order.len()];
    f(&order);

    let mut i = 1;
    while i < order.len() {
        if counters[i] < i {
            let j = if i % 2 == 0 { 0 } else { counters[i] };
            order.swap(j, i);
            f(&order);
            counters[i] += 1;
            i = 1;
        } else {
            counters[i] = 0;
            i += 1;
        }
    }
}

fn tree_in_order(keys: &[u32]) -> (RbTree<u32, u64>, BTreeMap<u32, u64>) {
    let mut t = RbTree::new();
    let mut m = BTreeMap::new();
    for (i, &k) in keys.iter().enumerate() {
        let v = i as u64;
        let (_, created) = t.insert(k, v, None).unwrap();
        assert_eq!(created, m.insert(k, v).is_none());
        t.validate();
    }
    (t, m)
}

#[test]
fn test_each_order_visits_every_permutation() {
    let mut seen = std::collections::BTreeSet::new();
    each_order(&[1, 2, 3, 4], |order| {
        seen.insert(order.to_vec());
    });
    assert_eq!(seen.len(), 24);
}

#[test]
fn exhaustive_insert_order_small_set() {
    each_order(&SMALL_KEYS, |order| {
        let (t, m) = tree_in_order(order);
        let got: Vec<(u32, u64)> = t.iter().map(|(k, v)| (*k, *v)).collect();
        let expected: Vec<(u32, u64)> = m.into_iter().collect();
        assert_eq!(got, expected);
    });
}

#[test]
fn exhaustive_remove_order_small_set() {
    let (base_tree, base_map) = tree_in_order(&SMALL_KEYS);

    each_order(&SMALL_KEYS, |order| {
        let mut t = base_tree.clone();
        let mut m = base_map.clone();

        for k in order {
            assert_eq!(t.take(k), m.remove_entry(k));
            assert_eq!(t.len(), m.len());
            t.validate();
        }
        assert!(t.is_empty());
        assert!(t.root().is_nil());
        assert!(t.last().is_nil());
    });
}

#[test]
fn exhaustive_set_relational_order() {
    // All subsets of {0, 1, 2, 3} compare like their sorted vectors.
    let subsets: Vec<Vec<u8>> = (0u8..16)
        .map(|mask| (0u8..4).filter(|b| mask & (1 << b) != 0).collect())
        .collect();

    for a in &subsets {
        for b in &subsets {
            let sa: OrderedSet<u8> = a.iter().copied().collect();
            let sb: OrderedSet<u8> = b.iter().copied().collect();
            assert_eq!(sa.partial_cmp(&sb), a.partial_cmp(b), "{a:?} vs {b:?}");
            assert_eq!(sa == sb, a == b);
        }
    }
}
