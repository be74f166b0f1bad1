use super::*;

use proptest::prelude::*;
use proptest_derive::Arbitrary;
use std::collections::BTreeMap;

const KEY_SPACE: u16 = 512;

#[derive(Clone, Debug, Arbitrary)]
enum Op {
    #[proptest(weight = 4)]
    Insert(#[proptest(strategy = "0..KEY_SPACE")] u16, u8),
    #[proptest(weight = 4)]
    Add(#[proptest(strategy = "0..KEY_SPACE")] u16, u8),
    #[proptest(weight = 2)]
    Get(#[proptest(strategy = "0..KEY_SPACE")] u16),
}

fn validate_tree<K: Ord, V>(t: &AvlTree<K, V>) {
    if let Err(violation) = t.validate() {
        panic!("invalid tree: {violation}");
    }
}

fn pairs_strategy() -> impl Strategy<Value = Vec<(u16, u8)>> {
    // Small value range keeps ties frequent.
    prop::collection::vec((any::<u16>(), 0u8..16), 0..=3000)
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        max_shrink_iters: 50_000,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_equivalence_btreemap(ops in prop::collection::vec(any::<Op>(), 0..=2000)) {
        let mut t: AvlTree<u16, u32> = AvlTree::new();
        let mut m: BTreeMap<u16, u32> = BTreeMap::new();

        for op in ops {
            match op {
                Op::Insert(key, value) => {
                    let old_t = t.insert(key, u32::from(value));
                    let old_m = m.insert(key, u32::from(value));
                    prop_assert_eq!(old_t, old_m);
                }
                Op::Add(key, delta) => {
                    let existed = m.contains_key(&key);
                    let created = t.insert_with(key, u32::from(delta), |v, d| *v += d);
                    *m.entry(key).or_insert(0) += u32::from(delta);
                    prop_assert_eq!(created, !existed);
                }
                Op::Get(key) => {
                    prop_assert_eq!(t.get(&key), m.get(&key));
                }
            }
            prop_assert_eq!(t.len(), m.len());
        }

        validate_tree(&t);
        for key in 0..KEY_SPACE {
            prop_assert_eq!(t.contains_key(&key), m.contains_key(&key));
        }
        let got: Vec<(u16, u32)> = t.iter().map(|(k, v)| (*k, *v)).collect();
        let expected: Vec<(u16, u32)> = m.into_iter().collect();
        prop_assert_eq!(got, expected);
    }

    #[test]
    fn prop_reducers_agree(pairs in pairs_strategy(), cutoff in 0u32..16) {
        let t: AvlTree<u16, u8> = pairs.iter().copied().collect();
        validate_tree(&t);

        let expected = find_max_sequential(&t);
        prop_assert_eq!(expected.map(|(_, v)| *v), t.values().max().copied());
        prop_assert_eq!(find_max(&t, cutoff), expected);
        prop_assert_eq!(find_max(&t, 0), expected);
        prop_assert_eq!(find_max(&t, u32::MAX), expected);
    }

    #[test]
    fn prop_overwrite_reinsert_keeps_shape(pairs in pairs_strategy(), pick in any::<prop::sample::Index>()) {
        prop_assume!(!pairs.is_empty());
        let mut t: AvlTree<u16, u8> = pairs.iter().copied().collect();
        let mut before = Vec::new();
        t.visit_reverse(|k, h, l| before.push((*k, h, l)));

        let (key, _) = pairs[pick.index(pairs.len())];
        prop_assert!(t.insert(key, 200).is_some());

        let mut after = Vec::new();
        t.visit_reverse(|k, h, l| after.push((*k, h, l)));
        prop_assert_eq!(before, after);
        prop_assert_eq!(t.get(&key), Some(&200));
    }
}

fn for_each_permutation<T: Clone>(items: &[T], mut f: impl FnMut(Vec<T>)) {
    fn rec<T: Clone>(items: &[T], used: &mut [bool], out: &mut Vec<T>, f: &mut impl FnMut(Vec<T>)) {
        if out.len() == items.len() {
            f(out.clone());
            return;
        }
        for i in 0..items.len() {
            if used[i] {
                continue;
            }
            used[i] = true;
            out.push(items[i].clone());
            rec(items, used, out, f);
            out.pop();
            used[i] = false;
        }
    }

    let mut used = vec![false; items.len()];
    let mut out = Vec::with_capacity(items.len());
    rec(items, &mut used, &mut out, &mut f);
}

#[test]
fn exhaustive_insert_order_small_set() {
    let keys: Vec<&str> = vec!["a", "b", "c", "d", "e", "f", "g"];

    for_each_permutation(&keys, |perm| {
        let mut t: AvlTree<&str, usize> = AvlTree::new();
        let mut m: BTreeMap<&str, usize> = BTreeMap::new();

        for (i, k) in perm.into_iter().enumerate() {
            // Repeated values exercise the tie rules.
            let v = i % 3;
            assert_eq!(t.insert(k, v), m.insert(k, v));
            validate_tree(&t);
        }

        assert!(t.height() <= 3);
        let got: Vec<(&str, usize)> = t.iter().map(|(k, v)| (*k, *v)).collect();
        let expected: Vec<(&str, usize)> = m.iter().map(|(k, v)| (*k, *v)).collect();
        assert_eq!(got, expected);

        let sequential = find_max_sequential(&t);
        for cutoff in 0..=4 {
            assert_eq!(find_max(&t, cutoff), sequential);
        }
    });
}

#[test]
fn exhaustive_insert_then_clear() {
    let keys = [1, 2, 3, 4, 5];
    for_each_permutation(&keys, |perm| {
        let mut t: AvlTree<i32, ()> = perm.into_iter().map(|k| (k, ())).collect();
        validate_tree(&t);
        assert_eq!(t.clear(), keys.len());
        assert!(t.is_empty());
        validate_tree(&t);
    });
}
