#![cfg(test)]

// Property tests for HashTable kept inside the crate so they can check the
// bucket structure through crate-private accessors.

use crate::config::TableConfig;
use crate::destructor::Destructor;
use crate::table::HashTable;
use core::hash::{BuildHasher, Hasher};
use hashbrown::HashMap;
use proptest::prelude::*;
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

// Pool-indexed operations to improve shrinking: indices shrink to earlier keys,
// pool length shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum OpI {
    Put(usize, i32),
    Get(usize),
    Remove(usize),
    Contains(String),
    Iterate,
    Clear,
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<OpI>)> {
    proptest::collection::vec("[a-z]{0,5}", 1..=24).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let contains_pool = proptest::sample::select(pool.clone());
        let op = prop_oneof![
            6 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Put(i, v)),
            2 => idx.clone().prop_map(OpI::Get),
            4 => idx.clone().prop_map(OpI::Remove),
            1 => prop_oneof![
                contains_pool.prop_map(|s: String| s),
                "[a-z]{0,5}".prop_map(|s| s)
            ]
            .prop_map(OpI::Contains),
            1 => Just(OpI::Iterate),
            1 => Just(OpI::Clear),
        ];
        proptest::collection::vec(op, 1..120).prop_map(move |ops| (pool.clone(), ops))
    })
}

// Every entry sits in the slot its key hashes to, and every node in the arena
// is reachable from a chain.
fn check_structure<V, D, S>(t: &HashTable<V, D, S>) -> Result<(), TestCaseError>
where
    D: Destructor<V>,
    S: BuildHasher,
{
    let cap = t.capacity();
    prop_assert!(cap.is_power_of_two());
    let mut total = 0;
    for (i, chain) in t.slots().iter().enumerate() {
        for e in chain.iter(t.nodes()) {
            let expected = if e.key.is_empty() {
                0
            } else {
                let mut h = t.hasher().build_hasher();
                h.write(e.key.as_bytes());
                (h.finish() as usize) & (cap - 1)
            };
            prop_assert_eq!(expected, i);
            total += 1;
        }
    }
    prop_assert_eq!(total, t.count());
    Ok(())
}

fn run<S: BuildHasher>(
    mut sut: HashTable<i32, impl FnMut(i32), S>,
    destroyed: Rc<RefCell<Vec<i32>>>,
    pool: Vec<String>,
    ops: Vec<OpI>,
) -> Result<(), TestCaseError> {
    let mut model: HashMap<String, i32> = HashMap::new();
    let mut expected_destroyed: Vec<i32> = Vec::new();

    for op in ops {
        match op {
            OpI::Put(i, v) => {
                let k = &pool[i];
                let before = sut.count();
                sut.put(k, v).expect("put");
                match model.insert(k.clone(), v) {
                    Some(old) => {
                        expected_destroyed.push(old);
                        prop_assert_eq!(sut.count(), before, "overwrite must not grow count");
                    }
                    None => prop_assert_eq!(sut.count(), before + 1),
                }
                prop_assert_eq!(sut.get(k), Some(&v));
            }
            OpI::Get(i) => {
                let k = &pool[i];
                prop_assert_eq!(sut.get(k), model.get(k));
            }
            OpI::Remove(i) => {
                let k = &pool[i];
                prop_assert_eq!(sut.remove(k), model.remove(k));
                prop_assert!(!sut.contains(k));
                prop_assert_eq!(sut.get(k), None);
            }
            OpI::Contains(s) => {
                prop_assert_eq!(sut.contains(&s), model.contains_key(&s));
            }
            OpI::Iterate => {
                let mut seen = BTreeSet::new();
                let mut it = sut.cursor();
                while !it.at_end() {
                    let k = it.current_key().expect("positioned cursor has a key");
                    prop_assert!(seen.insert(k.to_string()), "key visited twice");
                    prop_assert_eq!(it.current_value(), model.get(k));
                    it.advance();
                }
                let m_keys: BTreeSet<String> = model.keys().cloned().collect();
                prop_assert_eq!(seen, m_keys);
            }
            OpI::Clear => {
                let mut drained: Vec<i32> = model.drain().map(|(_, v)| v).collect();
                expected_destroyed.append(&mut drained);
                sut.clear();
            }
        }

        prop_assert_eq!(sut.count(), model.len());
        check_structure(&sut)?;
    }

    // Teardown destroys whatever is left.
    expected_destroyed.extend(model.values().copied());
    drop(sut);
    let mut got = destroyed.borrow().clone();
    got.sort_unstable();
    expected_destroyed.sort_unstable();
    prop_assert_eq!(got, expected_destroyed);
    Ok(())
}

fn recorder() -> (Rc<RefCell<Vec<i32>>>, impl FnMut(i32)) {
    let log = Rc::new(RefCell::new(Vec::new()));
    let l = log.clone();
    (log, move |v| l.borrow_mut().push(v))
}

fn small_config() -> TableConfig {
    TableConfig::new()
        .initial_capacity(2)
        .max_load_factor(0.7)
        .min_load_factor(0.2)
}

// Property: State-machine equivalence against hashbrown::HashMap.
// Invariants exercised across random operation sequences:
// - `put` on an existing key replaces in place and destroys the old value.
// - get/contains/remove agree with the model; removed keys are gone.
// - The cursor yields each live key exactly once with the right value.
// - Every entry stays in the slot its key hashes to across grow/shrink.
// - Destructor calls equal overwritten + cleared + torn-down values.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        let (log, d) = recorder();
        let sut = HashTable::with_config_and_destructor(small_config(), d).unwrap();
        run(sut, log, pool, ops)?;
    }
}

// Collision variant using a constant hasher to stress chain handling.
#[derive(Clone, Default)]
struct ConstBuildHasher;
struct ConstHasher;
impl BuildHasher for ConstBuildHasher {
    type Hasher = ConstHasher;
    fn build_hasher(&self) -> Self::Hasher {
        ConstHasher
    }
}
impl Hasher for ConstHasher {
    fn write(&mut self, _bytes: &[u8]) {}
    fn finish(&self) -> u64 {
        0
    }
}

// Property: Same state-machine invariants as above, with every key in one
// chain. This stresses cursor insert/remove and chain release.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_collisions((pool, ops) in arb_scenario()) {
        let (log, d) = recorder();
        let sut = HashTable::with_config_destructor_and_hasher(small_config(), d, ConstBuildHasher)
            .unwrap();
        run(sut, log, pool, ops)?;
    }
}
