// HashTable public API suite.
//
// Each test documents the behavior being verified. Core properties:
// - Uniqueness: re-putting a key never grows the count.
// - Round-trip: put(k, v) then get(k) yields v.
// - Remove/re-find: a removed key is gone from get/contains.
// - Count consistency: destructor calls account for every value.
// - Resize transparency: keys survive several growth steps.
// - Iterator completeness: the cursor visits every key exactly once.
// - Key isolation: the table keeps its own copy of each key.
use chained_hashtable::{HashTable, TableConfig, TableError};
use std::cell::Cell;
use std::collections::BTreeSet;
use std::rc::Rc;

fn key(i: usize) -> String {
    format!("clave-{:04}", i)
}

// Test: uniqueness under repeated puts of overlapping key sets.
// Verifies: count equals distinct keys; each key appears once when iterated.
#[test]
fn uniqueness() {
    let mut t = HashTable::new();
    for round in 0..3 {
        for i in 0..50 {
            t.put(&key(i), round * 100 + i).unwrap();
        }
        assert_eq!(t.count(), 50);
    }
    let keys: Vec<&str> = t.keys().collect();
    let unique: BTreeSet<&str> = keys.iter().copied().collect();
    assert_eq!(keys.len(), unique.len());
    assert_eq!(t.get(&key(7)), Some(&207));
}

// Test: round-trip and remove/re-find.
#[test]
fn round_trip_and_remove() {
    let mut t = HashTable::new();
    t.put("gato", "miau").unwrap();
    assert_eq!(t.get("gato"), Some(&"miau"));
    assert_eq!(t.remove("gato"), Some("miau"));
    assert_eq!(t.get("gato"), None);
    assert!(!t.contains("gato"));
    assert_eq!(t.count(), 0);
}

// Test: stored "empty" values are distinguishable from a miss.
#[test]
fn none_values_are_not_misses() {
    let mut t: HashTable<Option<u8>> = HashTable::new();
    t.put("nada", None).unwrap();
    assert_eq!(t.get("nada"), Some(&None));
    assert_eq!(t.get("otra"), None);
    assert_eq!(t.remove("nada"), Some(None));
}

// Test: count consistency via destructor counting.
// Verifies: overwrites + teardown destroy exactly the values the table owned;
// removed values are never destroyed by the table.
#[test]
fn destructor_accounts_for_every_value() {
    let destroyed = Rc::new(Cell::new(0usize));
    let d = destroyed.clone();
    let mut t = HashTable::with_destructor(move |_v: Box<u64>| d.set(d.get() + 1));

    for i in 0..100 {
        t.put(&key(i), Box::new(i as u64)).unwrap();
    }
    for i in 0..10 {
        t.put(&key(i), Box::new(0)).unwrap(); // 10 overwrites
    }
    let mut removed = Vec::new();
    for i in 90..100 {
        removed.push(t.remove(&key(i)).unwrap());
    }
    assert_eq!(destroyed.get(), 10);
    assert_eq!(t.count(), 90);

    drop(t);
    assert_eq!(destroyed.get(), 100);
    assert_eq!(removed.len(), 10);
}

// Test: resize transparency with initial capacity 8 and max load 0.7.
// Verifies: all 2000 keys survive many growth steps and stay retrievable.
#[test]
fn resize_transparency() {
    let cfg = TableConfig::new().initial_capacity(8).max_load_factor(0.7);
    let mut t = HashTable::with_config(cfg).unwrap();
    for i in 0..2000 {
        t.put(&key(i), i).unwrap();
        if i == 3 {
            assert_eq!(t.capacity(), 8);
        }
    }
    assert_eq!(t.count(), 2000);
    assert!(t.capacity() >= 2048);
    assert!(t.load_factor() <= 0.7 + f64::EPSILON);
    for i in 0..2000 {
        assert_eq!(t.get(&key(i)), Some(&i), "lost {}", key(i));
    }
}

// Test: iterator completeness.
// Verifies: the visited key set equals the inserted key set, no repeats.
#[test]
fn iterator_completeness() {
    let mut t = HashTable::new();
    let expected: BTreeSet<String> = (0..257).map(key).collect();
    for k in &expected {
        t.put(k, ()).unwrap();
    }

    let mut seen = BTreeSet::new();
    let mut it = t.cursor();
    let mut steps = 0;
    while !it.at_end() {
        assert!(seen.insert(it.current_key().unwrap().to_string()));
        steps += 1;
        it.advance();
    }
    assert_eq!(steps, expected.len());
    assert_eq!(seen, expected);

    let via_iter: BTreeSet<String> = t.iter().map(|(k, _)| k.to_string()).collect();
    assert_eq!(via_iter, expected);
}

// Test: empty table iteration.
#[test]
fn empty_table_iteration() {
    let t: HashTable<i32> = HashTable::new();
    let it = t.cursor();
    assert!(it.at_end());
    assert_eq!(it.current_key(), None);
    assert_eq!(t.iter().count(), 0);
}

// Test: emptied table iterates as empty.
#[test]
fn emptied_table_iteration() {
    let mut t = HashTable::new();
    t.put("a", 1).unwrap();
    t.remove("a");
    assert!(t.cursor().at_end());
}

// Test: key isolation.
// Verifies: mutating the caller's buffer after put does not affect lookups.
#[test]
fn key_isolation() {
    let mut t = HashTable::new();
    let mut buf = String::from("original");
    t.put(&buf, 1).unwrap();
    buf.make_ascii_uppercase();
    assert_eq!(t.get("original"), Some(&1));
    assert_eq!(t.get(&buf), None);
    drop(buf);
    assert_eq!(t.keys().next(), Some("original"));
}

// Test: growth failure surfaces from put.
// Verifies: an over-large explicit resize reports AllocationFailure and
// leaves contents intact.
#[test]
fn resize_failure_is_reported() {
    let mut t = HashTable::new();
    t.put("a", 1).unwrap();
    assert_eq!(t.resize(usize::MAX), Err(TableError::AllocationFailure));
    assert_eq!(t.get("a"), Some(&1));
    assert!(matches!(t.resize(0), Err(TableError::InvalidArgument(_))));
}

// Test: custom hasher support.
#[test]
fn works_with_std_random_state() {
    let mut t = HashTable::with_hasher(std::collections::hash_map::RandomState::new());
    for i in 0..500 {
        t.put(&key(i), i).unwrap();
    }
    for i in (0..500).step_by(2) {
        assert_eq!(t.remove(&key(i)), Some(i));
    }
    assert_eq!(t.count(), 250);
    assert!(t.contains(&key(1)));
    assert!(!t.contains(&key(2)));
}

// Test: shrink does not disturb lookups.
#[test]
fn shrink_keeps_remaining_keys() {
    let cfg = TableConfig::new().initial_capacity(4);
    let mut t = HashTable::with_config(cfg).unwrap();
    for i in 0..1000 {
        t.put(&key(i), i).unwrap();
    }
    let peak = t.capacity();
    for i in 0..990 {
        assert_eq!(t.remove(&key(i)), Some(i));
    }
    assert!(t.capacity() < peak);
    for i in 990..1000 {
        assert_eq!(t.get(&key(i)), Some(&i));
    }
}
