//! Open-addressed hash table keyed by interned strings.
//!
//! The table backs both the string interner and the VM's globals. Probing
//! is linear from `hash % capacity`. A slot is in one of three states:
//!
//! - empty: no key, value `nil`
//! - live: key present
//! - tombstone: no key, value boolean `true`
//!
//! Lookups stop at a truly empty slot and probe past tombstones; insertions
//! reuse the first tombstone seen on their probe path. The load-factor
//! count includes tombstones, which bounds worst-case probe length at the
//! cost of occasionally rehashing a sparse table. Rehashing copies live
//! entries only, so the count is rebuilt from scratch there.
//!
//! Keys are compared by reference. That is sound only because every key is
//! interned; [`find_string`](Table::find_string) is the one content-based
//! lookup, used by the interner itself before a string has a canonical
//! reference.

use std::rc::Rc;

use crate::object::WispStr;
use crate::value::Value;

/// Grow to 75% full at most.
const MAX_LOAD_NUM: usize = 3;
const MAX_LOAD_DEN: usize = 4;

/// Initial capacity 8, doubling afterwards.
fn grow_capacity(capacity: usize) -> usize {
    if capacity < 8 {
        8
    } else {
        capacity * 2
    }
}

#[derive(Clone)]
struct Entry {
    key: Option<Rc<WispStr>>,
    value: Value,
}

impl Entry {
    const EMPTY: Entry = Entry {
        key: None,
        value: Value::Nil,
    };

    /// A tombstone is key-less but holds `true` so probe chains stay intact.
    fn is_tombstone(&self) -> bool {
        self.key.is_none() && !matches!(self.value, Value::Nil)
    }
}

/// A map from interned strings to values.
#[derive(Default)]
pub struct Table {
    /// Live entries plus tombstones; see the module docs for why.
    count: usize,
    entries: Vec<Entry>,
}

impl Table {
    pub fn new() -> Table {
        Table {
            count: 0,
            entries: Vec::new(),
        }
    }

    /// Index of the slot `key` occupies or should occupy: the live match if
    /// present, otherwise the first tombstone on the probe path, otherwise
    /// the empty slot that terminated the probe.
    ///
    /// The load-factor cap guarantees at least one empty slot, so the probe
    /// always terminates.
    fn find_entry(entries: &[Entry], key: &Rc<WispStr>) -> usize {
        let mut index = key.hash() as usize % entries.len();
        let mut tombstone = None;
        loop {
            let entry = &entries[index];
            match &entry.key {
                None => {
                    if !entry.is_tombstone() {
                        return tombstone.unwrap_or(index);
                    }
                    if tombstone.is_none() {
                        tombstone = Some(index);
                    }
                }
                Some(existing) => {
                    if Rc::ptr_eq(existing, key) {
                        return index;
                    }
                }
            }
            index = (index + 1) % entries.len();
        }
    }

    /// Look up `key`, returning its value if present.
    pub fn get(&self, key: &Rc<WispStr>) -> Option<&Value> {
        if self.count == 0 {
            return None;
        }
        let index = Self::find_entry(&self.entries, key);
        let entry = &self.entries[index];
        entry.key.as_ref().map(|_| &entry.value)
    }

    /// Insert or update `key`. Returns true when the key was not present
    /// before; overwriting a tombstone's old slot still counts as new.
    pub fn set(&mut self, key: Rc<WispStr>, value: Value) -> bool {
        if (self.count + 1) * MAX_LOAD_DEN > self.entries.len() * MAX_LOAD_NUM {
            let capacity = grow_capacity(self.entries.len());
            self.adjust_capacity(capacity);
        }

        let index = Self::find_entry(&self.entries, &key);
        let entry = &mut self.entries[index];
        let is_new = entry.key.is_none();
        // A reused tombstone is already in the count.
        if is_new && !entry.is_tombstone() {
            self.count += 1;
        }
        entry.key = Some(key);
        entry.value = value;
        is_new
    }

    /// Remove `key`, leaving a tombstone. Returns whether it existed.
    pub fn delete(&mut self, key: &Rc<WispStr>) -> bool {
        if self.count == 0 {
            return false;
        }
        let index = Self::find_entry(&self.entries, key);
        let entry = &mut self.entries[index];
        if entry.key.is_none() {
            return false;
        }
        entry.key = None;
        entry.value = Value::Bool(true);
        true
    }

    /// Content-based lookup for the interner: match on length, hash, and
    /// bytes, in that order. All three must agree.
    pub fn find_string(&self, text: &str, hash: u32) -> Option<Rc<WispStr>> {
        if self.count == 0 {
            return None;
        }
        let mut index = hash as usize % self.entries.len();
        loop {
            let entry = &self.entries[index];
            match &entry.key {
                None => {
                    if !entry.is_tombstone() {
                        return None;
                    }
                }
                Some(key) => {
                    if key.len() == text.len() && key.hash() == hash && key.as_str() == text {
                        return Some(Rc::clone(key));
                    }
                }
            }
            index = (index + 1) % self.entries.len();
        }
    }

    /// Rebuild at `capacity`, discarding tombstones. The count is
    /// recomputed because only live entries survive.
    fn adjust_capacity(&mut self, capacity: usize) {
        let old = std::mem::replace(&mut self.entries, vec![Entry::EMPTY; capacity]);
        self.count = 0;
        for entry in old {
            if let Some(key) = entry.key {
                let index = Self::find_entry(&self.entries, &key);
                self.entries[index] = Entry {
                    key: Some(key),
                    value: entry.value,
                };
                self.count += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heap::Heap;

    fn key(heap: &mut Heap, text: &str) -> Rc<WispStr> {
        heap.intern(text)
    }

    #[test]
    fn test_get_on_empty_table() {
        let mut heap = Heap::new();
        let table = Table::new();
        assert!(table.get(&key(&mut heap, "a")).is_none());
    }

    #[test]
    fn test_set_then_get() {
        let mut heap = Heap::new();
        let mut table = Table::new();
        let k = key(&mut heap, "answer");
        assert!(table.set(Rc::clone(&k), Value::Number(42.0)));
        assert_eq!(table.get(&k), Some(&Value::Number(42.0)));
    }

    #[test]
    fn test_set_returns_false_on_update() {
        let mut heap = Heap::new();
        let mut table = Table::new();
        let k = key(&mut heap, "x");
        assert!(table.set(Rc::clone(&k), Value::Number(1.0)));
        assert!(!table.set(Rc::clone(&k), Value::Number(2.0)));
        assert_eq!(table.get(&k), Some(&Value::Number(2.0)));
    }

    #[test]
    fn test_delete_leaves_reusable_tombstone() {
        let mut heap = Heap::new();
        let mut table = Table::new();
        let k = key(&mut heap, "gone");
        table.set(Rc::clone(&k), Value::Nil);
        assert!(table.delete(&k));
        assert!(table.get(&k).is_none());
        assert!(!table.delete(&k));
        // Re-inserting after a delete is "new" again.
        assert!(table.set(Rc::clone(&k), Value::Bool(true)));
        assert_eq!(table.get(&k), Some(&Value::Bool(true)));
    }

    #[test]
    fn test_probe_past_tombstone_finds_later_entry() {
        // Fill enough that collisions are certain, delete in the middle of
        // probe chains, and check every survivor is still reachable.
        let mut heap = Heap::new();
        let mut table = Table::new();
        let keys: Vec<_> = (0..64).map(|i| key(&mut heap, &format!("k{}", i))).collect();
        for (i, k) in keys.iter().enumerate() {
            table.set(Rc::clone(k), Value::Number(i as f64));
        }
        for k in keys.iter().step_by(2) {
            assert!(table.delete(k));
        }
        for (i, k) in keys.iter().enumerate() {
            if i % 2 == 0 {
                assert!(table.get(k).is_none());
            } else {
                assert_eq!(table.get(k), Some(&Value::Number(i as f64)));
            }
        }
    }

    #[test]
    fn test_growth_preserves_entries() {
        let mut heap = Heap::new();
        let mut table = Table::new();
        let keys: Vec<_> = (0..512)
            .map(|i| key(&mut heap, &format!("var_{}", i)))
            .collect();
        for (i, k) in keys.iter().enumerate() {
            table.set(Rc::clone(k), Value::Number(i as f64));
        }
        for (i, k) in keys.iter().enumerate() {
            assert_eq!(table.get(k), Some(&Value::Number(i as f64)));
        }
    }

    #[test]
    fn test_find_string_matches_content() {
        let mut heap = Heap::new();
        let mut table = Table::new();
        let k = key(&mut heap, "needle");
        table.set(Rc::clone(&k), Value::Nil);

        let found = table.find_string("needle", k.hash()).expect("present");
        assert!(Rc::ptr_eq(&found, &k));
        assert!(table.find_string("haystack", k.hash()).is_none());
    }
}
