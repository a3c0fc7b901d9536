//! The process-wide atom table.
//!
//! Every name, toolchain name, and directory string in the graph becomes
//! an `Atom`: a handle to one canonical `'static` copy of the string.
//! The table is insert-only and lives for the whole process, which is
//! what lets labels compare and hash by address alone.

use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Mutex, OnceLock};

/// Interns are spread over a handful of independently locked shards so
/// concurrent loads of unrelated files rarely contend.
const SHARD_COUNT: usize = 16;

struct AtomTable {
    shards: [Mutex<HashSet<&'static str>>; SHARD_COUNT],
}

impl AtomTable {
    fn global() -> &'static AtomTable {
        static TABLE: OnceLock<AtomTable> = OnceLock::new();
        TABLE.get_or_init(|| AtomTable {
            shards: std::array::from_fn(|_| Mutex::new(HashSet::new())),
        })
    }

    fn intern(&self, s: &str) -> &'static str {
        let mut shard = self.shards[Self::shard_of(s)].lock().unwrap();
        if let Some(&stored) = shard.get(s) {
            return stored;
        }
        // First sighting: move the bytes to the table's permanent storage.
        let stored: &'static str = Box::leak(s.into());
        shard.insert(stored);
        stored
    }

    /// FNV-1a over the bytes. Only has to spread strings across shards,
    /// not be collision-resistant.
    fn shard_of(s: &str) -> usize {
        let mut h: u64 = 0xcbf2_9ce4_8422_2325;
        for &byte in s.as_bytes() {
            h ^= u64::from(byte);
            h = h.wrapping_mul(0x0000_0100_0000_01b3);
        }
        (h as usize) % SHARD_COUNT
    }
}

/// A handle to an interned string.
///
/// Atoms with equal content share one address for the life of the
/// process, so cloning is free, equality is a pointer compare, and the
/// address doubles as a precomputed hash ingredient for labels.
#[derive(Clone, Copy)]
pub struct Atom(&'static str);

impl Atom {
    /// Intern `s`, returning the canonical atom for its content.
    pub fn new(s: impl AsRef<str>) -> Self {
        Atom(AtomTable::global().intern(s.as_ref()))
    }

    pub fn as_str(self) -> &'static str {
        self.0
    }

    pub fn is_empty(self) -> bool {
        self.0.is_empty()
    }

    /// The canonical address of the content, stable for the process.
    /// Equal atoms always report the same value.
    pub fn ptr_value(self) -> usize {
        self.0.as_ptr() as usize
    }
}

impl Default for Atom {
    fn default() -> Self {
        Atom::new("")
    }
}

impl PartialEq for Atom {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.0, other.0)
    }
}

impl Eq for Atom {}

impl Hash for Atom {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.ptr_value());
    }
}

impl fmt::Debug for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.0, f)
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

impl From<&str> for Atom {
    fn from(s: &str) -> Self {
        Atom::new(s)
    }
}

impl From<String> for Atom {
    fn from(s: String) -> Self {
        Atom::new(s)
    }
}

impl From<&String> for Atom {
    fn from(s: &String) -> Self {
        Atom::new(s)
    }
}
