//! The process-wide string pool: a thread-unsafe interner, initialized once,
//! returning stable small integer ids for byte strings.
//!
//! This is consumed as a black box everywhere else in the loader
//! (`add(bytes|null) → id`, `id → bytes`); the implementation here is the
//! one concrete instance the crate ships, isolated behind [`StringId`] and
//! [`Strings`] so a future caller could swap in a thread-safe interner
//! without touching any parsing code.

use std::collections::HashMap;

/// A stable small integer id for an interned byte string.
///
/// Id `0` is reserved for the empty/absent string: a null pointer interns to
/// id 0, matching the model's "empty name" convention (an unnamed tag has
/// `name == StringId::EMPTY`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct StringId(u32);

impl StringId {
    /// The id of the empty string, always present at index 0.
    pub const EMPTY: StringId = StringId(0);

    /// The raw dense index backing this id, for debugging/pretty-printing.
    pub fn index(self) -> u32 {
        self.0
    }
}

/// A single, thread-unsafe, process-wide string interner.
///
/// Construct once per load (`Strings::new()`) and thread a shared reference
/// through every CU. Parsing a single file is single-threaded, so a plain
/// `HashMap` is sufficient — no interior mutability locking is required.
#[derive(Debug)]
pub struct Strings {
    by_bytes: HashMap<Box<[u8]>, StringId>,
    by_id: Vec<Box<[u8]>>,
}

impl Strings {
    /// Construct a new, empty pool. Id 0 is pre-populated with the empty
    /// string so `StringId::EMPTY` is always valid.
    pub fn new() -> Self {
        let mut pool = Strings {
            by_bytes: HashMap::new(),
            by_id: Vec::new(),
        };
        let empty: Box<[u8]> = Box::from(&b""[..]);
        pool.by_bytes.insert(empty.clone(), StringId::EMPTY);
        pool.by_id.push(empty);
        pool
    }

    /// Intern `bytes`, returning its stable id. `None` is treated the same
    /// as an empty slice, both mapping to [`StringId::EMPTY`].
    pub fn add(&mut self, bytes: Option<&[u8]>) -> StringId {
        let bytes = bytes.unwrap_or(b"");
        if bytes.is_empty() {
            return StringId::EMPTY;
        }
        if let Some(&id) = self.by_bytes.get(bytes) {
            return id;
        }
        let id = StringId(self.by_id.len() as u32);
        let boxed: Box<[u8]> = Box::from(bytes);
        self.by_id.push(boxed.clone());
        self.by_bytes.insert(boxed, id);
        id
    }

    /// Intern a UTF-8 `str`, a convenience wrapper over [`Strings::add`].
    pub fn add_str(&mut self, s: &str) -> StringId {
        self.add(Some(s.as_bytes()))
    }

    /// Look up the bytes behind `id`. Panics if `id` was never returned by
    /// this pool: callers never hold ids from a different pool instance.
    pub fn ptr(&self, id: StringId) -> &[u8] {
        &self.by_id[id.0 as usize]
    }

    /// Convenience: look up `id` as a `&str`, lossily replacing invalid
    /// UTF-8. DWARF producers occasionally emit non-UTF-8 names; failing the
    /// whole load over a display string would be disproportionate.
    pub fn str(&self, id: StringId) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(self.ptr(id))
    }

    /// Number of distinct strings interned so far, including the empty
    /// string at index 0.
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// True only right after construction.
    pub fn is_empty(&self) -> bool {
        self.len() <= 1
    }
}

impl Default for Strings {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_is_id_zero() {
        let pool = Strings::new();
        assert_eq!(pool.ptr(StringId::EMPTY), b"");
    }

    #[test]
    fn none_maps_to_empty() {
        let mut pool = Strings::new();
        assert_eq!(pool.add(None), StringId::EMPTY);
    }

    #[test]
    fn interning_is_deduplicated() {
        let mut pool = Strings::new();
        let a = pool.add_str("foo");
        let b = pool.add_str("foo");
        assert_eq!(a, b);
        let c = pool.add_str("bar");
        assert_ne!(a, c);
        assert_eq!(pool.ptr(a), b"foo");
        assert_eq!(pool.ptr(c), b"bar");
    }

    #[test]
    fn len_counts_empty_plus_distinct() {
        let mut pool = Strings::new();
        pool.add_str("a");
        pool.add_str("b");
        pool.add_str("a");
        assert_eq!(pool.len(), 3);
    }
}
