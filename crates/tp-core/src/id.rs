//! Interned object identifiers.

use lasso::{Spur, ThreadedRodeo};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::LazyLock;
use std::sync::atomic::{AtomicU64, Ordering};

/// Global interner for object ids. Ids live for the process lifetime;
/// a course holds a few hundred objects at most.
static IDS: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);

/// Identifier of one course object.
///
/// Interned: a 4-byte `Spur` index, so ids are `Copy` and compare and
/// hash in O(1). The string form is whatever the creating layer chose,
/// typically a control code (`31`) or a generated name for objects
/// that carry no code (`leg_12`).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectId(Spur);

impl ObjectId {
    /// Intern a string id, returning the existing id when already known.
    pub fn intern(s: &str) -> Self {
        ObjectId(IDS.get_or_intern(s))
    }

    /// A fresh, process-unique id for an object created during
    /// editing, e.g. `control_7` or `leg_12`.
    pub fn fresh(prefix: &str) -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        let n = NEXT.fetch_add(1, Ordering::Relaxed);
        Self::intern(&format!("{prefix}_{n}"))
    }

    /// Resolve back to the interned string.
    pub fn as_str(&self) -> &str {
        IDS.resolve(&self.0)
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.as_str())
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.as_str())
    }
}

// Serialized as the plain string so document snapshots stay readable
// and independent of interner state.
impl Serialize for ObjectId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ObjectId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(ObjectId::intern(&s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_string_same_id() {
        assert_eq!(ObjectId::intern("31"), ObjectId::intern("31"));
        assert_eq!(ObjectId::intern("31").as_str(), "31");
    }

    #[test]
    fn fresh_ids_never_collide() {
        let a = ObjectId::fresh("leg");
        let b = ObjectId::fresh("leg");
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("leg_"));
    }

    #[test]
    fn display_prefixes_a_hash() {
        assert_eq!(format!("{}", ObjectId::intern("31")), "#31");
    }
}
