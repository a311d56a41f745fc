use lasso::{Spur, ThreadedRodeo};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::LazyLock;

/// Global string interner for field IDs.
static INTERNER: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);

/// Opaque identifier of a field inside a form schema.
/// Interned: 4 bytes, Copy, Eq, Hash in O(1).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldId(Spur);

impl FieldId {
    /// Intern a string as a FieldId, or return the existing one.
    pub fn intern(s: &str) -> Self {
        FieldId(INTERNER.get_or_intern(s))
    }

    pub fn as_str(&self) -> &str {
        INTERNER.resolve(&self.0)
    }

    /// Generate a process-unique id of the form `field_<n>`.
    ///
    /// `taken` is consulted so ids loaded from storage (which may already use
    /// the same pattern) are never handed out twice within one schema.
    pub fn generate(taken: impl Fn(FieldId) -> bool) -> Self {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        loop {
            let n = COUNTER.fetch_add(1, Ordering::Relaxed);
            let id = Self::intern(&format!("field_{n}"));
            if !taken(id) {
                return id;
            }
        }
    }
}

impl fmt::Debug for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.as_str())
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for FieldId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for FieldId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(FieldId::intern(&s))
    }
}

/// Identifier assigned to a form by the persistence service.
///
/// Backends disagree on whether ids are numbers or strings, so both are
/// accepted on the wire and kept as text.
#[derive(Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct FormId(String);

impl FormId {
    pub fn new(id: impl Into<String>) -> Self {
        FormId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for FormId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FormId({})", self.0)
    }
}

impl fmt::Display for FormId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for FormId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Wire {
            Text(String),
            Int(i64),
        }
        Ok(match Wire::deserialize(deserializer)? {
            Wire::Text(s) => FormId(s),
            Wire::Int(n) => FormId(n.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_roundtrip() {
        let a = FieldId::intern("email_field");
        let b = FieldId::intern("email_field");
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "email_field");
    }

    #[test]
    fn generated_ids_are_unique() {
        let a = FieldId::generate(|_| false);
        let b = FieldId::generate(|_| false);
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("field_"));
    }

    #[test]
    fn generate_skips_taken_ids() {
        let first = FieldId::generate(|_| false);
        let n: u64 = first.as_str()["field_".len()..].parse().unwrap();
        let blocked = FieldId::intern(&format!("field_{}", n + 1));
        let next = FieldId::generate(|id| id == blocked);
        assert_ne!(next, blocked);
        assert_ne!(next, first);
    }

    #[test]
    fn form_id_accepts_numbers_and_strings() {
        let a: FormId = serde_json::from_str("42").unwrap();
        let b: FormId = serde_json::from_str("\"42\"").unwrap();
        assert_eq!(a, b);
        assert_eq!(serde_json::to_string(&a).unwrap(), "\"42\"");
    }
}
