use std::any::{type_name, TypeId};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Identity of a type in the graph.
///
/// Two keys are equal iff they were derived from the same type.
/// The type name is carried along for error messages and dumps only.
#[derive(Clone, Copy)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    /// Full type name, as reported by [std::any::type_name]
    pub fn type_name(&self) -> &'static str {
        self.name
    }

    /// Type name with module paths stripped, e.g. `Arc<dyn Logger>`
    pub fn short_name(&self) -> String {
        let mut out = String::with_capacity(self.name.len());
        let mut path = String::new();
        for c in self.name.chars() {
            if c.is_alphanumeric() || c == '_' || c == ':' {
                path.push(c);
            } else {
                out.push_str(last_segment(&path));
                path.clear();
                out.push(c);
            }
        }
        out.push_str(last_segment(&path));
        out
    }
}

fn last_segment(path: &str) -> &str {
    path.rsplit("::").next().unwrap_or(path)
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl PartialOrd for TypeKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// Names first for readable dumps, ids to stay consistent with Eq
impl Ord for TypeKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name
            .cmp(other.name)
            .then_with(|| self.id.cmp(&other.id))
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.short_name())
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TypeKey").field(&self.name).finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    trait Greeter {}
    struct Nested;

    #[test]
    fn keys_follow_types() {
        assert_eq!(TypeKey::of::<Arc<Nested>>(), TypeKey::of::<Arc<Nested>>());
        assert_ne!(TypeKey::of::<Arc<Nested>>(), TypeKey::of::<Nested>());
        assert_ne!(
            TypeKey::of::<Arc<dyn Greeter>>(),
            TypeKey::of::<Arc<Nested>>()
        );
    }

    #[test]
    fn short_names_strip_paths() {
        assert_eq!(TypeKey::of::<Arc<Nested>>().to_string(), "Arc<Nested>");
        assert_eq!(
            TypeKey::of::<Arc<dyn Greeter + Send>>().to_string(),
            "Arc<dyn Greeter + Send>"
        );
        assert_eq!(TypeKey::of::<Vec<String>>().to_string(), "Vec<String>");
        assert_eq!(TypeKey::of::<u32>().to_string(), "u32");
    }
}
