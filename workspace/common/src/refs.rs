use serde::Serialize;
use utoipa::ToSchema;

/// A reference to another entity as it appears in API output.
///
/// A reference is either the raw stored identifier or the entity it was
/// expanded into. The two states are explicit; nothing downstream ever
/// has to guess whether a value is "still just an id".
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(untagged)]
pub enum ResourceRef<T> {
    /// The stored identifier, not (or not yet) expanded.
    Unresolved(String),
    /// The referenced entity, expanded by the reader.
    Resolved(T),
}

impl<T> ResourceRef<T> {
    /// Expand an unresolved reference when the lookup produced a value;
    /// otherwise keep carrying the bare identifier.
    pub fn resolve_with(id: String, lookup: Option<T>) -> Self {
        match lookup {
            Some(entity) => ResourceRef::Resolved(entity),
            None => ResourceRef::Unresolved(id),
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, ResourceRef::Resolved(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Debug, Clone, PartialEq, Serialize)]
    struct Stub {
        id: String,
        username: String,
    }

    #[test]
    fn unresolved_serializes_as_bare_id() {
        let r: ResourceRef<Stub> = ResourceRef::Unresolved("abc".to_string());
        assert_eq!(serde_json::to_value(&r).unwrap(), serde_json::json!("abc"));
    }

    #[test]
    fn resolved_serializes_as_object() {
        let r = ResourceRef::Resolved(Stub {
            id: "abc".to_string(),
            username: "alice".to_string(),
        });
        let v = serde_json::to_value(&r).unwrap();
        assert_eq!(v["username"], "alice");
    }

    #[test]
    fn resolve_with_keeps_id_on_missing_lookup() {
        let r: ResourceRef<Stub> = ResourceRef::resolve_with("abc".to_string(), None);
        assert!(!r.is_resolved());
    }
}
