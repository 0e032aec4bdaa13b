use uuid::Uuid;

/// Mint a fresh opaque entity identifier.
///
/// Identifiers are UUID v4 rendered in the canonical hyphenated form and
/// are immutable for the lifetime of the entity they name.
pub fn new_entity_id() -> String {
    Uuid::new_v4().to_string()
}

/// Check whether a string is a well-formed entity identifier.
///
/// Callers reject malformed identifiers before any store access is
/// attempted, so a bad id never turns into a store query.
pub fn is_valid_entity_id(id: &str) -> bool {
    Uuid::parse_str(id).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minted_ids_are_valid_and_unique() {
        let a = new_entity_id();
        let b = new_entity_id();
        assert!(is_valid_entity_id(&a));
        assert!(is_valid_entity_id(&b));
        assert_ne!(a, b);
    }

    #[test]
    fn rejects_malformed_identifiers() {
        assert!(!is_valid_entity_id(""));
        assert!(!is_valid_entity_id("not-an-id"));
        assert!(!is_valid_entity_id("12345"));
        assert!(!is_valid_entity_id("d83785a3-1f0b-4c8e-b8d4")); // truncated
    }
}
