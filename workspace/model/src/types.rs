//! Column types stored as JSON on the entity rows.
//!
//! Reference sets and the role variant are kept inline on the owning row,
//! the way the original document collections keep them, so one row update
//! is one atomic store operation.

use chrono::{DateTime, Utc};
use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};

/// A set of entity identifiers stored as a JSON array.
///
/// Insert and remove are idempotent: inserting a present id or removing an
/// absent one is a no-op. Insertion order is preserved.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct RefSet(Vec<String>);

impl RefSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an id. Returns false when the id was already present.
    pub fn insert(&mut self, id: &str) -> bool {
        if self.contains(id) {
            return false;
        }
        self.0.push(id.to_string());
        true
    }

    /// Remove an id. Returns false when the id was not present.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.0.len();
        self.0.retain(|existing| existing != id);
        self.0.len() != before
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.iter().any(|existing| existing == id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.0.clone()
    }
}

impl From<Vec<String>> for RefSet {
    fn from(mut ids: Vec<String>) -> Self {
        ids.dedup();
        Self(ids)
    }
}

/// The user's role, stored as a tagged JSON object.
///
/// The `role` tag carries the variant name, so the stored shape matches
/// the discriminator field the collection historically used, while the
/// role-specific fields exist only on the matching variant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
#[serde(tag = "role")]
pub enum UserRole {
    RegularUser {
        join_date: DateTime<Utc>,
    },
    AdminUser {
        permissions_level: i32,
        can_delete_movies: bool,
        can_remove_reviews: bool,
    },
}

impl UserRole {
    /// A regular user joining now.
    pub fn regular(join_date: DateTime<Utc>) -> Self {
        UserRole::RegularUser { join_date }
    }

    /// The variant name, as used for role filtering and login responses.
    pub fn name(&self) -> &'static str {
        match self {
            UserRole::RegularUser { .. } => "RegularUser",
            UserRole::AdminUser { .. } => "AdminUser",
        }
    }
}
