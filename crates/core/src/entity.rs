//! Entity base: storage identity, business code, creation timestamp.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::EntityId;

/// Fields shared by every aggregate.
///
/// - `id` is assigned by storage and absent before the first save.
/// - `code` is the human-facing business identifier; it may be empty until a
///   code generator assigns one.
/// - `created_at` is set once and never changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityMeta {
    id: Option<EntityId>,
    code: String,
    created_at: DateTime<Utc>,
}

impl EntityMeta {
    /// Metadata for a not-yet-persisted aggregate, stamped with the current time.
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            id: None,
            code: code.into(),
            created_at: Utc::now(),
        }
    }

    /// Metadata for an aggregate loaded from storage.
    ///
    /// A missing `created_at` (legacy rows) falls back to the current time.
    pub fn restore(
        id: Option<EntityId>,
        code: impl Into<String>,
        created_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id,
            code: code.into(),
            created_at: created_at.unwrap_or_else(Utc::now),
        }
    }

    pub fn id(&self) -> Option<EntityId> {
        self.id
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Called by persistence adapters once storage has assigned an identity.
    pub fn assign_id(&mut self, id: EntityId) {
        self.id = Some(id);
    }
}

/// Aggregate with a storage identity and a business code.
///
/// Equality between aggregates is defined by business code alone and is
/// exposed through [`Entity::same_code_as`] instead of `PartialEq`. Two
/// aggregates whose codes are both empty are considered the same entity.
pub trait Entity {
    fn meta(&self) -> &EntityMeta;

    fn meta_mut(&mut self) -> &mut EntityMeta;

    fn id(&self) -> Option<EntityId> {
        self.meta().id()
    }

    fn code(&self) -> &str {
        self.meta().code()
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.meta().created_at()
    }

    /// Code-based identity: `true` iff both business codes are equal.
    fn same_code_as(&self, other: &Self) -> bool
    where
        Self: Sized,
    {
        self.code() == other.code()
    }
}
