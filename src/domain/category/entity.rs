//! Category entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::transaction::TransactionType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(i64);

impl CategoryId {
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl From<i64> for CategoryId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for CategoryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone)]
pub struct NewCategory {
    pub name: String,
    pub description: Option<String>,
    pub kind: TransactionType,
}

/// Global classification shared by every user's transactions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    id: CategoryId,
    name: String,
    description: Option<String>,
    kind: TransactionType,
    created_at: DateTime<Utc>,
}

impl Category {
    pub fn from_new(id: CategoryId, new: NewCategory) -> Self {
        Self {
            id,
            name: new.name,
            description: new.description,
            kind: new.kind,
            created_at: Utc::now(),
        }
    }

    pub fn restore(
        id: CategoryId,
        name: String,
        description: Option<String>,
        kind: TransactionType,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            description,
            kind,
            created_at,
        }
    }

    pub fn id(&self) -> CategoryId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn kind(&self) -> TransactionType {
        self.kind
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn set_description(&mut self, description: Option<String>) {
        self.description = description;
    }

    pub fn set_kind(&mut self, kind: TransactionType) {
        self.kind = kind;
    }
}
