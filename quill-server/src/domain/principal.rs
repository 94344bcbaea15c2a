use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An authenticated identity. Created on first successful magic-code
/// sign-in, never mutated or deleted afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Principal {
    pub id: Uuid,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl Principal {
    pub fn new(email: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            email: email.to_lowercase(),
            created_at: Utc::now(),
        }
    }
}
