//! User domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::ids::{CartEntryId, UserId};
use crate::error::DomainError;

/// A raffle participant, looked up by email.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct User {
    /// Unique identifier
    pub id: UserId,
    /// Login email (unique)
    pub email: String,
    /// Cart entries owned by the user, in insertion order
    pub cart_entry: Vec<CartEntryId>,
    /// When the user registered
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Creates a new user with an empty cart.
    ///
    /// # Validation
    /// - Email must have a non-empty local part and domain around a single `@`
    pub fn new(email: &str) -> Result<Self, DomainError> {
        let email = email.trim();
        match email.split_once('@') {
            Some((local, domain))
                if !local.is_empty() && !domain.is_empty() && !domain.contains('@') => {}
            _ => return Err(DomainError::InvalidEmail(email.to_string())),
        }

        Ok(Self {
            id: UserId::new(),
            email: email.to_string(),
            cart_entry: Vec::new(),
            created_at: Utc::now(),
        })
    }

    /// Creates a user with all fields specified (for database reconstruction).
    pub fn from_parts(
        id: UserId,
        email: String,
        cart_entry: Vec<CartEntryId>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            email,
            cart_entry,
            created_at,
        }
    }

    /// Returns true when the user has nothing to check out.
    pub fn has_empty_cart(&self) -> bool {
        self.cart_entry.is_empty()
    }
}
