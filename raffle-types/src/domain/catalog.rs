//! Raffle catalog: prize items and the nyxciphers (raffles) built on them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::ids::{ItemId, NyxcipherId};
use crate::error::DomainError;

/// A prize item that a raffle gives away.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Item {
    pub id: ItemId,
    pub item_name: String,
    pub item_description: Option<String>,
    /// Declared value in smallest currency unit
    pub item_value: i64,
    pub created_at: DateTime<Utc>,
}

impl Item {
    /// Creates a new catalog item.
    ///
    /// # Validation
    /// - Name cannot be blank
    /// - Value cannot be negative
    pub fn new(
        item_name: String,
        item_description: Option<String>,
        item_value: i64,
    ) -> Result<Self, DomainError> {
        if item_name.trim().is_empty() {
            return Err(DomainError::ValidationError(
                "Item name cannot be empty".into(),
            ));
        }
        if item_value < 0 {
            return Err(DomainError::NegativeAmount);
        }

        Ok(Self {
            id: ItemId::new(),
            item_name,
            item_description,
            item_value,
            created_at: Utc::now(),
        })
    }
}

/// A raffle: tickets are sold against it and it references the prize item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Nyxcipher {
    pub id: NyxcipherId,
    pub nyxcipher_name: String,
    pub nyxcipher_category: Option<String>,
    pub nyxcipher_item_id: ItemId,
    pub charity_recipient: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Nyxcipher {
    /// Creates a new raffle for the given prize item.
    pub fn new(
        nyxcipher_name: String,
        nyxcipher_category: Option<String>,
        nyxcipher_item_id: ItemId,
        charity_recipient: Option<String>,
    ) -> Result<Self, DomainError> {
        if nyxcipher_name.trim().is_empty() {
            return Err(DomainError::ValidationError(
                "Nyxcipher name cannot be empty".into(),
            ));
        }

        Ok(Self {
            id: NyxcipherId::new(),
            nyxcipher_name,
            nyxcipher_category,
            nyxcipher_item_id,
            charity_recipient,
            created_at: Utc::now(),
        })
    }
}

/// A raffle joined with its prize item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct NyxcipherWithItem {
    #[serde(flatten)]
    pub nyxcipher: Nyxcipher,
    pub item: Item,
}
