//! Data Transfer Objects (DTOs) for requests and responses.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{ItemId, NyxcipherId};

// ─────────────────────────────────────────────────────────────────────────────
// User DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Request to register a user.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegisterUserRequest {
    pub email: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Catalog DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Request to add a prize item to the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateItemRequest {
    pub item_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_description: Option<String>,
    /// Declared value in smallest currency unit
    pub item_value: i64,
}

/// Request to open a raffle for a prize item.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateNyxcipherRequest {
    pub nyxcipher_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nyxcipher_category: Option<String>,
    pub nyxcipher_item_id: ItemId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub charity_recipient: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Cart & Payment DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Request to put a ticket block for a raffle into the user's cart.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AddToCartRequest {
    pub nyxcipher_id: NyxcipherId,
    pub ticket_count: u32,
    /// Price of the whole block in smallest currency unit
    pub ticket_price: i64,
}

/// Request to check out the user's cart.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SavePaymentRequest {
    /// Name of the processor that settled the payment (recorded as-is)
    pub payment_processor: String,
}

/// Response after deleting a ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DeleteTicketResponse {
    pub deleted: bool,
}
