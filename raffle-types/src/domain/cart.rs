//! Cart domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::catalog::Nyxcipher;
use super::ids::{CartEntryId, NyxcipherId, TicketId, UserId};
use super::ticket::Ticket;

/// A pending purchase: a ticket block for one raffle, owned by a user.
///
/// Cart entries are deleted when they are converted into payments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CartEntry {
    pub id: CartEntryId,
    pub user_id: UserId,
    pub nyxcipher_id: NyxcipherId,
    pub ticket_id: TicketId,
    pub created_at: DateTime<Utc>,
}

impl CartEntry {
    /// Creates a cart entry for a freshly created ticket.
    pub fn new(user_id: UserId, ticket: &Ticket) -> Self {
        Self {
            id: CartEntryId::new(),
            user_id,
            nyxcipher_id: ticket.nyxcipher_id,
            ticket_id: ticket.id,
            created_at: Utc::now(),
        }
    }
}

/// A cart entry joined with the ticket and raffle it references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CartLine {
    pub entry: CartEntry,
    pub ticket: Ticket,
    pub nyxcipher: Nyxcipher,
}
