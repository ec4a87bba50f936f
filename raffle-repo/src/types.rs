//! Database row types shared by the SQLite and PostgreSQL adapters, plus
//! the composition of multi-table reads into joined domain records.
//!
//! Column types decode the same way on both backends: UUIDs are stored as
//! `BLOB`/`UUID`, timestamps as RFC 3339 `TEXT`/`TIMESTAMPTZ`, and assigned
//! numbers as JSON `TEXT`/`JSONB`.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use sqlx::types::Json;
use uuid::Uuid;

use raffle_types::{
    CartEntry, CartEntryId, CartLine, Item, ItemId, Nyxcipher, NyxcipherId, NyxcipherWithItem,
    Payment, PaymentHistoryEntry, PaymentId, RepoError, Ticket, TicketId, User, UserId,
};

// ─────────────────────────────────────────────────────────────────────────────
// Database row structs (derive FromRow for automatic mapping)
// ─────────────────────────────────────────────────────────────────────────────

/// User row from database.
#[derive(FromRow)]
pub struct DbUser {
    pub id: Uuid,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// Item row from database.
#[derive(FromRow)]
pub struct DbItem {
    pub id: Uuid,
    pub item_name: String,
    pub item_description: Option<String>,
    pub item_value: i64,
    pub created_at: DateTime<Utc>,
}

/// Nyxcipher row from database.
#[derive(FromRow)]
pub struct DbNyxcipher {
    pub id: Uuid,
    pub nyxcipher_name: String,
    pub nyxcipher_category: Option<String>,
    pub nyxcipher_item_id: Uuid,
    pub charity_recipient: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Ticket row from database.
#[derive(FromRow)]
pub struct DbTicket {
    pub id: Uuid,
    pub nyxcipher_id: Uuid,
    pub ticket_count: i64,
    pub ticket_price: i64,
    pub payment_id: Option<Uuid>,
    pub nyxcipher_name: Option<String>,
    pub nyxcipher_category: Option<String>,
    pub nyxcipher_item_id: Option<Uuid>,
    pub charity_recipient: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Cart entry row from database.
#[derive(FromRow)]
pub struct DbCartEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub nyxcipher_id: Uuid,
    pub ticket_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Payment row from database.
#[derive(FromRow)]
pub struct DbPayment {
    pub id: Uuid,
    pub buyer_id: Uuid,
    pub nyxcipher_id: Uuid,
    pub ticket_id: Uuid,
    pub purchase_date: DateTime<Utc>,
    pub assigned_numbers: Json<Vec<u32>>,
    pub amount_paid: i64,
    pub payment_processor: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Domain conversion
// ─────────────────────────────────────────────────────────────────────────────

impl DbUser {
    /// Convert database row to domain User, attaching the cart entry ids.
    pub fn into_domain(self, cart_entry: Vec<Uuid>) -> User {
        User::from_parts(
            UserId::from_uuid(self.id),
            self.email,
            cart_entry.into_iter().map(CartEntryId::from_uuid).collect(),
            self.created_at,
        )
    }
}

impl DbItem {
    pub fn into_domain(self) -> Item {
        Item {
            id: ItemId::from_uuid(self.id),
            item_name: self.item_name,
            item_description: self.item_description,
            item_value: self.item_value,
            created_at: self.created_at,
        }
    }
}

impl DbNyxcipher {
    pub fn into_domain(self) -> Nyxcipher {
        Nyxcipher {
            id: NyxcipherId::from_uuid(self.id),
            nyxcipher_name: self.nyxcipher_name,
            nyxcipher_category: self.nyxcipher_category,
            nyxcipher_item_id: ItemId::from_uuid(self.nyxcipher_item_id),
            charity_recipient: self.charity_recipient,
            created_at: self.created_at,
        }
    }
}

impl DbTicket {
    /// Convert database row to domain Ticket.
    pub fn into_domain(self) -> Result<Ticket, RepoError> {
        let ticket_count = u32::try_from(self.ticket_count).map_err(|_| {
            RepoError::Database(format!("Invalid ticket count: {}", self.ticket_count))
        })?;

        Ok(Ticket {
            id: TicketId::from_uuid(self.id),
            nyxcipher_id: NyxcipherId::from_uuid(self.nyxcipher_id),
            ticket_count,
            ticket_price: self.ticket_price,
            payment_id: self.payment_id.map(PaymentId::from_uuid),
            nyxcipher_name: self.nyxcipher_name,
            nyxcipher_category: self.nyxcipher_category,
            nyxcipher_item_id: self.nyxcipher_item_id.map(ItemId::from_uuid),
            charity_recipient: self.charity_recipient,
            created_at: self.created_at,
        })
    }
}

impl DbCartEntry {
    pub fn into_domain(self) -> CartEntry {
        CartEntry {
            id: CartEntryId::from_uuid(self.id),
            user_id: UserId::from_uuid(self.user_id),
            nyxcipher_id: NyxcipherId::from_uuid(self.nyxcipher_id),
            ticket_id: TicketId::from_uuid(self.ticket_id),
            created_at: self.created_at,
        }
    }
}

impl DbPayment {
    pub fn into_domain(self) -> Payment {
        Payment::from_parts(
            PaymentId::from_uuid(self.id),
            UserId::from_uuid(self.buyer_id),
            NyxcipherId::from_uuid(self.nyxcipher_id),
            TicketId::from_uuid(self.ticket_id),
            self.purchase_date,
            self.assigned_numbers.0,
            self.amount_paid,
            self.payment_processor,
        )
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Join composition
// ─────────────────────────────────────────────────────────────────────────────

fn dangling(kind: &str, id: impl std::fmt::Display) -> RepoError {
    RepoError::Database(format!("Dangling {kind} reference: {id}"))
}

/// Joins cart entries with their tickets and raffles, keeping entry order.
///
/// Every entry must resolve both references.
pub fn compose_cart(
    entries: Vec<DbCartEntry>,
    tickets: Vec<DbTicket>,
    nyxciphers: Vec<DbNyxcipher>,
) -> Result<Vec<CartLine>, RepoError> {
    let mut tickets = tickets
        .into_iter()
        .map(|row| row.into_domain().map(|t| (t.id, t)))
        .collect::<Result<HashMap<_, _>, _>>()?;
    let nyxciphers: HashMap<_, _> = nyxciphers
        .into_iter()
        .map(|row| {
            let n = row.into_domain();
            (n.id, n)
        })
        .collect();

    entries
        .into_iter()
        .map(|row| {
            let entry = row.into_domain();
            let ticket = tickets
                .remove(&entry.ticket_id)
                .ok_or_else(|| dangling("ticket", entry.ticket_id))?;
            let nyxcipher = nyxciphers
                .get(&entry.nyxcipher_id)
                .cloned()
                .ok_or_else(|| dangling("nyxcipher", entry.nyxcipher_id))?;
            Ok(CartLine {
                entry,
                ticket,
                nyxcipher,
            })
        })
        .collect()
}

/// Joins a buyer's payments with raffle, prize item, buyer and ticket.
///
/// Payments keep the order they were read in. A missing ticket yields
/// `ticket: None`; a missing raffle or item is an integrity error.
pub fn compose_history(
    buyer: User,
    payments: Vec<DbPayment>,
    nyxciphers: Vec<DbNyxcipher>,
    items: Vec<DbItem>,
    tickets: Vec<DbTicket>,
) -> Result<Vec<PaymentHistoryEntry>, RepoError> {
    let items: HashMap<_, _> = items
        .into_iter()
        .map(|row| {
            let i = row.into_domain();
            (i.id, i)
        })
        .collect();
    let nyxciphers = nyxciphers
        .into_iter()
        .map(|row| {
            let nyxcipher = row.into_domain();
            let item = items
                .get(&nyxcipher.nyxcipher_item_id)
                .cloned()
                .ok_or_else(|| dangling("item", nyxcipher.nyxcipher_item_id))?;
            Ok((nyxcipher.id, NyxcipherWithItem { nyxcipher, item }))
        })
        .collect::<Result<HashMap<_, _>, RepoError>>()?;
    let tickets = tickets
        .into_iter()
        .map(|row| row.into_domain().map(|t| (t.id, t)))
        .collect::<Result<HashMap<_, _>, _>>()?;

    payments
        .into_iter()
        .map(|row| {
            let payment = row.into_domain();
            let nyxcipher = nyxciphers
                .get(&payment.nyxcipher_id)
                .cloned()
                .ok_or_else(|| dangling("nyxcipher", payment.nyxcipher_id))?;
            Ok(PaymentHistoryEntry {
                id: payment.id,
                nyxcipher,
                buyer: buyer.clone(),
                ticket: tickets.get(&payment.ticket_id).cloned(),
                purchase_date: payment.purchase_date,
                assigned_numbers: payment.assigned_numbers,
                amount_paid: payment.amount_paid,
                payment_processor: payment.payment_processor,
            })
        })
        .collect()
}
