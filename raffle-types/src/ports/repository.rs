//! Repository port trait.
//!
//! This is the primary port in our hexagonal architecture.
//! Adapters (Postgres, SQLite, in-memory mocks) implement this trait.

use crate::domain::{
    CartEntry, CartLine, CheckoutLine, Item, ItemId, Nyxcipher, NyxcipherId, Payment,
    PaymentHistoryEntry, PaymentId, Ticket, TicketId, User, UserId,
};
use crate::dto::{CreateItemRequest, CreateNyxcipherRequest, RegisterUserRequest};
use crate::error::RepoError;

/// The main repository port for the raffle payment service.
///
/// Related records are loaded through explicit joins; nothing is lazily
/// populated behind the caller's back.
#[async_trait::async_trait]
pub trait RaffleRepository: Send + Sync + 'static {
    // ─────────────────────────────────────────────────────────────────────────────
    // Users
    // ─────────────────────────────────────────────────────────────────────────────

    /// Registers a user with an empty cart.
    ///
    /// Fails with `RepoError::Conflict` if the email is already taken.
    async fn create_user(&self, req: RegisterUserRequest) -> Result<User, RepoError>;

    /// Finds a user by email, including the ids of their cart entries.
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;

    // ─────────────────────────────────────────────────────────────────────────────
    // Catalog
    // ─────────────────────────────────────────────────────────────────────────────

    /// Adds a prize item to the catalog.
    async fn create_item(&self, req: CreateItemRequest) -> Result<Item, RepoError>;

    /// Gets a prize item by ID.
    async fn get_item(&self, id: ItemId) -> Result<Option<Item>, RepoError>;

    /// Opens a raffle. Fails with `RepoError::NotFound` if the item is unknown.
    async fn create_nyxcipher(&self, req: CreateNyxcipherRequest) -> Result<Nyxcipher, RepoError>;

    /// Gets a raffle by ID.
    async fn get_nyxcipher(&self, id: NyxcipherId) -> Result<Option<Nyxcipher>, RepoError>;

    // ─────────────────────────────────────────────────────────────────────────────
    // Cart
    // ─────────────────────────────────────────────────────────────────────────────

    /// Stores a new ticket and the cart entry that points at it.
    async fn add_cart_entry(&self, user_id: UserId, ticket: Ticket)
    -> Result<CartEntry, RepoError>;

    /// Lists a user's cart entries joined with their tickets and raffles,
    /// in insertion order.
    async fn list_cart(&self, user_id: UserId) -> Result<Vec<CartLine>, RepoError>;

    // ─────────────────────────────────────────────────────────────────────────────
    // Payments (checkout MUST be atomic)
    // ─────────────────────────────────────────────────────────────────────────────

    /// Converts cart entries into payments.
    ///
    /// For every line: inserts the payment, deletes the cart entry and links
    /// the ticket to the payment. All lines commit together or not at all.
    async fn checkout(
        &self,
        user_id: UserId,
        lines: Vec<CheckoutLine>,
    ) -> Result<Vec<Payment>, RepoError>;

    /// Gets a bare payment record by ID.
    async fn get_payment(&self, id: PaymentId) -> Result<Option<Payment>, RepoError>;

    /// Lists a buyer's payments joined with raffle, prize item, buyer and
    /// ticket, newest purchase first.
    async fn list_payment_history(
        &self,
        buyer_id: UserId,
    ) -> Result<Vec<PaymentHistoryEntry>, RepoError>;

    // ─────────────────────────────────────────────────────────────────────────────
    // Tickets
    // ─────────────────────────────────────────────────────────────────────────────

    /// Gets a ticket by ID.
    async fn get_ticket(&self, id: TicketId) -> Result<Option<Ticket>, RepoError>;

    /// Persists the descriptive fields of a ticket.
    ///
    /// Fails with `RepoError::NotFound` if the ticket no longer exists.
    async fn update_ticket(&self, ticket: &Ticket) -> Result<(), RepoError>;

    /// Deletes a ticket. Returns false if nothing was deleted.
    async fn delete_ticket(&self, id: TicketId) -> Result<bool, RepoError>;
}
