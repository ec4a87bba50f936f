//! # Raffle Types
//!
//! Domain types and port traits for the raffle payment service.
//! This crate has ZERO external IO dependencies - only data structures,
//! business rules, and trait definitions.
//!
//! ## Architecture
//!
//! This crate represents the **innermost core** of the hexagonal architecture:
//! - `domain/` - Pure domain types (User, Nyxcipher, Ticket, Payment, ...)
//! - `ports/` - Trait definitions that adapters must implement
//! - `dto/` - Data Transfer Objects for API boundaries
//! - `error/` - Domain and application error types

pub mod domain;
pub mod dto;
pub mod error;
pub mod ports;

// Re-export commonly used types
pub use domain::{
    CartEntry, CartEntryId, CartLine, CheckoutLine, Item, ItemId, MAX_TICKET_COUNT, Nyxcipher,
    NyxcipherId, NyxcipherWithItem, Payment, PaymentHistoryEntry, PaymentId, Ticket, TicketId, TicketPatch,
    User, UserId,
};
pub use dto::*;
pub use error::{AppError, DomainError, RepoError};
pub use ports::RaffleRepository;
