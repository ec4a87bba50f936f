//! Domain models for the raffle payment service.

pub mod cart;
pub mod catalog;
pub mod ids;
pub mod payment;
pub mod ticket;
pub mod user;

pub use cart::{CartEntry, CartLine};
pub use catalog::{Item, Nyxcipher, NyxcipherWithItem};
pub use ids::{CartEntryId, ItemId, NyxcipherId, PaymentId, TicketId, UserId};
pub use payment::{
    ASSIGNED_NUMBER_MAX, ASSIGNED_NUMBER_MIN, CheckoutLine, Payment, PaymentHistoryEntry,
    generate_numbers,
};
pub use ticket::{MAX_TICKET_COUNT, Ticket, TicketPatch};
pub use user::User;
