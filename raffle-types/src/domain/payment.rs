//! Payment domain model and ticket number assignment.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::cart::CartLine;
use super::catalog::NyxcipherWithItem;
use super::ids::{CartEntryId, NyxcipherId, PaymentId, TicketId, UserId};
use super::ticket::Ticket;
use super::user::User;

/// Smallest number that can be assigned to a ticket unit.
pub const ASSIGNED_NUMBER_MIN: u32 = 1_000_000;
/// Largest number that can be assigned to a ticket unit.
pub const ASSIGNED_NUMBER_MAX: u32 = 9_999_998;

/// Draws `count` uniformly random 7-digit numbers.
///
/// Numbers are not unique: the same number may appear twice in one draw
/// or across draws.
pub fn generate_numbers<R: Rng + ?Sized>(rng: &mut R, count: u32) -> Vec<u32> {
    (0..count)
        .map(|_| rng.random_range(ASSIGNED_NUMBER_MIN..=ASSIGNED_NUMBER_MAX))
        .collect()
}

/// A finalized purchase of one ticket block.
///
/// Payments are immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Payment {
    pub id: PaymentId,
    pub buyer_id: UserId,
    pub nyxcipher_id: NyxcipherId,
    pub ticket_id: TicketId,
    pub purchase_date: DateTime<Utc>,
    /// One number per ticket unit
    pub assigned_numbers: Vec<u32>,
    /// Amount charged in smallest currency unit
    pub amount_paid: i64,
    pub payment_processor: String,
}

impl Payment {
    /// Reconstructs a payment from database fields.
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        id: PaymentId,
        buyer_id: UserId,
        nyxcipher_id: NyxcipherId,
        ticket_id: TicketId,
        purchase_date: DateTime<Utc>,
        assigned_numbers: Vec<u32>,
        amount_paid: i64,
        payment_processor: String,
    ) -> Self {
        Self {
            id,
            buyer_id,
            nyxcipher_id,
            ticket_id,
            purchase_date,
            assigned_numbers,
            amount_paid,
            payment_processor,
        }
    }
}

/// One cart entry converted into the payment that replaces it.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutLine {
    /// Cart entry consumed by this payment
    pub cart_entry_id: CartEntryId,
    pub payment: Payment,
}

impl CheckoutLine {
    /// Prices a cart line and draws its ticket numbers.
    pub fn from_cart_line<R: Rng + ?Sized>(
        buyer_id: UserId,
        line: &CartLine,
        payment_processor: &str,
        rng: &mut R,
    ) -> Self {
        let payment = Payment {
            id: PaymentId::new(),
            buyer_id,
            nyxcipher_id: line.entry.nyxcipher_id,
            ticket_id: line.ticket.id,
            purchase_date: Utc::now(),
            assigned_numbers: generate_numbers(rng, line.ticket.ticket_count),
            amount_paid: line.ticket.ticket_price,
            payment_processor: payment_processor.to_string(),
        };

        Self {
            cart_entry_id: line.entry.id,
            payment,
        }
    }
}

/// A payment joined with its raffle (and prize item), buyer and ticket.
///
/// `ticket` is `None` when the ticket was deleted after purchase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PaymentHistoryEntry {
    pub id: PaymentId,
    pub nyxcipher: NyxcipherWithItem,
    pub buyer: User,
    pub ticket: Option<Ticket>,
    pub purchase_date: DateTime<Utc>,
    pub assigned_numbers: Vec<u32>,
    pub amount_paid: i64,
    pub payment_processor: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CartEntry, ItemId, Nyxcipher};

    /// Degenerate random source that always yields zero bits.
    struct ZeroRng;

    impl rand::RngCore for ZeroRng {
        fn next_u32(&mut self) -> u32 {
            0
        }

        fn next_u64(&mut self) -> u64 {
            0
        }

        fn fill_bytes(&mut self, dst: &mut [u8]) {
            dst.fill(0);
        }
    }

    fn cart_line(ticket_count: u32, ticket_price: i64) -> CartLine {
        let nyxcipher = Nyxcipher::new("Draw".into(), None, ItemId::new(), None).unwrap();
        let ticket = Ticket::for_nyxcipher(&nyxcipher, ticket_count, ticket_price).unwrap();
        let entry = CartEntry::new(UserId::new(), &ticket);
        CartLine {
            entry,
            ticket,
            nyxcipher,
        }
    }

    #[test]
    fn test_generate_numbers_length_and_range() {
        let numbers = generate_numbers(&mut rand::rng(), 500);

        assert_eq!(numbers.len(), 500);
        assert!(
            numbers
                .iter()
                .all(|n| (ASSIGNED_NUMBER_MIN..=ASSIGNED_NUMBER_MAX).contains(n))
        );
    }

    #[test]
    fn test_generate_numbers_zero_count() {
        assert!(generate_numbers(&mut rand::rng(), 0).is_empty());
    }

    #[test]
    fn test_generate_numbers_permits_duplicates() {
        let numbers = generate_numbers(&mut ZeroRng, 3);

        assert_eq!(numbers.len(), 3);
        assert!(numbers.windows(2).all(|pair| pair[0] == pair[1]));
        assert!((ASSIGNED_NUMBER_MIN..=ASSIGNED_NUMBER_MAX).contains(&numbers[0]));
    }

    #[test]
    fn test_checkout_line_from_cart_line() {
        let line = cart_line(4, 2000);
        let buyer = UserId::new();

        let checkout = CheckoutLine::from_cart_line(buyer, &line, "stripe", &mut rand::rng());

        assert_eq!(checkout.cart_entry_id, line.entry.id);
        assert_eq!(checkout.payment.buyer_id, buyer);
        assert_eq!(checkout.payment.ticket_id, line.ticket.id);
        assert_eq!(checkout.payment.nyxcipher_id, line.nyxcipher.id);
        assert_eq!(checkout.payment.assigned_numbers.len(), 4);
        assert_eq!(checkout.payment.amount_paid, 2000);
        assert_eq!(checkout.payment.payment_processor, "stripe");
    }
}
