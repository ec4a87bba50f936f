//! Ticket domain model and the administrator patch applied to it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::catalog::Nyxcipher;
use super::ids::{ItemId, NyxcipherId, PaymentId, TicketId};
use crate::error::DomainError;

/// Upper bound on ticket units in one cart line; checkout draws one number per unit.
pub const MAX_TICKET_COUNT: u32 = 10_000;

/// A block of raffle tickets bought in one cart line.
///
/// The descriptive `nyxcipher_*` and `charity_recipient` fields are copied
/// from the raffle when the ticket is created and can later be overridden
/// by an administrator through [`TicketPatch`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Ticket {
    pub id: TicketId,
    pub nyxcipher_id: NyxcipherId,
    /// Number of ticket units; one assigned number is drawn per unit
    pub ticket_count: u32,
    /// Price of the whole block in smallest currency unit
    pub ticket_price: i64,
    /// Set once the ticket has been paid for
    pub payment_id: Option<PaymentId>,
    pub nyxcipher_name: Option<String>,
    pub nyxcipher_category: Option<String>,
    pub nyxcipher_item_id: Option<ItemId>,
    pub charity_recipient: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Ticket {
    /// Creates an unpaid ticket block for a raffle.
    ///
    /// # Validation
    /// - Between 1 and [`MAX_TICKET_COUNT`] ticket units
    /// - Price cannot be negative
    pub fn for_nyxcipher(
        nyxcipher: &Nyxcipher,
        ticket_count: u32,
        ticket_price: i64,
    ) -> Result<Self, DomainError> {
        if ticket_count == 0 {
            return Err(DomainError::EmptyTicketCount);
        }
        if ticket_count > MAX_TICKET_COUNT {
            return Err(DomainError::TicketCountTooLarge(ticket_count));
        }
        if ticket_price < 0 {
            return Err(DomainError::NegativeAmount);
        }

        Ok(Self {
            id: TicketId::new(),
            nyxcipher_id: nyxcipher.id,
            ticket_count,
            ticket_price,
            payment_id: None,
            nyxcipher_name: Some(nyxcipher.nyxcipher_name.clone()),
            nyxcipher_category: nyxcipher.nyxcipher_category.clone(),
            nyxcipher_item_id: Some(nyxcipher.nyxcipher_item_id),
            charity_recipient: nyxcipher.charity_recipient.clone(),
            created_at: Utc::now(),
        })
    }

    /// Returns true once a payment has been linked to this ticket.
    pub fn is_paid(&self) -> bool {
        self.payment_id.is_some()
    }

    /// Applies an administrator patch and returns the merged ticket.
    ///
    /// A patch field wins when it is present and non-empty; otherwise the
    /// current value is kept.
    pub fn merge(mut self, patch: TicketPatch) -> Self {
        if let Some(name) = non_blank(patch.nyxcipher_name) {
            self.nyxcipher_name = Some(name);
        }
        if let Some(category) = non_blank(patch.nyxcipher_category) {
            self.nyxcipher_category = Some(category);
        }
        if let Some(item_id) = patch.nyxcipher_item_id {
            self.nyxcipher_item_id = Some(item_id);
        }
        if let Some(recipient) = non_blank(patch.charity_recipient) {
            self.charity_recipient = Some(recipient);
        }
        self
    }
}

/// Administrator edit of a ticket's descriptive fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TicketPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nyxcipher_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nyxcipher_category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nyxcipher_item_id: Option<ItemId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub charity_recipient: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raffle() -> Nyxcipher {
        Nyxcipher::new(
            "Summer Draw".into(),
            Some("Outdoors".into()),
            ItemId::new(),
            Some("Food Bank".into()),
        )
        .unwrap()
    }

    #[test]
    fn test_ticket_copies_raffle_fields() {
        let nyx = raffle();
        let ticket = Ticket::for_nyxcipher(&nyx, 3, 1500).unwrap();

        assert_eq!(ticket.nyxcipher_id, nyx.id);
        assert_eq!(ticket.nyxcipher_name.as_deref(), Some("Summer Draw"));
        assert_eq!(ticket.nyxcipher_item_id, Some(nyx.nyxcipher_item_id));
        assert!(!ticket.is_paid());
    }

    #[test]
    fn test_ticket_validation() {
        let nyx = raffle();
        assert!(matches!(
            Ticket::for_nyxcipher(&nyx, 0, 100),
            Err(DomainError::EmptyTicketCount)
        ));
        assert!(matches!(
            Ticket::for_nyxcipher(&nyx, 1, -5),
            Err(DomainError::NegativeAmount)
        ));
    }

    #[test]
    fn test_ticket_count_upper_bound() {
        let nyx = raffle();
        assert!(Ticket::for_nyxcipher(&nyx, MAX_TICKET_COUNT, 100).is_ok());
        assert!(matches!(
            Ticket::for_nyxcipher(&nyx, MAX_TICKET_COUNT + 1, 100),
            Err(DomainError::TicketCountTooLarge(n)) if n == MAX_TICKET_COUNT + 1
        ));
        assert!(matches!(
            Ticket::for_nyxcipher(&nyx, u32::MAX, 100),
            Err(DomainError::TicketCountTooLarge(_))
        ));
    }

    #[test]
    fn test_merge_only_charity_recipient() {
        let ticket = Ticket::for_nyxcipher(&raffle(), 2, 200).unwrap();
        let before = ticket.clone();

        let merged = ticket.merge(TicketPatch {
            charity_recipient: Some("Animal Shelter".into()),
            ..Default::default()
        });

        assert_eq!(merged.charity_recipient.as_deref(), Some("Animal Shelter"));
        assert_eq!(merged.nyxcipher_name, before.nyxcipher_name);
        assert_eq!(merged.nyxcipher_category, before.nyxcipher_category);
        assert_eq!(merged.nyxcipher_item_id, before.nyxcipher_item_id);
    }

    #[test]
    fn test_merge_ignores_empty_strings() {
        let ticket = Ticket::for_nyxcipher(&raffle(), 2, 200).unwrap();
        let before = ticket.clone();

        let merged = ticket.merge(TicketPatch {
            nyxcipher_name: Some(String::new()),
            nyxcipher_category: Some("   ".into()),
            nyxcipher_item_id: None,
            charity_recipient: None,
        });

        assert_eq!(merged, before);
    }

    #[test]
    fn test_patch_deserializes_missing_fields_as_none() {
        let patch: TicketPatch = serde_json::from_str(r#"{"nyxcipher_name":"Winter"}"#).unwrap();
        assert_eq!(patch.nyxcipher_name.as_deref(), Some("Winter"));
        assert!(patch.charity_recipient.is_none());
    }
}
