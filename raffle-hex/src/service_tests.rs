//! PaymentService unit tests.

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use raffle_types::{
        AddToCartRequest, AppError, CartEntry, CartLine, CheckoutLine, CreateItemRequest,
        CreateNyxcipherRequest, Item, ItemId, MAX_TICKET_COUNT, Nyxcipher, NyxcipherId,
        NyxcipherWithItem, Payment, PaymentHistoryEntry, PaymentId, RaffleRepository,
        RegisterUserRequest, RepoError, SavePaymentRequest, Ticket, TicketId, TicketPatch, User,
        UserId,
    };

    use crate::PaymentService;

    /// Simple in-memory repository for testing the service layer.
    pub struct MockRepo {
        users: Mutex<HashMap<UserId, User>>,
        items: Mutex<HashMap<ItemId, Item>>,
        nyxciphers: Mutex<HashMap<NyxcipherId, Nyxcipher>>,
        tickets: Mutex<HashMap<TicketId, Ticket>>,
        cart: Mutex<Vec<CartEntry>>,
        payments: Mutex<Vec<Payment>>,
    }

    impl MockRepo {
        pub fn new() -> Self {
            Self {
                users: Mutex::new(HashMap::new()),
                items: Mutex::new(HashMap::new()),
                nyxciphers: Mutex::new(HashMap::new()),
                tickets: Mutex::new(HashMap::new()),
                cart: Mutex::new(Vec::new()),
                payments: Mutex::new(Vec::new()),
            }
        }

        fn with_cart(&self, mut user: User) -> User {
            user.cart_entry = self
                .cart
                .lock()
                .unwrap()
                .iter()
                .filter(|e| e.user_id == user.id)
                .map(|e| e.id)
                .collect();
            user
        }

        fn payment_count(&self) -> usize {
            self.payments.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl RaffleRepository for MockRepo {
        async fn create_user(&self, req: RegisterUserRequest) -> Result<User, RepoError> {
            let user = User::new(&req.email).map_err(RepoError::Domain)?;
            let mut users = self.users.lock().unwrap();
            if users.values().any(|u| u.email == user.email) {
                return Err(RepoError::Conflict(format!(
                    "Email already registered: {}",
                    user.email
                )));
            }
            users.insert(user.id, user.clone());
            Ok(user)
        }

        async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
            let user = self
                .users
                .lock()
                .unwrap()
                .values()
                .find(|u| u.email == email)
                .cloned();
            Ok(user.map(|u| self.with_cart(u)))
        }

        async fn create_item(&self, req: CreateItemRequest) -> Result<Item, RepoError> {
            let item = Item::new(req.item_name, req.item_description, req.item_value)
                .map_err(RepoError::Domain)?;
            self.items.lock().unwrap().insert(item.id, item.clone());
            Ok(item)
        }

        async fn get_item(&self, id: ItemId) -> Result<Option<Item>, RepoError> {
            Ok(self.items.lock().unwrap().get(&id).cloned())
        }

        async fn create_nyxcipher(
            &self,
            req: CreateNyxcipherRequest,
        ) -> Result<Nyxcipher, RepoError> {
            if !self.items.lock().unwrap().contains_key(&req.nyxcipher_item_id) {
                return Err(RepoError::NotFound);
            }
            let nyxcipher = Nyxcipher::new(
                req.nyxcipher_name,
                req.nyxcipher_category,
                req.nyxcipher_item_id,
                req.charity_recipient,
            )
            .map_err(RepoError::Domain)?;
            self.nyxciphers
                .lock()
                .unwrap()
                .insert(nyxcipher.id, nyxcipher.clone());
            Ok(nyxcipher)
        }

        async fn get_nyxcipher(&self, id: NyxcipherId) -> Result<Option<Nyxcipher>, RepoError> {
            Ok(self.nyxciphers.lock().unwrap().get(&id).cloned())
        }

        async fn add_cart_entry(
            &self,
            user_id: UserId,
            ticket: Ticket,
        ) -> Result<CartEntry, RepoError> {
            let entry = CartEntry::new(user_id, &ticket);
            self.tickets.lock().unwrap().insert(ticket.id, ticket);
            self.cart.lock().unwrap().push(entry.clone());
            Ok(entry)
        }

        async fn list_cart(&self, user_id: UserId) -> Result<Vec<CartLine>, RepoError> {
            let cart = self.cart.lock().unwrap();
            let tickets = self.tickets.lock().unwrap();
            let nyxciphers = self.nyxciphers.lock().unwrap();
            cart.iter()
                .filter(|e| e.user_id == user_id)
                .map(|entry| {
                    Ok(CartLine {
                        entry: entry.clone(),
                        ticket: tickets
                            .get(&entry.ticket_id)
                            .cloned()
                            .ok_or(RepoError::NotFound)?,
                        nyxcipher: nyxciphers
                            .get(&entry.nyxcipher_id)
                            .cloned()
                            .ok_or(RepoError::NotFound)?,
                    })
                })
                .collect()
        }

        async fn checkout(
            &self,
            user_id: UserId,
            lines: Vec<CheckoutLine>,
        ) -> Result<Vec<Payment>, RepoError> {
            let mut cart = self.cart.lock().unwrap();
            let mut tickets = self.tickets.lock().unwrap();

            // Validate every line before touching anything.
            for line in &lines {
                if !cart
                    .iter()
                    .any(|e| e.id == line.cart_entry_id && e.user_id == user_id)
                {
                    return Err(RepoError::Conflict("Cart entry is gone".into()));
                }
                if !tickets.contains_key(&line.payment.ticket_id) {
                    return Err(RepoError::NotFound);
                }
            }

            let mut payments = Vec::with_capacity(lines.len());
            for line in lines {
                cart.retain(|e| e.id != line.cart_entry_id);
                if let Some(ticket) = tickets.get_mut(&line.payment.ticket_id) {
                    ticket.payment_id = Some(line.payment.id);
                }
                payments.push(line.payment);
            }
            self.payments
                .lock()
                .unwrap()
                .extend(payments.iter().cloned());
            Ok(payments)
        }

        async fn get_payment(&self, id: PaymentId) -> Result<Option<Payment>, RepoError> {
            Ok(self
                .payments
                .lock()
                .unwrap()
                .iter()
                .find(|p| p.id == id)
                .cloned())
        }

        async fn list_payment_history(
            &self,
            buyer_id: UserId,
        ) -> Result<Vec<PaymentHistoryEntry>, RepoError> {
            let buyer = self
                .users
                .lock()
                .unwrap()
                .get(&buyer_id)
                .cloned()
                .ok_or(RepoError::NotFound)?;
            let buyer = self.with_cart(buyer);

            let mut payments: Vec<Payment> = self
                .payments
                .lock()
                .unwrap()
                .iter()
                .filter(|p| p.buyer_id == buyer_id)
                .cloned()
                .collect();
            payments.sort_by(|a, b| b.purchase_date.cmp(&a.purchase_date));

            let items = self.items.lock().unwrap();
            let nyxciphers = self.nyxciphers.lock().unwrap();
            let tickets = self.tickets.lock().unwrap();
            payments
                .into_iter()
                .map(|p| {
                    let nyxcipher = nyxciphers
                        .get(&p.nyxcipher_id)
                        .cloned()
                        .ok_or(RepoError::NotFound)?;
                    let item = items
                        .get(&nyxcipher.nyxcipher_item_id)
                        .cloned()
                        .ok_or(RepoError::NotFound)?;
                    Ok(PaymentHistoryEntry {
                        id: p.id,
                        nyxcipher: NyxcipherWithItem { nyxcipher, item },
                        buyer: buyer.clone(),
                        ticket: tickets.get(&p.ticket_id).cloned(),
                        purchase_date: p.purchase_date,
                        assigned_numbers: p.assigned_numbers,
                        amount_paid: p.amount_paid,
                        payment_processor: p.payment_processor,
                    })
                })
                .collect()
        }

        async fn get_ticket(&self, id: TicketId) -> Result<Option<Ticket>, RepoError> {
            Ok(self.tickets.lock().unwrap().get(&id).cloned())
        }

        async fn update_ticket(&self, ticket: &Ticket) -> Result<(), RepoError> {
            let mut tickets = self.tickets.lock().unwrap();
            let slot = tickets.get_mut(&ticket.id).ok_or(RepoError::NotFound)?;
            *slot = ticket.clone();
            Ok(())
        }

        async fn delete_ticket(&self, id: TicketId) -> Result<bool, RepoError> {
            let removed = self.tickets.lock().unwrap().remove(&id).is_some();
            if removed {
                self.cart.lock().unwrap().retain(|e| e.ticket_id != id);
            }
            Ok(removed)
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Fixtures
    // ─────────────────────────────────────────────────────────────────────────

    const EMAIL: &str = "alice@example.com";

    async fn setup() -> (PaymentService<MockRepo>, Nyxcipher) {
        let service = PaymentService::new(MockRepo::new());
        service
            .register_user(RegisterUserRequest {
                email: EMAIL.to_string(),
            })
            .await
            .unwrap();
        let item = service
            .create_item(CreateItemRequest {
                item_name: "Mountain bike".to_string(),
                item_description: None,
                item_value: 120_000,
            })
            .await
            .unwrap();
        let nyxcipher = service
            .create_nyxcipher(CreateNyxcipherRequest {
                nyxcipher_name: "Summer Draw".to_string(),
                nyxcipher_category: Some("Sports".to_string()),
                nyxcipher_item_id: item.id,
                charity_recipient: Some("Red Cross".to_string()),
            })
            .await
            .unwrap();
        (service, nyxcipher)
    }

    async fn add(service: &PaymentService<MockRepo>, nyxcipher: &Nyxcipher, count: u32) -> CartLine {
        service
            .add_to_cart(
                EMAIL,
                AddToCartRequest {
                    nyxcipher_id: nyxcipher.id,
                    ticket_count: count,
                    ticket_price: i64::from(count) * 500,
                },
            )
            .await
            .unwrap()
    }

    fn checkout_request() -> SavePaymentRequest {
        SavePaymentRequest {
            payment_processor: "paypal".to_string(),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // History
    // ─────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_history_unknown_email_not_found() {
        let (service, _) = setup().await;

        let result = service.get_payments_history("ghost@example.com").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_history_sorted_newest_first() {
        let (service, nyxcipher) = setup().await;
        add(&service, &nyxcipher, 1).await;
        service.save_payment(EMAIL, checkout_request()).await.unwrap();
        add(&service, &nyxcipher, 2).await;
        add(&service, &nyxcipher, 3).await;
        service.save_payment(EMAIL, checkout_request()).await.unwrap();

        let history = service.get_payments_history(EMAIL).await.unwrap();

        assert_eq!(history.len(), 3);
        assert!(
            history
                .windows(2)
                .all(|w| w[0].purchase_date >= w[1].purchase_date)
        );
        assert!(history.iter().all(|h| h.buyer.email == EMAIL));
        assert!(history.iter().all(|h| h.nyxcipher.item.item_name == "Mountain bike"));
    }

    #[tokio::test]
    async fn test_history_empty_without_payments() {
        let (service, _) = setup().await;

        let history = service.get_payments_history(EMAIL).await.unwrap();

        assert!(history.is_empty());
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Checkout
    // ─────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_checkout_empty_cart_fails() {
        let (service, _) = setup().await;

        let result = service.save_payment(EMAIL, checkout_request()).await;

        assert!(matches!(result, Err(AppError::Validation(_))));
        assert_eq!(service.repo().payment_count(), 0);
    }

    #[tokio::test]
    async fn test_checkout_unknown_user_fails() {
        let (service, _) = setup().await;

        let result = service
            .save_payment("ghost@example.com", checkout_request())
            .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_checkout_converts_every_cart_entry() {
        let (service, nyxcipher) = setup().await;
        let first = add(&service, &nyxcipher, 2).await;
        let second = add(&service, &nyxcipher, 4).await;

        let payments = service.save_payment(EMAIL, checkout_request()).await.unwrap();

        assert_eq!(payments.len(), 2);
        assert_eq!(payments[0].ticket_id, first.ticket.id);
        assert_eq!(payments[1].ticket_id, second.ticket.id);
        assert_eq!(payments[0].assigned_numbers.len(), 2);
        assert_eq!(payments[1].assigned_numbers.len(), 4);
        assert_eq!(payments[1].amount_paid, second.ticket.ticket_price);
        assert!(payments.iter().all(|p| p.payment_processor == "paypal"));
        assert!(
            payments
                .iter()
                .flat_map(|p| &p.assigned_numbers)
                .all(|n| (1_000_000..=9_999_998).contains(n))
        );

        assert!(service.get_cart(EMAIL).await.unwrap().is_empty());
        let ticket = service.repo().get_ticket(first.ticket.id).await.unwrap().unwrap();
        assert_eq!(ticket.payment_id, Some(payments[0].id));
    }

    #[tokio::test]
    async fn test_get_one_paid_payment() {
        let (service, nyxcipher) = setup().await;
        add(&service, &nyxcipher, 1).await;
        let payments = service.save_payment(EMAIL, checkout_request()).await.unwrap();

        let payment = service
            .get_one_paid_payment(EMAIL, payments[0].id)
            .await
            .unwrap();

        assert_eq!(payment, payments[0]);
    }

    #[tokio::test]
    async fn test_get_one_paid_payment_not_found() {
        let (service, _) = setup().await;

        let missing = service.get_one_paid_payment(EMAIL, PaymentId::new()).await;
        let no_user = service
            .get_one_paid_payment("ghost@example.com", PaymentId::new())
            .await;

        assert!(matches!(missing, Err(AppError::NotFound(_))));
        assert!(matches!(no_user, Err(AppError::NotFound(_))));
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Ticket administration
    // ─────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_update_changes_only_patched_field() {
        let (service, nyxcipher) = setup().await;
        let line = add(&service, &nyxcipher, 1).await;

        let updated = service
            .update_payment(
                line.ticket.id,
                TicketPatch {
                    charity_recipient: Some("Animal Shelter".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.charity_recipient.as_deref(), Some("Animal Shelter"));
        assert_eq!(updated.nyxcipher_name, line.ticket.nyxcipher_name);
        assert_eq!(updated.nyxcipher_category, line.ticket.nyxcipher_category);
        assert_eq!(updated.nyxcipher_item_id, line.ticket.nyxcipher_item_id);

        let stored = service.repo().get_ticket(line.ticket.id).await.unwrap().unwrap();
        assert_eq!(stored, updated);
    }

    #[tokio::test]
    async fn test_update_blank_fields_are_ignored() {
        let (service, nyxcipher) = setup().await;
        let line = add(&service, &nyxcipher, 1).await;

        let updated = service
            .update_payment(
                line.ticket.id,
                TicketPatch {
                    nyxcipher_name: Some("   ".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated, line.ticket);
    }

    #[tokio::test]
    async fn test_update_unknown_ticket_not_found() {
        let (service, _) = setup().await;

        let result = service
            .update_payment(TicketId::new(), TicketPatch::default())
            .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_unknown_ticket_not_found() {
        let (service, _) = setup().await;

        let result = service.delete_payment(TicketId::new()).await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_then_lookup_not_found() {
        let (service, nyxcipher) = setup().await;
        let line = add(&service, &nyxcipher, 1).await;

        assert!(service.delete_payment(line.ticket.id).await.unwrap());

        let again = service.delete_payment(line.ticket.id).await;
        let update = service
            .update_payment(line.ticket.id, TicketPatch::default())
            .await;
        assert!(matches!(again, Err(AppError::NotFound(_))));
        assert!(matches!(update, Err(AppError::NotFound(_))));
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Users, catalog & cart
    // ─────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_register_duplicate_email_fails() {
        let (service, _) = setup().await;

        let result = service
            .register_user(RegisterUserRequest {
                email: EMAIL.to_string(),
            })
            .await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_register_invalid_email_fails() {
        let service = PaymentService::new(MockRepo::new());

        let result = service
            .register_user(RegisterUserRequest {
                email: "alice".to_string(),
            })
            .await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_create_item_negative_value_fails() {
        let service = PaymentService::new(MockRepo::new());

        let result = service
            .create_item(CreateItemRequest {
                item_name: "Bike".to_string(),
                item_description: None,
                item_value: -1,
            })
            .await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_create_nyxcipher_unknown_item_fails() {
        let service = PaymentService::new(MockRepo::new());

        let result = service
            .create_nyxcipher(CreateNyxcipherRequest {
                nyxcipher_name: "Draw".to_string(),
                nyxcipher_category: None,
                nyxcipher_item_id: ItemId::new(),
                charity_recipient: None,
            })
            .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_add_to_cart_copies_raffle_fields() {
        let (service, nyxcipher) = setup().await;

        let line = add(&service, &nyxcipher, 3).await;

        assert_eq!(line.ticket.nyxcipher_name.as_deref(), Some("Summer Draw"));
        assert_eq!(line.ticket.charity_recipient.as_deref(), Some("Red Cross"));
        assert_eq!(line.ticket.ticket_count, 3);
        assert!(!line.ticket.is_paid());

        let cart = service.get_cart(EMAIL).await.unwrap();
        assert_eq!(cart.len(), 1);
        assert_eq!(cart[0].entry.id, line.entry.id);
    }

    #[tokio::test]
    async fn test_add_to_cart_zero_tickets_fails() {
        let (service, nyxcipher) = setup().await;

        let result = service
            .add_to_cart(
                EMAIL,
                AddToCartRequest {
                    nyxcipher_id: nyxcipher.id,
                    ticket_count: 0,
                    ticket_price: 500,
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_add_to_cart_rejects_oversized_ticket_count() {
        let (service, nyxcipher) = setup().await;

        let result = service
            .add_to_cart(
                EMAIL,
                AddToCartRequest {
                    nyxcipher_id: nyxcipher.id,
                    ticket_count: u32::MAX,
                    ticket_price: 500,
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
        assert!(service.get_cart(EMAIL).await.unwrap().is_empty());

        let checkout = service
            .save_payment(
                EMAIL,
                SavePaymentRequest {
                    payment_processor: "stripe".into(),
                },
            )
            .await;
        assert!(matches!(checkout, Err(AppError::Validation(_))));
        assert_eq!(service.repo().payment_count(), 0);
    }

    #[tokio::test]
    async fn test_add_to_cart_accepts_max_ticket_count() {
        let (service, nyxcipher) = setup().await;

        let line = add(&service, &nyxcipher, MAX_TICKET_COUNT).await;

        assert_eq!(line.ticket.ticket_count, MAX_TICKET_COUNT);
    }

    #[tokio::test]
    async fn test_add_to_cart_unknown_nyxcipher_fails() {
        let (service, _) = setup().await;

        let result = service
            .add_to_cart(
                EMAIL,
                AddToCartRequest {
                    nyxcipher_id: NyxcipherId::new(),
                    ticket_count: 1,
                    ticket_price: 500,
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
