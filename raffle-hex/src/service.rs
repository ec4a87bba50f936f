//! Payment Application Service
//!
//! Orchestrates domain operations through the repository port.
//! Contains NO infrastructure logic - pure business orchestration.

use raffle_types::{
    AddToCartRequest, AppError, CartLine, CheckoutLine, CreateItemRequest,
    CreateNyxcipherRequest, Item, Nyxcipher, Payment, PaymentHistoryEntry, PaymentId,
    RaffleRepository, RegisterUserRequest, SavePaymentRequest, Ticket, TicketId, TicketPatch,
    User,
};

/// Application service for raffle payment operations.
///
/// Generic over `R: RaffleRepository` - the adapter is injected at compile time.
/// This enables:
/// - Swapping repositories without code changes
/// - Testing with in-memory repo
/// - Compile-time checks for port implementation
pub struct PaymentService<R: RaffleRepository> {
    repo: R,
}

impl<R: RaffleRepository> PaymentService<R> {
    /// Creates a new payment service with the given repository.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Returns a reference to the underlying repository.
    pub fn repo(&self) -> &R {
        &self.repo
    }

    async fn find_user(&self, email: &str) -> Result<User, AppError> {
        self.repo
            .find_user_by_email(email)
            .await?
            .ok_or_else(|| AppError::NotFound("Account not found".into()))
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Payment Operations
    // ─────────────────────────────────────────────────────────────────────────────

    /// Lists every payment made by the user, newest first, joined with the
    /// raffle, its prize item, the buyer and the ticket.
    #[tracing::instrument(skip(self))]
    pub async fn get_payments_history(
        &self,
        email: &str,
    ) -> Result<Vec<PaymentHistoryEntry>, AppError> {
        let user = self.find_user(email).await?;
        let history = self.repo.list_payment_history(user.id).await?;
        Ok(history)
    }

    /// Gets a single payment record. The record is not checked against the
    /// user; the email only has to belong to a registered account.
    #[tracing::instrument(skip(self))]
    pub async fn get_one_paid_payment(
        &self,
        email: &str,
        id: PaymentId,
    ) -> Result<Payment, AppError> {
        self.find_user(email).await?;

        self.repo
            .get_payment(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Payment not found".into()))
    }

    /// Checks out the user's cart.
    ///
    /// Every cart entry becomes one payment with freshly drawn ticket
    /// numbers. Payments come back in cart order.
    #[tracing::instrument(skip(self, req), fields(processor = %req.payment_processor))]
    pub async fn save_payment(
        &self,
        email: &str,
        req: SavePaymentRequest,
    ) -> Result<Vec<Payment>, AppError> {
        let user = self.find_user(email).await?;

        let cart = self.repo.list_cart(user.id).await?;
        if cart.is_empty() {
            return Err(AppError::Validation("Cart is empty".into()));
        }

        // ThreadRng is !Send; it must be gone before the next await.
        let lines: Vec<CheckoutLine> = {
            let mut rng = rand::rng();
            cart.iter()
                .map(|line| {
                    CheckoutLine::from_cart_line(user.id, line, &req.payment_processor, &mut rng)
                })
                .collect()
        };

        let payments = self.repo.checkout(user.id, lines).await?;

        tracing::info!(
            user_id = %user.id,
            payments = payments.len(),
            "Cart checked out"
        );
        Ok(payments)
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Ticket Administration
    // ─────────────────────────────────────────────────────────────────────────────

    /// Applies an administrator patch to a ticket and returns the result.
    #[tracing::instrument(skip(self, patch))]
    pub async fn update_payment(
        &self,
        ticket_id: TicketId,
        patch: TicketPatch,
    ) -> Result<Ticket, AppError> {
        let ticket = self
            .repo
            .get_ticket(ticket_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Ticket not found".into()))?;

        let merged = ticket.merge(patch);
        self.repo.update_ticket(&merged).await?;

        tracing::info!(ticket_id = %ticket_id, "Ticket updated");
        Ok(merged)
    }

    /// Deletes a ticket. Payments referencing it are kept.
    #[tracing::instrument(skip(self))]
    pub async fn delete_payment(&self, ticket_id: TicketId) -> Result<bool, AppError> {
        if self.repo.get_ticket(ticket_id).await?.is_none() {
            return Err(AppError::NotFound("Ticket not found".into()));
        }

        // A concurrent delete between lookup and delete still counts as gone.
        if !self.repo.delete_ticket(ticket_id).await? {
            return Err(AppError::NotFound("Ticket not found".into()));
        }

        tracing::info!(ticket_id = %ticket_id, "Ticket deleted");
        Ok(true)
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Users, Catalog & Cart
    // ─────────────────────────────────────────────────────────────────────────────

    /// Registers a user with an empty cart.
    #[tracing::instrument(skip(self))]
    pub async fn register_user(&self, req: RegisterUserRequest) -> Result<User, AppError> {
        self.repo.create_user(req).await.map_err(Into::into)
    }

    /// Adds a prize item to the catalog.
    #[tracing::instrument(skip(self))]
    pub async fn create_item(&self, req: CreateItemRequest) -> Result<Item, AppError> {
        self.repo.create_item(req).await.map_err(Into::into)
    }

    /// Opens a raffle for an existing prize item.
    #[tracing::instrument(skip(self))]
    pub async fn create_nyxcipher(
        &self,
        req: CreateNyxcipherRequest,
    ) -> Result<Nyxcipher, AppError> {
        if self.repo.get_item(req.nyxcipher_item_id).await?.is_none() {
            return Err(AppError::NotFound(format!(
                "Item {} not found",
                req.nyxcipher_item_id
            )));
        }

        self.repo.create_nyxcipher(req).await.map_err(Into::into)
    }

    /// Puts a block of tickets for a raffle into the user's cart.
    #[tracing::instrument(skip(self))]
    pub async fn add_to_cart(
        &self,
        email: &str,
        req: AddToCartRequest,
    ) -> Result<CartLine, AppError> {
        let user = self.find_user(email).await?;

        let nyxcipher = self
            .repo
            .get_nyxcipher(req.nyxcipher_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Nyxcipher {} not found", req.nyxcipher_id)))?;

        let ticket = Ticket::for_nyxcipher(&nyxcipher, req.ticket_count, req.ticket_price)
            .map_err(|e| AppError::BadRequest(e.to_string()))?;

        let entry = self.repo.add_cart_entry(user.id, ticket.clone()).await?;

        Ok(CartLine {
            entry,
            ticket,
            nyxcipher,
        })
    }

    /// Lists the user's cart with tickets and raffles, in insertion order.
    #[tracing::instrument(skip(self))]
    pub async fn get_cart(&self, email: &str) -> Result<Vec<CartLine>, AppError> {
        let user = self.find_user(email).await?;
        self.repo.list_cart(user.id).await.map_err(Into::into)
    }
}
