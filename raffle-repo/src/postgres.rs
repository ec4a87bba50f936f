//! PostgreSQL repository adapter.

use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::types::Json;
use uuid::Uuid;

use raffle_types::{
    CartEntry, CartLine, CheckoutLine, CreateItemRequest, CreateNyxcipherRequest, Item, ItemId,
    Nyxcipher, NyxcipherId, Payment, PaymentHistoryEntry, PaymentId, RaffleRepository,
    RegisterUserRequest, RepoError, Ticket, TicketId, User, UserId,
};

use crate::types::{
    DbCartEntry, DbItem, DbNyxcipher, DbPayment, DbTicket, DbUser, compose_cart, compose_history,
};

// ─────────────────────────────────────────────────────────────────────────────
// PostgreSQL Repository
// ─────────────────────────────────────────────────────────────────────────────

/// PostgreSQL repository.
///
/// Concurrent checkouts of the same cart serialize on the row locks taken by
/// the cart entry `DELETE`; the loser sees zero affected rows and rolls back.
pub struct PostgresRepo {
    pool: PgPool,
}

/// Executes SQL statements from a migration file, splitting by semicolons.
async fn execute_migration(pool: &PgPool, sql: &str, name: &str) -> Result<(), anyhow::Error> {
    for statement in sql.split(';') {
        let stmt = statement.trim();
        if !stmt.is_empty() {
            sqlx::query(stmt)
                .execute(pool)
                .await
                .map_err(|e| anyhow::anyhow!("Migration {} failed: {}", name, e))?;
        }
    }
    Ok(())
}

/// Runs all database migrations.
async fn run_migrations(pool: &PgPool) -> Result<(), anyhow::Error> {
    execute_migration(
        pool,
        include_str!("../migrations/0001_create_tables_pg.sql"),
        "0001",
    )
    .await
}

impl PostgresRepo {
    /// Creates a new PostgreSQL repository with automatic migration.
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPool::connect(database_url).await?;
        run_migrations(&pool).await?;
        Ok(Self { pool })
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn cart_entry_ids(&self, user_id: Uuid) -> Result<Vec<Uuid>, RepoError> {
        sqlx::query_scalar(
            r#"SELECT id FROM cart_entries WHERE user_id = $1 ORDER BY created_at, id"#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>, RepoError> {
        let row: Option<DbUser> =
            sqlx::query_as(r#"SELECT id, email, created_at FROM users WHERE id = $1"#)
                .bind(id.into_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| RepoError::Database(e.to_string()))?;

        match row {
            Some(row) => {
                let cart = self.cart_entry_ids(row.id).await?;
                Ok(Some(row.into_domain(cart)))
            }
            None => Ok(None),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Repository implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl RaffleRepository for PostgresRepo {
    async fn create_user(&self, req: RegisterUserRequest) -> Result<User, RepoError> {
        let user = User::new(&req.email).map_err(RepoError::Domain)?;

        sqlx::query(r#"INSERT INTO users (id, email, created_at) VALUES ($1, $2, $3)"#)
            .bind(user.id.into_uuid())
            .bind(&user.email)
            .bind(user.created_at)
            .execute(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(db) if db.is_unique_violation() => {
                    RepoError::Conflict(format!("Email already registered: {}", user.email))
                }
                e => RepoError::Database(e.to_string()),
            })?;

        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let row: Option<DbUser> =
            sqlx::query_as(r#"SELECT id, email, created_at FROM users WHERE email = $1"#)
                .bind(email)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| RepoError::Database(e.to_string()))?;

        match row {
            Some(row) => {
                let cart = self.cart_entry_ids(row.id).await?;
                Ok(Some(row.into_domain(cart)))
            }
            None => Ok(None),
        }
    }

    async fn create_item(&self, req: CreateItemRequest) -> Result<Item, RepoError> {
        let item = Item::new(req.item_name, req.item_description, req.item_value)
            .map_err(RepoError::Domain)?;

        sqlx::query(
            r#"INSERT INTO items (id, item_name, item_description, item_value, created_at) VALUES ($1, $2, $3, $4, $5)"#,
        )
        .bind(item.id.into_uuid())
        .bind(&item.item_name)
        .bind(&item.item_description)
        .bind(item.item_value)
        .bind(item.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        Ok(item)
    }

    async fn get_item(&self, id: ItemId) -> Result<Option<Item>, RepoError> {
        let row: Option<DbItem> = sqlx::query_as(
            r#"SELECT id, item_name, item_description, item_value, created_at FROM items WHERE id = $1"#,
        )
        .bind(id.into_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        Ok(row.map(DbItem::into_domain))
    }

    async fn create_nyxcipher(&self, req: CreateNyxcipherRequest) -> Result<Nyxcipher, RepoError> {
        let nyxcipher = Nyxcipher::new(
            req.nyxcipher_name,
            req.nyxcipher_category,
            req.nyxcipher_item_id,
            req.charity_recipient,
        )
        .map_err(RepoError::Domain)?;

        let result = sqlx::query(
            r#"INSERT INTO nyxciphers (id, nyxcipher_name, nyxcipher_category, nyxcipher_item_id, charity_recipient, created_at)
               SELECT $1, $2, $3, $4, $5, $6 WHERE EXISTS (SELECT 1 FROM items WHERE id = $7)"#,
        )
        .bind(nyxcipher.id.into_uuid())
        .bind(&nyxcipher.nyxcipher_name)
        .bind(&nyxcipher.nyxcipher_category)
        .bind(nyxcipher.nyxcipher_item_id.into_uuid())
        .bind(&nyxcipher.charity_recipient)
        .bind(nyxcipher.created_at)
        .bind(nyxcipher.nyxcipher_item_id.into_uuid())
        .execute(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }

        Ok(nyxcipher)
    }

    async fn get_nyxcipher(&self, id: NyxcipherId) -> Result<Option<Nyxcipher>, RepoError> {
        let row: Option<DbNyxcipher> = sqlx::query_as(
            r#"SELECT id, nyxcipher_name, nyxcipher_category, nyxcipher_item_id, charity_recipient, created_at
               FROM nyxciphers WHERE id = $1"#,
        )
        .bind(id.into_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        Ok(row.map(DbNyxcipher::into_domain))
    }

    async fn add_cart_entry(
        &self,
        user_id: UserId,
        ticket: Ticket,
    ) -> Result<CartEntry, RepoError> {
        let entry = CartEntry::new(user_id, &ticket);

        let mut db_tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepoError::Transaction(e.to_string()))?;

        sqlx::query(
            r#"INSERT INTO tickets (id, nyxcipher_id, ticket_count, ticket_price, payment_id, nyxcipher_name, nyxcipher_category, nyxcipher_item_id, charity_recipient, created_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)"#,
        )
        .bind(ticket.id.into_uuid())
        .bind(ticket.nyxcipher_id.into_uuid())
        .bind(i64::from(ticket.ticket_count))
        .bind(ticket.ticket_price)
        .bind(ticket.payment_id.map(PaymentId::into_uuid))
        .bind(&ticket.nyxcipher_name)
        .bind(&ticket.nyxcipher_category)
        .bind(ticket.nyxcipher_item_id.map(ItemId::into_uuid))
        .bind(&ticket.charity_recipient)
        .bind(ticket.created_at)
        .execute(&mut *db_tx)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        sqlx::query(
            r#"INSERT INTO cart_entries (id, user_id, nyxcipher_id, ticket_id, created_at) VALUES ($1, $2, $3, $4, $5)"#,
        )
        .bind(entry.id.into_uuid())
        .bind(entry.user_id.into_uuid())
        .bind(entry.nyxcipher_id.into_uuid())
        .bind(entry.ticket_id.into_uuid())
        .bind(entry.created_at)
        .execute(&mut *db_tx)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        db_tx
            .commit()
            .await
            .map_err(|e| RepoError::Transaction(e.to_string()))?;

        Ok(entry)
    }

    async fn list_cart(&self, user_id: UserId) -> Result<Vec<CartLine>, RepoError> {
        let user_id = user_id.into_uuid();

        let entries: Vec<DbCartEntry> = sqlx::query_as(
            r#"SELECT id, user_id, nyxcipher_id, ticket_id, created_at
               FROM cart_entries WHERE user_id = $1 ORDER BY created_at, id"#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        if entries.is_empty() {
            return Ok(Vec::new());
        }

        let tickets: Vec<DbTicket> = sqlx::query_as(
            r#"SELECT id, nyxcipher_id, ticket_count, ticket_price, payment_id, nyxcipher_name, nyxcipher_category, nyxcipher_item_id, charity_recipient, created_at
               FROM tickets WHERE id IN (SELECT ticket_id FROM cart_entries WHERE user_id = $1)"#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        let nyxciphers: Vec<DbNyxcipher> = sqlx::query_as(
            r#"SELECT id, nyxcipher_name, nyxcipher_category, nyxcipher_item_id, charity_recipient, created_at
               FROM nyxciphers WHERE id IN (SELECT nyxcipher_id FROM cart_entries WHERE user_id = $1)"#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        compose_cart(entries, tickets, nyxciphers)
    }

    async fn checkout(
        &self,
        user_id: UserId,
        lines: Vec<CheckoutLine>,
    ) -> Result<Vec<Payment>, RepoError> {
        let mut db_tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepoError::Transaction(e.to_string()))?;

        let mut payments = Vec::with_capacity(lines.len());
        for line in lines {
            let payment = line.payment;

            sqlx::query(
                r#"INSERT INTO payments (id, buyer_id, nyxcipher_id, ticket_id, purchase_date, assigned_numbers, amount_paid, payment_processor)
                   VALUES ($1, $2, $3, $4, $5, $6, $7, $8)"#,
            )
            .bind(payment.id.into_uuid())
            .bind(payment.buyer_id.into_uuid())
            .bind(payment.nyxcipher_id.into_uuid())
            .bind(payment.ticket_id.into_uuid())
            .bind(payment.purchase_date)
            .bind(Json(payment.assigned_numbers.clone()))
            .bind(payment.amount_paid)
            .bind(&payment.payment_processor)
            .execute(&mut *db_tx)
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;

            let removed = sqlx::query(r#"DELETE FROM cart_entries WHERE id = $1 AND user_id = $2"#)
                .bind(line.cart_entry_id.into_uuid())
                .bind(user_id.into_uuid())
                .execute(&mut *db_tx)
                .await
                .map_err(|e| RepoError::Database(e.to_string()))?;

            if removed.rows_affected() == 0 {
                return Err(RepoError::Conflict(format!(
                    "Cart entry {} is no longer in the cart",
                    line.cart_entry_id
                )));
            }

            let linked = sqlx::query(r#"UPDATE tickets SET payment_id = $1 WHERE id = $2"#)
                .bind(payment.id.into_uuid())
                .bind(payment.ticket_id.into_uuid())
                .execute(&mut *db_tx)
                .await
                .map_err(|e| RepoError::Database(e.to_string()))?;

            if linked.rows_affected() == 0 {
                return Err(RepoError::NotFound);
            }

            payments.push(payment);
        }

        db_tx
            .commit()
            .await
            .map_err(|e| RepoError::Transaction(e.to_string()))?;

        tracing::debug!(user_id = %user_id, payments = payments.len(), "checkout committed");
        Ok(payments)
    }

    async fn get_payment(&self, id: PaymentId) -> Result<Option<Payment>, RepoError> {
        let row: Option<DbPayment> = sqlx::query_as(
            r#"SELECT id, buyer_id, nyxcipher_id, ticket_id, purchase_date, assigned_numbers, amount_paid, payment_processor
               FROM payments WHERE id = $1"#,
        )
        .bind(id.into_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        Ok(row.map(DbPayment::into_domain))
    }

    async fn list_payment_history(
        &self,
        buyer_id: UserId,
    ) -> Result<Vec<PaymentHistoryEntry>, RepoError> {
        let buyer = self.get_user(buyer_id).await?.ok_or(RepoError::NotFound)?;
        let buyer_uuid = buyer_id.into_uuid();

        let payments: Vec<DbPayment> = sqlx::query_as(
            r#"SELECT id, buyer_id, nyxcipher_id, ticket_id, purchase_date, assigned_numbers, amount_paid, payment_processor
               FROM payments WHERE buyer_id = $1
               ORDER BY purchase_date DESC"#,
        )
        .bind(buyer_uuid)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        if payments.is_empty() {
            return Ok(Vec::new());
        }

        let nyxciphers: Vec<DbNyxcipher> = sqlx::query_as(
            r#"SELECT id, nyxcipher_name, nyxcipher_category, nyxcipher_item_id, charity_recipient, created_at
               FROM nyxciphers WHERE id IN (SELECT nyxcipher_id FROM payments WHERE buyer_id = $1)"#,
        )
        .bind(buyer_uuid)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        let items: Vec<DbItem> = sqlx::query_as(
            r#"SELECT id, item_name, item_description, item_value, created_at
               FROM items WHERE id IN (
                   SELECT n.nyxcipher_item_id FROM nyxciphers n
                   JOIN payments p ON p.nyxcipher_id = n.id
                   WHERE p.buyer_id = $1
               )"#,
        )
        .bind(buyer_uuid)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        let tickets: Vec<DbTicket> = sqlx::query_as(
            r#"SELECT id, nyxcipher_id, ticket_count, ticket_price, payment_id, nyxcipher_name, nyxcipher_category, nyxcipher_item_id, charity_recipient, created_at
               FROM tickets WHERE id IN (SELECT ticket_id FROM payments WHERE buyer_id = $1)"#,
        )
        .bind(buyer_uuid)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        compose_history(buyer, payments, nyxciphers, items, tickets)
    }

    async fn get_ticket(&self, id: TicketId) -> Result<Option<Ticket>, RepoError> {
        let row: Option<DbTicket> = sqlx::query_as(
            r#"SELECT id, nyxcipher_id, ticket_count, ticket_price, payment_id, nyxcipher_name, nyxcipher_category, nyxcipher_item_id, charity_recipient, created_at
               FROM tickets WHERE id = $1"#,
        )
        .bind(id.into_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        row.map(DbTicket::into_domain).transpose()
    }

    async fn update_ticket(&self, ticket: &Ticket) -> Result<(), RepoError> {
        let result = sqlx::query(
            r#"UPDATE tickets
               SET nyxcipher_name = $1, nyxcipher_category = $2, nyxcipher_item_id = $3, charity_recipient = $4
               WHERE id = $5"#,
        )
        .bind(&ticket.nyxcipher_name)
        .bind(&ticket.nyxcipher_category)
        .bind(ticket.nyxcipher_item_id.map(ItemId::into_uuid))
        .bind(&ticket.charity_recipient)
        .bind(ticket.id.into_uuid())
        .execute(&self.pool)
        .await
        .map_err(|e| RepoError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }

        Ok(())
    }

    async fn delete_ticket(&self, id: TicketId) -> Result<bool, RepoError> {
        let result = sqlx::query(r#"DELETE FROM tickets WHERE id = $1"#)
            .bind(id.into_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }
}
