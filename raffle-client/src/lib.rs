//! # Raffle Client SDK
//!
//! A typed Rust client for the Raffle API.

use raffle_types::{
    AddToCartRequest, CartLine, CreateItemRequest, CreateNyxcipherRequest, DeleteTicketResponse,
    Item, Nyxcipher, NyxcipherId, Payment, PaymentHistoryEntry, PaymentId, RegisterUserRequest,
    SavePaymentRequest, Ticket, TicketId, TicketPatch, User,
};
use reqwest::{Client, Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;

/// Error type for client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid base URL: {0}")]
    InvalidUrl(String),
}

/// Raffle API client.
pub struct RaffleClient {
    base_url: String,
    admin_key: Option<String>,
    http: Client,
}

impl RaffleClient {
    /// Creates a new client.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            admin_key: None,
            http: Client::new(),
        }
    }

    /// Sets the administrator key sent as a bearer token.
    pub fn with_admin_key(mut self, admin_key: impl Into<String>) -> Self {
        self.admin_key = Some(admin_key.into());
        self
    }

    /// Checks if the API is healthy.
    pub async fn health(&self) -> Result<bool, ClientError> {
        let resp = self.http.get(self.url(&["health"])?).send().await?;
        Ok(resp.status().is_success())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Users & cart
    // ─────────────────────────────────────────────────────────────────────────

    /// Registers a user.
    pub async fn register_user(&self, email: &str) -> Result<User, ClientError> {
        let req = RegisterUserRequest {
            email: email.to_string(),
        };
        self.post(&["api", "users"], &req).await
    }

    /// Lists a user's cart.
    pub async fn get_cart(&self, email: &str) -> Result<Vec<CartLine>, ClientError> {
        self.get(&["api", "users", email, "cart"]).await
    }

    /// Puts a block of tickets into a user's cart.
    pub async fn add_to_cart(
        &self,
        email: &str,
        nyxcipher_id: NyxcipherId,
        ticket_count: u32,
        ticket_price: i64,
    ) -> Result<CartLine, ClientError> {
        let req = AddToCartRequest {
            nyxcipher_id,
            ticket_count,
            ticket_price,
        };
        self.post(&["api", "users", email, "cart"], &req).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Payments
    // ─────────────────────────────────────────────────────────────────────────

    /// Checks out a user's cart.
    pub async fn save_payment(
        &self,
        email: &str,
        payment_processor: &str,
    ) -> Result<Vec<Payment>, ClientError> {
        let req = SavePaymentRequest {
            payment_processor: payment_processor.to_string(),
        };
        self.post(&["api", "users", email, "payments"], &req).await
    }

    /// Lists a user's payment history, newest first.
    pub async fn get_payments_history(
        &self,
        email: &str,
    ) -> Result<Vec<PaymentHistoryEntry>, ClientError> {
        self.get(&["api", "users", email, "payments"]).await
    }

    /// Gets one payment record.
    pub async fn get_payment(&self, email: &str, id: PaymentId) -> Result<Payment, ClientError> {
        self.get(&["api", "users", email, "payments", &id.to_string()])
            .await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Catalog
    // ─────────────────────────────────────────────────────────────────────────

    /// Adds a prize item.
    pub async fn create_item(
        &self,
        item_name: &str,
        item_description: Option<String>,
        item_value: i64,
    ) -> Result<Item, ClientError> {
        let req = CreateItemRequest {
            item_name: item_name.to_string(),
            item_description,
            item_value,
        };
        self.post(&["api", "items"], &req).await
    }

    /// Opens a raffle.
    pub async fn create_nyxcipher(
        &self,
        req: &CreateNyxcipherRequest,
    ) -> Result<Nyxcipher, ClientError> {
        self.post(&["api", "nyxciphers"], req).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Ticket administration (requires the admin key)
    // ─────────────────────────────────────────────────────────────────────────

    /// Patches a ticket's descriptive fields.
    pub async fn update_ticket(
        &self,
        id: TicketId,
        patch: &TicketPatch,
    ) -> Result<Ticket, ClientError> {
        let resp = self
            .admin_request(Method::PUT, &["api", "tickets", &id.to_string()])?
            .json(patch)
            .send()
            .await?;
        self.handle_response(resp).await
    }

    /// Deletes a ticket.
    pub async fn delete_ticket(&self, id: TicketId) -> Result<bool, ClientError> {
        let resp = self
            .admin_request(Method::DELETE, &["api", "tickets", &id.to_string()])?
            .send()
            .await?;
        let body: DeleteTicketResponse = self.handle_response(resp).await?;
        Ok(body.deleted)
    }

    /// Joins percent-encoded path segments onto the base URL.
    fn url(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url =
            Url::parse(&self.base_url).map_err(|e| ClientError::InvalidUrl(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(self.base_url.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder, ClientError> {
        Ok(self.http.request(method, self.url(segments)?))
    }

    /// Builds a request for a ticket administration route; only these carry the admin key.
    fn admin_request(
        &self,
        method: Method,
        segments: &[&str],
    ) -> Result<RequestBuilder, ClientError> {
        let req = self.request(method, segments)?;
        Ok(match &self.admin_key {
            Some(key) => req.bearer_auth(key),
            None => req,
        })
    }

    async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, ClientError> {
        let resp = self.request(Method::GET, segments)?.send().await?;
        self.handle_response(resp).await
    }

    async fn post<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> Result<T, ClientError> {
        let resp = self
            .request(Method::POST, segments)?
            .json(body)
            .send()
            .await?;
        self.handle_response(resp).await
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            Ok(serde_json::from_str(&body)?)
        } else {
            let body = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(String::from))
                .unwrap_or(body);
            Err(ClientError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use reqwest::header::AUTHORIZATION;

    use super::*;

    #[test]
    fn test_client_creation() {
        let client = RaffleClient::new("http://localhost:3000");
        assert_eq!(client.base_url, "http://localhost:3000");
    }

    #[test]
    fn test_client_with_trailing_slash() {
        let client = RaffleClient::new("http://localhost:3000/");
        assert_eq!(client.base_url, "http://localhost:3000");
    }

    #[test]
    fn test_client_with_admin_key() {
        let client = RaffleClient::new("http://localhost:3000").with_admin_key("adm_key");
        assert_eq!(client.admin_key, Some("adm_key".to_string()));
    }

    #[test]
    fn test_url_encodes_email_segment() {
        let client = RaffleClient::new("http://localhost:3000");

        let url = client
            .url(&["api", "users", "jo doe/x@example.com", "cart"])
            .unwrap();

        assert_eq!(
            url.as_str(),
            "http://localhost:3000/api/users/jo%20doe%2Fx@example.com/cart"
        );
    }

    #[test]
    fn test_url_keeps_base_path() {
        let client = RaffleClient::new("http://localhost:3000/raffle/");

        let url = client.url(&["health"]).unwrap();

        assert_eq!(url.as_str(), "http://localhost:3000/raffle/health");
    }

    #[test]
    fn test_admin_key_only_sent_to_admin_routes() {
        let client = RaffleClient::new("http://localhost:3000").with_admin_key("adm_key");

        let public = client
            .request(Method::GET, &["api", "users", "a@example.com", "cart"])
            .unwrap()
            .build()
            .unwrap();
        assert!(public.headers().get(AUTHORIZATION).is_none());

        let admin = client
            .admin_request(Method::DELETE, &["api", "tickets", "id"])
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(admin.headers()[AUTHORIZATION], "Bearer adm_key");
    }

    #[test]
    fn test_invalid_base_url() {
        let client = RaffleClient::new("not a url");

        assert!(matches!(
            client.url(&["health"]),
            Err(ClientError::InvalidUrl(_))
        ));
    }
}
