//! HTTP request handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{FromRequest, Path, Request, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use utoipa::OpenApi;

use raffle_types::{
    AddToCartRequest, AppError, CreateItemRequest, CreateNyxcipherRequest, DeleteTicketResponse,
    PaymentId, RaffleRepository, RegisterUserRequest, SavePaymentRequest, TicketId, TicketPatch,
};

use crate::PaymentService;
use crate::openapi::ApiDoc;

/// Application state shared across handlers.
pub struct AppState<R: RaffleRepository> {
    pub service: PaymentService<R>,
    /// SHA-256 hex digest of the administrator key, if one is configured
    pub admin_key_hash: Option<String>,
}

/// Wrapper to implement IntoResponse for AppError (orphan rule workaround).
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Validation(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg.clone()),
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, msg.clone())
            }
        };

        let body = serde_json::json!({
            "error": message,
            "code": status.as_u16()
        });

        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError(AppError::BadRequest(rejection.body_text()))
    }
}

/// JSON request body whose rejections use the API error shape.
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

fn parse_id<T: std::str::FromStr>(raw: &str, what: &str) -> Result<T, ApiError> {
    raw.parse()
        .map_err(|_| ApiError(AppError::BadRequest(format!("Invalid {what} ID"))))
}

/// Health check endpoint.
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "healthy" }))
}

/// Serves the OpenAPI document.
pub async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

// ─────────────────────────────────────────────────────────────────────────────
// Users & Cart
// ─────────────────────────────────────────────────────────────────────────────

/// Register a user.
#[tracing::instrument(skip(state), fields(email = %req.email))]
pub async fn register_user<R: RaffleRepository>(
    State(state): State<Arc<AppState<R>>>,
    JsonBody(req): JsonBody<RegisterUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state.service.register_user(req).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Get a user's cart.
#[tracing::instrument(skip(state))]
pub async fn get_cart<R: RaffleRepository>(
    State(state): State<Arc<AppState<R>>>,
    Path(email): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let cart = state.service.get_cart(&email).await?;
    Ok(Json(cart))
}

/// Put tickets into a user's cart.
#[tracing::instrument(skip(state), fields(nyxcipher_id = %req.nyxcipher_id, count = req.ticket_count))]
pub async fn add_to_cart<R: RaffleRepository>(
    State(state): State<Arc<AppState<R>>>,
    Path(email): Path<String>,
    JsonBody(req): JsonBody<AddToCartRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let line = state.service.add_to_cart(&email, req).await?;
    Ok((StatusCode::CREATED, Json(line)))
}

// ─────────────────────────────────────────────────────────────────────────────
// Payments
// ─────────────────────────────────────────────────────────────────────────────

/// List a user's payment history.
#[tracing::instrument(skip(state))]
pub async fn get_payments_history<R: RaffleRepository>(
    State(state): State<Arc<AppState<R>>>,
    Path(email): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let history = state.service.get_payments_history(&email).await?;
    Ok(Json(history))
}

/// Get one payment record.
#[tracing::instrument(skip(state))]
pub async fn get_one_paid_payment<R: RaffleRepository>(
    State(state): State<Arc<AppState<R>>>,
    Path((email, id)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let payment_id: PaymentId = parse_id(&id, "payment")?;

    let payment = state
        .service
        .get_one_paid_payment(&email, payment_id)
        .await?;
    Ok(Json(payment))
}

/// Check out a user's cart.
#[tracing::instrument(skip(state), fields(processor = %req.payment_processor))]
pub async fn save_payment<R: RaffleRepository>(
    State(state): State<Arc<AppState<R>>>,
    Path(email): Path<String>,
    JsonBody(req): JsonBody<SavePaymentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let payments = state.service.save_payment(&email, req).await?;
    Ok((StatusCode::CREATED, Json(payments)))
}

// ─────────────────────────────────────────────────────────────────────────────
// Catalog
// ─────────────────────────────────────────────────────────────────────────────

/// Add a prize item.
#[tracing::instrument(skip(state), fields(name = %req.item_name))]
pub async fn create_item<R: RaffleRepository>(
    State(state): State<Arc<AppState<R>>>,
    JsonBody(req): JsonBody<CreateItemRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let item = state.service.create_item(req).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// Open a raffle.
#[tracing::instrument(skip(state), fields(name = %req.nyxcipher_name))]
pub async fn create_nyxcipher<R: RaffleRepository>(
    State(state): State<Arc<AppState<R>>>,
    JsonBody(req): JsonBody<CreateNyxcipherRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let nyxcipher = state.service.create_nyxcipher(req).await?;
    Ok((StatusCode::CREATED, Json(nyxcipher)))
}

// ─────────────────────────────────────────────────────────────────────────────
// Ticket administration
// ─────────────────────────────────────────────────────────────────────────────

/// Patch a ticket's descriptive fields.
#[tracing::instrument(skip(state, patch))]
pub async fn update_payment<R: RaffleRepository>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
    JsonBody(patch): JsonBody<TicketPatch>,
) -> Result<impl IntoResponse, ApiError> {
    let ticket_id: TicketId = parse_id(&id, "ticket")?;

    let ticket = state.service.update_payment(ticket_id, patch).await?;
    Ok(Json(ticket))
}

/// Delete a ticket.
#[tracing::instrument(skip(state))]
pub async fn delete_payment<R: RaffleRepository>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let ticket_id: TicketId = parse_id(&id, "ticket")?;

    let deleted = state.service.delete_payment(ticket_id).await?;
    Ok(Json(DeleteTicketResponse { deleted }))
}
