//! OpenAPI document for the HTTP API.

#![allow(dead_code)] // Path functions are only used by utoipa for documentation generation

use raffle_types::domain::{
    CartEntry, CartEntryId, CartLine, Item, ItemId, Nyxcipher, NyxcipherId, NyxcipherWithItem,
    Payment, PaymentHistoryEntry, PaymentId, Ticket, TicketId, TicketPatch, User, UserId,
};
use raffle_types::dto::{
    AddToCartRequest, CreateItemRequest, CreateNyxcipherRequest, DeleteTicketResponse,
    RegisterUserRequest, SavePaymentRequest,
};
use utoipa::{
    Modify, OpenApi,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};

// Dummy functions to generate path documentation
// These are not the actual handlers, just for OpenAPI path generation

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = inline(serde_json::Value), example = json!({"status": "healthy"}))
    )
)]
async fn health() {}

/// Register a user
#[utoipa::path(
    post,
    path = "/api/users",
    tag = "users",
    request_body = RegisterUserRequest,
    responses(
        (status = 201, description = "User registered", body = User),
        (status = 400, description = "Invalid or already registered email")
    )
)]
async fn register_user() {}

/// Get a user's cart
#[utoipa::path(
    get,
    path = "/api/users/{email}/cart",
    tag = "users",
    params(("email" = String, Path, description = "User email")),
    responses(
        (status = 200, description = "Cart lines in insertion order", body = Vec<CartLine>),
        (status = 404, description = "Account not found")
    )
)]
async fn get_cart() {}

/// Put a block of tickets into a user's cart
#[utoipa::path(
    post,
    path = "/api/users/{email}/cart",
    tag = "users",
    params(("email" = String, Path, description = "User email")),
    request_body = AddToCartRequest,
    responses(
        (status = 201, description = "Ticket added to the cart", body = CartLine),
        (status = 400, description = "Invalid ticket count or price"),
        (status = 404, description = "Account or nyxcipher not found")
    )
)]
async fn add_to_cart() {}

/// Payment history of a user, newest first
#[utoipa::path(
    get,
    path = "/api/users/{email}/payments",
    tag = "payments",
    params(("email" = String, Path, description = "User email")),
    responses(
        (status = 200, description = "Joined payment records", body = Vec<PaymentHistoryEntry>),
        (status = 404, description = "Account not found")
    )
)]
async fn get_payments_history() {}

/// Single payment record
#[utoipa::path(
    get,
    path = "/api/users/{email}/payments/{id}",
    tag = "payments",
    params(
        ("email" = String, Path, description = "User email"),
        ("id" = String, Path, description = "Payment ID (UUID)")
    ),
    responses(
        (status = 200, description = "Payment found", body = Payment),
        (status = 400, description = "Invalid payment ID"),
        (status = 404, description = "Account or payment not found")
    )
)]
async fn get_one_paid_payment() {}

/// Check out a user's cart
#[utoipa::path(
    post,
    path = "/api/users/{email}/payments",
    tag = "payments",
    params(("email" = String, Path, description = "User email")),
    request_body = SavePaymentRequest,
    responses(
        (status = 201, description = "One payment per cart entry", body = Vec<Payment>),
        (status = 404, description = "Account not found"),
        (status = 422, description = "Cart is empty")
    )
)]
async fn save_payment() {}

/// Add a prize item
#[utoipa::path(
    post,
    path = "/api/items",
    tag = "catalog",
    request_body = CreateItemRequest,
    responses(
        (status = 201, description = "Item created", body = Item),
        (status = 400, description = "Invalid item")
    )
)]
async fn create_item() {}

/// Open a raffle for a prize item
#[utoipa::path(
    post,
    path = "/api/nyxciphers",
    tag = "catalog",
    request_body = CreateNyxcipherRequest,
    responses(
        (status = 201, description = "Nyxcipher created", body = Nyxcipher),
        (status = 400, description = "Invalid nyxcipher"),
        (status = 404, description = "Item not found")
    )
)]
async fn create_nyxcipher() {}

/// Patch a ticket (administrator)
#[utoipa::path(
    put,
    path = "/api/tickets/{id}",
    tag = "tickets",
    params(("id" = String, Path, description = "Ticket ID (UUID)")),
    request_body = TicketPatch,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Merged ticket", body = Ticket),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Ticket not found")
    )
)]
async fn update_payment() {}

/// Delete a ticket (administrator)
#[utoipa::path(
    delete,
    path = "/api/tickets/{id}",
    tag = "tickets",
    params(("id" = String, Path, description = "Ticket ID (UUID)")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Ticket deleted", body = DeleteTicketResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Ticket not found")
    )
)]
async fn delete_payment() {}

/// OpenAPI documentation for the Raffle API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Raffle Payment Service API",
        version = "1.0.0",
        description = "Payment records for a raffle: carts, checkout with randomly assigned ticket numbers, purchase history and ticket administration.\n\n## Authentication\n\nTicket administration routes require the administrator key configured on the server:\n\n```\nAuthorization: Bearer <admin key>\n```",
        license(name = "MIT"),
    ),
    paths(
        health,
        register_user,
        get_cart,
        add_to_cart,
        get_payments_history,
        get_one_paid_payment,
        save_payment,
        create_item,
        create_nyxcipher,
        update_payment,
        delete_payment,
    ),
    components(
        schemas(
            RegisterUserRequest,
            AddToCartRequest,
            SavePaymentRequest,
            CreateItemRequest,
            CreateNyxcipherRequest,
            DeleteTicketResponse,
            TicketPatch,
            User,
            CartEntry,
            CartLine,
            Item,
            Nyxcipher,
            NyxcipherWithItem,
            Ticket,
            Payment,
            PaymentHistoryEntry,
            UserId,
            CartEntryId,
            ItemId,
            NyxcipherId,
            TicketId,
            PaymentId,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "users", description = "User registration and carts"),
        (name = "payments", description = "Checkout and payment history"),
        (name = "catalog", description = "Prize items and nyxciphers"),
        (name = "tickets", description = "Ticket administration"),
    )
)]
pub struct ApiDoc;

/// Security scheme modifier for Bearer token authentication.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            );
        }
    }
}
