//! HTTP surface: thin axum handlers over the core operations. All state is
//! injected through [`AppState`]; handlers hold no logic beyond input shaping
//! and error mapping.

use std::sync::Arc;

use axum::extract::{FromRequestParts, Path, Query, State};
use axum::http::request::Parts;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::api::auth;
use crate::engine::execute_trade;
use crate::error::CoreError;
use crate::persistence::LedgerStore;
use crate::portfolio::get_portfolio;
use crate::pricing::get_stock_series;
use crate::quotes::QuoteProvider;
use crate::types::TradeAction;

/// Every new user starts with this much virtual cash.
pub const STARTING_BALANCE_DOLLARS: i64 = 1_000_000;

const TRANSACTION_PAGE_LIMIT: usize = 100;

#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<dyn LedgerStore>,
    pub quotes: Arc<dyn QuoteProvider>,
    pub jwt_secret: Vec<u8>,
}

/// Authenticated user extracted from the JWT Bearer token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = CoreError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or(CoreError::InvalidCredentials)?;
        let claims = auth::decode_token(&state.jwt_secret, token)
            .map_err(|_| CoreError::InvalidCredentials)?;
        let user_id = claims
            .sub
            .parse()
            .map_err(|_| CoreError::InvalidCredentials)?;
        Ok(AuthUser { user_id })
    }
}

impl IntoResponse for CoreError {
    fn into_response(self) -> Response {
        let status = match &self {
            CoreError::Validation(_)
            | CoreError::InvalidShares(_)
            | CoreError::PriceUnavailable(_)
            | CoreError::InsufficientFunds { .. }
            | CoreError::InsufficientShares { .. }
            | CoreError::NoSuchPosition(_)
            | CoreError::EmailExists => StatusCode::BAD_REQUEST,
            CoreError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            CoreError::UserNotFound | CoreError::NoData(_) => StatusCode::NOT_FOUND,
            CoreError::Storage(_) | CoreError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        // Unexpected failures are logged in full but reported generically.
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = ?self, "request failed");
            "internal server error".to_string()
        } else {
            self.to_string()
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

async fn health() -> &'static str {
    "healthy"
}

#[derive(Deserialize)]
struct CredentialsRequest {
    email: String,
    password: String,
}

async fn register(
    State(state): State<AppState>,
    Json(req): Json<CredentialsRequest>,
) -> Result<impl IntoResponse, CoreError> {
    let email = req.email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(CoreError::Validation("a valid email is required".into()));
    }
    if req.password.is_empty() {
        return Err(CoreError::Validation("password is required".into()));
    }

    let hash = auth::hash_password(&req.password)
        .map_err(|err| CoreError::Internal(format!("password hashing failed: {err}")))?;
    let user_id = state
        .ledger
        .create_user(&email, &hash, STARTING_BALANCE_DOLLARS.into())
        .await?;
    tracing::info!(%user_id, %email, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(json!({ "user_id": user_id, "email": email })),
    ))
}

async fn login(
    State(state): State<AppState>,
    Json(req): Json<CredentialsRequest>,
) -> Result<impl IntoResponse, CoreError> {
    let email = req.email.trim().to_lowercase();
    let user = state
        .ledger
        .find_user_by_email(&email)
        .await?
        .ok_or(CoreError::InvalidCredentials)?;
    if !auth::verify_password(&req.password, &user.password_hash) {
        return Err(CoreError::InvalidCredentials);
    }
    let token = auth::create_token(&state.jwt_secret, user.id)
        .map_err(|err| CoreError::Internal(format!("token signing failed: {err}")))?;
    Ok(Json(json!({ "token": token })))
}

#[derive(Deserialize)]
struct SeriesParams {
    period: Option<String>,
    interval: Option<String>,
}

async fn stock_series(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
    Query(params): Query<SeriesParams>,
) -> Result<impl IntoResponse, CoreError> {
    let period = params.period.as_deref().unwrap_or("1d");
    let interval = params.interval.as_deref().unwrap_or("5m");
    let series = get_stock_series(state.quotes.as_ref(), &symbol, period, interval).await?;
    Ok(Json(series))
}

async fn portfolio(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse, CoreError> {
    let snapshot =
        get_portfolio(state.ledger.as_ref(), state.quotes.as_ref(), user.user_id).await?;
    Ok(Json(snapshot))
}

#[derive(Deserialize)]
struct TradeRequest {
    symbol: String,
    shares: i64,
    action: TradeAction,
}

async fn trade(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<TradeRequest>,
) -> Result<impl IntoResponse, CoreError> {
    let outcome = execute_trade(
        state.ledger.as_ref(),
        state.quotes.as_ref(),
        user.user_id,
        &req.symbol,
        req.shares,
        req.action,
    )
    .await?;
    Ok(Json(json!({
        "message": "Trade executed successfully",
        "new_balance": outcome.new_balance,
        "transaction": outcome.transaction,
    })))
}

async fn transactions(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse, CoreError> {
    let records = state
        .ledger
        .list_transactions(user.user_id, TRANSACTION_PAGE_LIMIT)
        .await?;
    Ok(Json(json!({ "transactions": records })))
}

pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/register", post(register))
        .route("/api/login", post(login))
        .route("/api/stock/{symbol}", get(stock_series))
        .route("/api/portfolio", get(portfolio))
        .route("/api/trade", post(trade))
        .route("/api/transactions", get(transactions))
        .with_state(state)
}
