//! REST API for the SWIFT code registry.
//!
//! Routes:
//! - `GET    /v1/swift-codes/:swift_code` returns one record, with branches if headquarters
//! - `GET    /v1/swift-codes/country/:iso2` lists all records for a country
//! - `POST   /v1/swift-codes` creates one record
//! - `DELETE /v1/swift-codes/:swift_code` removes one record
//!
//! The [`Registry`] is injected as router state; handlers never reach for
//! process-global storage.

mod error;
mod request;

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use swiftcodes_core::Registry;
use swiftcodes_shared::{CountrySwiftCodes, SwiftCodeDetail, SwiftCodesError};
use tower_http::trace::TraceLayer;

pub use error::{ApiError, ErrorResponse};
pub use request::CreateSwiftCodeRequest;

/// Confirmation body for writes.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    fn new(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            message: message.into(),
        })
    }
}

/// Build the API router around a shared registry.
pub fn router(registry: Arc<Registry>) -> Router {
    Router::new()
        .route("/v1/swift-codes", post(create_swift_code))
        .route(
            "/v1/swift-codes/:swift_code",
            get(get_swift_code).delete(delete_swift_code),
        )
        .route("/v1/swift-codes/country/:iso2", get(get_swift_codes_by_country))
        .layer(TraceLayer::new_for_http())
        .with_state(registry)
}

async fn get_swift_code(
    State(registry): State<Arc<Registry>>,
    Path(swift_code): Path<String>,
) -> Result<Json<SwiftCodeDetail>, ApiError> {
    Ok(Json(registry.get_by_code(&swift_code).await?))
}

async fn get_swift_codes_by_country(
    State(registry): State<Arc<Registry>>,
    Path(iso2): Path<String>,
) -> Result<Json<CountrySwiftCodes>, ApiError> {
    Ok(Json(registry.get_by_country(&iso2).await?))
}

async fn create_swift_code(
    State(registry): State<Arc<Registry>>,
    payload: Result<Json<CreateSwiftCodeRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let Json(request) = payload
        .map_err(|e| SwiftCodesError::validation(format!("invalid JSON body: {}", e.body_text())))?;
    let record = request.into_record()?;

    registry.insert(&record).await?;
    Ok((
        StatusCode::CREATED,
        MessageResponse::new(format!("SWIFT code {} created", record.swift_code)),
    ))
}

/// Deletion is keyed by code alone; query parameters are ignored.
async fn delete_swift_code(
    State(registry): State<Arc<Registry>>,
    Path(swift_code): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    registry.delete(&swift_code).await?;
    Ok(MessageResponse::new(format!(
        "SWIFT code {swift_code} deleted"
    )))
}
