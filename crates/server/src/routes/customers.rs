//! Customer endpoints.

use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use clientele_core::{Customer, CustomerDraft, ValidationError};

use super::{json_rejection, parse_customer_id};
use crate::error::Result;
use crate::services::CustomerError;
use crate::state::AppState;

/// Response carrying a single customer.
#[derive(Debug, Serialize)]
pub struct CustomerCreated {
    pub message: String,
    pub customer: Customer,
}

/// Response carrying every customer.
#[derive(Debug, Serialize)]
pub struct CustomerList {
    pub message: String,
    pub customers: Vec<Customer>,
}

/// Response for operations that return no record.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Query parameters of the search endpoint.
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(rename = "type")]
    pub key_type: Option<String>,
    pub value: Option<String>,
}

/// POST /api/customers
///
/// # Errors
///
/// 400 for invalid input, 409 if a document ID is already registered.
pub async fn create(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CustomerDraft>, JsonRejection>,
) -> Result<(StatusCode, Json<CustomerCreated>)> {
    let Json(draft) = payload.map_err(|e| json_rejection(&e))?;
    let customer = state.service().create_customer(draft).await?;

    Ok((
        StatusCode::CREATED,
        Json(CustomerCreated {
            message: "Customer created successfully".to_string(),
            customer,
        }),
    ))
}

/// GET /api/customers/all
///
/// # Errors
///
/// 503 if the store cannot be queried.
pub async fn list(State(state): State<AppState>) -> Result<Json<CustomerList>> {
    let customers = state.service().list_customers().await?;

    Ok(Json(CustomerList {
        message: format!("Successfully retrieved {} customers", customers.len()),
        customers,
    }))
}

/// GET /api/customers/search?type={type}&value={value}
///
/// # Errors
///
/// 400 for a missing or unknown type, 404 if nobody has that identifier.
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Customer>> {
    let key_type = params
        .key_type
        .ok_or(CustomerError::Validation(ValidationError::MissingField("type")))?;
    let value = params
        .value
        .ok_or(CustomerError::Validation(ValidationError::MissingField("value")))?;

    let customer = state.service().search(&key_type, &value).await?;
    Ok(Json(customer))
}

/// PUT /api/customers/{customer_id}
///
/// Replaces every mutable field. `customer_id` and `created_at` are kept.
///
/// # Errors
///
/// 400 for a malformed ID or invalid input, 404 if the customer does not
/// exist, 409 on an identifier conflict.
pub async fn update(
    State(state): State<AppState>,
    Path(customer_id): Path<String>,
    payload: std::result::Result<Json<CustomerDraft>, JsonRejection>,
) -> Result<Json<Customer>> {
    let id = parse_customer_id(&customer_id)?;
    let Json(draft) = payload.map_err(|e| json_rejection(&e))?;

    let customer = state.service().update_customer(id, draft).await?;
    Ok(Json(customer))
}

/// DELETE /api/customers/{customer_id}
///
/// # Errors
///
/// 400 for a malformed ID, 404 if the customer does not exist.
pub async fn delete(
    State(state): State<AppState>,
    Path(customer_id): Path<String>,
) -> Result<Json<MessageResponse>> {
    let id = parse_customer_id(&customer_id)?;
    state.service().delete_customer(id).await?;

    Ok(Json(MessageResponse {
        message: format!("Customer ID {id} and associated products deleted successfully"),
    }))
}
