//! Product endpoints.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::Serialize;

use clientele_core::{Product, ProductDraft};

use super::customers::MessageResponse;
use super::{json_rejection, parse_customer_id, parse_product_id};
use crate::error::Result;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ProductCreated {
    pub message: String,
    pub product: Product,
}

#[derive(Debug, Serialize)]
pub struct ProductList {
    pub products: Vec<Product>,
}

/// POST /api/products
///
/// # Errors
///
/// 400 for invalid input, 404 if the owning customer does not exist.
pub async fn create(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ProductDraft>, JsonRejection>,
) -> Result<(StatusCode, Json<ProductCreated>)> {
    let Json(draft) = payload.map_err(|e| json_rejection(&e))?;
    let product = state.service().add_product(draft).await?;

    Ok((
        StatusCode::CREATED,
        Json(ProductCreated {
            message: "Product added successfully".to_string(),
            product,
        }),
    ))
}

/// GET /api/products/{customer_id}
///
/// # Errors
///
/// 400 for a malformed ID.
pub async fn list(
    State(state): State<AppState>,
    Path(customer_id): Path<String>,
) -> Result<Json<ProductList>> {
    let id = parse_customer_id(&customer_id)?;
    let products = state.service().list_products(id).await?;
    Ok(Json(ProductList { products }))
}

/// DELETE /api/products/{customer_id}/{product_id}
///
/// # Errors
///
/// 400 for a malformed ID, 404 if the customer does not own such a product.
pub async fn delete(
    State(state): State<AppState>,
    Path((customer_id, product_id)): Path<(String, String)>,
) -> Result<Json<MessageResponse>> {
    let customer_id = parse_customer_id(&customer_id)?;
    let product_id = parse_product_id(&product_id)?;
    state
        .service()
        .delete_product(customer_id, product_id)
        .await?;

    Ok(Json(MessageResponse {
        message: format!(
            "Product ID {product_id} for Customer ID {customer_id} deleted successfully"
        ),
    }))
}
