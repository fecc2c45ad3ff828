use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use clientes::domain::{
    customer::{Customer, CustomerId, CustomerInput, InsertResult, UpdateResult},
    Id,
};
use tracing::{debug, info};

use crate::error::{self, ApiError};
use crate::AppState;

/// Any number is a valid path id, but only an integral one can address a row.
/// `Ok(None)` is a number no row can carry.
fn parse_id(raw: &str) -> Result<Option<CustomerId>, ApiError> {
    let raw = raw.trim();
    if let Some(id) = CustomerId::parse(raw) {
        return Ok(Some(id));
    }
    let number = raw
        .parse::<f64>()
        .ok()
        .filter(|n| !n.is_nan())
        .ok_or_else(ApiError::invalid_id)?;
    let integral =
        number.fract() == 0.0 && number >= i64::MIN as f64 && number < i64::MAX as f64;
    Ok(integral.then(|| CustomerId::from(number as i64)))
}

fn parse_input(
    body: Result<Json<CustomerInput>, JsonRejection>,
) -> Result<CustomerInput, ApiError> {
    let Json(input) =
        body.map_err(|rejection| ApiError::Validation(rejection.body_text()))?;
    input
        .validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;
    Ok(input)
}

pub async fn list_customers(
    State(state): State<AppState>,
) -> Result<Json<Vec<Customer>>, ApiError> {
    let customers = state
        .repository
        .list()
        .await
        .map_err(ApiError::storage(error::INTERNAL))?;
    debug!(count = customers.len(), "GET / served");
    Ok(Json(customers))
}

pub async fn get_customer(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<Vec<Customer>>, ApiError> {
    let Some(id) = parse_id(&raw_id)? else {
        debug!(id = %raw_id, "id addresses no row");
        return Err(ApiError::NotFound);
    };
    let customers = state
        .repository
        .get_by_id(id)
        .await
        .map_err(ApiError::storage(error::INTERNAL))?;
    if customers.is_empty() {
        return Err(ApiError::NotFound);
    }
    Ok(Json(customers))
}

pub async fn create_customer(
    State(state): State<AppState>,
    body: Result<Json<CustomerInput>, JsonRejection>,
) -> Result<Json<InsertResult>, ApiError> {
    let input = parse_input(body)?;
    let result = state
        .repository
        .create(&input)
        .await
        .map_err(ApiError::storage(error::CREATE_FAILED))?;
    info!(id = %result.insert_id, "POST /clientes/ served");
    Ok(Json(result))
}

pub async fn update_customer(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    body: Result<Json<CustomerInput>, JsonRejection>,
) -> Result<Json<UpdateResult>, ApiError> {
    let input = parse_input(body)?;
    let Ok(Some(id)) = parse_id(&raw_id) else {
        debug!(id = %raw_id, "id addresses no row, nothing updated");
        return Ok(Json(UpdateResult { affected_rows: 0 }));
    };
    info!(%id, ?input, "PUT /clientes/:id received");
    let result = state
        .repository
        .update(&input, id)
        .await
        .map_err(ApiError::storage(error::UPDATE_FAILED))?;
    Ok(Json(result))
}

pub async fn delete_customer(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<bool>, ApiError> {
    let Ok(Some(id)) = parse_id(&raw_id) else {
        debug!(id = %raw_id, "id addresses no row, nothing deleted");
        return Ok(Json(false));
    };
    info!(%id, "DELETE /clientes/:id received");
    let deleted = state
        .repository
        .delete_by_id(id)
        .await
        .map_err(ApiError::storage(error::DELETE_FAILED))?;
    Ok(Json(deleted))
}
