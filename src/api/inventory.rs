//! Inventory ledger endpoints

use axum::{
    extract::{Query, State},
    Json,
};

use crate::{
    error::AppResult,
    models::inventory::{AdjustInventory, InventoryRecord, StockCounts, StockQuery, UpdateShelfLocation},
};

use super::AuthenticatedUser;

/// Total and available copies of a book at a branch
#[utoipa::path(
    get,
    path = "/inventory",
    tag = "inventory",
    security(("bearer_auth" = [])),
    params(StockQuery),
    responses(
        (status = 200, description = "Copy counts, zero when not stocked", body = StockCounts)
    )
)]
pub async fn get_counts(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<StockQuery>,
) -> AppResult<Json<StockCounts>> {
    claims.require_read_inventory()?;
    Ok(Json(state.services.inventory.counts(query.book_id, query.branch_id).await?))
}

/// Full inventory record of a book at a branch
#[utoipa::path(
    get,
    path = "/inventory/record",
    tag = "inventory",
    security(("bearer_auth" = [])),
    params(StockQuery),
    responses(
        (status = 200, description = "Inventory record", body = InventoryRecord),
        (status = 404, description = "Book not stocked at this branch")
    )
)]
pub async fn get_record(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<StockQuery>,
) -> AppResult<Json<InventoryRecord>> {
    claims.require_read_inventory()?;
    Ok(Json(state.services.inventory.get_record(query.book_id, query.branch_id).await?))
}

/// Add or remove copies
#[utoipa::path(
    post,
    path = "/inventory/adjust",
    tag = "inventory",
    security(("bearer_auth" = [])),
    request_body = AdjustInventory,
    responses(
        (status = 200, description = "Adjusted record", body = InventoryRecord),
        (status = 400, description = "Zero delta"),
        (status = 404, description = "Book or branch not found"),
        (status = 422, description = "Total would become negative")
    )
)]
pub async fn adjust(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<AdjustInventory>,
) -> AppResult<Json<InventoryRecord>> {
    claims.require_write_inventory()?;

    let record = state
        .services
        .inventory
        .adjust(data.book_id, data.branch_id, data.delta)
        .await?;
    Ok(Json(record))
}

/// Set the shelf location of stocked copies
#[utoipa::path(
    put,
    path = "/inventory/shelf-location",
    tag = "inventory",
    security(("bearer_auth" = [])),
    request_body = UpdateShelfLocation,
    responses(
        (status = 200, description = "Updated record", body = InventoryRecord),
        (status = 404, description = "Book not stocked at this branch")
    )
)]
pub async fn set_shelf_location(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<UpdateShelfLocation>,
) -> AppResult<Json<InventoryRecord>> {
    claims.require_write_inventory()?;

    let record = state
        .services
        .inventory
        .set_shelf_location(data.book_id, data.branch_id, data.shelf_location)
        .await?;
    Ok(Json(record))
}
