//! Branch endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::{
    error::AppResult,
    models::{
        branch::{Branch, CreateBranch, UpdateBranch},
        inventory::BranchStock,
    },
};

use super::AuthenticatedUser;

/// List branches
#[utoipa::path(
    get,
    path = "/branches",
    tag = "branches",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All branches", body = Vec<Branch>)
    )
)]
pub async fn list_branches(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<Branch>>> {
    claims.require_read_catalog()?;
    Ok(Json(state.services.catalog.list_branches().await?))
}

/// Get branch by ID
#[utoipa::path(
    get,
    path = "/branches/{id}",
    tag = "branches",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Branch ID")),
    responses(
        (status = 200, description = "Branch details", body = Branch),
        (status = 404, description = "Branch not found")
    )
)]
pub async fn get_branch(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Branch>> {
    claims.require_read_catalog()?;
    Ok(Json(state.services.catalog.get_branch(id).await?))
}

/// Create a branch
#[utoipa::path(
    post,
    path = "/branches",
    tag = "branches",
    security(("bearer_auth" = [])),
    request_body = CreateBranch,
    responses(
        (status = 201, description = "Branch created", body = Branch),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Branch name already used")
    )
)]
pub async fn create_branch(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<CreateBranch>,
) -> AppResult<(StatusCode, Json<Branch>)> {
    claims.require_write_catalog()?;
    data.validate()?;

    let branch = state.services.catalog.create_branch(data).await?;
    Ok((StatusCode::CREATED, Json(branch)))
}

/// Update a branch
#[utoipa::path(
    put,
    path = "/branches/{id}",
    tag = "branches",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Branch ID")),
    request_body = UpdateBranch,
    responses(
        (status = 200, description = "Branch updated", body = Branch),
        (status = 404, description = "Branch not found")
    )
)]
pub async fn update_branch(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<UpdateBranch>,
) -> AppResult<Json<Branch>> {
    claims.require_write_catalog()?;
    data.validate()?;

    Ok(Json(state.services.catalog.update_branch(id, data).await?))
}

/// Delete a branch
#[utoipa::path(
    delete,
    path = "/branches/{id}",
    tag = "branches",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Branch ID")),
    responses(
        (status = 204, description = "Branch deleted"),
        (status = 404, description = "Branch not found")
    )
)]
pub async fn delete_branch(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    claims.require_write_catalog()?;
    state.services.catalog.delete_branch(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Books with available copies at a branch
#[utoipa::path(
    get,
    path = "/branches/{id}/books",
    tag = "inventory",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Branch ID")),
    responses(
        (status = 200, description = "Books on the shelf", body = Vec<BranchStock>),
        (status = 404, description = "Branch not found")
    )
)]
pub async fn list_branch_books(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Vec<BranchStock>>> {
    claims.require_read_inventory()?;
    Ok(Json(state.services.inventory.list_for_branch(id).await?))
}
