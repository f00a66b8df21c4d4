//! Faculty and faculty usage endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::{
    error::AppResult,
    models::{
        faculty::{CreateFaculty, FacultiesForBook, Faculty, FacultyUsage, RegisterUsage, UpdateFaculty},
        inventory::StockQuery,
    },
};

use super::AuthenticatedUser;

/// List faculties
#[utoipa::path(
    get,
    path = "/faculties",
    tag = "faculties",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All faculties", body = Vec<Faculty>)
    )
)]
pub async fn list_faculties(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<Faculty>>> {
    claims.require_read_people()?;
    Ok(Json(state.services.people.list_faculties().await?))
}

/// Get faculty by ID
#[utoipa::path(
    get,
    path = "/faculties/{id}",
    tag = "faculties",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Faculty ID")),
    responses(
        (status = 200, description = "Faculty details", body = Faculty),
        (status = 404, description = "Faculty not found")
    )
)]
pub async fn get_faculty(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Faculty>> {
    claims.require_read_people()?;
    Ok(Json(state.services.people.get_faculty(id).await?))
}

/// Create a faculty
#[utoipa::path(
    post,
    path = "/faculties",
    tag = "faculties",
    security(("bearer_auth" = [])),
    request_body = CreateFaculty,
    responses(
        (status = 201, description = "Faculty created", body = Faculty),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Faculty name already used")
    )
)]
pub async fn create_faculty(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<CreateFaculty>,
) -> AppResult<(StatusCode, Json<Faculty>)> {
    claims.require_write_people()?;
    data.validate()?;

    let faculty = state.services.people.create_faculty(data).await?;
    Ok((StatusCode::CREATED, Json(faculty)))
}

/// Update a faculty
#[utoipa::path(
    put,
    path = "/faculties/{id}",
    tag = "faculties",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Faculty ID")),
    request_body = UpdateFaculty,
    responses(
        (status = 200, description = "Faculty updated", body = Faculty),
        (status = 404, description = "Faculty not found")
    )
)]
pub async fn update_faculty(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<UpdateFaculty>,
) -> AppResult<Json<Faculty>> {
    claims.require_write_people()?;
    data.validate()?;

    Ok(Json(state.services.people.update_faculty(id, data).await?))
}

/// Delete a faculty without students
#[utoipa::path(
    delete,
    path = "/faculties/{id}",
    tag = "faculties",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Faculty ID")),
    responses(
        (status = 204, description = "Faculty deleted"),
        (status = 400, description = "Faculty still has students"),
        (status = 404, description = "Faculty not found")
    )
)]
pub async fn delete_faculty(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    claims.require_write_people()?;
    state.services.people.delete_faculty(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Books used by a faculty
#[utoipa::path(
    get,
    path = "/faculties/{id}/usages",
    tag = "faculties",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Faculty ID")),
    responses(
        (status = 200, description = "Usage rows", body = Vec<FacultyUsage>),
        (status = 404, description = "Faculty not found")
    )
)]
pub async fn list_faculty_usages(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Vec<FacultyUsage>>> {
    claims.require_read_people()?;
    Ok(Json(state.services.people.list_usages_for_faculty(id).await?))
}

/// Register that a faculty uses a stocked book
#[utoipa::path(
    post,
    path = "/faculty-usages",
    tag = "faculties",
    security(("bearer_auth" = [])),
    request_body = RegisterUsage,
    responses(
        (status = 200, description = "Usage row, existing or new", body = FacultyUsage),
        (status = 400, description = "Book not stocked at this branch"),
        (status = 404, description = "Faculty not found")
    )
)]
pub async fn register_usage(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<RegisterUsage>,
) -> AppResult<Json<FacultyUsage>> {
    claims.require_write_people()?;
    data.validate()?;

    Ok(Json(state.services.people.register_usage(data).await?))
}

/// Remove a usage row
#[utoipa::path(
    delete,
    path = "/faculty-usages/{id}",
    tag = "faculties",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Usage ID")),
    responses(
        (status = 204, description = "Usage removed"),
        (status = 404, description = "Usage not found")
    )
)]
pub async fn unregister_usage(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    claims.require_write_people()?;
    state.services.people.unregister_usage(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Faculties using a book at a branch
#[utoipa::path(
    get,
    path = "/faculty-usages/faculties",
    tag = "faculties",
    security(("bearer_auth" = [])),
    params(StockQuery),
    responses(
        (status = 200, description = "Distinct faculties by name, with count", body = FacultiesForBook)
    )
)]
pub async fn faculties_for_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<StockQuery>,
) -> AppResult<Json<FacultiesForBook>> {
    claims.require_read_people()?;

    let result = state
        .services
        .people
        .faculties_for_book(query.book_id, query.branch_id)
        .await?;
    Ok(Json(result))
}
