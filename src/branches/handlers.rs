// HTTP handlers for branch endpoints
//
// Listing and fetch are open to any authenticated user; create, update,
// delete, and staff assignment are admin-only via router middleware.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::auth::middleware::AuthenticatedUser;
use crate::branches::{
    AssignStaffRequest, Branch, BranchError, CreateBranchRequest, UpdateBranchRequest,
};
use crate::AppState;

/// POST /api/admin/branches
pub async fn create_branch_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<CreateBranchRequest>,
) -> Result<(StatusCode, Json<Branch>), BranchError> {
    request
        .validate()
        .map_err(|e| BranchError::ValidationError(e.to_string()))?;

    let branch = state
        .branch_repository
        .create(user.tenancy_id, request)
        .await?;

    Ok((StatusCode::CREATED, Json(branch)))
}

/// GET /api/branches
pub async fn list_branches_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<Branch>>, BranchError> {
    let branches = state.branch_repository.list(user.tenancy_id).await?;
    Ok(Json(branches))
}

/// GET /api/branches/{id}
pub async fn get_branch_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(branch_id): Path<i32>,
) -> Result<Json<Branch>, BranchError> {
    let branch = state
        .branch_repository
        .find_by_id(user.tenancy_id, branch_id)
        .await?
        .ok_or(BranchError::NotFound)?;

    Ok(Json(branch))
}

/// PATCH /api/admin/branches/{id}
pub async fn update_branch_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(branch_id): Path<i32>,
    Json(request): Json<UpdateBranchRequest>,
) -> Result<Json<Branch>, BranchError> {
    request
        .validate()
        .map_err(|e| BranchError::ValidationError(e.to_string()))?;

    let branch = state
        .branch_repository
        .update(user.tenancy_id, branch_id, request)
        .await?;

    Ok(Json(branch))
}

/// DELETE /api/admin/branches/{id}
pub async fn delete_branch_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(branch_id): Path<i32>,
) -> Result<StatusCode, BranchError> {
    state
        .branch_repository
        .delete(user.tenancy_id, branch_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/admin/branches/{id}/staff
pub async fn assign_staff_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(branch_id): Path<i32>,
    Json(request): Json<AssignStaffRequest>,
) -> Result<StatusCode, BranchError> {
    state
        .branch_repository
        .assign_staff(user.tenancy_id, branch_id, request.user_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/admin/branches/{id}/staff
pub async fn branch_staff_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(branch_id): Path<i32>,
) -> Result<Json<Vec<i32>>, BranchError> {
    let staff = state
        .branch_repository
        .branch_staff(user.tenancy_id, branch_id)
        .await?;

    Ok(Json(staff))
}
