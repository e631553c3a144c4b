use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Domain model representing a laundry branch
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Branch {
    pub id: i32,
    pub tenancy_id: Uuid,
    pub name: String,
    pub address: String,
    pub phone: Option<String>,
    /// Average of approved review ratings, None until the first approval
    pub rating: Option<f64>,
    pub review_count: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Request DTO for creating a branch
#[derive(Debug, Deserialize, Validate)]
pub struct CreateBranchRequest {
    #[validate(length(min = 1, max = 120, message = "Name must be 1-120 characters"))]
    pub name: String,
    #[validate(length(min = 1, max = 300, message = "Address must be 1-300 characters"))]
    pub address: String,
    #[validate(length(max = 20, message = "Phone must be at most 20 characters"))]
    pub phone: Option<String>,
}

/// Request DTO for updating a branch
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateBranchRequest {
    #[validate(length(min = 1, max = 120, message = "Name must be 1-120 characters"))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 300, message = "Address must be 1-300 characters"))]
    pub address: Option<String>,
    #[validate(length(max = 20, message = "Phone must be at most 20 characters"))]
    pub phone: Option<String>,
    pub is_active: Option<bool>,
}

/// Request DTO for assigning a staff member to a branch
#[derive(Debug, Deserialize)]
pub struct AssignStaffRequest {
    pub user_id: i32,
}
