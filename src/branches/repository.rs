use sqlx::PgPool;
use uuid::Uuid;

use crate::branches::{Branch, BranchError, CreateBranchRequest, UpdateBranchRequest};

const BRANCH_COLUMNS: &str =
    "id, tenancy_id, name, address, phone, rating, review_count, is_active, created_at";

/// Repository for database operations on branches
#[derive(Clone)]
pub struct BranchRepository {
    pool: PgPool,
}

impl BranchRepository {
    /// Create a new BranchRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a branch; names are unique per tenancy
    pub async fn create(
        &self,
        tenancy_id: Uuid,
        request: CreateBranchRequest,
    ) -> Result<Branch, BranchError> {
        let branch = sqlx::query_as::<_, Branch>(&format!(
            "INSERT INTO branches (tenancy_id, name, address, phone)
             VALUES ($1, $2, $3, $4)
             RETURNING {BRANCH_COLUMNS}"
        ))
        .bind(tenancy_id)
        .bind(&request.name)
        .bind(&request.address)
        .bind(&request.phone)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => BranchError::DuplicateName,
            _ => BranchError::DatabaseError(e),
        })?;

        Ok(branch)
    }

    /// List branches in a tenancy
    pub async fn list(&self, tenancy_id: Uuid) -> Result<Vec<Branch>, BranchError> {
        let branches = sqlx::query_as::<_, Branch>(&format!(
            "SELECT {BRANCH_COLUMNS} FROM branches
             WHERE tenancy_id = $1
             ORDER BY name ASC"
        ))
        .bind(tenancy_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(branches)
    }

    /// Find a branch by ID within a tenancy
    pub async fn find_by_id(&self, tenancy_id: Uuid, id: i32) -> Result<Option<Branch>, BranchError> {
        let branch = sqlx::query_as::<_, Branch>(&format!(
            "SELECT {BRANCH_COLUMNS} FROM branches WHERE tenancy_id = $1 AND id = $2"
        ))
        .bind(tenancy_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(branch)
    }

    /// Partial update; unset fields keep their stored values
    pub async fn update(
        &self,
        tenancy_id: Uuid,
        id: i32,
        request: UpdateBranchRequest,
    ) -> Result<Branch, BranchError> {
        let branch = sqlx::query_as::<_, Branch>(&format!(
            "UPDATE branches SET
                 name = COALESCE($3, name),
                 address = COALESCE($4, address),
                 phone = COALESCE($5, phone),
                 is_active = COALESCE($6, is_active)
             WHERE tenancy_id = $1 AND id = $2
             RETURNING {BRANCH_COLUMNS}"
        ))
        .bind(tenancy_id)
        .bind(id)
        .bind(request.name)
        .bind(request.address)
        .bind(request.phone)
        .bind(request.is_active)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => BranchError::DuplicateName,
            _ => BranchError::DatabaseError(e),
        })?
        .ok_or(BranchError::NotFound)?;

        Ok(branch)
    }

    /// Delete a branch
    pub async fn delete(&self, tenancy_id: Uuid, id: i32) -> Result<(), BranchError> {
        let result = sqlx::query("DELETE FROM branches WHERE tenancy_id = $1 AND id = $2")
            .bind(tenancy_id)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(BranchError::NotFound);
        }
        Ok(())
    }

    /// Assign a staff member to a branch (idempotent)
    pub async fn assign_staff(
        &self,
        tenancy_id: Uuid,
        branch_id: i32,
        user_id: i32,
    ) -> Result<(), BranchError> {
        // Assignee must be staff or admin in the same tenancy
        let staff: Option<(i32,)> = sqlx::query_as(
            "SELECT id FROM users
             WHERE tenancy_id = $1 AND id = $2 AND role IN ('staff', 'admin')",
        )
        .bind(tenancy_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        if staff.is_none() {
            return Err(BranchError::InvalidStaffMember);
        }

        if self.find_by_id(tenancy_id, branch_id).await?.is_none() {
            return Err(BranchError::NotFound);
        }

        sqlx::query(
            "INSERT INTO branch_staff (branch_id, user_id)
             VALUES ($1, $2)
             ON CONFLICT DO NOTHING",
        )
        .bind(branch_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Staff member IDs assigned to a branch
    pub async fn branch_staff(
        &self,
        tenancy_id: Uuid,
        branch_id: i32,
    ) -> Result<Vec<i32>, BranchError> {
        let ids: Vec<(i32,)> = sqlx::query_as(
            "SELECT bs.user_id FROM branch_staff bs
             JOIN branches b ON b.id = bs.branch_id
             WHERE b.tenancy_id = $1 AND bs.branch_id = $2
             ORDER BY bs.user_id",
        )
        .bind(tenancy_id)
        .bind(branch_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids.into_iter().map(|r| r.0).collect())
    }
}
