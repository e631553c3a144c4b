// Catalog and tenancy data models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Category of a laundry service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ServiceCategory {
    Wash,
    DryClean,
    Iron,
    WashIron,
    Premium,
}

impl ServiceCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceCategory::Wash => "wash",
            ServiceCategory::DryClean => "dry_clean",
            ServiceCategory::Iron => "iron",
            ServiceCategory::WashIron => "wash_iron",
            ServiceCategory::Premium => "premium",
        }
    }
}

impl std::fmt::Display for ServiceCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ServiceCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "wash" => Ok(ServiceCategory::Wash),
            "dry_clean" => Ok(ServiceCategory::DryClean),
            "iron" => Ok(ServiceCategory::Iron),
            "wash_iron" => Ok(ServiceCategory::WashIron),
            "premium" => Ok(ServiceCategory::Premium),
            _ => Err(format!("Invalid service category: {}", s)),
        }
    }
}

/// A tenancy: one laundry operator on the shared platform
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Tenancy {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub tax_percent: Decimal,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// A priced laundry service offered by a tenancy
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct LaundryService {
    pub id: i32,
    pub tenancy_id: Uuid,
    pub name: String,
    pub category: ServiceCategory,
    pub item_type: String,
    pub unit_price: Decimal,
    pub turnaround_hours: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Request DTO for creating a laundry service
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateService {
    #[validate(length(min = 1, max = 120, message = "Name must be 1-120 characters"))]
    pub name: String,
    pub category: ServiceCategory,
    #[validate(length(min = 1, max = 80, message = "Item type must be 1-80 characters"))]
    pub item_type: String,
    #[validate(custom = "crate::validation::validate_positive_price")]
    pub unit_price: Decimal,
    #[validate(range(min = 1, max = 720, message = "Turnaround must be 1-720 hours"))]
    pub turnaround_hours: i32,
}

/// Request DTO for updating a laundry service; omitted fields keep their values
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateService {
    #[validate(length(min = 1, max = 120, message = "Name must be 1-120 characters"))]
    pub name: Option<String>,
    pub category: Option<ServiceCategory>,
    #[validate(length(min = 1, max = 80, message = "Item type must be 1-80 characters"))]
    pub item_type: Option<String>,
    #[validate(custom = "crate::validation::validate_positive_price")]
    pub unit_price: Option<Decimal>,
    #[validate(range(min = 1, max = 720, message = "Turnaround must be 1-720 hours"))]
    pub turnaround_hours: Option<i32>,
    pub is_active: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_service_category_round_trip() {
        for c in [
            ServiceCategory::Wash,
            ServiceCategory::DryClean,
            ServiceCategory::Iron,
            ServiceCategory::WashIron,
            ServiceCategory::Premium,
        ] {
            assert_eq!(ServiceCategory::from_str(c.as_str()).unwrap(), c);
        }
    }

    #[test]
    fn test_service_category_serde() {
        let json = serde_json::to_string(&ServiceCategory::DryClean).unwrap();
        assert_eq!(json, "\"dry_clean\"");
        let back: ServiceCategory = serde_json::from_str("\"wash_iron\"").unwrap();
        assert_eq!(back, ServiceCategory::WashIron);
    }

    #[test]
    fn test_invalid_category_rejected() {
        assert!(ServiceCategory::from_str("folding").is_err());
    }
}
