use serde::Deserialize;
use uuid::Uuid;

/// SQL query builder for the catalog listing endpoint
/// Builds a single parameterized query with filters, sorting, and pagination
pub struct SqlQueryBuilder {
    base_query: String,
    where_clauses: Vec<String>,
    params: Vec<String>,
    order_clause: Option<String>,
    limit: u32,
    offset: u32,
}

impl SqlQueryBuilder {
    /// Creates a builder scoped to one tenancy
    ///
    /// The tenancy filter is always the first bound parameter so no listing
    /// can ever cross tenancy boundaries.
    pub fn for_tenancy(tenancy_id: Uuid) -> Self {
        Self {
            base_query: "SELECT * FROM services".to_string(),
            where_clauses: vec!["tenancy_id = $1::uuid".to_string()],
            params: vec![tenancy_id.to_string()],
            order_clause: None,
            limit: 10,
            offset: 0,
        }
    }

    /// Adds a search filter for partial name matching (case-insensitive)
    pub fn add_search_filter(&mut self, search: &str) {
        let param_index = self.params.len() + 1;
        self.where_clauses.push(format!("name ILIKE ${}", param_index));
        self.params.push(format!("%{}%", search));
    }

    /// Adds a category filter (exact, case-insensitive)
    pub fn add_category_filter(&mut self, category: &str) {
        let param_index = self.params.len() + 1;
        self.where_clauses
            .push(format!("category ILIKE ${}", param_index));
        self.params.push(category.to_string());
    }

    /// Adds inclusive unit-price range filters
    pub fn add_price_range(&mut self, min: Option<f64>, max: Option<f64>) {
        if let Some(min_price) = min {
            let param_index = self.params.len() + 1;
            self.where_clauses
                .push(format!("unit_price >= ${}::numeric", param_index));
            self.params.push(min_price.to_string());
        }

        if let Some(max_price) = max {
            let param_index = self.params.len() + 1;
            self.where_clauses
                .push(format!("unit_price <= ${}::numeric", param_index));
            self.params.push(max_price.to_string());
        }
    }

    /// Sets the sort order for the query
    pub fn set_sort(&mut self, field: SortField, order: SortOrder) {
        let field_name = match field {
            SortField::Price => "unit_price",
            SortField::Turnaround => "turnaround_hours",
        };

        let order_str = match order {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        };

        self.order_clause = Some(format!("{} {}", field_name, order_str));
    }

    /// Sets pagination (1-indexed page)
    pub fn set_pagination(&mut self, page: u32, limit: u32) {
        self.limit = limit;
        self.offset = (page - 1) * limit;
    }

    /// Builds the final SQL query string with all parameters
    pub fn build(&self) -> (String, Vec<String>) {
        let mut query = self.base_query.clone();

        query.push_str(" WHERE ");
        query.push_str(&self.where_clauses.join(" AND "));

        if let Some(ref order) = self.order_clause {
            query.push_str(" ORDER BY ");
            query.push_str(order);
        }

        // LIMIT/OFFSET inlined as integers, never as text parameters
        query.push_str(&format!(" LIMIT {}", self.limit));
        query.push_str(&format!(" OFFSET {}", self.offset));

        (query, self.params.clone())
    }
}

/// Query parameters extracted from the HTTP request
#[derive(Debug, Deserialize)]
pub struct QueryParams {
    /// Search term for partial service-name matching
    pub search: Option<String>,
    /// Filter by service category
    pub category: Option<String>,
    /// Minimum unit price (inclusive)
    pub min_price: Option<f64>,
    /// Maximum unit price (inclusive)
    pub max_price: Option<f64>,
    /// Sort field: "price" or "turnaround"
    pub sort: Option<String>,
    /// Sort order: "asc" or "desc"
    pub order: Option<String>,
    /// Page number (1-indexed, defaults to 1)
    pub page: Option<u32>,
    /// Items per page (defaults to 10)
    pub limit: Option<u32>,
}

/// Sort field options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Price,
    Turnaround,
}

/// Sort order options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Validated and normalized query parameters
#[derive(Debug)]
pub struct ValidatedQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub sort_field: Option<SortField>,
    pub sort_order: SortOrder,
    pub page: u32,
    pub limit: u32,
}

/// Query-string validation error
#[derive(Debug)]
pub struct QueryError {
    pub message: String,
}

impl std::fmt::Display for QueryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for QueryError {}

/// Query parameter validator
pub struct QueryValidator;

impl QueryValidator {
    /// Validates and normalizes query parameters
    pub fn validate(params: QueryParams) -> Result<ValidatedQuery, QueryError> {
        let search = Self::normalize_string(params.search);
        let category = Self::normalize_string(params.category);

        if let Some(ref c) = category {
            if crate::validation::validate_service_category(c).is_err() {
                return Err(QueryError {
                    message: format!("Invalid category '{}'", c),
                });
            }
        }

        let min_price = match params.min_price {
            Some(price) => {
                Self::validate_price(price, "min_price")?;
                Some(price)
            }
            None => None,
        };

        let max_price = match params.max_price {
            Some(price) => {
                Self::validate_price(price, "max_price")?;
                Some(price)
            }
            None => None,
        };

        if let (Some(min), Some(max)) = (min_price, max_price) {
            if min > max {
                return Err(QueryError {
                    message: "min_price cannot be greater than max_price".to_string(),
                });
            }
        }

        let sort_field = match params.sort {
            Some(sort_str) => Some(Self::parse_sort_field(&sort_str)?),
            None => None,
        };

        let sort_order = match params.order {
            Some(order_str) => Self::parse_sort_order(&order_str)?,
            None => SortOrder::Asc,
        };

        let page = match params.page {
            Some(p) => {
                Self::validate_pagination_param(p, "page")?;
                p
            }
            None => 1,
        };

        let limit = match params.limit {
            Some(l) => {
                Self::validate_pagination_param(l, "limit")?;
                l
            }
            None => 10,
        };

        Ok(ValidatedQuery {
            search,
            category,
            min_price,
            max_price,
            sort_field,
            sort_order,
            page,
            limit,
        })
    }

    /// Trims whitespace; empty strings become None
    fn normalize_string(s: Option<String>) -> Option<String> {
        s.and_then(|s| {
            let trimmed = s.trim().to_string();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed)
            }
        })
    }

    fn validate_price(price: f64, param_name: &str) -> Result<(), QueryError> {
        if price <= 0.0 {
            return Err(QueryError {
                message: format!("{} must be a positive number", param_name),
            });
        }
        if price.is_nan() || price.is_infinite() {
            return Err(QueryError {
                message: format!("{} must be a valid number", param_name),
            });
        }
        Ok(())
    }

    fn parse_sort_field(s: &str) -> Result<SortField, QueryError> {
        match s.to_lowercase().as_str() {
            "price" => Ok(SortField::Price),
            "turnaround" => Ok(SortField::Turnaround),
            _ => Err(QueryError {
                message: format!("Invalid sort field '{}'. Must be 'price' or 'turnaround'", s),
            }),
        }
    }

    fn parse_sort_order(s: &str) -> Result<SortOrder, QueryError> {
        match s.to_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            _ => Err(QueryError {
                message: format!("Invalid sort order '{}'. Must be 'asc' or 'desc'", s),
            }),
        }
    }

    fn validate_pagination_param(value: u32, param_name: &str) -> Result<(), QueryError> {
        if value == 0 {
            return Err(QueryError {
                message: format!("{} must be greater than zero", param_name),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tenancy() -> Uuid {
        Uuid::nil()
    }

    #[test]
    fn test_builder_always_scopes_to_tenancy() {
        let builder = SqlQueryBuilder::for_tenancy(tenancy());
        let (query, params) = builder.build();
        assert!(query.contains("tenancy_id = $1::uuid"));
        assert_eq!(params[0], Uuid::nil().to_string());
    }

    #[test]
    fn test_builder_with_all_filters() {
        let mut builder = SqlQueryBuilder::for_tenancy(tenancy());
        builder.add_search_filter("shirt");
        builder.add_category_filter("wash");
        builder.add_price_range(Some(10.0), Some(100.0));
        builder.set_sort(SortField::Price, SortOrder::Desc);
        builder.set_pagination(2, 20);

        let (query, params) = builder.build();
        assert!(query.contains("name ILIKE $2"));
        assert!(query.contains("category ILIKE $3"));
        assert!(query.contains("unit_price >= $4::numeric"));
        assert!(query.contains("unit_price <= $5::numeric"));
        assert!(query.contains("ORDER BY unit_price DESC"));
        assert!(query.ends_with("LIMIT 20 OFFSET 20"));
        assert_eq!(params.len(), 5);
        assert_eq!(params[1], "%shirt%");
    }

    #[test]
    fn test_validator_defaults() {
        let validated = QueryValidator::validate(QueryParams {
            search: None,
            category: None,
            min_price: None,
            max_price: None,
            sort: None,
            order: None,
            page: None,
            limit: None,
        })
        .unwrap();

        assert_eq!(validated.page, 1);
        assert_eq!(validated.limit, 10);
        assert_eq!(validated.sort_order, SortOrder::Asc);
        assert!(validated.sort_field.is_none());
    }

    #[test]
    fn test_validator_rejects_inverted_price_range() {
        let result = QueryValidator::validate(QueryParams {
            search: None,
            category: None,
            min_price: Some(100.0),
            max_price: Some(10.0),
            sort: None,
            order: None,
            page: None,
            limit: None,
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_validator_rejects_unknown_category() {
        let result = QueryValidator::validate(QueryParams {
            search: None,
            category: Some("folding".to_string()),
            min_price: None,
            max_price: None,
            sort: None,
            order: None,
            page: None,
            limit: None,
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_validator_rejects_zero_page() {
        let result = QueryValidator::validate(QueryParams {
            search: None,
            category: None,
            min_price: None,
            max_price: None,
            sort: None,
            order: None,
            page: Some(0),
            limit: None,
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_search_trimmed_and_emptied() {
        let validated = QueryValidator::validate(QueryParams {
            search: Some("   ".to_string()),
            category: None,
            min_price: None,
            max_price: None,
            sort: Some("turnaround".to_string()),
            order: Some("desc".to_string()),
            page: None,
            limit: None,
        })
        .unwrap();
        assert!(validated.search.is_none());
        assert_eq!(validated.sort_field, Some(SortField::Turnaround));
        assert_eq!(validated.sort_order, SortOrder::Desc);
    }
}
