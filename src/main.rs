pub mod auth;
pub mod benefits;
pub mod branches;
pub mod db;
pub mod error;
pub mod models;
pub mod notifications;
pub mod orders;
pub mod query;
pub mod reviews;
pub mod tickets;
pub mod validation;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{delete, get, patch, post, put},
    Router,
};
use sqlx::PgPool;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;
use validator::Validate;

use auth::{
    middleware::{AuthenticatedUser, RequireRole},
    repository::{TokenRepository, UserRepository},
    token::TokenService,
    AuthService,
};
use benefits::{BenefitRepository, UsageRecorder};
use branches::BranchRepository;
use error::ApiError;
use models::{CreateService, LaundryService, ServiceCategory, UpdateService};
use notifications::Notifier;
use orders::{
    OrderItemsRepository, OrderService, OrdersRepository, ServiceLookupRepository,
};
use query::{QueryParams, QueryValidator, SqlQueryBuilder};
use reviews::{RatingCalculator, ReviewRepository, ReviewService};
use tickets::{TicketRepository, TicketService};

/// OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    paths(
        create_service,
        get_service_by_id,
        update_service,
        delete_service,
    ),
    components(
        schemas(LaundryService, CreateService, UpdateService, ServiceCategory)
    ),
    tags(
        (name = "services", description = "Laundry service catalog endpoints")
    ),
    info(
        title = "Laundry API",
        version = "1.0.0",
        description = "Multi-tenant RESTful API for laundry order management",
        contact(
            name = "API Support",
            email = "support@laundryapi.com"
        )
    )
)]
struct ApiDoc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub auth_service: AuthService,
    pub benefit_repository: BenefitRepository,
    pub branch_repository: BranchRepository,
    pub order_service: OrderService,
    pub order_items_repo: OrderItemsRepository,
    pub review_service: ReviewService,
    pub ticket_service: TicketService,
}

const SERVICE_COLUMNS: &str =
    "id, tenancy_id, name, category, item_type, unit_price, turnaround_hours, is_active, created_at";

/// Handler for POST /api/services
/// Creates a catalog entry within the caller's tenancy (admin only)
#[utoipa::path(
    post,
    path = "/api/services",
    request_body = CreateService,
    responses(
        (status = 201, description = "Service created successfully", body = LaundryService),
        (status = 400, description = "Invalid input data", body = String, example = json!({"error": "Price must be a positive number"})),
        (status = 409, description = "Duplicate service name", body = String, example = json!({"error": "Service with name 'Shirt Wash' already exists"})),
        (status = 500, description = "Internal server error", body = String, example = json!({"error": "Database error"}))
    ),
    tag = "services"
)]
async fn create_service(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<CreateService>,
) -> Result<(StatusCode, Json<LaundryService>), ApiError> {
    tracing::debug!("Creating new service: {}", payload.name);

    // Validate the request using validator crate
    payload.validate()?;

    // Service names are unique within a tenancy
    if db::check_duplicate_service(&state.db, user.tenancy_id, &payload.name).await? {
        tracing::warn!("Attempt to create duplicate service: {}", payload.name);
        return Err(ApiError::Conflict {
            message: format!("Service with name '{}' already exists", payload.name),
        });
    }

    let service = sqlx::query_as::<_, LaundryService>(&format!(
        r#"
        INSERT INTO services (tenancy_id, name, category, item_type, unit_price, turnaround_hours)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING {SERVICE_COLUMNS}
        "#,
    ))
    .bind(user.tenancy_id)
    .bind(&payload.name)
    .bind(payload.category)
    .bind(&payload.item_type)
    .bind(payload.unit_price)
    .bind(payload.turnaround_hours)
    .fetch_one(&state.db)
    .await?;

    tracing::info!("Successfully created service with id: {}", service.id);
    Ok((StatusCode::CREATED, Json(service)))
}

/// Handler for GET /api/services
/// Lists the tenancy's catalog with search, filtering, sorting, and pagination
async fn get_services_with_query(
    Query(params): Query<QueryParams>,
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<LaundryService>>, ApiError> {
    tracing::debug!("Fetching services with query parameters: {:?}", params);

    // 1. Validate query parameters
    let validated = QueryValidator::validate(params)?;

    // 2. Build the tenancy-scoped SQL query
    let mut builder = SqlQueryBuilder::for_tenancy(user.tenancy_id);

    if let Some(search) = validated.search {
        builder.add_search_filter(&search);
    }
    if let Some(category) = validated.category {
        builder.add_category_filter(&category);
    }
    builder.add_price_range(validated.min_price, validated.max_price);

    if let Some(sort_field) = validated.sort_field {
        builder.set_sort(sort_field, validated.sort_order);
    }

    builder.set_pagination(validated.page, validated.limit);

    let (query_str, params) = builder.build();

    // 3. Execute the query with parameterized binding
    let mut query = sqlx::query_as::<_, LaundryService>(&query_str);

    for param in params {
        query = query.bind(param);
    }

    let services = query.fetch_all(&state.db).await?;

    tracing::debug!("Query returned {} services", services.len());
    Ok(Json(services))
}

/// Handler for GET /api/services/:id
#[utoipa::path(
    get,
    path = "/api/services/{id}",
    params(
        ("id" = i32, Path, description = "Service ID")
    ),
    responses(
        (status = 200, description = "Service found", body = LaundryService),
        (status = 404, description = "Service not found", body = String, example = json!({"error": "Service with id 1 not found"})),
        (status = 500, description = "Internal server error", body = String, example = json!({"error": "Database error"}))
    ),
    tag = "services"
)]
async fn get_service_by_id(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i32>,
) -> Result<Json<LaundryService>, ApiError> {
    tracing::debug!("Fetching service with id: {}", id);

    let service = sqlx::query_as::<_, LaundryService>(&format!(
        "SELECT {SERVICE_COLUMNS} FROM services WHERE id = $1 AND tenancy_id = $2",
    ))
    .bind(id)
    .bind(user.tenancy_id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| {
        tracing::debug!("Service with id {} not found", id);
        ApiError::NotFound {
            resource: "Service".to_string(),
            id: id.to_string(),
        }
    })?;

    tracing::debug!("Successfully retrieved service: {}", service.name);
    Ok(Json(service))
}

/// Handler for PUT /api/services/:id
/// Updates a catalog entry; omitted fields keep their current values (admin only)
#[utoipa::path(
    put,
    path = "/api/services/{id}",
    params(
        ("id" = i32, Path, description = "Service ID")
    ),
    request_body = UpdateService,
    responses(
        (status = 200, description = "Service updated successfully", body = LaundryService),
        (status = 400, description = "Invalid input data", body = String, example = json!({"error": "Price must be a positive number"})),
        (status = 404, description = "Service not found", body = String, example = json!({"error": "Service with id 1 not found"})),
        (status = 409, description = "Duplicate service name", body = String, example = json!({"error": "Service with name 'Shirt Wash' already exists"})),
        (status = 500, description = "Internal server error", body = String, example = json!({"error": "Database error"}))
    ),
    tag = "services"
)]
async fn update_service(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateService>,
) -> Result<Json<LaundryService>, ApiError> {
    tracing::debug!("Updating service with id: {}", id);

    // Validate the request using validator crate
    payload.validate()?;

    // Use a transaction so the exists-check and update stay atomic
    let mut tx = state.db.begin().await?;

    let existing = sqlx::query_as::<_, LaundryService>(&format!(
        "SELECT {SERVICE_COLUMNS} FROM services WHERE id = $1 AND tenancy_id = $2",
    ))
    .bind(id)
    .bind(user.tenancy_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| {
        tracing::debug!("Service with id {} not found for update", id);
        ApiError::NotFound {
            resource: "Service".to_string(),
            id: id.to_string(),
        }
    })?;

    // If the name is changing, it must stay unique within the tenancy
    if let Some(ref new_name) = payload.name {
        if new_name != &existing.name
            && db::check_duplicate_service_excluding_id(&state.db, user.tenancy_id, new_name, id)
                .await?
        {
            tracing::warn!("Attempt to update service {} to duplicate name: {}", id, new_name);
            return Err(ApiError::Conflict {
                message: format!("Service with name '{}' already exists", new_name),
            });
        }
    }

    let updated_service = sqlx::query_as::<_, LaundryService>(&format!(
        r#"
        UPDATE services
        SET name = $1,
            category = $2,
            item_type = $3,
            unit_price = $4,
            turnaround_hours = $5,
            is_active = $6
        WHERE id = $7 AND tenancy_id = $8
        RETURNING {SERVICE_COLUMNS}
        "#,
    ))
    .bind(payload.name.unwrap_or(existing.name))
    .bind(payload.category.unwrap_or(existing.category))
    .bind(payload.item_type.unwrap_or(existing.item_type))
    .bind(payload.unit_price.unwrap_or(existing.unit_price))
    .bind(payload.turnaround_hours.unwrap_or(existing.turnaround_hours))
    .bind(payload.is_active.unwrap_or(existing.is_active))
    .bind(id)
    .bind(user.tenancy_id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::info!("Successfully updated service with id: {}", id);
    Ok(Json(updated_service))
}

/// Handler for DELETE /api/services/:id
/// Removes a catalog entry (admin only)
#[utoipa::path(
    delete,
    path = "/api/services/{id}",
    params(
        ("id" = i32, Path, description = "Service ID")
    ),
    responses(
        (status = 204, description = "Service deleted successfully"),
        (status = 404, description = "Service not found", body = String, example = json!({"error": "Service with id 1 not found"})),
        (status = 500, description = "Internal server error", body = String, example = json!({"error": "Database error"}))
    ),
    tag = "services"
)]
async fn delete_service(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    tracing::debug!("Deleting service with id: {}", id);

    let result = sqlx::query("DELETE FROM services WHERE id = $1 AND tenancy_id = $2")
        .bind(id)
        .bind(user.tenancy_id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        tracing::debug!("Service with id {} not found for deletion", id);
        return Err(ApiError::NotFound {
            resource: "Service".to_string(),
            id: id.to_string(),
        });
    }

    tracing::info!("Successfully deleted service with id: {}", id);
    Ok(StatusCode::NO_CONTENT)
}

/// Wires every repository and service into the shared application state
fn build_state(db: PgPool, jwt_secret: String) -> AppState {
    let auth_service = AuthService::new(
        UserRepository::new(db.clone()),
        TokenRepository::new(db.clone()),
        TokenService::new(jwt_secret),
    );

    let order_service = OrderService::new(
        OrdersRepository::new(db.clone()),
        OrderItemsRepository::new(db.clone()),
        ServiceLookupRepository::new(db.clone()),
        BenefitRepository::new(db.clone()),
        UsageRecorder::new(db.clone()),
        Notifier::new(),
    );

    let review_repository = ReviewRepository::new(db.clone());
    let review_service = ReviewService::new(
        review_repository.clone(),
        OrdersRepository::new(db.clone()),
        RatingCalculator::new(review_repository),
    );

    AppState {
        auth_service,
        benefit_repository: BenefitRepository::new(db.clone()),
        branch_repository: BranchRepository::new(db.clone()),
        order_service,
        order_items_repo: OrderItemsRepository::new(db.clone()),
        review_service,
        ticket_service: TicketService::new(TicketRepository::new(db.clone())),
        db,
    }
}

/// Creates and configures the application router
/// Maps all API endpoints to their handlers and adds CORS middleware
fn create_router(db: PgPool, jwt_secret: String) -> Router {
    use tower_http::cors::{Any, CorsLayer};

    let state = build_state(db, jwt_secret);

    // Configure CORS to allow all origins, methods, and headers
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Rate limit the credential endpoints per peer IP
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(2)
            .burst_size(10)
            .finish()
            .expect("Failed to build rate limiter config"),
    );

    let governor_limiter = governor_conf.limiter().clone();
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(Duration::from_secs(60)).await;
            governor_limiter.retain_recent();
        }
    });

    let auth_routes = Router::new()
        .route("/api/auth/register", post(auth::register_handler))
        .route("/api/auth/login", post(auth::login_handler))
        .route("/api/auth/refresh", post(auth::refresh_handler))
        .layer(GovernorLayer {
            config: governor_conf,
        })
        .route("/api/auth/me", get(auth::me_handler));

    // Any authenticated user; handlers scope data through the caller's claims
    let customer_routes = Router::new()
        .route("/api/services", get(get_services_with_query))
        .route("/api/services/:id", get(get_service_by_id))
        .route("/api/branches", get(branches::list_branches_handler))
        .route("/api/branches/:id", get(branches::get_branch_handler))
        .route("/api/branches/:id/reviews", get(reviews::branch_reviews_handler))
        .route("/api/customer/orders", post(orders::create_order_handler))
        .route("/api/customer/orders", get(orders::order_history_handler))
        .route("/api/customer/orders/:id", get(orders::get_order_handler))
        .route("/api/customer/reviews", post(reviews::create_review_handler))
        .route("/api/customer/tickets", post(tickets::create_ticket_handler))
        .route("/api/customer/tickets", get(tickets::my_tickets_handler))
        .route("/api/customer/tickets/:id", get(tickets::get_ticket_handler));

    let staff_routes = Router::new()
        .route("/api/staff/orders", get(orders::list_tenancy_orders_handler))
        .route("/api/staff/orders/:id/status", patch(orders::update_status_handler))
        .route("/api/staff/orders/:id/payment", patch(orders::update_payment_handler))
        .route("/api/staff/tickets", get(tickets::list_tickets_handler))
        .route("/api/staff/tickets/:id/status", patch(tickets::update_ticket_status_handler))
        .route("/api/staff/tickets/:id/assign", patch(tickets::assign_ticket_handler))
        .route("/api/staff/reviews/pending", get(reviews::pending_reviews_handler))
        .route("/api/staff/reviews/:id/moderate", patch(reviews::moderate_review_handler))
        .layer(axum::middleware::from_fn(|req, next| {
            RequireRole::staff().middleware(req, next)
        }));

    let admin_routes = Router::new()
        .route("/api/services", post(create_service))
        .route("/api/services/:id", put(update_service))
        .route("/api/services/:id", delete(delete_service))
        .route("/api/admin/branches", post(branches::create_branch_handler))
        .route("/api/admin/branches/:id", patch(branches::update_branch_handler))
        .route("/api/admin/branches/:id", delete(branches::delete_branch_handler))
        .route("/api/admin/branches/:id/staff", post(branches::assign_staff_handler))
        .route("/api/admin/branches/:id/staff", get(branches::branch_staff_handler))
        .route("/api/admin/discounts", post(benefits::handlers::create_discount_handler))
        .route("/api/admin/discounts", get(benefits::handlers::list_discounts_handler))
        .route("/api/admin/discounts/:id", get(benefits::handlers::get_discount_handler))
        .route("/api/admin/discounts/:id", patch(benefits::handlers::update_discount_handler))
        .route("/api/admin/discounts/:id", delete(benefits::handlers::delete_discount_handler))
        .route("/api/admin/campaigns", post(benefits::handlers::create_campaign_handler))
        .route("/api/admin/campaigns", get(benefits::handlers::list_campaigns_handler))
        .route("/api/admin/campaigns/:id", get(benefits::handlers::get_campaign_handler))
        .route("/api/admin/campaigns/:id/active", patch(benefits::handlers::set_campaign_active_handler))
        .route("/api/admin/campaigns/:id", delete(benefits::handlers::delete_campaign_handler))
        .route("/api/admin/coupons", post(benefits::handlers::create_coupon_handler))
        .route("/api/admin/coupons", get(benefits::handlers::list_coupons_handler))
        .route("/api/admin/coupons/:id/active", patch(benefits::handlers::set_coupon_active_handler))
        .route("/api/admin/coupons/:id", delete(benefits::handlers::delete_coupon_handler))
        .layer(axum::middleware::from_fn(|req, next| {
            RequireRole::admin().middleware(req, next)
        }));

    Router::new()
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // API routes
        .merge(auth_routes)
        .merge(customer_routes)
        .merge(staff_routes)
        .merge(admin_routes)
        .layer(cors)
        .with_state(state)
}

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Initialize tracing subscriber for logging
    // This enables the error!, warn!, info!, debug!, and trace! macros
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    tracing::info!("Laundry API - Starting...");

    // Get configuration from environment variables
    let database_url = std::env::var("DATABASE_URL")
        .expect("DATABASE_URL must be set in environment");
    let jwt_secret = std::env::var("JWT_SECRET")
        .expect("JWT_SECRET must be set in environment");
    let host = std::env::var("HOST")
        .unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = std::env::var("PORT")
        .unwrap_or_else(|_| "8080".to_string());

    // Create database connection pool
    tracing::info!("Connecting to database...");
    let db_pool = db::create_pool(&database_url)
        .await
        .expect("Failed to create database pool");

    // Run SQLx migrations on startup
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Migrations completed successfully");

    // Create the application router
    let app = create_router(db_pool, jwt_secret);

    // Start the Axum server
    let addr = format!("{}:{}", host, port);
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Laundry API is running on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui", addr);

    // Peer-IP rate limiting needs the connection info attached
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .await
    .expect("Server error");
}
