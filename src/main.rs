//! Bibliotheca Server - University Library Management System
//!
//! REST API server for catalog, branch inventory and loans.

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bibliotheca_server::{
    api,
    config::AppConfig,
    repository::Repository,
    services::Services,
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load().expect("Failed to load configuration");

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("bibliotheca_server={},tower_http=debug", config.logging.level).into()
    });

    let registry = tracing_subscriber::registry().with(filter);
    if config.logging.format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!("Starting Bibliotheca Server v{}", env!("CARGO_PKG_VERSION"));

    // Create database connection pool
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect(&config.database.url)
        .await
        .expect("Failed to connect to database");

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run database migrations");

    tracing::info!("Database migrations completed");

    // Save server address before moving config
    let server_host = config.server.host.clone();
    let server_port = config.server.port;

    // Create repository and services
    let repository = Repository::new(pool);
    let services = Services::new(repository, config.loans.clone());

    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    };

    let app = create_router(state);

    let addr = SocketAddr::new(server_host.parse()?, server_port);
    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes
fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API v1 routes
    let api_v1 = Router::new()
        // Health check
        .route("/health", get(api::health::health_check))
        .route("/ready", get(api::health::readiness_check))
        // Authors
        .route("/authors", get(api::books::list_authors))
        .route("/authors", post(api::books::create_author))
        .route("/authors/:id", get(api::books::get_author))
        .route("/authors/:id", put(api::books::update_author))
        .route("/authors/:id", delete(api::books::delete_author))
        // Publishers
        .route("/publishers", get(api::books::list_publishers))
        .route("/publishers", post(api::books::create_publisher))
        .route("/publishers/:id", get(api::books::get_publisher))
        .route("/publishers/:id", put(api::books::update_publisher))
        .route("/publishers/:id", delete(api::books::delete_publisher))
        // Books
        .route("/books", get(api::books::list_books))
        .route("/books", post(api::books::create_book))
        .route("/books/:id", get(api::books::get_book))
        .route("/books/:id", put(api::books::update_book))
        .route("/books/:id", delete(api::books::delete_book))
        .route("/books/:id/inventory", get(api::books::get_book_inventory))
        .route("/books/:id/borrowers/count", get(api::books::count_book_borrowers))
        // Branches
        .route("/branches", get(api::branches::list_branches))
        .route("/branches", post(api::branches::create_branch))
        .route("/branches/:id", get(api::branches::get_branch))
        .route("/branches/:id", put(api::branches::update_branch))
        .route("/branches/:id", delete(api::branches::delete_branch))
        .route("/branches/:id/books", get(api::branches::list_branch_books))
        // Inventory
        .route("/inventory", get(api::inventory::get_counts))
        .route("/inventory/record", get(api::inventory::get_record))
        .route("/inventory/adjust", post(api::inventory::adjust))
        .route("/inventory/shelf-location", put(api::inventory::set_shelf_location))
        // Faculties and usage registry
        .route("/faculties", get(api::faculties::list_faculties))
        .route("/faculties", post(api::faculties::create_faculty))
        .route("/faculties/:id", get(api::faculties::get_faculty))
        .route("/faculties/:id", put(api::faculties::update_faculty))
        .route("/faculties/:id", delete(api::faculties::delete_faculty))
        .route("/faculties/:id/usages", get(api::faculties::list_faculty_usages))
        .route("/faculty-usages", post(api::faculties::register_usage))
        .route("/faculty-usages/faculties", get(api::faculties::faculties_for_book))
        .route("/faculty-usages/:id", delete(api::faculties::unregister_usage))
        // Students
        .route("/students", get(api::students::list_students))
        .route("/students", post(api::students::create_student))
        .route("/students/:id", get(api::students::get_student))
        .route("/students/:id", put(api::students::update_student))
        .route("/students/:id", delete(api::students::delete_student))
        // Loans
        .route("/loans", get(api::loans::list_loans))
        .route("/loans", post(api::loans::issue_loan))
        .route("/loans/overdue", get(api::loans::list_overdue))
        .route("/loans/:id", get(api::loans::get_loan))
        .route("/loans/:id", delete(api::loans::delete_loan))
        .route("/loans/:id/return", post(api::loans::return_loan))
        .with_state(state);

    // OpenAPI documentation
    let openapi = api::openapi::create_openapi_router();

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
}
