// Bookclub Server - REST API for the book review community

use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use bookclub::{api::create_api_router, app_state::AppState, config::Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load configuration
    let config = Config::from_env()?;

    // Initialize application state
    let app_state = AppState::new(config.clone()).await?;

    // Build main application router
    let app = create_api_router(app_state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()),
    );

    let addr = config.server_address();
    info!("🚀 Bookclub server starting on http://{}", addr);
    println!("📋 API Documentation:");
    println!("  GET    /api/reviews                       - List reviews (page, sort, field, term)");
    println!("  POST   /api/reviews                       - Create review");
    println!("  GET    /api/reviews/{{id}}                  - Get review");
    println!("  POST   /api/reviews/{{id}}/view             - Count a view");
    println!("  PUT    /api/reviews/{{id}}                  - Update review");
    println!("  DELETE /api/reviews/{{id}}                  - Delete review with its comments");
    println!("  GET    /api/reviews/{{id}}/comments         - List comments on a review");
    println!("  POST   /api/reviews/{{id}}/comments         - Comment or reply");
    println!("  PUT    /api/comments/{{id}}                 - Edit comment");
    println!("  DELETE /api/comments/{{id}}                 - Delete comment with its replies");
    println!("  GET    /api/users/{{username}}/comments     - Comments by author");
    println!("  GET    /api/users/check?username=          - Username availability");
    println!("  POST   /api/auth/signup | login | social   - Account and session endpoints");

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
