pub mod auth;
pub mod error;
pub mod routes;
pub mod state;

use axum::routing::{delete, get, post, put};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};

use state::AppState;

/// Build the axum Router with all API routes and middleware.
/// Used by `serve()` and available for integration testing.
pub fn build_router(app_state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Auth
        .route("/api/auth/signup", post(routes::auth::signup))
        .route("/api/auth/login", post(routes::auth::login))
        .route("/api/auth/logout", post(routes::auth::logout))
        .route("/api/auth/me", get(routes::auth::me))
        .route("/api/auth/profile", put(routes::auth::update_profile))
        .route("/api/auth/password", post(routes::auth::change_password))
        .route("/api/auth/reset/request", post(routes::auth::reset_request))
        .route("/api/auth/reset/confirm", post(routes::auth::reset_confirm))
        // Users
        .route("/api/users", get(routes::auth::list_users))
        // Suppliers
        .route("/api/suppliers", get(routes::suppliers::list_suppliers))
        .route("/api/suppliers", post(routes::suppliers::create_supplier))
        .route(
            "/api/suppliers/{id}",
            put(routes::suppliers::update_supplier),
        )
        .route(
            "/api/suppliers/{id}",
            delete(routes::suppliers::delete_supplier),
        )
        // Deals
        .route("/api/deals", get(routes::deals::list_deals))
        .route("/api/deals", post(routes::deals::create_deal))
        .route("/api/deals/{id}", get(routes::deals::get_deal))
        .route("/api/deals/{id}", put(routes::deals::update_deal))
        .route("/api/deals/{id}", delete(routes::deals::delete_deal))
        .route(
            "/api/deals/{id}/transition",
            post(routes::deals::transition_deal),
        )
        // Packs
        .route("/api/deals/{id}/pack", get(routes::packs::get_pack))
        .route(
            "/api/deals/{id}/pack/generate",
            post(routes::packs::generate_pack),
        )
        // Meeting notes
        .route("/api/deals/{id}/notes", get(routes::notes::get_notes))
        .route("/api/deals/{id}/notes", put(routes::notes::put_notes))
        // Stakeholder comments
        .route(
            "/api/deals/{id}/comments",
            get(routes::comments::list_comments),
        )
        .route(
            "/api/deals/{id}/comments",
            post(routes::comments::add_comment),
        )
        .route(
            "/api/deals/{id}/comments/events",
            get(routes::comments::comment_events),
        )
        .layer(cors)
        .with_state(app_state)
}

/// Start the API server on `bind:port`.
pub async fn serve(app_state: AppState, bind: &str, port: u16) -> anyhow::Result<()> {
    let app = build_router(app_state);

    let addr = format!("{bind}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("NegoPack API listening on http://{addr}");

    axum::serve(listener, app).await?;
    Ok(())
}
