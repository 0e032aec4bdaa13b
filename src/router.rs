use crate::handlers::{
    auth::{login, register},
    health::health_check,
    movies::{
        create_movie, create_movie_review, delete_movie, get_movie, get_movie_reviews, get_movies,
        patch_movie, update_movie,
    },
    reviews::{
        create_review, delete_review, get_review, get_reviews, patch_review, update_review,
    },
    search::{get_search_detail, search_movies},
    users::{
        add_favorite, create_user, delete_user, follow_user, get_user, get_users, patch_user,
        remove_favorite, unfollow_user, update_user,
    },
};
use crate::schemas::{ApiDoc, AppState};
use axum::{
    routing::{delete, get, patch, post, put},
    Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Create application router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    let router = Router::new()
        // Health check
        .route("/health", get(health_check))
        // Auth routes
        .route("/api/v1/auth/register", post(register))
        .route("/api/v1/auth/login", post(login))
        // Movie CRUD routes
        .route("/api/v1/movies", post(create_movie))
        .route("/api/v1/movies", get(get_movies))
        .route("/api/v1/movies/:movie_id", get(get_movie))
        .route("/api/v1/movies/:movie_id", put(update_movie))
        .route("/api/v1/movies/:movie_id", patch(patch_movie))
        .route("/api/v1/movies/:movie_id", delete(delete_movie))
        .route("/api/v1/movies/:movie_id/reviews", get(get_movie_reviews))
        .route("/api/v1/movies/:movie_id/reviews", post(create_movie_review))
        // Review CRUD routes
        .route("/api/v1/reviews", post(create_review))
        .route("/api/v1/reviews", get(get_reviews))
        .route("/api/v1/reviews/:review_id", get(get_review))
        .route("/api/v1/reviews/:review_id", put(update_review))
        .route("/api/v1/reviews/:review_id", patch(patch_review))
        .route("/api/v1/reviews/:review_id", delete(delete_review))
        // User CRUD routes
        .route("/api/v1/users", post(create_user))
        .route("/api/v1/users", get(get_users))
        .route("/api/v1/users/:user_id", get(get_user))
        .route("/api/v1/users/:user_id", put(update_user))
        .route("/api/v1/users/:user_id", patch(patch_user))
        .route("/api/v1/users/:user_id", delete(delete_user))
        // Favorite and follow routes
        .route(
            "/api/v1/users/:user_id/favorites/:movie_id",
            post(add_favorite),
        )
        .route(
            "/api/v1/users/:user_id/favorites/:movie_id",
            delete(remove_favorite),
        )
        .route("/api/v1/users/:user_id/follow/:target_id", post(follow_user))
        .route(
            "/api/v1/users/:user_id/follow/:target_id",
            delete(unfollow_user),
        )
        // External metadata proxy
        .route("/api/v1/search", get(search_movies))
        .route("/api/v1/search/:imdb_id", get(get_search_detail));

    // Prometheus metrics install a global recorder, which clashes with the
    // per-test routers the test suite builds; the endpoint exists only in
    // non-test builds.
    #[cfg(not(test))]
    let router = {
        let (prometheus_layer, metric_handle) = axum_prometheus::PrometheusMetricLayer::pair();
        router
            .route("/metrics", get(|| async move { metric_handle.render() }))
            .layer(prometheus_layer)
    };

    router
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Add middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(TimeoutLayer::new(Duration::from_secs(30)))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
