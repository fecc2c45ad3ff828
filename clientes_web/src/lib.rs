pub mod error;
pub mod handlers;
pub mod method_override;

use std::sync::Arc;

use axum::{
    http::{header, HeaderName, Method},
    middleware,
    routing::{get, post},
    Router,
};
use clientes::domain::customer::CustomerRepository;
use tower::Layer;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::handlers::{
    create_customer, delete_customer, get_customer, list_customers, update_customer,
};

#[derive(Clone)]
pub struct AppState {
    pub repository: Arc<dyn CustomerRepository>,
}

impl AppState {
    pub fn new<R: CustomerRepository + 'static>(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }
}

fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::ORIGIN,
            HeaderName::from_static("x-requested-with"),
            header::CONTENT_TYPE,
            header::ACCEPT,
            header::AUTHORIZATION,
        ])
}

/// Builds the gateway: customer routes behind method override, CORS and request tracing.
pub fn app(state: AppState) -> Router {
    let routes = Router::new()
        .route("/", get(list_customers))
        .route("/clientes", post(create_customer))
        .route("/clientes/", post(create_customer))
        .route(
            "/clientes/:id",
            get(get_customer)
                .put(update_customer)
                .delete(delete_customer),
        )
        .with_state(state);

    // Must wrap the router: the rewritten method has to be seen by routing.
    let routes = middleware::from_fn(method_override::method_override).layer(routes);

    Router::new()
        .fallback_service(routes)
        .layer(cors())
        .layer(TraceLayer::new_for_http())
}
