use actix_web::http::StatusCode;
use actix_web::{error, web, App, HttpServer};

use super::handlers::{self, ErrorBody};
use super::AppState;

/// Register payment routes, plus `/metrics` and `/health`
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        let response = ErrorBody::response(StatusCode::BAD_REQUEST, err.to_string());
        error::InternalError::from_response(err, response).into()
    }))
    .app_data(web::PathConfig::default().error_handler(|err, _req| {
        let response = ErrorBody::response(StatusCode::BAD_REQUEST, err.to_string());
        error::InternalError::from_response(err, response).into()
    }))
    .service(
        web::scope("/payments")
            .route("", web::post().to(handlers::create_payment))
            .route("/{id}/link", web::post().to(handlers::generate_link))
            .route("/{id}/history", web::get().to(handlers::get_history)),
    )
    .route("/webhook", web::post().to(handlers::webhook))
    .route("/metrics", web::get().to(handlers::metrics_handler))
    .route("/health", web::get().to(handlers::health_handler));
}

/// Start the payment API server
pub async fn start_server(state: AppState, host: &str, port: u16) -> std::io::Result<()> {
    tracing::info!("Starting payment API on http://{}:{}", host, port);
    tracing::info!("Metrics available on http://{}:{}/metrics", host, port);

    let state = web::Data::new(state);

    HttpServer::new(move || App::new().app_data(state.clone()).configure(configure))
        .bind((host, port))?
        .run()
        .await
}
