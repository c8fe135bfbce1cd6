use actix_web::web;

use crate::handlers::health_handlers::health_check;
use crate::handlers::url_handlers::{
    create_short_url, get_all_urls, get_url_statistics, redirect_to_url,
};

/// Configure the routes
pub fn init_routes(cfg: &mut web::ServiceConfig) {
    // Redirects live at the root level
    cfg.route("/r/{code}", web::get().to(redirect_to_url));
    cfg.service(
        web::scope("/api")
            .route("/shorten", web::post().to(create_short_url))
            .route("/urls", web::get().to(get_all_urls))
            .route("/analytics/{code}", web::get().to(get_url_statistics))
            .route("/health/check", web::get().to(health_check)),
    );
}
