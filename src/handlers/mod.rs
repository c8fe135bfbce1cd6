pub mod health_handlers;
pub mod url_handlers;
