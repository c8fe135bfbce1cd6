mod db;
mod errors;
mod handlers;
mod models;
mod routes;
mod services;
mod state;
mod structs;
mod utils;

use std::env;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer, http, middleware::Logger, web};
use dotenv::dotenv;
use env_logger::Env;

use crate::db::Datastore;
use crate::db::memory::MemoryStore;
use crate::db::mongodb::{MongoStore, get_database};
use crate::routes::routes::init_routes;
use crate::state::app_state::AppState;
use crate::utils::log_sink::{EventLog, StdLogSink};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    let port_string = env::var("PORT").unwrap_or_else(|_| String::from("8080"));
    let port = port_string.parse::<u16>().expect("PORT must be a number");
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let base_url = env::var("HOST").unwrap_or_else(|_| String::from("http://localhost:8080"));

    // DATASTORE=memory runs without MongoDB (ephemeral, single process).
    let store: Arc<dyn Datastore> = match env::var("DATASTORE").as_deref() {
        Ok("memory") => Arc::new(MemoryStore::new()),
        _ => {
            let db = match get_database().await {
                Ok(db) => db,
                Err(e) => {
                    eprintln!("Error connecting to the database: {}", e);
                    std::process::exit(1);
                }
            };
            let store = MongoStore::new(db);
            if let Err(e) = store.init_indexes().await {
                eprintln!("Error creating indexes: {}", e);
                std::process::exit(1);
            }
            Arc::new(store)
        }
    };

    let events = EventLog::new(Arc::new(StdLogSink));

    // Create shared state
    let app_state = web::Data::new(AppState::new(store, events, base_url));

    // Start the Actix Web server
    HttpServer::new(move || {
        let logger = Logger::new("%a \"%r\" %s %b \"%{Referer}i\" \"%{User-Agent}i\" %D ms");
        let cors = Cors::default()
            .allowed_origin("http://localhost:5173")
            .allowed_origin("http://localhost:4173")
            .allowed_methods(vec!["GET", "POST"])
            .allowed_headers(vec![http::header::AUTHORIZATION, http::header::ACCEPT])
            .allowed_header(http::header::CONTENT_TYPE)
            .max_age(3600);
        App::new()
            .wrap(logger)
            .wrap(cors)
            .app_data(app_state.clone())
            .configure(init_routes)
    })
    .bind(("127.0.0.1", port))?
    .run()
    .await
}
