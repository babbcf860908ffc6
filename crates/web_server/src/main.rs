//! Main entry point for the campgrounds backend server.
//! This crate wires the campground routes to the database pool and the
//! external geocoding and media store clients, and serves the frontend.

use actix_files::Files;
use actix_web::{App, HttpResponse, HttpServer, middleware::Logger, web};
use std::path::Path;

use auth_services::AuthMiddleware;
use campgrounds::ReadFailurePolicy;
use geocoder::GeocoderClient;
use media_store::MediaStoreClient;
use postgres::database::{create_connection_pool, ensure_schema, test_connection};
use web_handlers::handlers::*;

fn get_frontend_path() -> &'static str {
    // Check multiple possible locations for frontend files
    if Path::new("./frontend-build").exists() {
        log::info!("✅ Using Docker frontend path: ./frontend-build");
        "./frontend-build"
    } else if Path::new("../frontend/build").exists() {
        log::info!("✅ Using local frontend path: ../frontend/build");
        "../frontend/build"
    } else {
        log::info!("❌ Frontend files not found in either location");
        "./frontend-build" // fallback
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    log::info!("🚀 Starting campgrounds server...");

    // Create database connection pool
    let pool = match create_connection_pool().await {
        Ok(pool) => {
            log::info!("🗃️ Database pool created successfully");

            if let Err(e) = test_connection(&pool).await {
                log::error!("❌ Database connection test failed: {}", e);
            }
            pool
        }
        Err(e) => {
            log::error!("❌ Failed to create database pool: {}", e);
            log::error!("💡 Make sure PostgreSQL is running and DATABASE_URL is set");
            std::process::exit(1);
        }
    };

    if let Err(e) = ensure_schema(&pool).await {
        log::error!("❌ Failed to create campground schema: {}", e);
        std::process::exit(1);
    }

    let geocoder_client = match GeocoderClient::from_env() {
        Ok(client) => web::Data::new(client),
        Err(e) => {
            log::error!("❌ Failed to configure geocoder: {}", e);
            std::process::exit(1);
        }
    };

    let media_client = match MediaStoreClient::from_env() {
        Ok(client) => web::Data::new(client),
        Err(e) => {
            log::error!("❌ Failed to configure media store: {}", e);
            std::process::exit(1);
        }
    };

    let read_failure_policy = ReadFailurePolicy::from_env();
    log::info!("📖 Repository read failures: {:?}", read_failure_policy);

    let frontend_path = get_frontend_path();
    let bind_addr =
        std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    log::info!("📁 Frontend files location: {}", frontend_path);
    log::info!("🌐 Server will be available at: http://{}", bind_addr);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .app_data(geocoder_client.clone())
            .app_data(media_client.clone())
            .app_data(web::Data::new(read_failure_policy))
            .wrap(Logger::default())
            .service(
                web::scope("/api/campgrounds")
                    // Authenticated-only resources come first so "/new"
                    // never falls into the "/{id}" matcher.
                    .service(
                        web::resource("/new")
                            .route(web::get().to(new_campground_form))
                            .wrap(AuthMiddleware),
                    )
                    .service(
                        web::resource("/{id}/edit")
                            .route(web::get().to(edit_campground_form))
                            .wrap(AuthMiddleware),
                    )
                    // Mixed-auth resources; the write methods establish the
                    // caller through the CurrentUser extractor.
                    .service(
                        web::resource("")
                            .route(web::get().to(list_campgrounds))
                            .route(web::post().to(create_campground)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(show_campground))
                            .route(web::put().to(update_campground))
                            .route(web::delete().to(delete_campground)),
                    ),
            )
            .route(
                "/health",
                web::get().to(|| async { HttpResponse::Ok().body("OK") }),
            )
            .service(Files::new("/", frontend_path).index_file("index.html"))
    })
    .bind(bind_addr)?
    .run()
    .await
}
