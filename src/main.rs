use std::process::exit;
use std::sync::Arc;

use actix_identity::IdentityMiddleware;
use actix_session::SessionMiddleware;
use actix_session::storage::CookieSessionStore;
use actix_web::cookie::Key;
use actix_web::middleware::Logger;
use actix_web::{App, HttpServer, web};

use buildstock::auth::{HttpIdentityProvider, IdentityProvider};
use buildstock::db::establish_connection_pool;
use buildstock::extraction::firecrawl::FirecrawlClient;
use buildstock::extraction::{ExtractionClient, FallbackMode};
use buildstock::models::config::ServerConfig;
use buildstock::repository::DieselRepository;
use buildstock::routes::auth::{login, logout};
use buildstock::routes::materials::{
    api_v1_browse_materials, api_v1_get_material, api_v1_list_saved_searches,
    api_v1_material_categories, api_v1_material_vendors, api_v1_save_search,
    api_v1_search_materials,
};
use buildstock::routes::sync::{
    api_v1_cancel_sync, api_v1_latest_sync, api_v1_sync_status, api_v1_trigger_sync,
};
use buildstock::services::sync::SyncRegistry;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let config = match ServerConfig::load() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Failed to load configuration: {e}");
            exit(1);
        }
    };

    // Key::derive_from needs enough entropy to stretch into a session key.
    if config.secret.len() < 64 {
        log::error!("BUILDSTOCK__SECRET must be at least 64 characters");
        exit(1);
    }

    let pool = match establish_connection_pool(&config.database_url) {
        Ok(pool) => pool,
        Err(e) => {
            log::error!("Failed to create database pool: {e}");
            exit(1);
        }
    };
    let repo = DieselRepository::new(pool);

    let fallback = if config.sync.synthetic_fallback {
        FallbackMode::Synthetic
    } else {
        FallbackMode::None
    };
    let extraction: Arc<dyn ExtractionClient> =
        match FirecrawlClient::from_config(&config.extraction, fallback) {
            Ok(client) => Arc::new(client),
            Err(e) => {
                log::error!("Failed to build extraction client: {e}");
                exit(1);
            }
        };

    let identity: Arc<dyn IdentityProvider> =
        match HttpIdentityProvider::new(&config.auth_service_url) {
            Ok(provider) => Arc::new(provider),
            Err(e) => {
                log::error!("Failed to build identity provider: {e}");
                exit(1);
            }
        };

    let registry = SyncRegistry::default();
    let secret_key = Key::derive_from(config.secret.as_bytes());
    let bind_address = config.bind_address.clone();

    log::info!("Starting BuildStock server at {bind_address}");

    HttpServer::new(move || {
        App::new()
            .wrap(IdentityMiddleware::default())
            .wrap(SessionMiddleware::new(
                CookieSessionStore::default(),
                secret_key.clone(),
            ))
            .wrap(Logger::default())
            .app_data(web::Data::new(repo.clone()))
            .app_data(web::Data::from(extraction.clone()))
            .app_data(web::Data::from(identity.clone()))
            .app_data(web::Data::new(registry.clone()))
            .app_data(web::Data::new(config.clone()))
            .service(login)
            .service(logout)
            .service(
                web::scope("/api")
                    .service(api_v1_search_materials)
                    .service(api_v1_material_categories)
                    .service(api_v1_material_vendors)
                    .service(api_v1_browse_materials)
                    .service(api_v1_get_material)
                    .service(api_v1_list_saved_searches)
                    .service(api_v1_save_search)
                    .service(api_v1_latest_sync)
                    .service(api_v1_sync_status)
                    .service(api_v1_trigger_sync)
                    .service(api_v1_cancel_sync),
            )
    })
    .bind(&bind_address)?
    .run()
    .await
}
