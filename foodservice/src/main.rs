use std::env;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer};
use opentelemetry::global;
use opentelemetry_sdk::propagation::TraceContextPropagator;
use opentelemetry_sdk::runtime::TokioCurrentThread;
use paperclip::actix::{web, OpenApiExt};
use tracing_actix_web::TracingLogger;
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, Registry};

use foodservice::app_config::{config_app, json_config};
use foodservice::places_client::{PlacesClient, DEFAULT_PLACES_API_URL};
use foodservice::recipes_repository::{
    InMemoryRecipeRepository, PostgresRecipeRepository, PostgresRecipeRepositoryConfig,
    RecipeRepository,
};
use foodservice::recommendations_updater::RecommendationsUpdater;
use foodservice::user_sessions::UserSessions;

const DEFAULT_PORT: u16 = 5000;

// Based on https://github.com/LukeMathWalker/tracing-actix-web/blob/main/examples/opentelemetry/src/main.rs#L15
fn init_telemetry() {
    let app_name = "foodservice";

    // Start a new Jaeger trace pipeline.
    // Spans are exported in batch - recommended setup for a production application.
    global::set_text_map_propagator(TraceContextPropagator::new());
    #[allow(deprecated)]
    let tracer = opentelemetry_jaeger::new_agent_pipeline()
        .with_service_name(app_name)
        .install_batch(TokioCurrentThread)
        .expect("Failed to install OpenTelemetry tracer.");

    // Filter based on level - trace, debug, info, warn, error
    // Tunable via `RUST_LOG` env variable
    let env_filter = EnvFilter::try_from_default_env().unwrap_or(EnvFilter::new("info"));
    // Create a `tracing` layer using the Jaeger tracer
    let telemetry = tracing_opentelemetry::layer().with_tracer(tracer);
    // Create a `tracing` layer to emit spans as structured logs to stdout
    let formatting_layer = BunyanFormattingLayer::new(app_name.into(), std::io::stdout);
    // Combined them all together in a `tracing` subscriber
    let subscriber = Registry::default()
        .with(env_filter)
        .with(telemetry)
        .with(JsonStorageLayer)
        .with(formatting_layer);
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to install `tracing` subscriber.")
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    init_telemetry();

    let port: u16 = env::var("PORT")
        .ok()
        .filter(|value| !value.is_empty())
        .and_then(|value| value.parse().ok())
        .unwrap_or(DEFAULT_PORT);
    let use_in_memory_db = env::var("USE_IN_MEMORY_DB")
        .map(|value| value.to_lowercase() == "true")
        .unwrap_or_default();
    let pg_hostname = env::var("DB_HOST").unwrap_or("127.0.0.1".to_string());
    let pg_username = env::var("DB_USERNAME").unwrap_or("postgres".to_string());
    let pg_password = env::var("DB_PASSWORD").unwrap_or("postgres".to_string());
    let places_api_url =
        env::var("GOOGLE_MAPS_API_URL").unwrap_or(DEFAULT_PLACES_API_URL.to_string());
    let places_api_key = env::var("GOOGLE_MAPS_API_KEY").unwrap_or_default();

    let recipes_repository: Arc<dyn RecipeRepository + Send + Sync> = if use_in_memory_db {
        Arc::new(InMemoryRecipeRepository::default())
    } else {
        Arc::new(
            PostgresRecipeRepository::init(PostgresRecipeRepositoryConfig {
                hostname: pg_hostname,
                username: pg_username,
                password: pg_password,
            })
            .await
            .expect("Failed to init postgres"),
        )
    };

    let places_client = Arc::new(
        PlacesClient::new(&places_api_url, &places_api_key)
            .expect("Failed to build places client"),
    );
    let sessions = UserSessions::default();

    let recommendations_updater = RecommendationsUpdater::new(recipes_repository.clone());
    let recommendations_provider = recommendations_updater.provider();
    if let Err(err) = recommendations_updater.refresh_once().await {
        tracing::warn!("Initial recommendation index build failed: {}", err);
    }
    tokio::spawn(async move {
        if let Err(err) = recommendations_updater.start().await {
            tracing::error!("Recommendations updater stopped: {}", err);
        }
    });

    let server = HttpServer::new(move || {
        App::new()
            .wrap_api()
            .app_data(web::Data::new(recipes_repository.clone()))
            .app_data(web::Data::new(sessions.clone()))
            .app_data(web::Data::new(recommendations_provider.clone()))
            .app_data(web::Data::new(places_client.clone()))
            .app_data(json_config())
            .wrap(TracingLogger::default())
            .wrap(Cors::permissive())
            .configure(config_app)
            .with_json_spec_at("/apispec/v2")
            .build()
    })
    .bind(("0.0.0.0", port))?;

    println!("MCP Server running on port {}", port);

    server.run().await
}
