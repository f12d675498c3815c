use actix_web::HttpResponse;
use paperclip::actix::web;
use serde_json::json;

use crate::handlers;

pub fn config_app(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/health").route(web::get().to(handlers::health)))
        .service(web::resource("/mcp").route(web::get().to(handlers::mcp_manifest)))
        .service(web::resource("/validate").route(web::get().to(handlers::validate)))
        .service(
            web::scope("/api")
                .service(
                    web::resource("/recipes").route(web::get().to(handlers::get_all_recipes)),
                )
                .service(
                    web::scope("/recipe")
                        .service(
                            web::resource("")
                                .route(web::get().to(handlers::ask_recipe))
                                .route(web::post().to(handlers::add_recipe)),
                        )
                        .service(
                            web::resource("/{recipe_id}")
                                .route(web::get().to(handlers::get_recipe))
                                .route(web::patch().to(handlers::update_recipe)),
                        ),
                )
                .service(web::resource("/locality").route(web::get().to(handlers::locality)))
                .service(web::resource("/recommend").route(web::get().to(handlers::recommend))),
        );
}

/// Body parsing config shared by the server and the handler tests: any
/// malformed JSON body answers 400 with a uniform error shape before a
/// handler runs.
pub fn json_config() -> actix_web::web::JsonConfig {
    actix_web::web::JsonConfig::default().error_handler(|err, _req| {
        let message = err.to_string();
        actix_web::error::InternalError::from_response(
            err,
            HttpResponse::BadRequest().json(json!({ "error": message })),
        )
        .into()
    })
}
