//! HTTP surface of the survey API.

pub mod responses;

use actix_web::web;

/// Registers every route. Unknown paths, and unknown methods on known paths,
/// answer `404 {"status":"Not Found"}`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/up")
            .route(web::get().to(responses::up))
            .default_service(web::to(responses::not_found)),
    )
    .service(
        web::resource("/responses")
            .route(web::post().to(responses::add_response))
            .default_service(web::to(responses::not_found)),
    )
    .service(
        web::resource("/responses/{id}")
            .route(web::get().to(responses::get_response))
            .default_service(web::to(responses::not_found)),
    )
    .service(
        web::resource("/stats")
            .route(web::get().to(responses::get_stats))
            .default_service(web::to(responses::not_found)),
    )
    .default_service(web::to(responses::not_found));
}
