use actix_web::web;

pub mod config;
pub mod form;
pub mod query;

/// Register every route
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(form::index)
        .service(form::submit_form)
        .service(query::query_json)
        .service(query::query_params)
        .service(config::get_langs)
        .service(config::get_categories)
        .service(config::health);
}
