use actix_web::{get, web, HttpResponse, Responder};

use crate::models::{AppState, Category, CategoryInfo, LangInfo};

#[get("/langs")]
pub async fn get_langs(data: web::Data<AppState>) -> impl Responder {
    let mut langs: Vec<LangInfo> = data
        .corpora
        .values()
        .map(|corpus| LangInfo {
            name: corpus.language.name().to_string(),
            code: corpus.language.code().to_string(),
            words: corpus.words.len(),
            phrases: corpus.phrases.len(),
        })
        .collect();
    langs.sort_by(|a, b| a.code.cmp(&b.code));

    HttpResponse::Ok().json(langs)
}

#[get("/categories")]
pub async fn get_categories() -> impl Responder {
    let categories: Vec<CategoryInfo> = Category::ALL
        .iter()
        .map(|c| CategoryInfo {
            name: c.name(),
            label: c.label(),
        })
        .collect();

    HttpResponse::Ok().json(categories)
}

#[get("/health")]
pub async fn health() -> impl Responder {
    HttpResponse::Ok().body("OK")
}
