use actix_web::{get, post, web, HttpResponse};

use crate::error::AppError;
use crate::models::{AppState, PunRequest, QueryParams, QueryRequest, QueryResponse};
use crate::services::generator::{generate_puns, render_output};

async fn query_logic(data: &AppState, req: QueryRequest) -> Result<HttpResponse, AppError> {
    let request = PunRequest::try_from(req)?;
    let puns = generate_puns(data, &request).await?;

    Ok(HttpResponse::Ok().json(QueryResponse {
        output: render_output(&puns),
        puns,
    }))
}

#[post("/query")]
pub async fn query_json(
    data: web::Data<AppState>,
    body: web::Json<QueryRequest>,
) -> Result<HttpResponse, AppError> {
    query_logic(&data, body.into_inner()).await
}

#[get("/query")]
pub async fn query_params(
    data: web::Data<AppState>,
    params: web::Query<QueryParams>,
) -> Result<HttpResponse, AppError> {
    query_logic(&data, params.into_inner().into()).await
}

#[cfg(test)]
mod tests {
    use crate::handlers::configure;
    use crate::handlers::tests::test_state;
    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use serde_json::{json, Value};

    #[actix_web::test]
    async fn test_post_query_returns_output() {
        let app = test::init_service(App::new().app_data(test_state()).configure(configure)).await;
        let req = test::TestRequest::post()
            .uri("/query")
            .set_json(json!({"input": "dime", "categories": ["proverbs"]}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        let output = body["output"].as_str().unwrap();
        assert!(output.contains("rhymed phrase: Dime is money"));
        assert_eq!(body["puns"].as_array().unwrap().len(), 2);
        assert_eq!(body["puns"][0]["category"], "proverbs");
        assert_eq!(body["puns"][0]["source"], "Formal Idioms");
    }

    #[actix_web::test]
    async fn test_get_query_with_params() {
        let app = test::init_service(App::new().app_data(test_state()).configure(configure)).await;
        let req = test::TestRequest::get()
            .uri("/query?input=rye&categories=lyrics,phrases&nsfw=true")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        let rhymed: Vec<&str> = body["puns"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|p| p["rhymed_phrase"].as_str())
            .collect();
        assert!(rhymed.contains(&"damn that rye"));
        assert!(rhymed.contains(&"Lucy in the rye with diamonds"));
    }

    #[actix_web::test]
    async fn test_query_rejects_bad_input() {
        let app = test::init_service(App::new().app_data(test_state()).configure(configure)).await;

        let req = test::TestRequest::post()
            .uri("/query")
            .set_json(json!({"input": "rye", "language": "de"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::post()
            .uri("/query")
            .set_json(json!({"input": "   "}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(test::read_body(resp).await, "Query is empty");

        let req = test::TestRequest::post()
            .uri("/query")
            .set_json(json!({"input": "rye", "mode": "sentence"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_query_with_no_rhymes_is_empty() {
        let app = test::init_service(App::new().app_data(test_state()).configure(configure)).await;
        let req = test::TestRequest::post()
            .uri("/query")
            .set_json(json!({"input": "xylophone", "mode": "word"}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["output"], "");
        assert!(body["puns"].as_array().unwrap().is_empty());
    }
}
