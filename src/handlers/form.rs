use actix_web::http::header::ContentType;
use actix_web::{get, post, web, HttpResponse};
use log::{debug, warn};

use crate::error::AppError;
use crate::form::{FormFields, FormView};
use crate::models::{AppState, ServerResponse};
use crate::services::generator::{generate_puns, render_output};

fn html(body: String) -> HttpResponse {
    HttpResponse::Ok().content_type(ContentType::html()).body(body)
}

/// Empty form; no generation happens until the form is submitted.
#[get("/")]
pub async fn index() -> Result<HttpResponse, AppError> {
    Ok(html(FormView::default().render()?))
}

#[post("/")]
pub async fn submit_form(
    data: web::Data<AppState>,
    form: web::Form<FormFields>,
) -> Result<HttpResponse, AppError> {
    let mut view = FormView::default();
    for change in form.into_inner().changes() {
        view.on_field_change(change);
    }

    debug!("Submitting form: {:?}", view.state());
    let request = view.submit()?;
    match generate_puns(&data, &request).await {
        Ok(puns) => view.complete(ServerResponse {
            output: render_output(&puns),
        }),
        Err(e) => {
            warn!("Form submission for '{}' failed: {}", request.input, e);
            view.fail(e);
        }
    }

    debug!("Form is {:?} with {} bytes of output", view.phase(), view.output().len());
    Ok(html(view.render()?))
}
