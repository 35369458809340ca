pub mod actions;
pub mod index;

use axum::http::StatusCode;
use axum::response::Html;
use handlebars::{Handlebars, RenderError};
use serde::{Serialize};



#[derive(Debug, Serialize)]
pub struct TemplateViewModel {
    pub title: String,
    pub body: String,
}

/// Renders `name` with `data` inside the page layout.
pub fn render_page<T: Serialize>(
    registry: &Handlebars<'_>,
    title: &str,
    name: &str,
    data: &T,
) -> Result<Html<String>, RenderError> {
    let page = TemplateViewModel {
        title: title.into(),
        body: registry.render(name, data)?,
    };

    Ok(Html(registry.render("template", &page)?))
}

pub fn get_error_page(registry: &Handlebars<'_>, status: StatusCode) -> (StatusCode, Html<String>) {
    let name = format!("errors/{}", status.as_u16());
    let title = status.canonical_reason().unwrap_or("Error");

    match render_page(registry, title, &name, &serde_json::json!({})) {
        Ok(html) => (status, html),
        Err(err) => {
            log::error!("Failed to render {}: {}", name, err);
            (status, Html(format!("<h1>{} {}</h1>", status.as_u16(), title)))
        }
    }
}
