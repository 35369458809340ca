use std::sync::Arc;
use axum::extract::{Form, Path, State};
use axum::response::Redirect;
use serde::Deserialize;

use crate::AppState;


#[derive(Debug, Deserialize)]
pub struct QueryForm {
    #[serde(default)]
    q: String,
}

#[axum_macros::debug_handler]
pub async fn post_query(State(state): State<Arc<AppState>>, Form(form): Form<QueryForm>) -> Redirect {
    state.finder.set_query(form.q);
    Redirect::to("/")
}

#[axum_macros::debug_handler]
pub async fn post_suggestion(State(state): State<Arc<AppState>>, Path(login): Path<String>) -> Redirect {
    state.finder.select_suggestion(&login);
    Redirect::to("/")
}

/// Searches for the submitted text, or the current query when the request
/// carries no form.
#[axum_macros::debug_handler]
pub async fn post_search(State(state): State<Arc<AppState>>, form: Option<Form<QueryForm>>) -> Redirect {
    if let Some(Form(form)) = form {
        state.finder.set_query(form.q);
    }
    state.finder.search().await;
    Redirect::to("/")
}

#[axum_macros::debug_handler]
pub async fn post_random(State(state): State<Arc<AppState>>) -> Redirect {
    state.finder.random().await;
    Redirect::to("/")
}

#[axum_macros::debug_handler]
pub async fn post_reset(State(state): State<Arc<AppState>>) -> Redirect {
    state.finder.reset();
    Redirect::to("/")
}

/// Sends the browser to the loaded profile on GitHub and resets the widget.
#[axum_macros::debug_handler]
pub async fn get_open(State(state): State<Arc<AppState>>) -> Redirect {
    match state.finder.open_profile() {
        Some(url) => Redirect::to(&url),
        None => Redirect::to("/"),
    }
}
