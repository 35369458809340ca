use std::{sync::{Arc}, net::{SocketAddr, IpAddr, Ipv4Addr}, str::FromStr, time::Duration};
use clap::Parser;
use axum::{routing::{get, post}, Router};
use axum::http::{Response, StatusCode};
use axum::body::{boxed, Body};
use handlebars::{Handlebars, TemplateError};
use tower::{ServiceBuilder, ServiceExt};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use reqwest::Client;

pub mod models;
pub mod controllers;
pub mod services;
pub mod validators;

#[cfg(test)]
mod test_support;

use controllers::{actions, index};
use services::github_user_service::{GitHubUserService, DEFAULT_API_URL};
use services::user_finder::UserFinder;


// Command line interface
#[derive(Parser, Debug)]
#[clap(name="github-user-finder", about="Find GitHub users from your browser!")]
struct Opt {
    #[clap(short = 'l', long = "log", default_value = "debug")]
    log_level: String,

    #[clap(short = 'a', long = "addr", default_value = "::1")]
    addr: String,

    #[clap(short = 'p', long = "port", default_value = "8080")]
    port: u16,

    #[clap(long = "static_dir", default_value = "static")]
    static_dir: String,

    #[clap(long = "api-url", default_value = DEFAULT_API_URL)]
    api_url: String,

    #[clap(long = "debounce-ms", default_value = "300")]
    debounce_ms: u64,
}

pub struct AppState {
    registry: Handlebars<'static>,
    finder: UserFinder,
}

fn templates() -> Result<Handlebars<'static>, TemplateError> {
    let mut handlebars = Handlebars::new();
    handlebars.set_strict_mode(true);
    handlebars.register_template_string("template", include_str!("templates/template.hbs"))?;
    handlebars.register_template_string("index", include_str!("templates/index.hbs"))?;
    handlebars.register_template_string("errors/500", include_str!("templates/errors/500.hbs"))?;
    Ok(handlebars)
}

fn router(app_state: Arc<AppState>, static_dir: String) -> Router {
    Router::new()
        .route("/", get(index::get_index))
        .route("/state", get(index::get_state))
        .route("/query", post(actions::post_query))
        .route("/suggestions/:login", post(actions::post_suggestion))
        .route("/search", post(actions::post_search))
        .route("/random", post(actions::post_random))
        .route("/reset", post(actions::post_reset))
        .route("/open", get(actions::get_open))
        .fallback_service(get(|req| async move {
            match ServeDir::new(static_dir).oneshot(req).await {
                Ok(res) => res.map(boxed),
                Err(err) => Response::builder()
                    .status(StatusCode::INTERNAL_SERVER_ERROR)
                    .body(boxed(Body::from(format!("error: {err}"))))
                    .expect("error response"),
            }
        }))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(app_state)
}

#[tokio::main]
async fn main() {
    // Fetch console arguments
    let opt = Opt::parse();
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", format!("{},hyper=info,mio=info", opt.log_level));
    }
    // Enable console logging
    tracing_subscriber::fmt::init();

    // Register templates
    let registry = templates().unwrap_or_else(|err| {
        log::error!("Failed to register templates: {}", err);
        std::process::exit(1);
    });

    // Setup the finder against the GitHub API
    let github_user_service = GitHubUserService::new(Client::new(), &opt.api_url);
    let finder = UserFinder::new(github_user_service, Duration::from_millis(opt.debounce_ms));

    // Setup controller routes and inject app state
    let app_state = Arc::new(AppState {
        registry,
        finder,
    });
    let app = router(app_state, opt.static_dir);

    let sock_addr = SocketAddr::from((
        IpAddr::from_str(opt.addr.as_str()).unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST)),
        opt.port
    ));
    log::info!("Now listening on http://{}", sock_addr);

    if let Err(err) = axum::Server::bind(&sock_addr)
        .serve(app.into_make_service())
        .await
    {
        log::error!("Server stopped: {}", err);
    }
}
