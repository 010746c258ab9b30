// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::time::Duration;

use axum::Router;
use axum::http::HeaderName;
use axum::http::StatusCode;
use axum::http::header::CACHE_CONTROL;
use axum::http::header::CONTENT_TYPE;
use axum::response::Html;
use axum::routing::get;
use axum::routing::post;
use tokio::net::TcpListener;
use tokio::net::TcpStream;
use tokio::signal::ctrl_c;
use tokio::time::sleep;

use crate::cmd::serve::api::categories_handler;
use crate::cmd::serve::api::clear_cache_handler;
use crate::cmd::serve::api::deck_handler;
use crate::cmd::serve::api::due_handler;
use crate::cmd::serve::api::metrics_handler;
use crate::cmd::serve::api::next_handler;
use crate::cmd::serve::api::preview_handler;
use crate::cmd::serve::api::progress_handler;
use crate::cmd::serve::api::rating_handler;
use crate::cmd::serve::api::weekly_handler;
use crate::cmd::serve::get::get_handler;
use crate::cmd::serve::post::post_handler;
use crate::cmd::serve::state::ServerState;
use crate::collection::Collection;
use crate::error::Fallible;
use crate::types::timestamp::Timestamp;

pub async fn start_server(directory: Option<String>, port: Option<u16>) -> Fallible<()> {
    let coll = Collection::new(directory)?;
    let port = port.unwrap_or(coll.config.port);
    let open_browser = coll.config.open_browser;
    let state = ServerState::new(&coll, Timestamp::now())?;
    let app = router(state);
    let bind = format!("127.0.0.1:{port}");

    if open_browser {
        // Start a separate task to open the browser once the server is up.
        let url = format!("http://{bind}/");
        let probe = bind.clone();
        tokio::spawn(async move {
            loop {
                if let Ok(stream) = TcpStream::connect(probe.as_str()).await {
                    drop(stream);
                    break;
                }
                sleep(Duration::from_millis(1)).await;
            }
            if let Err(e) = open::that(&url) {
                log::warn!("Failed to open {url}: {e}");
            }
        });
    }

    log::debug!("Starting server on {bind}");
    let listener = TcpListener::bind(bind.as_str()).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    log::debug!("Server stopped.");
    Ok(())
}

pub fn router(state: ServerState) -> Router {
    let app = Router::new();
    let app = app.route("/", get(get_handler));
    let app = app.route("/", post(post_handler));
    let app = app.route("/style.css", get(stylesheet));
    let app = app.route("/api/deck", get(deck_handler));
    let app = app.route("/api/due", get(due_handler));
    let app = app.route("/api/next", get(next_handler));
    let app = app.route("/api/metrics", get(metrics_handler));
    let app = app.route("/api/weekly", get(weekly_handler));
    let app = app.route("/api/categories", get(categories_handler));
    let app = app.route("/api/progress", get(progress_handler));
    let app = app.route("/api/cache/clear", post(clear_cache_handler));
    let app = app.route("/api/cards/{id}/preview", get(preview_handler));
    let app = app.route("/api/cards/{id}/rating", post(rating_handler));
    let app = app.fallback(not_found_handler);
    app.with_state(state)
}

async fn shutdown_signal() {
    if let Err(e) = ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
}

async fn stylesheet() -> (StatusCode, [(HeaderName, &'static str); 2], &'static [u8]) {
    let bytes = include_bytes!("style.css");
    (
        StatusCode::OK,
        [
            (CONTENT_TYPE, "text/css"),
            (CACHE_CONTROL, "public, max-age=604800, immutable"),
        ],
        bytes,
    )
}

async fn not_found_handler() -> (StatusCode, Html<String>) {
    (StatusCode::NOT_FOUND, Html("Not Found".to_string()))
}
