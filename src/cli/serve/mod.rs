//! Article server with live updates.
//!
//! ```text
//! tiny_http ──► rayon pool ──► Route ──► Delivery (store snapshots)
//! Coordinator (tokio thread) ──► watcher / store actor / WebSocket actor
//! ```

mod lifecycle;
mod response;
mod route;

use crate::{
    article::{ArticleError, ArticleStore},
    config::FolioConfig,
    delivery::{Delivery, DeliveryOptions},
    log,
};
use anyhow::Result;
use crossbeam::channel;
use route::Route;
use std::sync::Arc;
use std::sync::atomic::{AtomicU16, Ordering};
use tiny_http::{Method, Request, Server};

/// Requests handled concurrently
const REQUEST_THREADS: usize = 4;

/// Actual WebSocket port (may differ from `serve.ws_port` if it was in use).
/// Updated by the coordinator after the listener binds.
static ACTUAL_WS_PORT: AtomicU16 = AtomicU16::new(0);

/// Update the actual WebSocket port (called by coordinator after binding)
pub fn set_actual_ws_port(port: u16) {
    ACTUAL_WS_PORT.store(port, Ordering::Relaxed);
}

/// Get the actual WebSocket port, if the listener is up
fn get_actual_ws_port() -> Option<u16> {
    match ACTUAL_WS_PORT.load(Ordering::Relaxed) {
        0 => None,
        port => Some(port),
    }
}

/// Load articles, bind the server and run until Ctrl+C.
pub fn serve(config: FolioConfig) -> Result<()> {
    let config = Arc::new(config);

    let store = Arc::new(ArticleStore::new(config.store_options()));
    let report = store.load_all()?;
    log!(
        "serve";
        "{} article(s) from {}",
        report.loaded,
        config.content_dir().display()
    );

    let delivery = Arc::new(Delivery::new(
        store,
        DeliveryOptions {
            site_title: config.site.title.clone(),
            live_reload: config.serve.watch,
        },
    ));

    let (server, addr) = lifecycle::bind_with_retry(config.serve.interface, config.serve.port)?;
    let server = Arc::new(server);

    let (shutdown_tx, shutdown_rx) = channel::unbounded::<()>();
    lifecycle::register_server_for_shutdown(Arc::clone(&server), shutdown_tx);

    log!("serve"; "http://{}", addr);

    let actor_handle =
        lifecycle::spawn_actors(Arc::clone(&config), Arc::clone(&delivery), shutdown_rx);
    run_request_loop(&server, &delivery)?;
    lifecycle::wait_for_shutdown(actor_handle);
    Ok(())
}

fn run_request_loop(server: &Server, delivery: &Arc<Delivery>) -> Result<()> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(REQUEST_THREADS)
        .build()?;

    for request in server.incoming_requests() {
        let delivery = Arc::clone(delivery);
        pool.spawn(move || {
            if let Err(e) = handle_request(request, &delivery) {
                log!("serve"; "request error: {e}");
            }
        });
    }
    Ok(())
}

/// Handle a single HTTP request
fn handle_request(request: Request, delivery: &Delivery) -> Result<()> {
    if crate::core::is_shutdown() {
        return response::respond_unavailable(request);
    }
    if !matches!(request.method(), Method::Get | Method::Head) {
        return response::respond_method_not_allowed(request);
    }

    let ws_port = get_actual_ws_port().filter(|_| delivery.options().live_reload);
    crate::debug!("serve"; "{} {}", request.method(), request.url());

    match Route::parse(request.url(), ws_port.is_some()) {
        Route::Index => response::respond_html(request, delivery.index_page()),
        Route::ApiIndex => match delivery.index_json() {
            Ok(json) => response::respond_json(request, json),
            Err(e) => response::respond_error(request, &e),
        },
        Route::Article(slug) => match delivery.render(&slug) {
            Ok(page) => response::respond_html(request, page.document),
            Err(e) => respond_article_error(request, &e),
        },
        Route::ApiArticle(slug) => match delivery.fetch(&slug) {
            Ok(json) => response::respond_json(request, json),
            Err(e) => respond_article_error(request, &e),
        },
        Route::Livereload => match ws_port {
            Some(port) => response::respond_livereload_js(request, port),
            None => response::respond_not_found(request),
        },
        Route::NotFound => response::respond_not_found(request),
    }
}

fn respond_article_error(request: Request, error: &ArticleError) -> Result<()> {
    if error.is_not_found() {
        response::respond_not_found(request)
    } else {
        log!("error"; "{}", error);
        response::respond_error(request, error)
    }
}
