//! HTTP response handlers.
//!
//! tiny_http drops the body of HEAD responses itself and keeps the
//! `Content-Length` of the full response, so handlers always build the body.

use anyhow::{Result, anyhow};
use tiny_http::{Header, Request, Response, StatusCode};

mod mime {
    pub const HTML: &str = "text/html; charset=utf-8";
    pub const JSON: &str = "application/json; charset=utf-8";
    pub const JAVASCRIPT: &str = "application/javascript; charset=utf-8";
    pub const PLAIN: &str = "text/plain; charset=utf-8";
}

pub fn respond_html(request: Request, body: String) -> Result<()> {
    send(request, 200, mime::HTML, body)
}

pub fn respond_json(request: Request, body: String) -> Result<()> {
    send(request, 200, mime::JSON, body)
}

/// Respond with livereload.js from memory.
pub fn respond_livereload_js(request: Request, ws_port: u16) -> Result<()> {
    use crate::embed::serve::{LIVERELOAD_JS, LivereloadVars};

    let body = LIVERELOAD_JS.render(&LivereloadVars { ws_port });
    send(request, 200, mime::JAVASCRIPT, body)
}

pub fn respond_not_found(request: Request) -> Result<()> {
    send(request, 404, mime::PLAIN, "404 Not Found".to_string())
}

pub fn respond_method_not_allowed(request: Request) -> Result<()> {
    let response = Response::from_string("405 Method Not Allowed")
        .with_status_code(StatusCode(405))
        .with_header(make_header("Content-Type", mime::PLAIN)?)
        .with_header(make_header("Allow", "GET, HEAD")?);
    request.respond(response)?;
    Ok(())
}

/// Respond with 503 Service Unavailable (server shutting down).
pub fn respond_unavailable(request: Request) -> Result<()> {
    send(request, 503, mime::PLAIN, "503 Service Unavailable".to_string())
}

pub fn respond_error(request: Request, error: &dyn std::fmt::Display) -> Result<()> {
    send(request, 500, mime::PLAIN, format!("500 Internal Server Error\n{error}"))
}

fn send(request: Request, status: u16, content_type: &'static str, body: String) -> Result<()> {
    let response = Response::from_string(body)
        .with_status_code(StatusCode(status))
        .with_header(make_header("Content-Type", content_type)?)
        .with_header(make_header("Cache-Control", "no-store")?);
    request.respond(response)?;
    Ok(())
}

fn make_header(key: &'static str, value: &'static str) -> Result<Header> {
    Header::from_bytes(key, value).map_err(|()| anyhow!("invalid header `{key}: {value}`"))
}
