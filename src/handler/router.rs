//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: method validation, reply cache
//! lookup, dispatch to the home or document page and conditional replies.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Instant;

use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::{Method, Request, Response};
use tracing::{debug, error, warn};

use super::{document, home};
use crate::config::AppState;
use crate::error::ServeError;
use crate::http;
use crate::logger;

/// Request context encapsulating information needed for request processing
pub struct RequestContext<'a> {
    pub path: &'a str,
    pub is_head: bool,
    pub if_none_match: Option<String>,
    pub access_log: bool,
}

/// Main entry point for HTTP request handling
pub async fn handle_request(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    // GET and HEAD carry no body worth reading
    let (parts, _) = req.into_parts();
    let method = &parts.method;

    let ctx = RequestContext {
        path: parts.uri.path(),
        is_head: *method == Method::HEAD,
        if_none_match: parts
            .headers
            .get("if-none-match")
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string),
        access_log: state.config.logging.access_log,
    };

    let response = respond(method, &ctx, &state).await;

    if ctx.access_log {
        logger::log_access(
            method,
            ctx.path,
            response.status(),
            response.body().size_hint().exact().unwrap_or(0),
            started.elapsed(),
        );
    }
    Ok(response)
}

/// Produce the response for an already parsed request
pub async fn respond(
    method: &Method,
    ctx: &RequestContext<'_>,
    state: &AppState,
) -> Response<Full<Bytes>> {
    if let Some(resp) = check_http_method(method) {
        return resp;
    }
    route_request(ctx, state).await
}

fn check_http_method(method: &Method) -> Option<Response<Full<Bytes>>> {
    match *method {
        Method::GET | Method::HEAD => None,
        _ => {
            warn!(%method, "method not allowed");
            Some(http::build_405_response())
        }
    }
}

async fn route_request(ctx: &RequestContext<'_>, state: &AppState) -> Response<Full<Bytes>> {
    // 1. Favicon routes, never cached
    if state.config.routes.favicon_paths.iter().any(|p| ctx.path == p) {
        return http::build_404_response(ctx.is_head);
    }

    // 2. Fresh cached reply
    if let Some(cache) = &state.cache {
        if let Some(hit) = cache.lookup(ctx.path) {
            debug!(path = ctx.path, etag = %hit.etag, "reply cache hit");
            return conditional_reply(ctx, hit.body, &hit.etag);
        }
    }

    // 3. Render
    let rendered = if ctx.path == "/" {
        home::render_home(state).await
    } else {
        document::render_document(ctx.path, state).await
    };

    match rendered {
        Ok(html) => {
            let body = Bytes::from(html);
            let etag = http::generate_etag(&body);
            if let Some(cache) = &state.cache {
                cache.store(ctx.path, &etag, body.clone());
            }
            conditional_reply(ctx, body, &etag)
        }
        Err(err) => {
            log_failure(ctx.path, &err);
            http::build_error_response(&err, ctx.is_head)
        }
    }
}

/// `304` when the client already holds `etag`, the page otherwise
fn conditional_reply(ctx: &RequestContext<'_>, body: Bytes, etag: &str) -> Response<Full<Bytes>> {
    if http::check_etag_match(ctx.if_none_match.as_deref(), etag) {
        http::build_304_response(etag)
    } else {
        http::build_page_response(body, etag, ctx.is_head)
    }
}

fn log_failure(path: &str, err: &ServeError) {
    let status = err.status().as_u16();
    if err.status().is_server_error() {
        error!(path, status, error = %err, "request failed");
    } else {
        warn!(path, status, error = %err, "request failed");
    }
}
