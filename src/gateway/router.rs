//! Request dispatch module
//!
//! Entry point for HTTP request processing: method gate, basename
//! resolution, allow-list validation, and dispatch to the file store.

use crate::config::AppState;
use crate::gateway::store;
use crate::http;
use crate::logger;
use http_body_util::{BodyExt, Full};
use hyper::body::{Body, Bytes};
use hyper::header::HeaderValue;
use hyper::{Method, Request, Response};
use std::convert::Infallible;
use std::sync::Arc;

/// Main entry point for HTTP request handling.
///
/// Generic over the request body so the dispatch can be exercised in tests
/// with in-memory bodies; the server feeds it `hyper::body::Incoming`.
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: Body,
    B::Error: std::fmt::Display,
{
    let method = req.method().clone();
    let access_log = state.config.logging.access_log;

    if access_log {
        logger::log_request(&method, req.uri(), req.version());
    }

    // 1. Method gate: only GET and POST reach the store
    if method != Method::GET && method != Method::POST {
        logger::log_warning(&format!("Method not allowed: {method}"));
        return Ok(finish(http::build_405_response(), &state, access_log));
    }

    // 2. Body size gate (Content-Length only; bodies are never streamed to disk)
    if let Some(resp) = check_body_size(&req, state.config.http.max_body_size) {
        return Ok(finish(resp, &state, access_log));
    }

    // 3. Resolve the candidate filename: last path segment, query string and
    //    any directory prefix discarded
    let path = req.uri().path().to_string();
    let name = store::basename(&path).to_string();

    if !store::is_allowed(&name) {
        logger::log_warning(&format!("Rejected filename in request path: {path}"));
        return Ok(finish(
            http::build_invalid_filename_response(),
            &state,
            access_log,
        ));
    }

    // 4. Dispatch the validated name to the store
    let response = if method == Method::POST {
        handle_post(req, &state, &name).await
    } else {
        handle_get(&state, &name).await
    };

    Ok(finish(response, &state, access_log))
}

/// Stamp the Server header and write the access log line
fn finish(
    mut response: Response<Full<Bytes>>,
    state: &Arc<AppState>,
    access_log: bool,
) -> Response<Full<Bytes>> {
    if let Ok(server) = HeaderValue::from_str(&state.config.http.server_name) {
        response.headers_mut().insert(hyper::header::SERVER, server);
    }

    if access_log {
        // Full<Bytes> knows its exact size up front
        let body_bytes = response.body().size_hint().exact().unwrap_or(0);
        logger::log_response(
            response.status().as_u16(),
            usize::try_from(body_bytes).unwrap_or(usize::MAX),
        );
    }

    response
}

/// Validate Content-Length header and return 413 if exceeded
fn check_body_size<B>(req: &Request<B>, max_body_size: u64) -> Option<Response<Full<Bytes>>> {
    let content_length = req.headers().get("content-length")?;
    content_length.to_str().map_or_else(
        |_| {
            logger::log_warning("Content-Length header contains non-ASCII characters");
            None
        },
        |size_str| match size_str.parse::<u64>() {
            Ok(size) if size > max_body_size => {
                logger::log_error(&format!(
                    "Request body too large: {size} bytes (max: {max_body_size})"
                ));
                Some(http::build_413_response())
            }
            Err(_) => {
                logger::log_warning(&format!(
                    "Invalid Content-Length value: '{size_str}', skipping size check"
                ));
                None
            }
            _ => None,
        },
    )
}

/// Serve the raw contents of a managed file.
///
/// A never-written file answers with an empty body, not an error.
async fn handle_get(state: &Arc<AppState>, name: &str) -> Response<Full<Bytes>> {
    match store::read_file(&state.data_dir, name).await {
        Ok(Some(contents)) => http::build_yaml_response(Bytes::from(contents)),
        Ok(None) => http::build_yaml_response(Bytes::new()),
        Err(e) => {
            logger::log_error(&format!("Failed to read '{name}': {e}"));
            http::build_500_response()
        }
    }
}

/// Replace a managed file with the raw request body
async fn handle_post<B>(req: Request<B>, state: &Arc<AppState>, name: &str) -> Response<Full<Bytes>>
where
    B: Body,
    B::Error: std::fmt::Display,
{
    let body = match req.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            logger::log_error(&format!("Failed to read request body: {e}"));
            return http::build_bad_body_response();
        }
    };

    match store::write_file(&state.data_dir, name, &body).await {
        Ok(()) => http::build_saved_response(),
        Err(e) => {
            logger::log_error(&format!("Failed to write '{name}': {e}"));
            http::build_500_response()
        }
    }
}
