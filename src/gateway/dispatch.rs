//! Outbound dispatch to the upstream.
//!
//! # Responsibilities
//! - Perform exactly one outbound call per request (no retries)
//! - Copy headers with hygiene rules on both legs
//! - Enforce fixed connect and read timeouts
//! - Guarantee exactly one audit record on every exit path
//!
//! # Design Decisions
//! - The hyper client never follows redirects, so a 3xx passes through to
//!   the caller untouched
//! - Responses are fully buffered; HEAD never attempts a body read
//! - The pooled client returns or drops the upstream connection when the
//!   response and its body are dropped, on success and failure alike

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderMap, HeaderValue, Method, Request, Response, StatusCode, Uri};
use http_body_util::BodyExt;
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use thiserror::Error;

use crate::audit::{AuditSink, ExchangeLogger};
use crate::http::error::gateway_failure;
use crate::store::StoredRoute;

/// Fixed timeout for establishing the upstream connection.
const CONNECT_TIMEOUT: Duration = Duration::from_millis(10_000);

/// Fixed timeout for reading the upstream response head, and again for the
/// body. Per-read socket deadlines are not expressible on a pooled hyper
/// client, so each phase gets the full budget.
const READ_TIMEOUT: Duration = Duration::from_millis(10_000);

/// Failures while talking to the upstream. All of them become a 500 with a
/// JSON envelope, and all of them still produce an audit record.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("invalid target URL: {0}")]
    InvalidTarget(axum::http::uri::InvalidUri),

    #[error("invalid host in target URL: {0}")]
    InvalidHost(axum::http::header::InvalidHeaderValue),

    #[error("failed to build upstream request: {0}")]
    BuildRequest(axum::http::Error),

    #[error("upstream request failed: {0}")]
    Upstream(hyper_util::client::legacy::Error),

    #[error("failed to read upstream response: {0}")]
    ReadBody(hyper::Error),

    #[error("upstream did not respond within {}ms", READ_TIMEOUT.as_millis())]
    ReadTimeout,
}

struct UpstreamReply {
    status: StatusCode,
    headers: HeaderMap,
    header_log: String,
    body: Bytes,
}

/// Performs the outbound call and owns the audit guarantee.
pub struct ProxyDispatcher {
    client: Client<HttpsConnector<HttpConnector>, Body>,
    sink: Arc<dyn AuditSink>,
}

impl ProxyDispatcher {
    pub fn new(sink: Arc<dyn AuditSink>) -> Self {
        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(CONNECT_TIMEOUT));
        connector.enforce_http(false);

        let https = HttpsConnectorBuilder::new()
            .with_webpki_roots()
            .https_or_http()
            .enable_http1()
            .enable_http2()
            .wrap_connector(connector);

        Self {
            client: Client::builder(TokioExecutor::new()).build(https),
            sink,
        }
    }

    /// Forward one request and answer the client. `started` is the handler's
    /// entry instant, so the recorded duration spans lookup through return.
    pub async fn dispatch(
        &self,
        route: &StoredRoute,
        target_url: String,
        method: Method,
        headers: &HeaderMap,
        body: Option<Bytes>,
        started: Instant,
    ) -> Response<Body> {
        let body_text = body
            .as_ref()
            .filter(|b| !b.is_empty())
            .map(|b| String::from_utf8_lossy(b).into_owned());

        let mut log = ExchangeLogger::begin(
            self.sink.clone(),
            route.id,
            method.as_str(),
            body_text,
            started,
        );
        log.set_request_url(&target_url);

        match self
            .forward(&mut log, &target_url, &method, headers, body)
            .await
        {
            Ok(reply) => {
                let body_text = String::from_utf8_lossy(&reply.body).into_owned();
                log.success(reply.status.as_u16(), reply.header_log, body_text);

                let mut response = Response::new(Body::from(reply.body));
                *response.status_mut() = reply.status;
                *response.headers_mut() = reply.headers;
                response
            }
            Err(error) => {
                tracing::error!(
                    route = %route.source_pattern,
                    target = %target_url,
                    %error,
                    "Upstream dispatch failed"
                );
                log.failure(&error.to_string());
                gateway_failure(&error.to_string())
            }
        }
    }

    async fn forward(
        &self,
        log: &mut ExchangeLogger,
        target_url: &str,
        method: &Method,
        headers: &HeaderMap,
        body: Option<Bytes>,
    ) -> Result<UpstreamReply, ProxyError> {
        let uri: Uri = target_url.parse().map_err(ProxyError::InvalidTarget)?;
        let host = uri.authority().map(|a| a.as_str().to_string());

        let mut builder = Request::builder().method(method.clone()).uri(uri);
        let mut header_log = String::new();
        if let Some(out) = builder.headers_mut() {
            // Host is recomputed from the target URL and Content-Length from
            // the body actually written; everything else passes through.
            for (name, value) in headers {
                if name == header::HOST || name == header::CONTENT_LENGTH {
                    continue;
                }
                out.append(name.clone(), value.clone());
                append_header_line(&mut header_log, name.as_str(), value);
            }
            if let Some(host) = host {
                let value = HeaderValue::from_str(&host).map_err(ProxyError::InvalidHost)?;
                out.insert(header::HOST, value);
            }
        }
        log.set_request_headers(header_log);

        // Only POST and PUT carry a body upstream.
        let writes_body = matches!(*method, Method::POST | Method::PUT);
        let outbound_body = match body {
            Some(bytes) if writes_body && !bytes.is_empty() => Body::from(bytes),
            _ => Body::empty(),
        };
        let request = builder.body(outbound_body).map_err(ProxyError::BuildRequest)?;

        let response = tokio::time::timeout(READ_TIMEOUT, self.client.request(request))
            .await
            .map_err(|_| ProxyError::ReadTimeout)?
            .map_err(ProxyError::Upstream)?;

        let status = response.status();
        let (parts, incoming) = response.into_parts();

        let body = if *method == Method::HEAD {
            Bytes::new()
        } else {
            tokio::time::timeout(READ_TIMEOUT, incoming.collect())
                .await
                .map_err(|_| ProxyError::ReadTimeout)?
                .map_err(ProxyError::ReadBody)?
                .to_bytes()
        };

        // Transfer-Encoding would contradict the fully buffered body.
        let mut response_headers = HeaderMap::new();
        let mut header_log = String::new();
        for (name, value) in parts.headers.iter() {
            if name == header::TRANSFER_ENCODING {
                continue;
            }
            response_headers.append(name.clone(), value.clone());
            append_header_line(&mut header_log, name.as_str(), value);
        }

        Ok(UpstreamReply {
            status,
            headers: response_headers,
            header_log,
            body,
        })
    }
}

fn append_header_line(log: &mut String, name: &str, value: &HeaderValue) {
    log.push_str(name);
    log.push_str(": ");
    log.push_str(&String::from_utf8_lossy(value.as_bytes()));
    log.push('\n');
}
