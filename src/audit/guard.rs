//! Exactly-once audit record guard.

use std::sync::Arc;
use std::time::Instant;

use time::OffsetDateTime;

use crate::audit::record::ExchangeRecord;
use crate::audit::sink::AuditSink;

/// RAII guard that guarantees one audit record per gateway request.
///
/// The dispatcher fills in fields as they become known and ends the exchange
/// through [`success`](Self::success) or [`failure`](Self::failure), both of
/// which consume the guard. If neither runs (the request future was dropped,
/// or an exit path was missed), `Drop` appends an abort record instead, so a
/// record is written on every exit path and never twice.
pub struct ExchangeLogger {
    sink: Arc<dyn AuditSink>,
    started: Instant,
    record: Option<ExchangeRecord>,
}

impl ExchangeLogger {
    /// Open the exchange. `started` is the instant the handler began, taken
    /// before route lookup so the recorded duration covers the whole request.
    pub fn begin(
        sink: Arc<dyn AuditSink>,
        route_id: u64,
        method: &str,
        request_body: Option<String>,
        started: Instant,
    ) -> Self {
        let record = ExchangeRecord {
            id: 0,
            route_id,
            timestamp: OffsetDateTime::now_utc(),
            request_method: method.to_string(),
            request_url: String::new(),
            request_headers: String::new(),
            request_body,
            response_status_code: 0,
            response_headers: String::new(),
            response_body: String::new(),
            duration_ms: 0,
        };
        Self {
            sink,
            started,
            record: Some(record),
        }
    }

    pub fn set_request_url(&mut self, url: &str) {
        if let Some(record) = self.record.as_mut() {
            record.request_url = url.to_string();
        }
    }

    pub fn set_request_headers(&mut self, serialized: String) {
        if let Some(record) = self.record.as_mut() {
            record.request_headers = serialized;
        }
    }

    /// Close the exchange with the upstream's response.
    pub fn success(mut self, status: u16, response_headers: String, response_body: String) {
        self.flush(status, response_headers, response_body);
    }

    /// Close the exchange after a dispatch failure. The record carries
    /// status 500 and the error text as its response body.
    pub fn failure(mut self, message: &str) {
        self.flush(500, String::new(), format!("Gateway Error: {message}"));
    }

    fn flush(&mut self, status: u16, response_headers: String, response_body: String) {
        if let Some(mut record) = self.record.take() {
            record.response_status_code = status;
            record.response_headers = response_headers;
            record.response_body = response_body;
            record.duration_ms = self.started.elapsed().as_millis() as u64;
            self.sink.append(record);
        }
    }
}

impl Drop for ExchangeLogger {
    fn drop(&mut self) {
        if self.record.is_some() {
            self.flush(
                500,
                String::new(),
                "Gateway Error: request aborted before completion".to_string(),
            );
        }
    }
}
