//! Audit log rows.

use serde::Serialize;
use time::OffsetDateTime;

/// One full gateway request/response cycle.
///
/// Headers are serialized one `name: value` pair per line. `id` is assigned
/// by the sink on append.
#[derive(Debug, Clone, Serialize)]
pub struct ExchangeRecord {
    pub id: u64,
    pub route_id: u64,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub request_method: String,
    pub request_url: String,
    pub request_headers: String,
    pub request_body: Option<String>,
    pub response_status_code: u16,
    pub response_headers: String,
    pub response_body: String,
    pub duration_ms: u64,
}

/// Summary projection for list views: everything except the bulky
/// header/body columns.
#[derive(Debug, Clone, Serialize)]
pub struct RecordSummary {
    pub id: u64,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub request_method: String,
    pub response_status_code: u16,
    pub duration_ms: u64,
}

impl From<&ExchangeRecord> for RecordSummary {
    fn from(record: &ExchangeRecord) -> Self {
        Self {
            id: record.id,
            timestamp: record.timestamp,
            request_method: record.request_method.clone(),
            response_status_code: record.response_status_code,
            duration_ms: record.duration_ms,
        }
    }
}
