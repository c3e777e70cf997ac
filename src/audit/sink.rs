//! Append-only persistence of exchange records.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use crate::audit::record::{ExchangeRecord, RecordSummary};

/// Write contract the dispatcher depends on, plus the narrow read surface
/// the admin views need. Appends must be safe under unbounded concurrency.
pub trait AuditSink: Send + Sync {
    /// Persist a record and return its assigned id.
    fn append(&self, record: ExchangeRecord) -> u64;

    /// Newest-first summaries for one route, capped at `limit`.
    fn recent_for_route(&self, route_id: u64, limit: usize) -> Vec<RecordSummary>;

    /// Full record by id.
    fn find(&self, id: u64) -> Option<ExchangeRecord>;

    /// Delete every record for one route; returns how many were removed.
    fn clear_for_route(&self, route_id: u64) -> usize;
}

/// In-process sink backed by a plain vector.
pub struct MemoryAuditSink {
    next_id: AtomicU64,
    records: Mutex<Vec<ExchangeRecord>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            records: Mutex::new(Vec::new()),
        }
    }

    /// Full records for one route, newest first. Not part of the sink
    /// contract; used by tests and diagnostics.
    pub fn records_for_route(&self, route_id: u64) -> Vec<ExchangeRecord> {
        let records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        records
            .iter()
            .rev()
            .filter(|r| r.route_id == route_id)
            .cloned()
            .collect()
    }
}

impl Default for MemoryAuditSink {
    fn default() -> Self {
        Self::new()
    }
}

impl AuditSink for MemoryAuditSink {
    fn append(&self, mut record: ExchangeRecord) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        record.id = id;
        let mut records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        records.push(record);
        id
    }

    fn recent_for_route(&self, route_id: u64, limit: usize) -> Vec<RecordSummary> {
        let records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        records
            .iter()
            .rev()
            .filter(|r| r.route_id == route_id)
            .take(limit)
            .map(RecordSummary::from)
            .collect()
    }

    fn find(&self, id: u64) -> Option<ExchangeRecord> {
        let records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        records.iter().find(|r| r.id == id).cloned()
    }

    fn clear_for_route(&self, route_id: u64) -> usize {
        let mut records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        let before = records.len();
        records.retain(|r| r.route_id != route_id);
        before - records.len()
    }
}
