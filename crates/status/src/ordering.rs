//! Newest-first ordering by `createdAt`.
//!
//! Timestamps are parsed as RFC 3339 and compared as instants, so records
//! with different UTC offsets still order correctly. A record whose
//! `createdAt` is missing or unparsable sorts after every dated record. The
//! sort is stable: undated records, and records with equal instants, keep
//! the order in which they were collected.

use chrono::{DateTime, FixedOffset};

use crate::{PullRequest, Run};

/// A record that can be ordered by creation time.
pub trait CreatedAt {
    fn created_at(&self) -> Option<&str>;
}

impl CreatedAt for Run {
    fn created_at(&self) -> Option<&str> {
        self.created_at.as_deref()
    }
}

impl CreatedAt for PullRequest {
    fn created_at(&self) -> Option<&str> {
        self.created_at.as_deref()
    }
}

/// Parses an ISO-8601 timestamp, returning `None` for anything unparsable.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(raw.trim()).ok()
}

/// Sorts `records` newest first; undated records go last.
pub fn sort_newest_first<T: CreatedAt>(records: &mut [T]) {
    records.sort_by_cached_key(|record| {
        let parsed = record.created_at().and_then(parse_timestamp);
        // `None < Some(_)`, so wrapping in `Reverse` puts dated records first
        // (descending) and undated ones last.
        std::cmp::Reverse(parsed)
    });
}
