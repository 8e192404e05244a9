//! Rate limit header parsing and the low-remaining warning.

use crate::observability::TracingHooks;
use chrono::{DateTime, Utc};
use reqwest::header::HeaderMap;
use std::sync::atomic::{AtomicBool, Ordering};

/// Default remaining-request count below which a warning is logged.
pub const DEFAULT_WARNING_THRESHOLD: u32 = 100;

/// Rate limit information extracted from response headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitInfo {
    /// Maximum requests allowed.
    pub limit: Option<u32>,
    /// Remaining requests in current window.
    pub remaining: u32,
    /// Time when the rate limit resets.
    pub reset_at: Option<DateTime<Utc>>,
    /// Resource category.
    pub resource: Option<String>,
}

impl RateLimitInfo {
    /// Reads rate limit headers.
    ///
    /// Returns `None` when `x-ratelimit-remaining` is absent or not an
    /// integer; the other headers are optional.
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let remaining = header_number::<u32>(headers, "x-ratelimit-remaining")?;
        let limit = header_number(headers, "x-ratelimit-limit");
        let reset_at = header_number::<i64>(headers, "x-ratelimit-reset")
            .and_then(|ts| DateTime::from_timestamp(ts, 0));
        let resource = headers
            .get("x-ratelimit-resource")
            .and_then(|v| v.to_str().ok())
            .map(String::from);

        Some(Self {
            limit,
            remaining,
            reset_at,
            resource,
        })
    }
}

fn header_number<T: std::str::FromStr>(headers: &HeaderMap, name: &str) -> Option<T> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}

/// Watches `x-ratelimit-remaining` and warns once per client.
///
/// The flag is set with a compare-and-swap, so concurrent responses still
/// produce a single warning. It is never reset.
#[derive(Debug)]
pub struct RateLimitMonitor {
    threshold: u32,
    warned: AtomicBool,
}

impl RateLimitMonitor {
    /// Creates a monitor with the given threshold.
    pub fn new(threshold: u32) -> Self {
        Self {
            threshold,
            warned: AtomicBool::new(false),
        }
    }

    /// Gets the warning threshold.
    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    /// Returns true once the warning has been issued.
    pub fn warning_issued(&self) -> bool {
        self.warned.load(Ordering::SeqCst)
    }

    /// Inspects a response's headers.
    ///
    /// Returns true if this call issued the warning. A missing or
    /// unparsable header never warns.
    pub fn observe(&self, headers: &HeaderMap) -> bool {
        let Some(info) = RateLimitInfo::from_headers(headers) else {
            return false;
        };

        if info.remaining >= self.threshold {
            return false;
        }

        let fired = self
            .warned
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok();
        if fired {
            TracingHooks::on_rate_limit_low(&info, self.threshold);
        }
        fired
    }
}

impl Default for RateLimitMonitor {
    fn default() -> Self {
        Self::new(DEFAULT_WARNING_THRESHOLD)
    }
}
