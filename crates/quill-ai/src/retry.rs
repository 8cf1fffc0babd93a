use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

pub const BASE_BACKOFF_MS: u64 = 200;

static REQUEST_COUNTER: AtomicU64 = AtomicU64::new(1);
static JITTER_COUNTER: AtomicU64 = AtomicU64::new(1);

pub fn should_retry_status(status: u16) -> bool {
    status == 408 || status == 409 || status == 425 || status == 429 || status >= 500
}

pub fn next_backoff_ms(attempt: usize) -> u64 {
    let shift = attempt.min(6);
    BASE_BACKOFF_MS.saturating_mul(1_u64 << shift)
}

pub fn next_backoff_ms_with_jitter(attempt: usize, jitter_enabled: bool) -> u64 {
    let base = next_backoff_ms(attempt);
    if !jitter_enabled || base <= 1 {
        return base;
    }

    // Bounded jitter in [50%, 100%] of the deterministic backoff.
    let low = base / 2;
    let width = base.saturating_sub(low);
    let seed = JITTER_COUNTER.fetch_add(1, Ordering::Relaxed);
    let mixed = seed.wrapping_mul(0x9E37_79B9_7F4A_7C15).rotate_left(17) ^ 0xA24B_AED4_963E_E407;
    let jitter = if width == 0 {
        0
    } else {
        mixed % width.saturating_add(1)
    };
    low.saturating_add(jitter)
}

pub fn parse_retry_after_ms(headers: &reqwest::header::HeaderMap) -> Option<u64> {
    let raw = headers.get("retry-after")?.to_str().ok()?.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(seconds) = raw.parse::<u64>() {
        return Some(seconds.saturating_mul(1000));
    }

    let retry_at = DateTime::parse_from_rfc2822(raw).ok()?.with_timezone(&Utc);
    let now = Utc::now();
    let delay_ms = retry_at.signed_duration_since(now).num_milliseconds();
    if delay_ms <= 0 {
        return Some(0);
    }

    u64::try_from(delay_ms).ok()
}

pub fn provider_retry_delay_ms(
    attempt: usize,
    jitter_enabled: bool,
    retry_after_ms: Option<u64>,
) -> u64 {
    let backoff_ms = next_backoff_ms_with_jitter(attempt, jitter_enabled);
    match retry_after_ms {
        Some(retry_after_ms) => backoff_ms.max(retry_after_ms),
        None => backoff_ms,
    }
}

pub fn is_retryable_http_error(error: &reqwest::Error) -> bool {
    error.is_timeout() || error.is_connect() || error.is_request() || error.is_body()
}

pub fn new_request_id() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis();
    let count = REQUEST_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("quill-{millis}-{count}")
}
