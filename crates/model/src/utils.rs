//! Small helpers shared by the response shapes.

use std::time::{SystemTime, UNIX_EPOCH};

/// Return the current unix timestamp in seconds.
pub(crate) fn now_unix() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

/// Text carried by every disabled-model response.
pub(crate) const DISABLED_TEXT: &str = "This model is currently disabled.";
