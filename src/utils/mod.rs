//! Project-specific utilities live here.

use time::OffsetDateTime;

/// Current UTC time truncated to whole seconds, the precision the store keeps.
pub fn now_utc() -> OffsetDateTime {
    let now = OffsetDateTime::now_utc();
    now.replace_nanosecond(0).unwrap_or(now)
}
