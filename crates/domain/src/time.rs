//! Time helpers.
//!
//! Command values, readings and events carry their origin as milliseconds
//! since the Unix epoch, the resolution devices report with.

use chrono::Utc;

/// Milliseconds since the Unix epoch.
pub type OriginMillis = i64;

/// Return the current time as an origin in milliseconds.
#[must_use]
pub fn now_millis() -> OriginMillis {
    Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_return_origin_in_milliseconds() {
        let before = Utc::now().timestamp_millis();
        let origin = now_millis();
        let after = Utc::now().timestamp_millis();
        assert!(origin >= before);
        assert!(origin <= after);
    }
}
