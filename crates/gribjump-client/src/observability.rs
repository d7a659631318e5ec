//! Structured logging for the extraction client.
//!
//! All events use target `"gribjump"` and carry `event` and `component`
//! fields. The library never installs a subscriber; applications configure
//! one through `tracing_subscriber` or similar.

/// Target for all client log events.
pub(crate) const GRIBJUMP_TARGET: &str = gribjump_result::LOG_TARGET;

/// Debug-level event.
macro_rules! log_debug {
    ($($field:tt)*) => {
        ::tracing::debug!(target: $crate::observability::GRIBJUMP_TARGET, $($field)*)
    };
}

/// Info-level event.
macro_rules! log_info {
    ($($field:tt)*) => {
        ::tracing::info!(target: $crate::observability::GRIBJUMP_TARGET, $($field)*)
    };
}

/// Warn-level event.
macro_rules! log_warn {
    ($($field:tt)*) => {
        ::tracing::warn!(target: $crate::observability::GRIBJUMP_TARGET, $($field)*)
    };
}

pub(crate) use log_debug;
pub(crate) use log_info;
pub(crate) use log_warn;

#[cfg(test)]
mod tests {
    #[test]
    fn client_and_decoder_share_a_target() {
        assert_eq!(super::GRIBJUMP_TARGET, "gribjump");
        assert_eq!(super::GRIBJUMP_TARGET, gribjump_result::LOG_TARGET);
    }
}
