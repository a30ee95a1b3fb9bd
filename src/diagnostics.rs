//! Rate-limited warning sink: unsupported or unrecognized tags get a single
//! warning per distinct tag, instead of one per occurrence.
//!
//! The crate never picks a logging subscriber for its caller — it only
//! emits through the `log` facade, same as the rest of this ecosystem's
//! library crates.

use std::cell::RefCell;
use std::collections::HashSet;

use crate::error::Diagnostic;

/// Gates repeated warnings for the same distinct key so a CU full of one
/// unsupported tag produces a single log line instead of thousands.
///
/// One instance lives per [`crate::cu::Cu`]; dedup only needs to hold
/// *within* a CU, so the set does not need to survive across CUs.
#[derive(Debug, Default)]
pub struct RateLimiter {
    seen: RefCell<HashSet<String>>,
}

impl RateLimiter {
    /// Construct an empty limiter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Log `diagnostic` at `warn` level, but only the first time `key` is
    /// seen by this limiter.
    pub fn warn_once(&self, key: &str, diagnostic: Diagnostic<'_>) {
        let mut seen = self.seen.borrow_mut();
        if seen.insert(key.to_string()) {
            log::warn!("{diagnostic}");
        }
    }

    /// Unconditionally log `diagnostic` at `warn` level. Used for conditions
    /// that are not tag-keyed (dangling references, malformed expressions).
    pub fn warn(&self, diagnostic: Diagnostic<'_>) {
        log::warn!("{diagnostic}");
    }

    /// Unconditionally log `diagnostic` at `debug` level, for tolerated
    /// conditions that should not rise to a warning (see DESIGN.md's
    /// open-question decisions).
    pub fn note(&self, message: &str) {
        log::debug!("{message}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warns_only_once_per_key() {
        let _ = env_logger::builder().is_test(true).try_init();
        let limiter = RateLimiter::new();
        // Can't directly observe log output here without a capturing
        // subscriber; at minimum this must not panic and must dedup the
        // underlying HashSet.
        limiter.warn_once("DW_TAG_foo", Diagnostic::UnsupportedTag("DW_TAG_foo"));
        limiter.warn_once("DW_TAG_foo", Diagnostic::UnsupportedTag("DW_TAG_foo"));
        assert_eq!(limiter.seen.borrow().len(), 1);
    }

    #[test]
    fn distinct_keys_each_recorded() {
        let limiter = RateLimiter::new();
        limiter.warn_once("DW_TAG_foo", Diagnostic::UnsupportedTag("DW_TAG_foo"));
        limiter.warn_once("DW_TAG_bar", Diagnostic::UnsupportedTag("DW_TAG_bar"));
        assert_eq!(limiter.seen.borrow().len(), 2);
    }
}
