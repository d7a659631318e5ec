//! Caller provenance attached to every engine call.
//!
//! The engine logs the context alongside each call; it never affects
//! results. Defaults describe the client (`source`, `action`, versions,
//! `user`, `hostname`) and are merged underneath caller-supplied entries,
//! so a caller may override any of them.

use indexmap::IndexMap;
use serde::Serialize;

/// Version of this client crate.
pub const CLIENT_VERSION: &str = env!("CARGO_PKG_VERSION");

const UNKNOWN: &str = "unknown";

/// Ordered string-to-string provenance map.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RequestContext {
    entries: IndexMap<String, String>,
}

impl RequestContext {
    /// An empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an entry.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    /// Value of an entry, if present.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the context has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Default provenance for one client action.
    pub fn defaults(source: &str, action: &str, engine_version: &str) -> Self {
        Self::new()
            .with("source", source)
            .with("action", action)
            .with("client_version", CLIENT_VERSION)
            .with("engine_version", engine_version)
            .with("user", current_user())
            .with("hostname", current_host())
    }

    /// `self` with every default entry it does not already set.
    ///
    /// Caller entries keep their order and come first.
    pub fn merged_over(&self, defaults: RequestContext) -> Self {
        let mut merged = self.clone();
        for (k, v) in defaults.entries {
            merged.entries.entry(k).or_insert(v);
        }
        merged
    }

    /// Compact JSON, the engine wire form.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RequestContext {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

fn env_or_unknown(names: &[&str]) -> String {
    names
        .iter()
        .find_map(|name| std::env::var(name).ok().filter(|v| !v.is_empty()))
        .unwrap_or_else(|| UNKNOWN.to_string())
}

fn current_user() -> String {
    env_or_unknown(&["USER", "USERNAME", "LOGNAME"])
}

/// The system hostname, then the shell's `HOSTNAME`/`COMPUTERNAME`.
fn current_host() -> String {
    let host = gethostname::gethostname();
    match host.to_str() {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => env_or_unknown(&["HOSTNAME", "COMPUTERNAME"]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_carry_identity() {
        let ctx = RequestContext::defaults("gribjump-rs", "extract", "9.9.9");
        assert_eq!(ctx.get("source"), Some("gribjump-rs"));
        assert_eq!(ctx.get("action"), Some("extract"));
        assert_eq!(ctx.get("client_version"), Some(CLIENT_VERSION));
        assert_eq!(ctx.get("engine_version"), Some("9.9.9"));
        assert!(ctx.get("user").is_some_and(|u| !u.is_empty()));
        assert!(ctx.get("hostname").is_some_and(|h| !h.is_empty()));
        assert_eq!(ctx.len(), 6);
    }

    #[test]
    fn hostname_comes_from_the_system() {
        let system = gethostname::gethostname();
        let ctx = RequestContext::defaults("gribjump-rs", "extract", "1");
        match system.to_str() {
            Some(name) if !name.is_empty() => assert_eq!(ctx.get("hostname"), Some(name)),
            _ => assert!(ctx.get("hostname").is_some()),
        }
    }

    #[test]
    fn caller_entries_win() {
        let caller = RequestContext::new()
            .with("source", "pytest")
            .with("ticket", "42");
        let merged = caller.merged_over(RequestContext::defaults("gribjump-rs", "axes", "1"));
        assert_eq!(merged.get("source"), Some("pytest"));
        assert_eq!(merged.get("ticket"), Some("42"));
        assert_eq!(merged.get("action"), Some("axes"));
        assert_eq!(merged.len(), 7);
    }

    #[test]
    fn json_is_compact_and_ordered() {
        let ctx: RequestContext = [("source", "test"), ("action", "extract")].into_iter().collect();
        assert_eq!(
            ctx.to_json().unwrap(),
            r#"{"source":"test","action":"extract"}"#
        );
    }
}
