// packages/engine/src/interception/routing_table.rs
//! Redirect table for the Pocket API hosts
//!
//! Maps each redirect-eligible host to its configured target base URL.
//! The table is built once and shared read-only afterwards.

use crate::utils::errors::{EngineError, Result};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, warn};
use url::Url;

/// Hosts whose calls may be redirected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum EligibleHost {
    /// Get/send/auth API
    #[serde(rename = "getpocket.com")]
    GetSend,

    /// Article text API
    #[serde(rename = "text.getpocket.com")]
    TextApi,
}

impl EligibleHost {
    pub const ALL: [EligibleHost; 2] = [EligibleHost::GetSend, EligibleHost::TextApi];

    /// Host name as it appears in request URLs
    pub fn as_str(self) -> &'static str {
        match self {
            EligibleHost::GetSend => "getpocket.com",
            EligibleHost::TextApi => "text.getpocket.com",
        }
    }

    /// Exact, case-sensitive host match
    pub fn from_host(host: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|h| h.as_str() == host)
    }
}

impl fmt::Display for EligibleHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Redirect rule for one eligible host
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RedirectRule {
    /// Host this rule applies to
    pub host: EligibleHost,

    /// Replacement `scheme://host[:port]`, absent means passthrough
    pub target_base: Option<Url>,
}

impl RedirectRule {
    pub fn disabled(host: EligibleHost) -> Self {
        Self {
            host,
            target_base: None,
        }
    }

    pub fn match_host(&self) -> &'static str {
        self.host.as_str()
    }

    pub fn is_enabled(&self) -> bool {
        self.target_base.is_some()
    }
}

/// Reduce a configured target to `scheme://host[:port]`
///
/// Path, query, fragment and credentials of the target are dropped. Targets
/// without a host cannot carry a request path and are rejected.
pub fn base_target(mut url: Url) -> Result<Url> {
    if url.cannot_be_a_base() || !url.has_host() {
        return Err(EngineError::InvalidTarget {
            value: url.to_string(),
            reason: "expected scheme://host[:port]".to_string(),
        });
    }

    url.set_path("");
    url.set_query(None);
    url.set_fragment(None);
    let _ = url.set_username("");
    let _ = url.set_password(None);

    Ok(url)
}

/// Parse a configured value into a base target
pub fn parse_target(value: &str) -> Result<Url> {
    let url = Url::parse(value).map_err(|e| EngineError::InvalidTarget {
        value: value.to_string(),
        reason: e.to_string(),
    })?;
    base_target(url)
}

/// Immutable host -> rule mapping
///
/// Every eligible host always has a slot; a slot without a target is
/// disabled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RedirectTable {
    rules: HashMap<&'static str, RedirectRule>,
}

impl RedirectTable {
    /// Table with every rule disabled
    pub fn disabled() -> Self {
        let rules = EligibleHost::ALL
            .into_iter()
            .map(|host| (host.as_str(), RedirectRule::disabled(host)))
            .collect();

        Self { rules }
    }

    /// Set the target for one host while building the table
    ///
    /// Targets that cannot serve as a base URL leave the slot disabled.
    pub fn with_target(mut self, host: EligibleHost, target: Option<Url>) -> Self {
        let target_base = match target.map(base_target).transpose() {
            Ok(target) => target,
            Err(e) => {
                warn!("Ignoring redirect target for {}: {}", host, e);
                None
            }
        };

        debug!(
            "Redirect rule for {}: {}",
            host,
            target_base.as_ref().map(Url::as_str).unwrap_or("<passthrough>")
        );

        self.rules
            .insert(host.as_str(), RedirectRule { host, target_base });
        self
    }

    /// Exact host lookup
    pub fn lookup(&self, host: &str) -> Option<&RedirectRule> {
        self.rules.get(host)
    }

    /// Rule for a known host
    pub fn rule(&self, host: EligibleHost) -> &RedirectRule {
        // Every eligible host is inserted by `disabled()`.
        &self.rules[host.as_str()]
    }

    /// Whether any host is redirected
    pub fn is_enabled(&self) -> bool {
        self.rules.values().any(RedirectRule::is_enabled)
    }

    /// Rules in a stable order
    pub fn rules(&self) -> impl Iterator<Item = &RedirectRule> {
        EligibleHost::ALL.into_iter().map(move |host| self.rule(host))
    }

    /// Human-readable dump
    pub fn export_config(&self) -> String {
        let mut output = String::from("# Pocket Proxy redirect table\n\n");

        for rule in self.rules() {
            let target = rule
                .target_base
                .as_ref()
                .map(Url::as_str)
                .unwrap_or("passthrough");
            output.push_str(&format!("{} -> {}\n", rule.match_host(), target));
        }

        output
    }
}

impl Default for RedirectTable {
    fn default() -> Self {
        Self::disabled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_disabled_table() {
        let table = RedirectTable::disabled();

        assert!(!table.is_enabled());
        for host in EligibleHost::ALL {
            let rule = table.lookup(host.as_str()).unwrap();
            assert_eq!(rule.host, host);
            assert!(rule.target_base.is_none());
        }
    }

    #[test]
    fn test_with_target() {
        let table = RedirectTable::disabled()
            .with_target(EligibleHost::GetSend, Some(url("https://alt.example.com:8443")));

        let rule = table.lookup("getpocket.com").unwrap();
        assert_eq!(
            rule.target_base.as_ref().unwrap().as_str(),
            "https://alt.example.com:8443/"
        );
        assert!(!table.rule(EligibleHost::TextApi).is_enabled());
        assert!(table.is_enabled());
    }

    #[test]
    fn test_exact_match_only() {
        let table = RedirectTable::disabled()
            .with_target(EligibleHost::GetSend, Some(url("http://localhost:8080")));

        assert!(table.lookup("getpocket.com").is_some());
        assert!(table.lookup("GETPOCKET.COM").is_none());
        assert!(table.lookup("api.getpocket.com").is_none());
        assert!(table.lookup("getpocket.com.evil").is_none());
        assert!(table.lookup("example.com").is_none());
    }

    #[test]
    fn test_base_target_strips_extras() {
        let target = base_target(url("https://user:pw@alt.example.com:8443/prefix?x=1#frag")).unwrap();
        assert_eq!(target.as_str(), "https://alt.example.com:8443/");
    }

    #[test]
    fn test_base_target_rejects_hostless() {
        assert!(base_target(url("mailto:someone@example.com")).is_err());
        assert!(parse_target("not a url").is_err());
        assert!(parse_target("localhost:8080").is_err());
    }

    #[test]
    fn test_invalid_target_leaves_slot_disabled() {
        let table = RedirectTable::disabled()
            .with_target(EligibleHost::TextApi, Some(url("data:text/plain,hi")));
        assert!(!table.is_enabled());
    }

    #[test]
    fn test_export_config() {
        let table = RedirectTable::disabled()
            .with_target(EligibleHost::TextApi, Some(url("http://10.0.0.2:9000")));
        let config = table.export_config();

        assert!(config.contains("getpocket.com -> passthrough"));
        assert!(config.contains("text.getpocket.com -> http://10.0.0.2:9000/"));
    }

    #[test]
    fn test_serialize() {
        let table = RedirectTable::disabled()
            .with_target(EligibleHost::GetSend, Some(url("http://localhost:8080")));
        let json = serde_json::to_value(&table).unwrap();

        assert_eq!(
            json["rules"]["getpocket.com"]["target_base"],
            "http://localhost:8080/"
        );
        assert_eq!(json["rules"]["text.getpocket.com"]["host"], "text.getpocket.com");
        assert!(json["rules"]["text.getpocket.com"]["target_base"].is_null());
    }
}
