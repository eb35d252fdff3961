// packages/engine/src/interception/decision.rs
//! Redirect decision
//!
//! Given a request and the redirect table, compute the request that should
//! actually be dispatched. A redirect swaps scheme, host and port for the
//! configured target; the path and query the host composed are kept as-is.

use crate::interception::request::RequestDescriptor;
use crate::interception::routing_table::{EligibleHost, RedirectTable};

/// What happened to a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Sent to the configured target for this host
    Redirect(EligibleHost),

    /// Forwarded unchanged
    Passthrough,
}

/// Compute the effective request
pub fn decide(request: RequestDescriptor, table: &RedirectTable) -> RequestDescriptor {
    evaluate(request, table).0
}

/// Compute the effective request and report the decision
pub fn evaluate(
    mut request: RequestDescriptor,
    table: &RedirectTable,
) -> (RequestDescriptor, Decision) {
    let Some(rule) = request.host().and_then(|host| table.lookup(host)) else {
        return (request, Decision::Passthrough);
    };

    let Some(target) = &rule.target_base else {
        return (request, Decision::Passthrough);
    };

    let mut url = target.clone();
    url.set_path(request.url.path());
    url.set_query(request.url.query());

    request.url = url;
    (request, Decision::Redirect(rule.host))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interception::request::{CacheLoadControl, ResponseSink};
    use proptest::prelude::*;
    use url::Url;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    fn table() -> RedirectTable {
        RedirectTable::disabled()
            .with_target(EligibleHost::GetSend, Some(url("https://alt.example.com:8443")))
            .with_target(EligibleHost::TextApi, Some(url("http://10.0.0.5:9000")))
    }

    fn request(s: &str) -> RequestDescriptor {
        RequestDescriptor::new(url(s))
            .with_param("POST")
            .with_header("Authorization", "Bearer token")
            .with_body(&b"consumer_key=abc"[..])
            .with_sink(ResponseSink::from_raw(0x1000))
            .with_flags(3, -1)
            .with_cache_control(CacheLoadControl::AlwaysNetwork)
    }

    #[test]
    fn test_rewrite_get_send() {
        let input = request("https://getpocket.com/v3/send?id=1");
        let (output, decision) = evaluate(input.clone(), &table());

        assert_eq!(decision, Decision::Redirect(EligibleHost::GetSend));
        assert_eq!(output.url.as_str(), "https://alt.example.com:8443/v3/send?id=1");

        // Everything but the URL is untouched
        assert_eq!(output.param, input.param);
        assert_eq!(output.headers, input.headers);
        assert_eq!(output.body, input.body);
        assert_eq!(output.sink, input.sink);
        assert_eq!(output.flags, input.flags);
        assert_eq!(output.cache_control, input.cache_control);
    }

    #[test]
    fn test_rewrite_text_api_changes_scheme() {
        let output = decide(request("https://text.getpocket.com/text?foo=bar"), &table());
        assert_eq!(output.url.as_str(), "http://10.0.0.5:9000/text?foo=bar");
    }

    #[test]
    fn test_encoded_path_and_query_preserved() {
        let output = decide(
            request("https://getpocket.com/v3/get%20items?url=https%3A%2F%2Fa.b%2Fc&x=&y"),
            &table(),
        );
        assert_eq!(
            output.url.as_str(),
            "https://alt.example.com:8443/v3/get%20items?url=https%3A%2F%2Fa.b%2Fc&x=&y"
        );
    }

    #[test]
    fn test_fragment_not_carried_over() {
        let output = decide(request("https://getpocket.com/v3/get?since=0#top"), &table());
        assert_eq!(output.url.as_str(), "https://alt.example.com:8443/v3/get?since=0");
        assert_eq!(output.url.fragment(), None);
    }

    #[test]
    fn test_unknown_host_passthrough() {
        let input = request("https://example.com/v3/send?id=1");
        let (output, decision) = evaluate(input.clone(), &table());

        assert_eq!(decision, Decision::Passthrough);
        assert_eq!(output, input);
    }

    #[test]
    fn test_disabled_rule_passthrough() {
        let table = RedirectTable::disabled()
            .with_target(EligibleHost::TextApi, Some(url("http://10.0.0.5:9000")));
        let input = request("https://getpocket.com/v3/get");

        assert_eq!(decide(input.clone(), &table), input);
    }

    #[test]
    fn test_hostless_url_passthrough() {
        let input = request("data:text/plain,getpocket.com");
        assert_eq!(decide(input.clone(), &table()), input);
    }

    #[test]
    fn test_subdomain_not_matched() {
        let input = request("https://api.getpocket.com/v3/get");
        assert_eq!(decide(input.clone(), &table()), input);
    }

    fn path_strategy() -> impl Strategy<Value = String> {
        "(/[a-zA-Z0-9_.~-]{1,10}){0,4}"
    }

    fn query_strategy() -> impl Strategy<Value = Option<String>> {
        proptest::option::of("[a-z]{1,6}=[a-zA-Z0-9]{0,8}(&[a-z]{1,6}=[a-zA-Z0-9]{0,8}){0,3}")
    }

    fn compose(host: &str, path: &str, query: &Option<String>) -> Url {
        let query = query.as_ref().map(|q| format!("?{}", q)).unwrap_or_default();
        url(&format!("https://{}{}{}", host, path, query))
    }

    proptest! {
        #[test]
        fn prop_unknown_host_is_identity(
            label in "[a-z]{1,12}",
            path in path_strategy(),
            query in query_strategy()
        ) {
            let host = format!("{}.example.org", label);
            let input = request(compose(&host, &path, &query).as_str());

            prop_assert_eq!(decide(input.clone(), &table()), input);
        }

        #[test]
        fn prop_rewrite_keeps_path_and_query(
            text_api in any::<bool>(),
            path in path_strategy(),
            query in query_strategy()
        ) {
            let host = if text_api { EligibleHost::TextApi } else { EligibleHost::GetSend };
            let table = table();
            let target = table.rule(host).target_base.clone().unwrap();
            let input = request(compose(host.as_str(), &path, &query).as_str());

            let output = decide(input.clone(), &table);

            prop_assert_eq!(output.url.scheme(), target.scheme());
            prop_assert_eq!(output.url.host_str(), target.host_str());
            prop_assert_eq!(output.url.port(), target.port());
            prop_assert_eq!(output.url.path(), input.url.path());
            prop_assert_eq!(output.url.query(), input.url.query());
            prop_assert_eq!(&output.body, &input.body);
            prop_assert_eq!(&output.headers, &input.headers);
        }

        #[test]
        fn prop_decide_is_deterministic(
            host_index in 0usize..3,
            path in path_strategy(),
            query in query_strategy()
        ) {
            let host = ["getpocket.com", "text.getpocket.com", "example.net"][host_index];
            let input = request(compose(host, &path, &query).as_str());
            let table = table();

            prop_assert_eq!(decide(input.clone(), &table), decide(input, &table));
        }
    }
}
