// SPDX-License-Identifier: MIT

use super::*;

#[test]
fn renders_literal_text_unchanged() {
    let tmpl = ClusterUrlTemplate::parse("https://cluster.example.com/ui").unwrap();
    assert_eq!(tmpl.render("proxy1"), "https://cluster.example.com/ui");
}

#[test]
fn substitutes_proxy_placeholder() {
    let tmpl = ClusterUrlTemplate::parse("https://{{.Proxy}}.example.com/scheduler").unwrap();
    assert_eq!(tmpl.render("my-proxy"), "https://my-proxy.example.com/scheduler");
}

#[test]
fn substitutes_proxy_placeholder_multiple_times() {
    let tmpl = ClusterUrlTemplate::parse("{{.Proxy}}/{{.Proxy}}").unwrap();
    assert_eq!(tmpl.render("p"), "p/p");
}

#[test]
fn rejects_unclosed_directive() {
    let err = ClusterUrlTemplate::parse("https://{{.Proxy/oops").unwrap_err();
    assert!(matches!(err, TemplateError::Unclosed { .. }));
}

#[test]
fn rejects_unknown_directive() {
    let err = ClusterUrlTemplate::parse("https://{{.Bogus}}/scheduler").unwrap_err();
    assert!(matches!(err, TemplateError::UnknownDirective { .. }));
}

#[test]
fn round_trips_through_display() {
    let tmpl = ClusterUrlTemplate::parse("https://{{.Proxy}}.example.com").unwrap();
    assert_eq!(tmpl.to_string(), "https://{{.Proxy}}.example.com");
}
