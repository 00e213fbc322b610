// SPDX-License-Identifier: MIT

//! Minimal `{{.Proxy}}` template parser for `cluster_url_template`.
//!
//! This is a cosmetic link builder, not a general templating engine: the
//! only construct recognized inside `{{ }}` is the literal `.Proxy`
//! directive. Anything else is a parse error, surfaced once at
//! construction time per the "template parse/exec failure is fatal at
//! construction time" policy in the configuration section.

use std::fmt;

use thiserror::Error;

const PROXY_DIRECTIVE: &str = ".Proxy";

#[derive(Debug, Clone)]
enum Segment {
    Literal(String),
    Proxy,
}

/// A parsed `cluster_url_template`, ready to render against a proxy string.
#[derive(Debug, Clone)]
pub struct ClusterUrlTemplate {
    segments: Vec<Segment>,
}

impl ClusterUrlTemplate {
    /// Parse `raw` and exercise it once against a placeholder proxy so a
    /// malformed template is rejected here rather than at first render.
    pub fn parse(raw: &str) -> Result<Self, TemplateError> {
        let mut segments = Vec::new();
        let mut rest = raw;
        while let Some(open) = rest.find("{{") {
            if open > 0 {
                segments.push(Segment::Literal(rest[..open].to_string()));
            }
            let after_open = &rest[open + 2..];
            let close = after_open
                .find("}}")
                .ok_or_else(|| TemplateError::Unclosed { template: raw.to_string() })?;
            let directive = after_open[..close].trim();
            if directive != PROXY_DIRECTIVE {
                return Err(TemplateError::UnknownDirective {
                    template: raw.to_string(),
                    directive: directive.to_string(),
                });
            }
            segments.push(Segment::Proxy);
            rest = &after_open[close + 2..];
        }
        if !rest.is_empty() {
            segments.push(Segment::Literal(rest.to_string()));
        }

        let template = Self { segments };
        let _ = template.render("placeholder-proxy");
        Ok(template)
    }

    /// Render the template by substituting `{{.Proxy}}` with `proxy`.
    pub fn render(&self, proxy: &str) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(s) => out.push_str(s),
                Segment::Proxy => out.push_str(proxy),
            }
        }
        out
    }
}

impl fmt::Display for ClusterUrlTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            match segment {
                Segment::Literal(s) => f.write_str(s)?,
                Segment::Proxy => f.write_str("{{.Proxy}}")?,
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("cluster_url_template {template:?} has an unclosed directive")]
    Unclosed { template: String },
    #[error("cluster_url_template {template:?} has unknown directive {directive:?} (only .Proxy is supported)")]
    UnknownDirective { template: String, directive: String },
}

#[cfg(test)]
#[path = "template_tests.rs"]
mod tests;
