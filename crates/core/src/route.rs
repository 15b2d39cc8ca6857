//! Route templates.
//!
//! Resolution combines a controller template and an action fragment into
//! one template with the `[controller]`/`[action]` placeholders substituted.
//! Parsing splits the result into literal text and `{token}` segments.

use crate::error::{GenError, Result};

pub const DEFAULT_CONTROLLER_ROUTE: &str = "api/[controller]";

/// Combine controller and action routes into a single template.
pub fn resolve_template(
    controller_route: Option<&str>,
    action_route: Option<&str>,
    controller_display: &str,
    action_name: &str,
) -> String {
    let controller_route = controller_route.unwrap_or(DEFAULT_CONTROLLER_ROUTE);
    let combined = match action_route {
        Some(route) if route.starts_with("~/") || route.starts_with('/') => route.trim_start_matches('~').to_string(),
        Some(route) => join_urls(controller_route, route),
        None if contains_ignore_case(controller_route, "[action]") => controller_route.to_string(),
        None => join_urls(controller_route, "[action]"),
    };
    let combined = combined.trim_matches('/');

    let mut resolved = combined.to_string();
    for placeholder in ["[controller]", "{controller}"] {
        resolved = replace_ignore_case(&resolved, placeholder, controller_display);
    }
    for placeholder in ["[action]", "{action}"] {
        resolved = replace_ignore_case(&resolved, placeholder, action_name);
    }
    resolved
}

fn join_urls(left: &str, right: &str) -> String {
    let left = left.trim_matches('/');
    let right = right.trim_matches('/');
    match (left.is_empty(), right.is_empty()) {
        (true, _) => right.to_string(),
        (_, true) => left.to_string(),
        _ => format!("{left}/{right}"),
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_ascii_lowercase().contains(&needle.to_ascii_lowercase())
}

fn replace_ignore_case(haystack: &str, needle: &str, replacement: &str) -> String {
    let lower = haystack.to_ascii_lowercase();
    let needle = needle.to_ascii_lowercase();
    let mut out = String::with_capacity(haystack.len());
    let mut rest = 0;
    while let Some(found) = lower[rest..].find(&needle) {
        let start = rest + found;
        out.push_str(&haystack[rest..start]);
        out.push_str(replacement);
        rest = start + needle.len();
    }
    out.push_str(&haystack[rest..]);
    out
}

/// One piece of a parsed template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Token(Token),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub name: String,
    /// `{name?}` or a token with a default value.
    pub optional: bool,
    /// `{*name}` / `{**name}`; consumes the rest of the path.
    pub catch_all: bool,
    pub has_default: bool,
}

/// Split a resolved template into literal and token segments.
pub fn parse_template(template: &str) -> Result<Vec<Segment>> {
    let malformed = |reason: &str| GenError::MalformedRoute {
        template: template.to_string(),
        reason: reason.to_string(),
    };

    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut chars = template.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                literal.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                literal.push('}');
            }
            '}' => return Err(malformed("unbalanced '}'")),
            '{' => {
                let mut body = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some('{') => return Err(malformed("nested '{'")),
                        Some(ch) => body.push(ch),
                        None => return Err(malformed("unterminated '{'")),
                    }
                }
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                segments.push(Segment::Token(parse_token(&body).ok_or_else(|| malformed("empty token"))?));
            }
            other => literal.push(other),
        }
    }
    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    Ok(segments)
}

fn parse_token(body: &str) -> Option<Token> {
    let mut text = body.trim();
    let catch_all = text.starts_with('*');
    text = text.trim_start_matches('*');

    let (text, has_default) = match text.split_once('=') {
        Some((name, _)) => (name, true),
        None => (text, false),
    };
    let (text, question) = match text.strip_suffix('?') {
        Some(name) => (name, true),
        None => (text, false),
    };
    let name = text.split(':').next().unwrap_or_default().trim();
    if name.is_empty() {
        return None;
    }
    Some(Token {
        name: name.to_string(),
        optional: question || has_default,
        catch_all,
        has_default,
    })
}
