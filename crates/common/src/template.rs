//! Templated URL and topic parsing
//!
//! Splits strings such as `/orders/{id}` or `mqtt://{host}:{port}` into an
//! ordered list of literal and variable segments.

/// A single piece of a parsed template
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Variable(String),
}

impl Segment {
    pub fn variable_name(&self) -> Option<&str> {
        match self {
            Segment::Variable(name) => Some(name),
            Segment::Literal(_) => None,
        }
    }
}

/// Output of [`parse_template`] and [`extract_port_template`]
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedTemplate {
    pub segments: Vec<Segment>,
    pub has_variable: bool,
}

impl ParsedTemplate {
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Names of the variable segments, in order of appearance
    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(Segment::variable_name)
    }

    /// Concatenation of all literal segments
    pub fn literal_text(&self) -> String {
        self.segments
            .iter()
            .filter_map(|s| match s {
                Segment::Literal(value) => Some(value.as_str()),
                Segment::Variable(_) => None,
            })
            .collect()
    }

    /// Render the template, replacing each variable with `render(name)`
    pub fn render_with<F>(&self, mut render: F) -> String
    where
        F: FnMut(&str) -> String,
    {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(value) => out.push_str(value),
                Segment::Variable(name) => out.push_str(&render(name)),
            }
        }
        out
    }

    /// Render variables as colon-prefixed path parameters (`{id}` -> `:id`)
    pub fn to_colon_params(&self) -> String {
        self.render_with(|name| format!(":{}", name))
    }

    /// Rebuild the bracketed template text
    pub fn to_template_string(&self) -> String {
        self.render_with(|name| format!("{{{}}}", name))
    }
}

/// Parse a templated string into literal and variable segments
///
/// # Examples
/// ```
/// use asyncapi_flogo_common::{parse_template, Segment};
///
/// let parsed = parse_template("/orders/{id}");
/// assert!(parsed.has_variable);
/// assert_eq!(
///     parsed.segments,
///     vec![
///         Segment::Literal("/orders/".to_string()),
///         Segment::Variable("id".to_string()),
///     ]
/// );
/// ```
pub fn parse_template(input: &str) -> ParsedTemplate {
    let mut scanner = Scanner::default();
    for ch in input.chars() {
        scanner.push(ch);
    }
    scanner.finish()
}

/// Extract the port portion of a URL as a parsed template
///
/// The scheme is skipped and only the authority (up to the first `/`) is
/// inspected. Bracketed IPv6 literals are not mistaken for a port.
///
/// # Examples
/// ```
/// use asyncapi_flogo_common::{extract_port_template, Segment};
///
/// let port = extract_port_template("broker.example.com:{port}/x");
/// assert_eq!(port.segments, vec![Segment::Variable("port".to_string())]);
///
/// let port = extract_port_template("broker.example.com:9092/x");
/// assert_eq!(port.segments, vec![Segment::Literal("9092".to_string())]);
/// ```
pub fn extract_port_template(url: &str) -> ParsedTemplate {
    let rest = match url.find("://") {
        Some(idx) => &url[idx + 3..],
        None => url,
    };
    let authority = rest.split('/').next().unwrap_or_default();

    let host_end = if authority.starts_with('[') {
        match authority.find(']') {
            Some(idx) => idx + 1,
            None => return ParsedTemplate::default(),
        }
    } else {
        0
    };

    match authority[host_end..].find(':') {
        Some(idx) => parse_template(&authority[host_end + idx + 1..]),
        None => ParsedTemplate::default(),
    }
}

/// Brace scanner
///
/// `{` closes the pending text as a literal and `}` closes it as a variable.
/// Braces are not tracked as pairs, so a stray `}` still names a variable and
/// the text after an unmatched `{` ends up as a literal.
#[derive(Default)]
struct Scanner {
    segments: Vec<Segment>,
    pending: String,
    has_variable: bool,
}

impl Scanner {
    fn push(&mut self, ch: char) {
        match ch {
            '{' => self.flush_literal(),
            '}' => {
                if !self.pending.is_empty() {
                    let name = std::mem::take(&mut self.pending);
                    self.segments.push(Segment::Variable(name));
                    self.has_variable = true;
                }
            }
            _ => self.pending.push(ch),
        }
    }

    fn flush_literal(&mut self) {
        if !self.pending.is_empty() {
            let value = std::mem::take(&mut self.pending);
            self.segments.push(Segment::Literal(value));
        }
    }

    fn finish(mut self) -> ParsedTemplate {
        self.flush_literal();
        ParsedTemplate {
            segments: self.segments,
            has_variable: self.has_variable,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(s: &str) -> Segment {
        Segment::Literal(s.to_string())
    }

    fn var(s: &str) -> Segment {
        Segment::Variable(s.to_string())
    }

    #[test]
    fn test_plain_string_is_one_literal() {
        for input in ["/orders", "broker.example.com", "a:b/c", "x"] {
            let parsed = parse_template(input);
            assert!(!parsed.has_variable);
            assert_eq!(parsed.segments, vec![lit(input)]);
        }
    }

    #[test]
    fn test_empty_input() {
        let parsed = parse_template("");
        assert!(parsed.is_empty());
        assert!(!parsed.has_variable);
    }

    #[test]
    fn test_mixed_segments_keep_order() {
        let parsed = parse_template("mqtt://{host}:{port}/devices");
        assert_eq!(
            parsed.segments,
            vec![
                lit("mqtt://"),
                var("host"),
                lit(":"),
                var("port"),
                lit("/devices"),
            ]
        );
        assert_eq!(parsed.variables().collect::<Vec<_>>(), vec!["host", "port"]);
    }

    #[test]
    fn test_round_trip_balanced_braces() {
        for input in [
            "/orders/{id}",
            "{a}{b}",
            "{scheme}://{host}:{port}/{path}/tail",
            "prefix{x}suffix",
            "no variables",
        ] {
            assert_eq!(parse_template(input).to_template_string(), input);
        }
    }

    #[test]
    fn test_unmatched_open_brace_capture_is_literal() {
        let parsed = parse_template("/a/{broken");
        assert!(!parsed.has_variable);
        assert_eq!(parsed.segments, vec![lit("/a/"), lit("broken")]);
    }

    #[test]
    fn test_stray_close_brace_names_a_variable() {
        let parsed = parse_template("a}b");
        assert!(parsed.has_variable);
        assert_eq!(parsed.segments, vec![var("a"), lit("b")]);
    }

    #[test]
    fn test_nested_open_brace_restarts_capture() {
        let parsed = parse_template("{a{b}");
        assert_eq!(parsed.segments, vec![lit("a"), var("b")]);
    }

    #[test]
    fn test_empty_braces_produce_no_segment() {
        let parsed = parse_template("/a/{}/b");
        assert!(!parsed.has_variable);
        assert_eq!(parsed.segments, vec![lit("/a/"), lit("/b")]);
        assert_eq!(parsed.literal_text(), "/a//b");
    }

    #[test]
    fn test_colon_params() {
        assert_eq!(
            parse_template("/orders/{id}/items/{item}").to_colon_params(),
            "/orders/:id/items/:item"
        );
    }

    #[test]
    fn test_port_variable() {
        let port = extract_port_template("broker.example.com:{port}/x");
        assert!(port.has_variable);
        assert_eq!(port.segments, vec![var("port")]);
    }

    #[test]
    fn test_port_literal() {
        let port = extract_port_template("broker.example.com:9092/x");
        assert!(!port.has_variable);
        assert_eq!(port.segments, vec![lit("9092")]);
    }

    #[test]
    fn test_port_after_scheme() {
        let port = extract_port_template("http://{host}:8080");
        assert_eq!(port.segments, vec![lit("8080")]);

        let port = extract_port_template("tcp://broker:{base}0{suffix}/topics");
        assert_eq!(port.segments, vec![var("base"), lit("0"), var("suffix")]);
    }

    #[test]
    fn test_no_port() {
        assert!(extract_port_template("http://example.com/a:b").is_empty());
        assert!(extract_port_template("example.com").is_empty());
        assert!(extract_port_template("").is_empty());
    }

    #[test]
    fn test_ipv6_host_literal() {
        let port = extract_port_template("mqtt://[::1]:1883");
        assert_eq!(port.segments, vec![lit("1883")]);
        assert!(extract_port_template("mqtt://[::1]/x").is_empty());
    }

    #[test]
    fn test_deterministic() {
        let url = "ws://{host}:{port}/channel";
        assert_eq!(parse_template(url), parse_template(url));
        assert_eq!(extract_port_template(url), extract_port_template(url));
    }
}
