use crate::section::{AccessLogEntry, ParseError};
use chrono::DateTime;

const TIMESTAMP_FORMAT: &str = "%d/%b/%Y:%H:%M:%S %z";

/// Section key for a raw access-log line.
pub fn extract_section(line: &str) -> Result<String, ParseError> {
    parse_line(line).map(|entry| entry.section())
}

/// First path segment of a request path: `/pages/create?x=1` -> `/pages`.
pub fn section_of(path: &str) -> String {
    let path = path.split(['?', '#']).next().unwrap_or_default();

    match path.trim_start_matches('/').split('/').next() {
        Some(first) if !first.is_empty() => format!("/{first}"),
        _ => "/".to_string(),
    }
}

/// Parse a Common Log Format line:
///
/// `host ident authuser [dd/Mon/yyyy:HH:MM:SS +zzzz] "METHOD /path PROTO" status bytes`
pub fn parse_line(line: &str) -> Result<AccessLogEntry, ParseError> {
    let line = line.trim();
    if line.is_empty() {
        return Err(ParseError::Empty);
    }

    let (remote_host, rest) = next_token(line, "remote_host")?;
    let (ident, rest) = next_token(rest, "ident")?;
    let (auth_user, rest) = next_token(rest, "auth_user")?;

    let (raw_ts, rest) = delimited(rest, '[', ']', "timestamp")?;
    let timestamp = DateTime::parse_from_str(raw_ts, TIMESTAMP_FORMAT)
        .map_err(|_| ParseError::Timestamp(raw_ts.to_string()))?;

    let (request, rest) = delimited(rest, '"', '"', "request")?;
    let mut parts = request.split_whitespace();
    let (Some(method), Some(path), Some(protocol), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(ParseError::Request(request.to_string()));
    };

    let mut tail = rest.split_whitespace();
    let raw_status = tail.next().ok_or(ParseError::MissingField("status"))?;
    let status = raw_status
        .parse::<u16>()
        .map_err(|_| ParseError::Status(raw_status.to_string()))?;

    let raw_bytes = tail.next().ok_or(ParseError::MissingField("bytes"))?;
    let bytes = match raw_bytes {
        "-" => 0,
        b => b
            .parse::<u64>()
            .map_err(|_| ParseError::Bytes(b.to_string()))?,
    };

    Ok(AccessLogEntry {
        remote_host: remote_host.to_string(),
        ident: optional(ident),
        auth_user: optional(auth_user),
        timestamp,
        method: method.to_string(),
        path: path.to_string(),
        protocol: protocol.to_string(),
        status,
        bytes,
    })
}

fn next_token<'a>(input: &'a str, field: &'static str) -> Result<(&'a str, &'a str), ParseError> {
    input
        .trim_start()
        .split_once(' ')
        .filter(|(token, _)| !token.is_empty())
        .ok_or(ParseError::MissingField(field))
}

fn delimited<'a>(
    input: &'a str,
    open: char,
    close: char,
    field: &'static str,
) -> Result<(&'a str, &'a str), ParseError> {
    input
        .trim_start()
        .strip_prefix(open)
        .and_then(|s| s.split_once(close))
        .ok_or(ParseError::MissingField(field))
}

fn optional(token: &str) -> Option<String> {
    (token != "-").then(|| token.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};
    use pretty_assertions::assert_eq;

    const LINE: &str =
        r#"127.0.0.1 - james [09/May/2018:16:00:39 +0000] "GET /report HTTP/1.0" 200 123"#;

    #[test]
    fn test_parse_common_log_format() {
        let entry = parse_line(LINE).unwrap();

        assert_eq!(entry.remote_host, "127.0.0.1");
        assert_eq!(entry.ident, None);
        assert_eq!(entry.auth_user.as_deref(), Some("james"));
        assert_eq!(entry.timestamp.year(), 2018);
        assert_eq!(entry.timestamp.month(), 5);
        assert_eq!(entry.timestamp.hour(), 16);
        assert_eq!(entry.method, "GET");
        assert_eq!(entry.path, "/report");
        assert_eq!(entry.protocol, "HTTP/1.0");
        assert_eq!(entry.status, 200);
        assert_eq!(entry.bytes, 123);
    }

    #[test]
    fn test_dash_byte_count_is_zero() {
        let line = r#"10.0.0.2 - - [09/May/2018:16:00:41 +0200] "POST /api/user HTTP/1.1" 304 -"#;
        let entry = parse_line(line).unwrap();

        assert_eq!(entry.bytes, 0);
        assert_eq!(entry.auth_user, None);
        assert_eq!(entry.section(), "/api");
    }

    #[test]
    fn test_section_of() {
        assert_eq!(section_of("/pages/create"), "/pages");
        assert_eq!(section_of("/pages/create?x=1"), "/pages");
        assert_eq!(section_of("/report"), "/report");
        assert_eq!(section_of("/report?q=/a/b"), "/report");
        assert_eq!(section_of("/#top"), "/");
        assert_eq!(section_of("/"), "/");
        assert_eq!(section_of(""), "/");
        assert_eq!(section_of("//double/slash"), "/double");
    }

    #[test]
    fn test_extract_section() {
        assert_eq!(extract_section(LINE).unwrap(), "/report");
    }

    #[test]
    fn test_rejects_malformed_lines() {
        assert_eq!(parse_line("   "), Err(ParseError::Empty));
        assert_eq!(
            parse_line("127.0.0.1 - james"),
            Err(ParseError::MissingField("auth_user"))
        );
        assert_eq!(
            parse_line(r#"127.0.0.1 - james 09/May/2018 "GET / HTTP/1.0" 200 1"#),
            Err(ParseError::MissingField("timestamp"))
        );
        assert_eq!(
            parse_line(r#"127.0.0.1 - james [yesterday] "GET / HTTP/1.0" 200 1"#),
            Err(ParseError::Timestamp("yesterday".into()))
        );
        assert_eq!(
            parse_line(r#"127.0.0.1 - james [09/May/2018:16:00:39 +0000] "GET" 200 1"#),
            Err(ParseError::Request("GET".into()))
        );
        assert_eq!(
            parse_line(r#"127.0.0.1 - james [09/May/2018:16:00:39 +0000] "GET / HTTP/1.0" ok 1"#),
            Err(ParseError::Status("ok".into()))
        );
        assert_eq!(
            parse_line(r#"127.0.0.1 - james [09/May/2018:16:00:39 +0000] "GET / HTTP/1.0" 200"#),
            Err(ParseError::MissingField("bytes"))
        );
    }
}
