use ember::http::parser::{ParseError, parse_request};

#[test]
fn test_parse_request_line() {
    let req = b"GET /static/index.html HTTP/1.1\r\nHost: example.com\r\n\r\n";

    let parsed = parse_request(req).unwrap();

    assert_eq!(parsed.method, "GET");
    assert_eq!(parsed.path, "/static/index.html");
    assert!(!parsed.is_head());
}

#[test]
fn test_parse_head_request() {
    let req = b"HEAD /static/movie.bin HTTP/1.1\r\n\r\n";

    let parsed = parse_request(req).unwrap();

    assert_eq!(parsed.method, "HEAD");
    assert!(parsed.is_head());
}

#[test]
fn test_parse_any_method_token() {
    // The method is not whitelisted; unlisted verbs are forwarded to the
    // gateway rather than treated as protocol errors.
    let parsed = parse_request(b"TRACE /hello HTTP/1.1\r\n\r\n").unwrap();

    assert_eq!(parsed.method, "TRACE");
    assert_eq!(parsed.path, "/hello");
}

#[test]
fn test_parse_recognized_headers() {
    let req = b"GET /static/a.txt HTTP/1.1\r\n\
        If-Modified-Since: Sat, 29 Aug 2026 10:00:00 GMT\r\n\
        If-None-Match: \"abc123\"\r\n\
        Range: bytes=0-99\r\n\r\n";

    let parsed = parse_request(req).unwrap();

    assert_eq!(
        parsed.if_modified_since.as_deref(),
        Some("Sat, 29 Aug 2026 10:00:00 GMT")
    );
    assert_eq!(parsed.if_none_match.as_deref(), Some("\"abc123\""));
    assert_eq!(parsed.range.as_deref(), Some("bytes=0-99"));
}

#[test]
fn test_parse_ignores_other_headers() {
    let req = b"GET / HTTP/1.1\r\n\
        Host: example.com\r\n\
        User-Agent: test\r\n\
        Accept: */*\r\n\r\n";

    let parsed = parse_request(req).unwrap();

    assert!(parsed.if_modified_since.is_none());
    assert!(parsed.if_none_match.is_none());
    assert!(parsed.range.is_none());
}

#[test]
fn test_parse_malformed_request_line() {
    assert!(matches!(
        parse_request(b"GET\r\n\r\n"),
        Err(ParseError::InvalidRequest)
    ));
    assert!(matches!(
        parse_request(b"GET /path\r\n\r\n"),
        Err(ParseError::InvalidRequest)
    ));
}

#[test]
fn test_parse_rejects_extra_request_line_tokens() {
    // The request line is a three-way unpack; trailing tokens are malformed.
    assert!(matches!(
        parse_request(b"GET / HTTP/1.1 junk\r\n\r\n"),
        Err(ParseError::InvalidRequest)
    ));
}

#[test]
fn test_parse_undecodable_bytes() {
    let req = [0xff, 0xfe, 0x00, 0x01, b'\r', b'\n'];

    assert!(matches!(
        parse_request(&req),
        Err(ParseError::InvalidRequest)
    ));
}

#[test]
fn test_parse_retains_raw_bytes() {
    let req = b"POST /submit HTTP/1.1\r\nContent-Type: text/plain\r\n\r\nhello";

    let parsed = parse_request(req).unwrap();

    assert_eq!(parsed.method, "POST");
    assert_eq!(parsed.raw, req.to_vec());
}
