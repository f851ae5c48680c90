use crate::http::request::Request;

#[derive(Debug, PartialEq, Eq)]
pub enum ParseError {
    InvalidRequest,
}

/// Parses one inbound chunk into a request.
///
/// The request line must be exactly `<METHOD> <PATH> <PROTOCOL>`; the
/// protocol token is required but otherwise ignored, and the method token is
/// not whitelisted — unknown verbs flow through to the gateway. Of the header
/// lines, exactly `If-Modified-Since`, `If-None-Match`, and `Range` are
/// recognized; any other header is skipped. Undecodable bytes or a malformed
/// request line are protocol errors that close the connection without a
/// response.
pub fn parse_request(buf: &[u8]) -> Result<Request, ParseError> {
    let text = std::str::from_utf8(buf).map_err(|_| ParseError::InvalidRequest)?;

    let mut lines = text.split("\r\n");

    // Request line: three tokens, no more, no fewer.
    let request_line = lines.next().ok_or(ParseError::InvalidRequest)?;
    let mut parts = request_line.split_whitespace();

    let method = parts.next().ok_or(ParseError::InvalidRequest)?;
    let path = parts.next().ok_or(ParseError::InvalidRequest)?;
    let _protocol = parts.next().ok_or(ParseError::InvalidRequest)?;
    if parts.next().is_some() {
        return Err(ParseError::InvalidRequest);
    }

    // Recognized headers only; the blank line ends the head.
    let mut if_modified_since = None;
    let mut if_none_match = None;
    let mut range = None;

    for line in lines {
        if line.is_empty() {
            break;
        }
        if let Some(value) = line.strip_prefix("If-Modified-Since:") {
            if_modified_since = Some(value.trim().to_string());
        } else if let Some(value) = line.strip_prefix("If-None-Match:") {
            if_none_match = Some(value.trim().to_string());
        } else if let Some(value) = line.strip_prefix("Range:") {
            range = Some(value.trim().to_string());
        }
    }

    Ok(Request {
        method: method.to_string(),
        path: path.to_string(),
        if_modified_since,
        if_none_match,
        range,
        raw: buf.to_vec(),
    })
}
