/// Represents a parsed HTTP request from a client.
///
/// The method is carried as the raw token: the server itself only
/// distinguishes HEAD, and gateway-bound requests may use any verb, which is
/// forwarded verbatim to the application. Only three headers are interpreted;
/// everything else in the request head is ignored. The raw bytes are retained
/// because the gateway hands them to the application as its input blob.
#[derive(Debug, Clone)]
pub struct Request {
    /// The HTTP method token (e.g. "GET", "HEAD")
    pub method: String,
    /// The request path (e.g., "/static/index.html")
    pub path: String,
    /// `If-Modified-Since` header value, if present
    pub if_modified_since: Option<String>,
    /// `If-None-Match` header value, if present
    pub if_none_match: Option<String>,
    /// `Range` header value, if present
    pub range: Option<String>,
    /// The raw request bytes as read from the socket
    pub raw: Vec<u8>,
}

impl Request {
    /// Whether the response body should be suppressed.
    pub fn is_head(&self) -> bool {
        self.method == "HEAD"
    }
}
