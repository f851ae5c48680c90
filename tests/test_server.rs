//! End-to-end tests over real sockets: one request per connection, closed
//! by the server after the response.

use std::fs;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use ember::config::Config;
use ember::gateway::HelloApp;
use ember::server::listener::Server;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

fn temp_root(name: &str) -> PathBuf {
    let root = std::env::temp_dir().join(format!("ember-server-{}-{}", name, std::process::id()));
    let _ = fs::remove_dir_all(&root);
    fs::create_dir_all(&root).unwrap();
    root
}

/// Binds on an ephemeral port (TLS off, since 0 != 8443) and serves in the
/// background.
async fn spawn_server(static_root: PathBuf) -> SocketAddr {
    let config = Config {
        listen_addr: "127.0.0.1:0".to_string(),
        tls_cert: PathBuf::from("cert.pem"),
        tls_key: PathBuf::from("key.pem"),
        static_root,
    };

    let server = Server::bind(config, Arc::new(HelloApp)).await.unwrap();
    let addr = server.local_addr().unwrap();

    tokio::spawn(async move {
        let _ = server.serve().await;
    });

    addr
}

/// Sends one request and reads until the server closes the connection.
async fn roundtrip(addr: SocketAddr, request: &str) -> Vec<u8> {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(request.as_bytes()).await.unwrap();

    let mut response = Vec::new();
    stream.read_to_end(&mut response).await.unwrap();
    response
}

fn body_of(response: &[u8]) -> &[u8] {
    let pos = response
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .expect("no header/body separator");
    &response[pos + 4..]
}

fn header_of<'a>(response: &'a [u8], key: &str) -> Option<String> {
    let text = String::from_utf8_lossy(response);
    let head = text.split("\r\n\r\n").next()?;
    let prefix = format!("{}: ", key);
    head.lines()
        .find(|l| l.starts_with(&prefix))
        .map(|l| l[prefix.len()..].to_string())
}

#[tokio::test]
async fn test_static_file_roundtrip() {
    let root = temp_root("roundtrip");
    fs::write(root.join("index.html"), b"<h1>hello</h1>").unwrap();
    let addr = spawn_server(root).await;

    let resp = roundtrip(addr, "GET /static/index.html HTTP/1.1\r\n\r\n").await;

    assert!(resp.starts_with(b"HTTP/1.1 200 OK\r\n"));
    assert!(header_of(&resp, "ETag").is_some());
    assert!(header_of(&resp, "Last-Modified").is_some());
    assert_eq!(header_of(&resp, "Connection").as_deref(), Some("close"));
    assert_eq!(body_of(&resp), b"<h1>hello</h1>");
}

#[tokio::test]
async fn test_etag_revalidation_roundtrip() {
    let root = temp_root("revalidate");
    fs::write(root.join("page.html"), b"cache me").unwrap();
    let addr = spawn_server(root).await;

    let first = roundtrip(addr, "GET /static/page.html HTTP/1.1\r\n\r\n").await;
    let etag = header_of(&first, "ETag").unwrap();

    let second = roundtrip(
        addr,
        &format!("GET /static/page.html HTTP/1.1\r\nIf-None-Match: {}\r\n\r\n", etag),
    )
    .await;

    assert!(second.starts_with(b"HTTP/1.1 304 Not Modified\r\n"));
    assert!(body_of(&second).is_empty());
}

#[tokio::test]
async fn test_last_modified_revalidation_roundtrip() {
    let root = temp_root("ims");
    fs::write(root.join("page.html"), b"cache me").unwrap();
    let addr = spawn_server(root).await;

    let first = roundtrip(addr, "GET /static/page.html HTTP/1.1\r\n\r\n").await;
    let last_modified = header_of(&first, "Last-Modified").unwrap();

    let second = roundtrip(
        addr,
        &format!(
            "GET /static/page.html HTTP/1.1\r\nIf-Modified-Since: {}\r\n\r\n",
            last_modified
        ),
    )
    .await;

    assert!(second.starts_with(b"HTTP/1.1 304 Not Modified\r\n"));
}

#[tokio::test]
async fn test_range_roundtrip() {
    let root = temp_root("range");
    let content: Vec<u8> = (0..1000u32).map(|i| (i % 251) as u8).collect();
    fs::write(root.join("movie.bin"), &content).unwrap();
    let addr = spawn_server(root).await;

    let resp = roundtrip(
        addr,
        "GET /static/movie.bin HTTP/1.1\r\nRange: bytes=0-99\r\n\r\n",
    )
    .await;

    assert!(resp.starts_with(b"HTTP/1.1 206 Partial Content\r\n"));
    assert_eq!(
        header_of(&resp, "Content-Range").as_deref(),
        Some("bytes 0-99/1000")
    );
    assert_eq!(body_of(&resp), &content[..100]);
}

#[tokio::test]
async fn test_traversal_roundtrip() {
    let base = temp_root("traversal");
    let root = base.join("root");
    fs::create_dir_all(&root).unwrap();
    fs::write(base.join("secret.txt"), b"top secret").unwrap();
    let addr = spawn_server(root).await;

    let resp = roundtrip(addr, "GET /static/../secret.txt HTTP/1.1\r\n\r\n").await;

    assert!(resp.starts_with(b"HTTP/1.1 404 Not Found\r\n"));
}

#[tokio::test]
async fn test_head_matches_get_headers() {
    let root = temp_root("head");
    fs::write(root.join("a.txt"), b"twelve bytes").unwrap();
    let addr = spawn_server(root).await;

    let get_resp = roundtrip(addr, "GET /static/a.txt HTTP/1.1\r\n\r\n").await;
    let head_resp = roundtrip(addr, "HEAD /static/a.txt HTTP/1.1\r\n\r\n").await;

    assert!(head_resp.starts_with(b"HTTP/1.1 200 OK\r\n"));
    assert!(body_of(&head_resp).is_empty());
    assert_eq!(
        header_of(&head_resp, "Content-Length"),
        header_of(&get_resp, "Content-Length")
    );
}

#[tokio::test]
async fn test_gateway_roundtrip() {
    let root = temp_root("gateway");
    let addr = spawn_server(root).await;

    let resp = roundtrip(addr, "GET /hello HTTP/1.1\r\n\r\n").await;

    assert!(resp.starts_with(b"HTTP/1.1 200 OK\r\n"));
    assert!(header_of(&resp, "Date").is_some());
    assert!(header_of(&resp, "Server").is_some());
    assert_eq!(body_of(&resp), b"Hello from GET /hello\n");
}

#[tokio::test]
async fn test_unlisted_method_reaches_gateway() {
    let root = temp_root("trace");
    let addr = spawn_server(root).await;

    let resp = roundtrip(addr, "TRACE /hello HTTP/1.1\r\n\r\n").await;

    assert!(resp.starts_with(b"HTTP/1.1 200 OK\r\n"));
    assert_eq!(body_of(&resp), b"Hello from TRACE /hello\n");
}

#[tokio::test]
async fn test_malformed_request_closes_without_response() {
    let root = temp_root("malformed");
    let addr = spawn_server(root).await;

    let resp = roundtrip(addr, "NONSENSE\r\n\r\n").await;

    assert!(resp.is_empty());
}

#[tokio::test]
async fn test_concurrent_connections_are_independent() {
    let root = temp_root("concurrent");
    for i in 0..50 {
        fs::write(root.join(format!("file-{i}.txt")), format!("content of file {i}")).unwrap();
    }
    let addr = spawn_server(root).await;

    let mut handles = Vec::new();
    for i in 0..50 {
        handles.push(tokio::spawn(async move {
            let resp = roundtrip(addr, &format!("GET /static/file-{i}.txt HTTP/1.1\r\n\r\n")).await;
            (i, resp)
        }));
    }

    for handle in handles {
        let (i, resp) = handle.await.unwrap();
        assert!(resp.starts_with(b"HTTP/1.1 200 OK\r\n"), "request {i}");
        assert_eq!(
            body_of(&resp),
            format!("content of file {i}").as_bytes(),
            "cross-connection mixup on request {i}"
        );
    }
}
