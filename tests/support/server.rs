//! Minimal scripted HTTP server for client tests.
//!
//! [`serve`] answers one canned response per connection, in order.
//! [`serve_routes`] answers every connection with the first response whose
//! key appears in the request. Both count requests and close each
//! connection after responding.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use url::Url;

pub struct ScriptedServer {
    pub url: Url,
    hits: Arc<AtomicUsize>,
}

impl ScriptedServer {
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

pub fn response(status: &str, headers: &[(&str, &str)], body: &str) -> String {
    let mut out = format!("HTTP/1.1 {status}\r\n");
    for (name, value) in headers {
        out.push_str(&format!("{name}: {value}\r\n"));
    }
    out.push_str(&format!(
        "content-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
        body.len()
    ));
    out
}

pub async fn serve(responses: Vec<String>) -> ScriptedServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&hits);

    tokio::spawn(async move {
        for canned in responses {
            let Ok((mut socket, _)) = listener.accept().await else {
                return;
            };
            counter.fetch_add(1, Ordering::SeqCst);
            read_request(&mut socket).await;
            let _ = socket.write_all(canned.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    });

    ScriptedServer {
        url: Url::parse(&format!("http://{addr}/")).expect("url"),
        hits,
    }
}

/// Serve until dropped, routing on request line, headers and body.
/// Unmatched requests get a 404.
pub async fn serve_routes(routes: Vec<(&'static str, String)>) -> ScriptedServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&hits);
    let routes = Arc::new(routes);

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                return;
            };
            counter.fetch_add(1, Ordering::SeqCst);
            let routes = Arc::clone(&routes);
            tokio::spawn(async move {
                let request = read_request(&mut socket).await;
                let canned = routes
                    .iter()
                    .find(|(key, _)| request.contains(key))
                    .map_or_else(|| response("404 Not Found", &[], "{}"), |(_, r)| r.clone());
                let _ = socket.write_all(canned.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    ScriptedServer {
        url: Url::parse(&format!("http://{addr}/")).expect("url"),
        hits,
    }
}

async fn read_request(socket: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let Ok(n) = socket.read(&mut chunk).await else {
            break;
        };
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        let Some(end) = find(&buf, b"\r\n\r\n") else {
            continue;
        };
        let head = String::from_utf8_lossy(&buf[..end]).to_ascii_lowercase();
        let body_len = head
            .lines()
            .find_map(|l| l.strip_prefix("content-length:"))
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(0);
        if buf.len() >= end + 4 + body_len {
            break;
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}
