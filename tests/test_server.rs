//! End-to-end tests over loopback TCP.

mod common;

use std::net::SocketAddr;
use std::sync::Arc;

use common::{RawResponse, ScratchDir};
use tempest::fs::Directory;
use tempest::server::acceptor::{Acceptor, spawn_per_connection};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

async fn start(root: Arc<Directory>) -> SocketAddr {
    let acceptor = Acceptor::bind("127.0.0.1:0").await.unwrap();
    let addr = acceptor.local_addr().unwrap();
    tokio::spawn(acceptor.run(spawn_per_connection(root)));
    addr
}

async fn request(addr: SocketAddr, raw: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut stream = TcpStream::connect(addr).await?;
    stream.write_all(raw).await?;
    stream.shutdown().await?;

    let mut response = Vec::new();
    stream.read_to_end(&mut response).await?;
    Ok(response)
}

#[tokio::test]
async fn test_serves_file_over_tcp() {
    let dir = ScratchDir::new("tcp");
    dir.write("index.html", b"<h1>It works</h1>");
    let addr = start(Arc::new(Directory::optimal(dir.path()).unwrap())).await;

    let raw = request(addr, b"GET /index.html HTTP/1.0\r\nHost: localhost\r\n\r\n")
        .await
        .unwrap();
    let response = RawResponse::parse(&raw);

    assert_eq!(response.status_line, "HTTP/1.0 200 OK");
    assert_eq!(response.content_length(), 17);
    assert_eq!(response.body, b"<h1>It works</h1>");
}

#[cfg(target_os = "linux")]
#[tokio::test]
async fn test_sendfile_transmits_large_file() {
    let dir = ScratchDir::new("sendfile");
    let contents: Vec<u8> = (0..3_000_000u32).map(|i| (i % 253) as u8).collect();
    dir.write("big.bin", &contents);
    let addr = start(Arc::new(Directory::accelerated(dir.path()).unwrap())).await;

    let raw = request(addr, b"GET /big.bin HTTP/1.0\r\n\r\n").await.unwrap();
    let response = RawResponse::parse(&raw);

    assert_eq!(response.status(), 200);
    assert_eq!(response.content_length(), contents.len());
    assert!(response.body == contents);
}

#[tokio::test]
async fn test_portable_over_tcp() {
    let dir = ScratchDir::new("portable-tcp");
    let contents = vec![b'x'; 100_000];
    dir.write("blob", &contents);
    let addr = start(Arc::new(Directory::portable(dir.path()).unwrap())).await;

    let raw = request(addr, b"GET /blob HTTP/1.0\r\n\r\n").await.unwrap();
    let response = RawResponse::parse(&raw);

    assert_eq!(response.content_length(), contents.len());
    assert!(response.body == contents);
}

#[tokio::test]
async fn test_parse_failure_does_not_stop_acceptor() {
    let dir = ScratchDir::new("recover");
    dir.write("ok.txt", b"still serving");
    let addr = start(Arc::new(Directory::optimal(dir.path()).unwrap())).await;

    // cut off before the end of the header block
    let _ = request(addr, b"GET /ok.txt HTTP/1.0\r\nHost: x").await;
    let _ = request(addr, b"").await;

    let raw = request(addr, b"GET /ok.txt HTTP/1.0\r\n\r\n").await.unwrap();
    let response = RawResponse::parse(&raw);

    assert_eq!(response.status(), 200);
    assert_eq!(response.body, b"still serving");
}

#[tokio::test]
async fn test_concurrent_connections() {
    let dir = ScratchDir::new("concurrent");
    for i in 0..8 {
        dir.write(&format!("file{}.txt", i), format!("contents {}", i).as_bytes());
    }
    let addr = start(Arc::new(Directory::optimal(dir.path()).unwrap())).await;

    let mut tasks = Vec::new();
    for i in 0..8 {
        tasks.push(tokio::spawn(async move {
            let req = format!("GET /file{}.txt HTTP/1.0\r\n\r\n", i);
            let raw = request(addr, req.as_bytes()).await.unwrap();
            (i, RawResponse::parse(&raw).body)
        }));
    }

    for task in tasks {
        let (i, body) = task.await.unwrap();
        assert_eq!(body, format!("contents {}", i).into_bytes());
    }
}

#[tokio::test]
async fn test_hung_client_does_not_block_others() {
    let dir = ScratchDir::new("hung");
    dir.write("a.txt", b"A");
    let addr = start(Arc::new(Directory::optimal(dir.path()).unwrap())).await;

    // never finishes its request
    let mut idle = TcpStream::connect(addr).await.unwrap();
    idle.write_all(b"GET /a.txt HTTP/1.0\r\n").await.unwrap();

    let raw = request(addr, b"GET /a.txt HTTP/1.0\r\n\r\n").await.unwrap();
    assert_eq!(RawResponse::parse(&raw).body, b"A");

    drop(idle);
}
