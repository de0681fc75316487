//! Local servers and helpers for probe integration tests.
#![allow(dead_code)]

use futures::{SinkExt, StreamExt};
use protoprobe_core::{OutputFormat, ProbeReport, ProbeSpec, Reporter, Runner};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, UdpSocket};
use tokio::task::JoinHandle;

/// Run the given future with a timeout, failing the test if it elapses.
pub async fn run_with_timeout<F, T>(duration: Duration, fut: F) -> T
where
    F: std::future::Future<Output = T>,
{
    tokio::time::timeout(duration, fut)
        .await
        .expect("test timed out")
}

/// Run one probe through a quiet text reporter and return the report and
/// everything that was printed.
pub async fn probe_transcript(spec: ProbeSpec) -> (ProbeReport, String) {
    probe_output(spec, OutputFormat::Text).await
}

/// Same as [`probe_transcript`] with an explicit format.
pub async fn probe_output(spec: ProbeSpec, format: OutputFormat) -> (ProbeReport, String) {
    let mut runner = Runner::new(Reporter::new(Vec::new(), format).quiet(true));
    let report = run_with_timeout(Duration::from_secs(20), runner.run_one(spec))
        .await
        .expect("writing to a Vec cannot fail");
    let out = String::from_utf8(runner.into_reporter().into_inner()).unwrap();
    (report, out)
}

/// A port on 127.0.0.1 with nothing listening on it.
pub fn closed_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

/// A UDP port on 127.0.0.1 that is currently free.
pub fn free_udp_port() -> u16 {
    let socket = std::net::UdpSocket::bind("127.0.0.1:0").unwrap();
    socket.local_addr().unwrap().port()
}

/// HTTP/1.1 server answering one request with `body`.
pub async fn http_server(body: &'static str) -> (SocketAddr, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                return;
            }
            request.extend_from_slice(&buf[..n]);
        }
        assert!(request.starts_with(b"GET / HTTP/1.1\r\n"));
        let response = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            body.len(),
            body
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();
    });
    (addr, handle)
}

/// TCP server that echoes one read back, then reports whether the client
/// closed its side afterwards.
pub async fn tcp_echo_server() -> (SocketAddr, JoinHandle<bool>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = [0u8; 1024];
        let n = socket.read(&mut buf).await.unwrap();
        socket.write_all(&buf[..n]).await.unwrap();
        // EOF means the probe dropped its stream
        let rest = tokio::time::timeout(Duration::from_secs(5), socket.read(&mut buf)).await;
        matches!(rest, Ok(Ok(0)) | Ok(Err(_)))
    });
    (addr, handle)
}

/// TCP server that reads the greeting and hangs up without replying.
pub async fn tcp_hangup_server() -> (SocketAddr, JoinHandle<Vec<u8>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = [0u8; 1024];
        let n = socket.read(&mut buf).await.unwrap();
        buf[..n].to_vec()
    });
    (addr, handle)
}

/// TCP server that reads the greeting, never replies, and reports whether
/// the client closed its side within `wait`.
pub async fn tcp_silent_server(wait: Duration) -> (SocketAddr, JoinHandle<bool>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = [0u8; 1024];
        let _ = socket.read(&mut buf).await.unwrap();
        let rest = tokio::time::timeout(wait, socket.read(&mut buf)).await;
        matches!(rest, Ok(Ok(0)) | Ok(Err(_)))
    });
    (addr, handle)
}

/// UDP listener that answers the first datagram with `reply` and returns
/// what it received.
pub async fn udp_reply_server(reply: &'static [u8]) -> (SocketAddr, JoinHandle<Vec<u8>>) {
    let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let addr = socket.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        let mut buf = [0u8; 1024];
        let (n, peer) = socket.recv_from(&mut buf).await.unwrap();
        socket.send_to(reply, peer).await.unwrap();
        buf[..n].to_vec()
    });
    (addr, handle)
}

/// WebSocket server that echoes the first text frame.
pub async fn ws_echo_server() -> (SocketAddr, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
        while let Some(Ok(msg)) = ws.next().await {
            if msg.is_text() || msg.is_binary() {
                ws.send(msg).await.unwrap();
                break;
            }
        }
        // Drain until the client closes
        while let Some(Ok(_)) = ws.next().await {}
    });
    (addr, handle)
}
