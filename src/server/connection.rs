//! One accepted client, seen as a request source and a response sink.
//!
//! Directory and response code only ever touch [`Sender`], which is a plain
//! [`AsyncWrite`]. The one escape hatch is [`Sender::raw_response`], present
//! only when the sink is backed by a real socket on a platform with a
//! zero-copy file transmission primitive.

use std::io;
use std::net::SocketAddr;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, BufWriter};
use tokio::net::TcpStream;
use tokio::net::tcp::OwnedWriteHalf;

/// Buffered byte stream the request head is parsed from.
pub type Receiver = BufReader<Box<dyn AsyncRead + Send + Sync + Unpin>>;

pub struct Connection {
    peer: Option<SocketAddr>,
    receiver: Receiver,
    sender: Sender,
}

impl Connection {
    /// Wraps an accepted TCP socket.
    pub fn tcp(stream: TcpStream) -> Self {
        let peer = stream.peer_addr().ok();
        let (read_half, write_half) = stream.into_split();
        Self {
            peer,
            receiver: BufReader::new(Box::new(read_half)),
            sender: Sender::new(Sink::Socket(write_half)),
        }
    }

    /// Wraps any bidirectional byte stream. The result never exposes a raw
    /// descriptor, so file transmission always goes through the buffered copy.
    pub fn from_io<S>(io: S) -> Self
    where
        S: AsyncRead + AsyncWrite + Send + Sync + 'static,
    {
        let (read_half, write_half) = tokio::io::split(io);
        Self {
            peer: None,
            receiver: BufReader::new(Box::new(read_half)),
            sender: Sender::new(Sink::Stream(Box::new(write_half))),
        }
    }

    /// Label used in log lines.
    pub fn peer_label(&self) -> String {
        match self.peer {
            Some(addr) => addr.to_string(),
            None => "<in-memory>".to_string(),
        }
    }

    pub fn request(&mut self) -> &mut Receiver {
        &mut self.receiver
    }

    pub fn sender(&mut self) -> &mut Sender {
        &mut self.sender
    }

    /// Flushes whatever is still buffered and closes both directions.
    ///
    /// Consumes the connection, so it runs at most once.
    pub async fn shutdown(self) -> io::Result<()> {
        let Connection {
            receiver,
            mut sender,
            ..
        } = self;
        let result = sender.sink.shutdown().await;
        drop(receiver);
        result
    }

    /// Tears the connection down without flushing pending response bytes.
    pub fn abort(self) {
        drop(self);
    }
}

enum Sink {
    Socket(OwnedWriteHalf),
    Stream(Box<dyn AsyncWrite + Send + Sync + Unpin>),
}

impl AsyncWrite for Sink {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        match self.get_mut() {
            Sink::Socket(half) => Pin::new(half).poll_write(cx, buf),
            Sink::Stream(stream) => Pin::new(stream).poll_write(cx, buf),
        }
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            Sink::Socket(half) => Pin::new(half).poll_flush(cx),
            Sink::Stream(stream) => Pin::new(stream).poll_flush(cx),
        }
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            Sink::Socket(half) => Pin::new(half).poll_shutdown(cx),
            Sink::Stream(stream) => Pin::new(stream).poll_shutdown(cx),
        }
    }
}

/// The response side of a [`Connection`].
pub struct Sender {
    sink: BufWriter<Sink>,
}

impl Sender {
    fn new(sink: Sink) -> Self {
        Self {
            sink: BufWriter::new(sink),
        }
    }

    /// The socket behind this sink, if zero-copy transmission is possible.
    ///
    /// Bytes written through the raw socket bypass the write buffer, so the
    /// caller must flush before using it.
    #[cfg(target_os = "linux")]
    pub fn raw_response(&self) -> Option<RawSocket<'_>> {
        match self.sink.get_ref() {
            Sink::Socket(half) => Some(RawSocket {
                stream: half.as_ref(),
            }),
            Sink::Stream(_) => None,
        }
    }
}

impl AsyncWrite for Sender {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        Pin::new(&mut self.get_mut().sink).poll_write(cx, buf)
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().sink).poll_flush(cx)
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().sink).poll_shutdown(cx)
    }
}

/// Borrowed access to the raw socket descriptor of a [`Sender`].
#[cfg(target_os = "linux")]
pub struct RawSocket<'a> {
    stream: &'a TcpStream,
}

#[cfg(target_os = "linux")]
impl RawSocket<'_> {
    pub fn as_raw_fd(&self) -> std::os::fd::RawFd {
        use std::os::fd::AsRawFd;
        self.stream.as_raw_fd()
    }

    /// Runs `op` on the descriptor once the socket is writable, retrying
    /// whenever `op` reports `WouldBlock`.
    pub async fn write_with<T, F>(&self, mut op: F) -> io::Result<T>
    where
        F: FnMut(std::os::fd::RawFd) -> io::Result<T>,
    {
        let fd = self.as_raw_fd();
        self.stream
            .async_io(tokio::io::Interest::WRITABLE, || op(fd))
            .await
    }
}
