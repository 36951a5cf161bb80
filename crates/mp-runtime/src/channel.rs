//! TCP wire protocol for `c_channel`/`s_channel`. Deliberately plain
//! blocking `std::net` rather than an async runtime: every channel
//! operation in this language blocks the calling thread by design, and
//! `par` already supplies the only concurrency this interpreter ever
//! needs, one OS thread per statement.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};

use mp_util::Line;
use tracing::{debug, trace};

use crate::error::{RunResult, RuntimeError};

/// Bytes read for a client channel's greeting.
const GREETING_BUF: usize = 2040;
/// Bytes read per request on a server channel.
const REQUEST_BUF: usize = 2048;

fn io_err(name: &str, line: Line) -> impl FnOnce(std::io::Error) -> RuntimeError + '_ {
    move |source| RuntimeError::ChannelIo {
        name: name.to_string(),
        line,
        source,
    }
}

/// Connects to `host:port`, prints the server's greeting straight to
/// stdout — a real side effect on connect, not merely a returned value
/// — and returns the open socket for the caller to store under `name`.
pub fn connect(name: &str, host: &str, port: &str, line: Line) -> RunResult<TcpStream> {
    debug!(name, host, port, "c_channel connecting");
    let mut stream = TcpStream::connect(format!("{host}:{port}")).map_err(io_err(name, line))?;
    let mut buf = vec![0u8; GREETING_BUF];
    let n = stream.read(&mut buf).map_err(io_err(name, line))?;
    trace!(name, bytes = n, "c_channel received greeting");
    println!("{}", String::from_utf8_lossy(&buf[..n]));
    Ok(stream)
}

/// Binds `host:port`, accepts exactly one connection, sends
/// `description` if non-empty, then invokes `handle` with each
/// decoded request and writes back its stringified result. Returns
/// once the peer closes the connection (an empty read).
pub fn serve(
    name: &str,
    host: &str,
    port: &str,
    description: Option<&str>,
    line: Line,
    mut handle: impl FnMut(&str) -> RunResult<String>,
) -> RunResult<()> {
    debug!(name, host, port, "s_channel binding");
    let listener = TcpListener::bind(format!("{host}:{port}")).map_err(io_err(name, line))?;
    let (mut conn, peer) = listener.accept().map_err(io_err(name, line))?;
    debug!(name, %peer, "s_channel accepted connection");

    if let Some(description) = description {
        if !description.is_empty() {
            conn.write_all(description.as_bytes())
                .map_err(io_err(name, line))?;
        }
    }

    let mut buf = vec![0u8; REQUEST_BUF];
    loop {
        let n = conn.read(&mut buf).map_err(io_err(name, line))?;
        if n == 0 {
            break;
        }
        trace!(name, bytes = n, "s_channel received request");
        let data = String::from_utf8_lossy(&buf[..n]).into_owned();
        let reply = handle(&data)?;
        conn.write_all(reply.as_bytes()).map_err(io_err(name, line))?;
    }
    debug!(name, "s_channel peer closed connection");
    Ok(())
}

/// `send(conn_name, data)`: one write, then a blocking read of the
/// reply.
pub fn send(stream: &mut TcpStream, data: &str, name: &str, line: Line) -> RunResult<String> {
    trace!(name, "send writing request");
    stream
        .write_all(data.as_bytes())
        .map_err(io_err(name, line))?;
    let mut buf = vec![0u8; REQUEST_BUF];
    let n = stream.read(&mut buf).map_err(io_err(name, line))?;
    trace!(name, bytes = n, "send received reply");
    Ok(String::from_utf8_lossy(&buf[..n]).into_owned())
}
