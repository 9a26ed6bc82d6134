// Reusable listener module
// Creates TCP listeners through socket2 so the backlog is configurable

use socket2::{Domain, Protocol, Socket, Type};
use tokio::net::TcpListener;
use tracing::debug;

/// Create a `TcpListener` with `SO_REUSEADDR` enabled.
///
/// The address can be rebound right after a restart even while old
/// connections sit in `TIME_WAIT`.
pub fn create_reusable_listener(
    addr: std::net::SocketAddr,
    backlog: i32,
) -> std::io::Result<TcpListener> {
    let domain = if addr.is_ipv4() {
        Domain::IPV4
    } else {
        Domain::IPV6
    };

    let socket = Socket::new(domain, Type::STREAM, Some(Protocol::TCP))?;
    socket.set_reuse_address(true)?;

    // Required before handing the socket to tokio
    socket.set_nonblocking(true)?;

    socket.bind(&addr.into())?;
    socket.listen(backlog)?;
    debug!(%addr, backlog, "listener bound");

    let std_listener: std::net::TcpListener = socket.into();
    TcpListener::from_std(std_listener)
}
