use crate::interface::{ServerAddr, ServerInterface};
use crate::util::{Error, Result};
use dns_lookup::lookup_host;
use socket2::SockRef;
use std::io;
use std::net::{SocketAddr, TcpStream};
use std::sync::mpsc::{channel, Sender};
use std::thread;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

/// Time to wait for each TCP connection attempt
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Read timeout set on connected sockets
pub const READ_TIMEOUT: Duration = Duration::from_secs(2);

/// Outcome of one connection attempt
pub type Connection = (ServerAddr, Option<TcpStream>);

/// Connects to a server on a background thread
///
/// Exactly one `(server, socket)` pair is sent on `sender` when the attempt
/// finishes, with `None` if no address could be reached. Servers marked `s`
/// are connected over plain TCP like `t` servers.
pub fn spawn_connector(server: ServerAddr, sender: Sender<Connection>) -> JoinHandle<()> {
    thread::spawn(move || {
        let stream = match connect(&server) {
            Ok(stream) => {
                info!("Connected to {}", server);
                Some(stream)
            }
            Err(e) => {
                error!("Failed to connect to {}: {}", server, e);
                None
            }
        };
        // The coordinator may have stopped listening
        if sender.send((server, stream)).is_err() {
            debug!("Connection result dropped");
        }
    })
}

/// Resolves the host and tries each address in order until one accepts
pub fn connect(server: &ServerAddr) -> Result<TcpStream> {
    info!("Looking up DNS {:?}", server.host);
    let ips = lookup_host(&server.host)?;

    for ip in ips {
        let addr = SocketAddr::new(ip, server.port);
        let stream = match TcpStream::connect_timeout(&addr, CONNECT_TIMEOUT) {
            Ok(stream) => stream,
            Err(e) => {
                warn!("Failed to connect to {}: {}", addr, e);
                continue;
            }
        };
        if let Err(e) = configure(&stream) {
            warn!("Failed to configure socket for {}: {}", addr, e);
            continue;
        }
        return Ok(stream);
    }

    let msg = format!("No reachable address for {}", server.host);
    Err(Error::IOError(io::Error::new(io::ErrorKind::NotConnected, msg)))
}

fn configure(stream: &TcpStream) -> io::Result<()> {
    stream.set_nodelay(true)?;
    stream.set_read_timeout(Some(READ_TIMEOUT))?;
    SockRef::from(stream).set_keepalive(true)
}

/// Races connectors to every server and returns an interface to the first that answers
///
/// Servers that cannot be connected to are skipped. Returns `None` if none
/// connect within `wait`.
pub fn connect_first(servers: &[ServerAddr], wait: Duration) -> Option<ServerInterface<TcpStream>> {
    let (sender, receiver) = channel();
    for server in servers {
        spawn_connector(server.clone(), sender.clone());
    }
    drop(sender);

    let mut pending = servers.len();

    let deadline = Instant::now() + wait;
    while pending > 0 {
        let remaining = deadline.saturating_duration_since(Instant::now());
        match receiver.recv_timeout(remaining) {
            Ok((server, Some(stream))) => return Some(ServerInterface::new(server, stream)),
            Ok((_, None)) => pending -= 1,
            Err(_) => break,
        }
    }
    None
}
