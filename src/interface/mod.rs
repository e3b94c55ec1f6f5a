//! Connections to Electrum-style servers
//!
//! Servers speak newline-delimited JSON. Connectors open TCP sockets on
//! background threads and report back over a channel. A `ServerInterface`
//! wraps one connected socket, tracks which requests are still outstanding,
//! and matches responses back to them.
//!
//! # Examples
//!
//! Query the first server that answers:
//!
//! ```no_run, rust
//! use lightwallet::interface::{connect_first, ServerAddr};
//! use std::time::Duration;
//!
//! let servers = vec![
//!     ServerAddr::parse("electrum1.example.com:50001:t").unwrap(),
//!     ServerAddr::parse("electrum2.example.com:50001:t").unwrap(),
//! ];
//! let mut interface = connect_first(&servers, Duration::from_secs(10)).unwrap();
//!
//! interface.queue_request("server.version", vec![], 0);
//! interface.send_requests().unwrap();
//!
//! loop {
//!     for (request, response) in interface.get_responses() {
//!         match (request, response) {
//!             (Some(request), Some(response)) => { /* Response to request */ }
//!             (None, Some(notification)) => { /* Subscription update */ }
//!             _ => { /* Protocol violation or closed */ }
//!         }
//!     }
//!     if interface.is_closed() || interface.has_timed_out() {
//!         break;
//!     }
//!     if interface.ping_required() {
//!         interface.queue_request("server.ping", vec![], 1);
//!         interface.send_requests().unwrap();
//!     }
//! }
//! ```

mod connector;
mod interface;
mod pipe;
mod server;

pub use self::connector::{
    connect, connect_first, spawn_connector, Connection, CONNECT_TIMEOUT, READ_TIMEOUT,
};
pub use self::interface::{Request, ServerInterface, IDLE_TIMEOUT, PING_INTERVAL, REQUEST_TIMEOUT};
pub use self::pipe::{JsonPipe, PipeEvent, Transport, MAX_LINE_LEN};
pub use self::server::{Protocol, ServerAddr};
