use crate::interface::pipe::{JsonPipe, PipeEvent, Transport};
use crate::interface::ServerAddr;
use crate::util::{Error, Result};
use linked_hash_map::LinkedHashMap;
use serde::Serialize;
use serde_json::{self, Value};
use snowflake::ProcessUniqueId;
use std::fmt;
use std::mem;
use std::time::{Duration, Instant};

/// Minimum time between pings
pub const PING_INTERVAL: Duration = Duration::from_secs(60);

/// Time since the last queued request before outstanding requests count as late
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Time without wire traffic before outstanding requests count as late
pub const IDLE_TIMEOUT: Duration = Duration::from_secs(10);

/// A JSON-RPC style request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Request {
    pub method: String,
    pub params: Vec<Value>,
    pub id: u64,
}

/// Request/response session with one server
///
/// Requests are queued, then written in a batch by `send_requests`. Responses
/// are matched back to requests by id. The interface never blocks on reads, so
/// the owner polls `get_responses` and decides when to ping or give up using
/// `ping_required` and `has_timed_out`. Once closed, locally or by the server,
/// it may no longer be used.
pub struct ServerInterface<T: Transport> {
    /// Unique id for this session
    pub id: ProcessUniqueId,
    server: ServerAddr,
    pipe: Option<JsonPipe<T>>,
    unsent: Vec<Request>,
    unanswered: LinkedHashMap<u64, Request>,
    request_time: Instant,
    last_ping: Option<Instant>,
    closed_remotely: bool,
}

impl<T: Transport> ServerInterface<T> {
    /// Wraps a connected transport
    pub fn new(server: ServerAddr, transport: T) -> ServerInterface<T> {
        ServerInterface::new_at(server, transport, Instant::now())
    }

    pub fn new_at(server: ServerAddr, transport: T, now: Instant) -> ServerInterface<T> {
        let interface = ServerInterface {
            id: ProcessUniqueId::new(),
            server,
            pipe: Some(JsonPipe::new(transport, now)),
            unsent: Vec::new(),
            unanswered: LinkedHashMap::new(),
            request_time: now,
            last_ping: None,
            closed_remotely: false,
        };
        info!("{:?} Opened", interface);
        interface
    }

    /// Server this interface talks to
    pub fn server(&self) -> &ServerAddr {
        &self.server
    }

    /// Number of sent requests without a response
    pub fn unanswered_count(&self) -> usize {
        self.unanswered.len()
    }

    /// Whether the interface was closed locally or by the server
    pub fn is_closed(&self) -> bool {
        self.pipe.is_none() || self.closed_remotely
    }

    /// Queues a request to go out with the next `send_requests`
    ///
    /// The id must not match any request still outstanding.
    pub fn queue_request(&mut self, method: &str, params: Vec<Value>, id: u64) {
        self.queue_request_at(method, params, id, Instant::now())
    }

    pub fn queue_request_at(&mut self, method: &str, params: Vec<Value>, id: u64, now: Instant) {
        self.request_time = now;
        self.unsent.push(Request {
            method: method.to_string(),
            params,
            id,
        });
    }

    /// Writes all queued requests in one batch
    ///
    /// Queued requests become outstanding whether or not the write succeeds.
    pub fn send_requests(&mut self) -> Result<()> {
        self.send_requests_at(Instant::now())
    }

    pub fn send_requests_at(&mut self, now: Instant) -> Result<()> {
        if self.is_closed() {
            return Err(Error::IllegalState("Interface closed".to_string()));
        }
        if self.unsent.is_empty() {
            return Ok(());
        }

        let requests = mem::replace(&mut self.unsent, Vec::new());
        let mut lines = Vec::with_capacity(requests.len());
        for request in requests {
            let line = serde_json::to_string(&request)?;
            debug!("{:?} Write {}", self, line);
            lines.push(line);
            self.unanswered.insert(request.id, request);
        }

        let result = match self.pipe.as_mut() {
            Some(pipe) => pipe.send_all(&lines, now),
            None => return Err(Error::IllegalState("No transport".to_string())),
        };
        if let Err(e) = result {
            warn!("{:?} Failed to send requests: {}", self, e);
            return Err(Error::IOError(e));
        }
        Ok(())
    }

    /// Collects whatever has arrived without waiting for more
    ///
    /// Each entry is one of:
    ///
    /// * `(Some(request), Some(response))` for a response to an outstanding request
    /// * `(None, Some(notification))` for a message without an id
    /// * `(None, None)` when the server sent something unroutable or closed the
    ///   connection. It is always the last entry and nothing after it is read.
    pub fn get_responses(&mut self) -> Vec<(Option<Request>, Option<Value>)> {
        self.get_responses_at(Instant::now())
    }

    pub fn get_responses_at(&mut self, now: Instant) -> Vec<(Option<Request>, Option<Value>)> {
        let mut responses = Vec::new();
        if self.is_closed() {
            return responses;
        }

        let received = match self.pipe.as_mut() {
            Some(pipe) => pipe.receive(now),
            None => return responses,
        };
        if let Err(e) = received {
            warn!("{:?} Read failed: {}", self, e);
            if let Some(pipe) = self.pipe.as_mut() {
                pipe.set_eof();
            }
        }

        loop {
            let event = match self.pipe.as_mut() {
                Some(pipe) => pipe.get(),
                None => break,
            };
            match event {
                PipeEvent::Empty => break,
                PipeEvent::Closed => {
                    info!("{:?} Closed remotely", self);
                    self.closed_remotely = true;
                    responses.push((None, None));
                    break;
                }
                PipeEvent::Malformed(line) => {
                    warn!("{:?} Malformed message {:?}", self, line);
                    responses.push((None, None));
                    break;
                }
                PipeEvent::Message(message) => {
                    debug!("{:?} Read {}", self, message);
                    let id = match message.get("id") {
                        None | Some(Value::Null) => None,
                        Some(id) => Some(id.as_u64()),
                    };
                    let id = match id {
                        Some(id) => id,
                        None => {
                            responses.push((None, Some(message)));
                            continue;
                        }
                    };
                    match id.and_then(|id| self.unanswered.remove(&id)) {
                        Some(request) => responses.push((Some(request), Some(message))),
                        None => {
                            warn!("{:?} Response with unknown id {:?}", self, message.get("id"));
                            responses.push((None, None));
                            break;
                        }
                    }
                }
            }
        }
        responses
    }

    /// Whether a ping is due, true at most once per `PING_INTERVAL`
    pub fn ping_required(&mut self) -> bool {
        self.ping_required_at(Instant::now())
    }

    pub fn ping_required_at(&mut self, now: Instant) -> bool {
        let due = match self.last_ping {
            Some(last_ping) => now.saturating_duration_since(last_ping) > PING_INTERVAL,
            None => true,
        };
        if due {
            self.last_ping = Some(now);
        }
        due
    }

    /// Whether outstanding requests have gone unanswered on a silent connection
    pub fn has_timed_out(&self) -> bool {
        self.has_timed_out_at(Instant::now())
    }

    pub fn has_timed_out_at(&self, now: Instant) -> bool {
        let pipe = match self.pipe.as_ref() {
            Some(pipe) => pipe,
            None => return false,
        };
        let timed_out = !self.unanswered.is_empty()
            && now.saturating_duration_since(self.request_time) > REQUEST_TIMEOUT
            && pipe.idle_time(now) > IDLE_TIMEOUT;
        if timed_out {
            info!("{:?} Timed out with {} unanswered", self, self.unanswered.len());
        }
        timed_out
    }

    /// Shuts down and releases the transport
    ///
    /// Shutdown errors are logged. Calling again does nothing.
    pub fn close(&mut self) {
        let pipe = match self.pipe.take() {
            Some(pipe) => pipe,
            None => return,
        };
        info!("{:?} Closing", self);
        if !self.closed_remotely {
            if let Err(e) = pipe.shutdown() {
                warn!("{:?} Problem shutting down transport: {:?}", self, e);
            }
        }
    }
}

impl<T: Transport> fmt::Debug for ServerInterface<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&format!("[Interface {} {}]", self.id, self.server))
    }
}

impl<T: Transport> Drop for ServerInterface<T> {
    fn drop(&mut self) {
        self.close();
    }
}
