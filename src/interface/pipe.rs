use serde_json::{self, Value};
use std::io;
use std::io::{Read, Write};
use std::net::{Shutdown, TcpStream};
use std::time::{Duration, Instant};

/// Size of each read from the transport
const READ_CHUNK: usize = 4096;

/// Longest unterminated line a pipe buffers before giving up on the connection
pub const MAX_LINE_LEN: usize = 16 * 1024 * 1024;

/// Byte stream an interface talks over
pub trait Transport: Read + Write {
    fn shutdown(&self, how: Shutdown) -> io::Result<()>;
    fn set_nonblocking(&self, nonblocking: bool) -> io::Result<()>;
}

impl Transport for TcpStream {
    fn shutdown(&self, how: Shutdown) -> io::Result<()> {
        TcpStream::shutdown(self, how)
    }

    fn set_nonblocking(&self, nonblocking: bool) -> io::Result<()> {
        TcpStream::set_nonblocking(self, nonblocking)
    }
}

/// Next item buffered in a pipe
#[derive(Debug, Clone, PartialEq)]
pub enum PipeEvent {
    Message(Value),
    /// A line that is not valid JSON, or one too long to buffer
    Malformed(String),
    /// No complete line is buffered
    Empty,
    /// The remote end closed and everything before the close was consumed
    Closed,
}

/// Newline-delimited JSON over a transport
///
/// Reads never block. Partial lines stay buffered until the rest arrives, up
/// to a limit. A partial line over the limit is reported as malformed and the
/// pipe then reads as closed.
pub struct JsonPipe<T: Transport> {
    transport: T,
    buf: Vec<u8>,
    max_line: usize,
    eof: bool,
    last_activity: Instant,
}

impl<T: Transport> JsonPipe<T> {
    pub fn new(transport: T, now: Instant) -> JsonPipe<T> {
        JsonPipe {
            transport,
            buf: Vec::new(),
            max_line: MAX_LINE_LEN,
            eof: false,
            last_activity: now,
        }
    }

    /// Sets the longest unterminated line the pipe will buffer
    pub fn with_max_line(mut self, max_line: usize) -> JsonPipe<T> {
        self.max_line = max_line;
        self
    }

    /// Writes pre-serialized messages, one per line, in a single write
    pub fn send_all(&mut self, messages: &[String], now: Instant) -> io::Result<()> {
        let mut out = Vec::new();
        for message in messages {
            out.extend_from_slice(message.as_bytes());
            out.push(b'\n');
        }
        self.transport.write_all(&out)?;
        self.transport.flush()?;
        self.last_activity = now;
        Ok(())
    }

    /// Moves whatever the transport has available into the buffer without waiting
    pub fn receive(&mut self, now: Instant) -> io::Result<()> {
        if self.eof {
            return Ok(());
        }
        self.transport.set_nonblocking(true)?;
        let result = self.read_available(now);
        let restore = self.transport.set_nonblocking(false);
        result?;
        restore
    }

    fn read_available(&mut self, now: Instant) -> io::Result<()> {
        let mut chunk = [0; READ_CHUNK];
        loop {
            match self.transport.read(&mut chunk) {
                Ok(0) => {
                    self.eof = true;
                    return Ok(());
                }
                Ok(size) => {
                    self.buf.extend_from_slice(&chunk[..size]);
                    self.last_activity = now;
                    if self.buf.len() > self.max_line {
                        return Ok(());
                    }
                }
                Err(e) => match e.kind() {
                    // Depending on platform, either may signal that nothing is buffered
                    io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut => return Ok(()),
                    io::ErrorKind::Interrupted => continue,
                    _ => return Err(e),
                },
            }
        }
    }

    /// Takes the next buffered message
    pub fn get(&mut self) -> PipeEvent {
        loop {
            let end = match self.buf.iter().position(|b| *b == b'\n') {
                Some(end) => end,
                None if self.eof => return PipeEvent::Closed,
                None if self.buf.len() > self.max_line => {
                    warn!("Dropping unterminated line of {} bytes", self.buf.len());
                    self.buf.clear();
                    self.eof = true;
                    return PipeEvent::Malformed(format!("Line exceeds {} bytes", self.max_line));
                }
                None => return PipeEvent::Empty,
            };
            let line: Vec<u8> = self.buf.drain(..=end).collect();
            let line = &line[..end];
            if line.iter().all(|b| b.is_ascii_whitespace()) {
                continue;
            }
            return match serde_json::from_slice(line) {
                Ok(message) => PipeEvent::Message(message),
                Err(_) => {
                    let text = String::from_utf8_lossy(line);
                    PipeEvent::Malformed(text.trim().to_string())
                }
            };
        }
    }

    /// Marks the pipe as closed by the remote end
    pub fn set_eof(&mut self) {
        self.eof = true;
    }

    /// Time since bytes last moved in either direction
    pub fn idle_time(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.last_activity)
    }

    pub fn shutdown(&self) -> io::Result<()> {
        self.transport.shutdown(Shutdown::Both)
    }
}

#[cfg(test)]
pub(crate) mod mock {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    pub struct MockState {
        pub inbound: Vec<u8>,
        pub written: Vec<u8>,
        pub eof: bool,
        pub fail_writes: bool,
        pub fail_reads: bool,
        pub shutdowns: usize,
        pub nonblocking: bool,
    }

    /// In-memory transport whose state stays visible to the test
    #[derive(Clone, Default)]
    pub struct MockTransport {
        pub state: Arc<Mutex<MockState>>,
    }

    impl MockTransport {
        pub fn feed(&self, data: &str) {
            self.state.lock().unwrap().inbound.extend_from_slice(data.as_bytes());
        }

        pub fn written(&self) -> String {
            String::from_utf8(self.state.lock().unwrap().written.clone()).unwrap()
        }
    }

    impl Read for MockTransport {
        fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
            let mut state = self.state.lock().unwrap();
            assert!(state.nonblocking);
            if state.fail_reads {
                return Err(io::Error::new(io::ErrorKind::ConnectionReset, "Reset"));
            }
            if state.inbound.is_empty() {
                if state.eof {
                    return Ok(0);
                }
                return Err(io::Error::new(io::ErrorKind::WouldBlock, "Empty"));
            }
            let size = out.len().min(state.inbound.len());
            out[..size].clone_from_slice(&state.inbound[..size]);
            state.inbound.drain(..size);
            Ok(size)
        }
    }

    impl Write for MockTransport {
        fn write(&mut self, data: &[u8]) -> io::Result<usize> {
            let mut state = self.state.lock().unwrap();
            if state.fail_writes {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "Broken"));
            }
            state.written.extend_from_slice(data);
            Ok(data.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Transport for MockTransport {
        fn shutdown(&self, _how: Shutdown) -> io::Result<()> {
            self.state.lock().unwrap().shutdowns += 1;
            Ok(())
        }

        fn set_nonblocking(&self, nonblocking: bool) -> io::Result<()> {
            self.state.lock().unwrap().nonblocking = nonblocking;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::MockTransport;
    use super::*;

    #[test]
    fn lines_and_partials() {
        let now = Instant::now();
        let transport = MockTransport::default();
        let mut pipe = JsonPipe::new(transport.clone(), now);

        transport.feed("{\"a\":1}\n\n{\"b\":");
        pipe.receive(now).unwrap();
        assert!(pipe.get() == PipeEvent::Message(serde_json::json!({"a": 1})));
        assert!(pipe.get() == PipeEvent::Empty);

        transport.feed("2}\nnot json\n");
        pipe.receive(now).unwrap();
        assert!(pipe.get() == PipeEvent::Message(serde_json::json!({"b": 2})));
        assert!(pipe.get() == PipeEvent::Malformed("not json".to_string()));
        assert!(pipe.get() == PipeEvent::Empty);
        assert!(!transport.state.lock().unwrap().nonblocking);
    }

    #[test]
    fn closed_after_buffered_lines() {
        let now = Instant::now();
        let transport = MockTransport::default();
        let mut pipe = JsonPipe::new(transport.clone(), now);
        transport.feed("[1]\n");
        transport.state.lock().unwrap().eof = true;
        pipe.receive(now).unwrap();
        assert!(pipe.get() == PipeEvent::Message(serde_json::json!([1])));
        assert!(pipe.get() == PipeEvent::Closed);
    }

    #[test]
    fn invalid_utf8_is_malformed() {
        let now = Instant::now();
        let transport = MockTransport::default();
        let mut pipe = JsonPipe::new(transport.clone(), now);
        transport.state.lock().unwrap().inbound.extend_from_slice(b"[\"\xff\"]\n[2]\n");
        pipe.receive(now).unwrap();
        match pipe.get() {
            PipeEvent::Malformed(_) => {}
            _ => panic!("Expected Malformed"),
        }
        assert!(pipe.get() == PipeEvent::Message(serde_json::json!([2])));
    }

    #[test]
    fn oversized_line_closes() {
        let now = Instant::now();
        let transport = MockTransport::default();
        let mut pipe = JsonPipe::new(transport.clone(), now).with_max_line(16);

        transport.feed("[1]\n[\"0123456789");
        pipe.receive(now).unwrap();
        assert!(pipe.get() == PipeEvent::Message(serde_json::json!([1])));
        assert!(pipe.get() == PipeEvent::Empty);

        transport.feed("0123456789\"]");
        pipe.receive(now).unwrap();
        match pipe.get() {
            PipeEvent::Malformed(_) => {}
            _ => panic!("Expected Malformed"),
        }
        assert!(pipe.get() == PipeEvent::Closed);

        // Nothing more is read once the pipe gave up
        transport.feed("[3]\n");
        pipe.receive(now).unwrap();
        assert!(pipe.get() == PipeEvent::Closed);
    }

    #[test]
    fn send_and_idle_time() {
        let start = Instant::now();
        let transport = MockTransport::default();
        let mut pipe = JsonPipe::new(transport.clone(), start);

        let later = start + Duration::from_secs(5);
        assert!(pipe.idle_time(later) == Duration::from_secs(5));
        pipe.send_all(&["{}".to_string(), "[]".to_string()], later).unwrap();
        assert!(transport.written() == "{}\n[]\n");
        assert!(pipe.idle_time(later) == Duration::from_secs(0));

        transport.state.lock().unwrap().fail_writes = true;
        assert!(pipe.send_all(&["{}".to_string()], later).is_err());

        // Reading nothing does not count as activity
        let much_later = later + Duration::from_secs(20);
        pipe.receive(much_later).unwrap();
        assert!(pipe.idle_time(much_later) == Duration::from_secs(20));
        transport.feed("{}\n");
        pipe.receive(much_later).unwrap();
        assert!(pipe.idle_time(much_later) == Duration::from_secs(0));
    }
}
