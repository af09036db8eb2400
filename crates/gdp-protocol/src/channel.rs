use std::time::{Duration, Instant};

use gdp_port::Transport;
use log::{debug, trace, warn};

use crate::{ByteAccumulator, Command, DEFAULT_TIMEOUT, LogEntry, Result, err::Error};

/// Upper bound of a single read from the transport.
const CHUNK_SIZE: usize = 64;

/// Host side of the SBC command protocol.
///
/// Only one command can be outstanding: [`CommandChannel::send`] borrows the
/// channel mutably until the response is complete or has failed. Every call
/// gets its own [`ByteAccumulator`], so nothing survives from one command to
/// the next except the `stale` flag below.
pub struct CommandChannel<T: Transport> {
    io: T,
    timeout: Duration,
    /// Set when a response failed after its command was written, the input
    /// may still hold bytes of it.
    stale: bool,
}

impl<T: Transport> CommandChannel<T> {
    pub fn new(io: T) -> Self {
        Self {
            io,
            timeout: DEFAULT_TIMEOUT,
            stale: false,
        }
    }

    /// Response timeout for everything but bulk writes.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn transport(&self) -> &T {
        &self.io
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.io
    }

    pub fn into_inner(self) -> T {
        self.io
    }

    /// Send `command` and wait for its response data.
    pub fn send(&mut self, command: &Command) -> Result<Vec<u8>> {
        if self.stale {
            warn!("Discarding pending input before {command}");
            self.io.clear_input()?;
            self.stale = false;
        }

        debug!("=> {command}");
        self.io.write(&command.frame())?;

        let ret = self.collect(command);
        if ret.is_err() {
            self.stale = true;
        }
        ret
    }

    fn collect(&mut self, command: &Command) -> Result<Vec<u8>> {
        let mut acc = ByteAccumulator::new(command.expected_len());
        let deadline = command.timeout().map(|t| (t, Instant::now() + t));
        let mut buf = [0; CHUNK_SIZE];

        loop {
            let wait = match deadline {
                Some((timeout, deadline)) => {
                    let left = deadline.saturating_duration_since(Instant::now());
                    if left.is_zero() {
                        warn!("{command} timed out after {timeout:?}, state {:?}", acc.state());
                        return Err(Error::Timeout(timeout));
                    }
                    Some(left)
                }
                None => None,
            };

            let n = self.io.read_chunk(&mut buf, wait)?;
            if n == 0 {
                continue;
            }

            trace!("<= {:02x?}", &buf[..n]);
            if let Some(data) = acc.feed(&buf[..n])? {
                debug!("<= {} data bytes + ACK", data.len());
                return Ok(data);
            }
        }
    }

    /// Send `command` with the channel timeout.
    fn request(&mut self, command: Command) -> Result<Vec<u8>> {
        self.send(&command.with_timeout(Some(self.timeout)))
    }

    fn request_exact<const N: usize>(&mut self, command: Command) -> Result<[u8; N]> {
        let data = self.request(command)?;
        <[u8; N]>::try_from(data.as_slice()).map_err(|_| Error::ResponseLength {
            expected: N,
            got: data.len(),
        })
    }

    pub fn ping(&mut self) -> Result<()> {
        self.request(Command::ping()).map(|_| ())
    }

    /// Release the GDP.
    pub fn start(&mut self) -> Result<()> {
        self.request(Command::start()).map(|_| ())
    }

    /// Upload `image` to SRAM starting at address 0.
    pub fn bulk_write(&mut self, image: &[u8]) -> Result<()> {
        self.send(&Command::bulk_write(image)?).map(|_| ())
    }

    pub fn read_word(&mut self, addr: u16) -> Result<u16> {
        self.request_exact(Command::read(addr))
            .map(u16::from_be_bytes)
    }

    pub fn read_log(&mut self, addr: u16) -> Result<LogEntry> {
        let [hi, lo, spec] = self.request_exact(Command::log_read(addr))?;
        Ok(LogEntry::decode(addr, spec, u16::from_be_bytes([hi, lo])))
    }

    /// Ping until the SBC answers, at most `retries` times.
    ///
    /// Only timeouts are retried, anything else means the link is broken.
    pub fn wait_online(&mut self, retries: usize) -> Result<()> {
        for attempt in 1..=retries {
            match self.ping() {
                Ok(()) => return Ok(()),
                Err(e) if e.is_timeout() => debug!("Ping {attempt}/{retries}: {e}"),
                Err(e) => return Err(e),
            }
        }

        Err(Error::Offline(retries))
    }

    /// Read log entries `0..depth`, up to and including the first fatal one.
    ///
    /// `visit` is called for every entry as soon as it's read.
    pub fn poll_log<F: FnMut(&LogEntry)>(&mut self, depth: u16, mut visit: F) -> Result<Vec<LogEntry>> {
        let mut entries = Vec::new();
        for addr in 0..depth {
            let entry = self.read_log(addr)?;
            visit(&entry);
            entries.push(entry);
            if entry.is_fatal() {
                break;
            }
        }

        Ok(entries)
    }
}
