use std::{collections::VecDeque, thread::sleep, time::Duration};

use gdp_port::{POLL_INTERVAL, Transport};

/// In-memory SBC: every write releases the next scripted list of chunks into
/// the input buffer.
#[derive(Default)]
pub(crate) struct ScriptedTransport {
    pub written: Vec<Vec<u8>>,
    pub input: VecDeque<Vec<u8>>,
    pub script: VecDeque<Vec<Vec<u8>>>,
    pub clears: usize,
    pub fail_writes: bool,
    /// Fail every read once this many chunks were delivered.
    pub fail_reads_after: Option<usize>,
    pub reads: usize,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reply to the next write with `chunks`.
    pub fn reply(mut self, chunks: &[&[u8]]) -> Self {
        self.script
            .push_back(chunks.iter().map(|c| c.to_vec()).collect());
        self
    }

    /// Don't reply to the next write.
    pub fn silent(self) -> Self {
        self.reply(&[])
    }
}

impl Transport for ScriptedTransport {
    fn write(&mut self, buf: &[u8]) -> gdp_port::Result<()> {
        if self.fail_writes {
            return Err(std::io::Error::from(std::io::ErrorKind::BrokenPipe).into());
        }
        self.written.push(buf.to_vec());
        if let Some(chunks) = self.script.pop_front() {
            self.input.extend(chunks);
        }
        Ok(())
    }

    fn read_chunk(&mut self, buf: &mut [u8], timeout: Option<Duration>) -> gdp_port::Result<usize> {
        if self.fail_reads_after.is_some_and(|n| self.reads >= n) {
            return Err(std::io::Error::from(std::io::ErrorKind::BrokenPipe).into());
        }

        let Some(mut chunk) = self.input.pop_front() else {
            sleep(timeout.unwrap_or(POLL_INTERVAL));
            return Ok(0);
        };

        self.reads += 1;
        let n = chunk.len().min(buf.len());
        buf[..n].copy_from_slice(&chunk[..n]);
        if n < chunk.len() {
            self.input.push_front(chunk.split_off(n));
        }
        Ok(n)
    }

    fn clear_input(&mut self) -> gdp_port::Result<()> {
        self.clears += 1;
        self.input.clear();
        Ok(())
    }
}
