//! Reassembly of one response from arbitrarily fragmented inbound chunks.
//!
//! The ACK byte is expected glued to the tail of the last data chunk or as a
//! lone byte after it, whichever way the UART driver happened to split the
//! stream.

use derive_more::IsVariant;

use crate::{ACK, err::FramingError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, IsVariant)]
pub enum State {
    /// `remaining` data bytes (> 0) are still expected before the ACK.
    Collecting { remaining: usize },
    /// All data is in, the next chunk must be a lone ACK.
    AwaitingAck,
    /// The ACK was seen.
    Complete,
}

/// Collects the response of a single command.
#[derive(Debug)]
pub struct ByteAccumulator {
    state: State,
    collected: Vec<u8>,
}

impl ByteAccumulator {
    pub fn new(expected_len: usize) -> Self {
        Self {
            state: Self::state_for(expected_len),
            collected: Vec::with_capacity(expected_len),
        }
    }

    fn state_for(remaining: usize) -> State {
        if remaining == 0 {
            State::AwaitingAck
        } else {
            State::Collecting { remaining }
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// Bytes collected so far, without the ACK.
    pub fn collected(&self) -> &[u8] {
        &self.collected
    }

    /// Feed an inbound chunk.
    ///
    /// Returns the response data once the trailing ACK is seen, `None` while
    /// more bytes are expected.
    pub fn feed(&mut self, chunk: &[u8]) -> Result<Option<Vec<u8>>, FramingError> {
        match self.state {
            State::Complete => Err(FramingError::AlreadyComplete(chunk.len())),
            State::AwaitingAck => {
                if chunk != [ACK] {
                    return Err(FramingError::ExpectedLoneAck(chunk.to_vec()));
                }
                Ok(Some(self.complete()))
            }
            State::Collecting { remaining } => {
                let len = chunk.len();
                if len <= remaining {
                    self.collected.extend_from_slice(chunk);
                    self.state = Self::state_for(remaining - len);
                    Ok(None)
                } else if len == remaining + 1 {
                    let (data, tail) = chunk.split_at(remaining);
                    if tail[0] != ACK {
                        return Err(FramingError::MissingAck(tail[0]));
                    }
                    self.collected.extend_from_slice(data);
                    Ok(Some(self.complete()))
                } else {
                    Err(FramingError::UnexpectedLength {
                        expected: remaining + 1,
                        got: len,
                    })
                }
            }
        }
    }

    fn complete(&mut self) -> Vec<u8> {
        self.state = State::Complete;
        core::mem::take(&mut self.collected)
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    /// Feed `chunks` and count completions, stopping at the first error.
    fn run(
        expected_len: usize,
        chunks: &[&[u8]],
    ) -> (Vec<Vec<u8>>, Option<FramingError>) {
        let mut acc = ByteAccumulator::new(expected_len);
        let mut done = Vec::new();
        for chunk in chunks {
            match acc.feed(chunk) {
                Ok(Some(data)) => done.push(data),
                Ok(None) => {}
                Err(e) => return (done, Some(e)),
            }
        }
        (done, None)
    }

    #[test]
    fn lone_ack() {
        let (done, err) = run(0, &[&[ACK]]);
        assert_eq!(done, [Vec::<u8>::new()]);
        assert!(err.is_none());
    }

    #[test]
    fn lone_ack_wrong_value() {
        let (_, err) = run(0, &[&[0x02]]);
        assert_eq!(err, Some(FramingError::ExpectedLoneAck(vec![0x02])));
    }

    #[test]
    fn lone_ack_with_trailing_garbage() {
        let (_, err) = run(0, &[&[ACK, ACK]]);
        assert!(err.unwrap().is_expected_lone_ack());
    }

    #[test]
    fn data_and_ack_in_one_chunk() {
        let (done, err) = run(3, &[&[0x12, 0x34, 0x4e, ACK]]);
        assert_eq!(done, [vec![0x12, 0x34, 0x4e]]);
        assert!(err.is_none());
    }

    #[test]
    fn ack_after_data() {
        let mut acc = ByteAccumulator::new(2);
        assert_eq!(acc.feed(&[0xaa, 0xbb]), Ok(None));
        assert!(acc.state().is_awaiting_ack());
        assert_eq!(acc.feed(&[ACK]), Ok(Some(vec![0xaa, 0xbb])));
        assert!(acc.state().is_complete());
    }

    #[test]
    fn partial_chunks_keep_collecting() {
        let mut acc = ByteAccumulator::new(3);
        assert_eq!(acc.feed(&[0x12]), Ok(None));
        assert_eq!(acc.state(), State::Collecting { remaining: 2 });
        assert_eq!(acc.collected(), [0x12]);
    }

    #[test]
    fn terminating_byte_not_ack() {
        let (done, err) = run(2, &[&[0xaa], &[0xbb, 0x00]]);
        assert!(done.is_empty());
        assert_eq!(err, Some(FramingError::MissingAck(0x00)));
    }

    #[test]
    fn chunk_longer_than_response() {
        let (_, err) = run(2, &[&[0xaa, 0xbb, ACK, 0xcc]]);
        assert_eq!(
            err,
            Some(FramingError::UnexpectedLength {
                expected: 3,
                got: 4
            })
        );
    }

    #[test]
    fn nothing_after_completion() {
        let (done, err) = run(0, &[&[ACK], &[ACK]]);
        assert_eq!(done.len(), 1);
        assert_eq!(err, Some(FramingError::AlreadyComplete(1)));
    }

    #[test]
    fn empty_chunk_while_collecting_is_ignored() {
        let mut acc = ByteAccumulator::new(1);
        assert_eq!(acc.feed(&[]), Ok(None));
        assert_eq!(acc.state(), State::Collecting { remaining: 1 });
    }

    /// Split `stream` at the sorted, deduplicated `cuts`.
    fn split<'a>(stream: &'a [u8], cuts: &[usize]) -> Vec<&'a [u8]> {
        let mut chunks = Vec::new();
        let mut start = 0;
        for &cut in cuts {
            if cut > start && cut < stream.len() {
                chunks.push(&stream[start..cut]);
                start = cut;
            }
        }
        chunks.push(&stream[start..]);
        chunks
    }

    proptest! {
        #[test]
        fn any_fragmentation_completes_once(
            data in prop::collection::vec(any::<u8>(), 0..64),
            mut cuts in prop::collection::vec(0usize..65, 0..65),
        ) {
            let mut stream = data.clone();
            stream.push(ACK);
            cuts.sort_unstable();
            cuts.dedup();

            let chunks = split(&stream, &cuts);
            let (done, err) = run(data.len(), &chunks);
            prop_assert!(err.is_none());
            prop_assert_eq!(done, vec![data]);
        }

        #[test]
        fn wrong_terminator_never_completes(
            data in prop::collection::vec(any::<u8>(), 0..32),
            terminator in any::<u8>().prop_filter("not ACK", |b| *b != ACK),
            mut cuts in prop::collection::vec(0usize..33, 0..33),
        ) {
            let mut stream = data.clone();
            stream.push(terminator);
            cuts.sort_unstable();
            cuts.dedup();

            let chunks = split(&stream, &cuts);
            let (done, err) = run(data.len(), &chunks);
            prop_assert!(done.is_empty());
            prop_assert!(err.is_some());
        }
    }
}
