//! Reassembly of fragmented inbound publishes.
//!
//! The engine delivers every inbound publish as a "begin" notification with
//! the topic and announced length, followed by one or more data chunks. The
//! last chunk carries a flag and is the only completion signal.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::RawMutex;
use heapless::{String, Vec};

/// Maximum length for a recorded topic string. Longer topics are truncated.
pub const MAX_TOPIC_LEN: usize = 128;

/// Default capacity of the receive buffer in bytes.
///
/// A completed message is moved out of the shared buffer before the message
/// hook runs, so delivery needs roughly `N + MAX_TOPIC_LEN` bytes of stack on
/// the engine's callback context. Size the buffer against that stack.
pub const DEFAULT_RECV_BUF_SIZE: usize = 1024;

/// The in-progress message: payload bytes received so far plus the topic and
/// the length the engine announced for it.
///
/// `received_len` is `data.len()`, so it can never exceed `N`.
#[derive(Default)]
pub(crate) struct ReceiveBuffer<const N: usize> {
    data: Vec<u8, N>,
    expected_total: u32,
    topic: String<MAX_TOPIC_LEN>,
}

impl<const N: usize> ReceiveBuffer<N> {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Start a new message, discarding whatever was accumulated before.
    pub(crate) fn begin(&mut self, topic: &str, total_len: u32) {
        self.data.clear();
        self.expected_total = total_len;
        self.topic.clear();
        // Cannot fail, the slice is cut to fit.
        let _ = self.topic.push_str(truncate_at_boundary(topic, MAX_TOPIC_LEN));
    }

    /// Append `chunk` if it fits entirely. Returns `false` if it was dropped.
    pub(crate) fn append(&mut self, chunk: &[u8]) -> bool {
        if self.data.len() + chunk.len() > N {
            return false;
        }
        self.data.extend_from_slice(chunk).is_ok()
    }

    pub(crate) fn received_len(&self) -> usize {
        self.data.len()
    }

    pub(crate) fn expected_total(&self) -> u32 {
        self.expected_total
    }

    pub(crate) fn topic(&self) -> &str {
        self.topic.as_str()
    }

    pub(crate) fn payload(&self) -> &[u8] {
        &self.data
    }
}

fn truncate_at_boundary(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Merges the engine's begin/chunk notifications into whole messages.
///
/// Calls must not overlap: the engine is expected to deliver them from one
/// execution context. The internal mutex only provides the interior
/// mutability; pick `NoopRawMutex` when everything runs on one executor.
///
/// Messages longer than `N` bytes are delivered truncated to the chunks that
/// fit. No error is raised for that.
pub struct ReceiveReassembler<M: RawMutex, const N: usize = DEFAULT_RECV_BUF_SIZE> {
    buffer: Mutex<M, RefCell<ReceiveBuffer<N>>>,
}

impl<M: RawMutex, const N: usize> ReceiveReassembler<M, N> {
    pub fn new() -> Self {
        Self {
            buffer: Mutex::new(RefCell::new(ReceiveBuffer::new())),
        }
    }

    /// Buffer capacity in bytes.
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Bytes accumulated for the message currently in progress.
    pub fn received_len(&self) -> usize {
        self.buffer.lock(|buf| buf.borrow().received_len())
    }

    /// Length announced by the last accepted begin notification.
    pub fn expected_total(&self) -> u32 {
        self.buffer.lock(|buf| buf.borrow().expected_total())
    }

    /// Handle the engine's "publish begins" notification.
    pub fn on_begin_message(&self, topic: &str, total_len: u32) {
        if topic.is_empty() || total_len == 0 {
            warn!("reassembler: ignoring begin with empty topic or zero length");
            return;
        }

        debug!("reassembler: topic = {}, total length = {}", topic, total_len);
        if total_len as usize > N {
            warn!(
                "reassembler: {} byte message exceeds {} byte buffer, it will be truncated",
                total_len,
                N
            );
        }

        self.buffer
            .lock(|buf| buf.borrow_mut().begin(topic, total_len));
    }

    /// Handle one payload chunk. When `last` is set the accumulated message is
    /// passed to `on_message` and the buffer is reset.
    ///
    /// `on_message` runs after the buffer has been released, so it may freely
    /// call back into the adapter. The completed message lives on the caller's
    /// stack while it does (see [`DEFAULT_RECV_BUF_SIZE`]).
    pub fn on_data_chunk<F>(&self, chunk: &[u8], last: bool, on_message: F)
    where
        F: FnOnce(&str, &[u8]),
    {
        if chunk.is_empty() {
            warn!("reassembler: ignoring empty data chunk");
            return;
        }

        let completed = self.buffer.lock(|buf| {
            let mut buf = buf.borrow_mut();
            if !buf.append(chunk) {
                warn!(
                    "reassembler: dropping {} byte chunk, {} of {} bytes used",
                    chunk.len(),
                    buf.received_len(),
                    N
                );
            }
            if last {
                Some(core::mem::take(&mut *buf))
            } else {
                None
            }
        });

        trace!("reassembler: received {} byte chunk", chunk.len());

        if let Some(message) = completed {
            on_message(message.topic(), message.payload());
        }
    }
}

impl<M: RawMutex, const N: usize> Default for ReceiveReassembler<M, N> {
    fn default() -> Self {
        Self::new()
    }
}
