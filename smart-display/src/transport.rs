//! Ordered write path to the display link
//!
//! One writer thread owns the link and performs every write. Producers hand
//! buffers over a capacity-1 channel, so `submit` blocks while the writer is
//! behind and buffers reach the link in submission order, unsplit.
//!
//! A flush request travels through the same channel, so it reaches the link
//! after every buffer submitted before it.
//!
//! Shutdown runs in two phases: dropping the sender stops submissions, the
//! writer drains what is left, sends a final reset and flushes, and joining the
//! thread is the completion signal.

use std::io::Write;
use std::sync::mpsc::{self, Receiver, SyncSender};
use std::thread::{self, JoinHandle};

use log::{debug, info, warn};

use crate::command::Command;
use crate::error::{Error, Result};

/// Buffers that may wait in the channel ahead of the writer
pub const CHANNEL_CAPACITY: usize = 1;

/// Work items for the writer thread
enum Message {
    Write(Vec<u8>),
    Flush,
}

/// Counters reported by the writer when it stops
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkStats {
    /// Buffers written successfully
    pub buffers: u64,
    /// Bytes written successfully
    pub bytes: u64,
    /// Buffers dropped because the link write failed
    pub failed: u64,
    /// Flushes requested through [`Transport::flush`]
    pub flushes: u64,
}

/// Handle to the writer thread
pub struct Transport {
    sender: Option<SyncSender<Message>>,
    worker: Option<JoinHandle<LinkStats>>,
}

impl Transport {
    /// Start the writer thread; it owns `link` until shutdown
    pub fn spawn<W>(link: W) -> Result<Self>
    where
        W: Write + Send + 'static,
    {
        let (sender, receiver) = mpsc::sync_channel(CHANNEL_CAPACITY);
        let worker = thread::Builder::new()
            .name("display-link".into())
            .spawn(move || writer_loop(link, receiver))
            .map_err(Error::Spawn)?;

        debug!("link writer started");
        Ok(Self {
            sender: Some(sender),
            worker: Some(worker),
        })
    }

    /// Queue a buffer for the link, blocking while the writer is busy.
    ///
    /// Write failures on the link are not reported here.
    pub fn submit(&self, bytes: Vec<u8>) -> Result<()> {
        self.send(Message::Write(bytes))
    }

    /// Ask the writer to flush the link once everything queued so far is
    /// written. Does not wait for the flush itself.
    pub fn flush(&self) -> Result<()> {
        self.send(Message::Flush)
    }

    fn send(&self, message: Message) -> Result<()> {
        let sender = self.sender.as_ref().ok_or(Error::TransportClosed)?;
        sender.send(message).map_err(|_| Error::TransportClosed)
    }

    /// Stop accepting buffers, wait for the writer to drain and reset the
    /// device, and return its counters
    pub fn shutdown(mut self) -> Result<LinkStats> {
        self.finish()
    }

    fn finish(&mut self) -> Result<LinkStats> {
        drop(self.sender.take());
        match self.worker.take() {
            Some(handle) => handle.join().map_err(|_| Error::WriterPanicked),
            None => Ok(LinkStats::default()),
        }
    }
}

impl Drop for Transport {
    fn drop(&mut self) {
        if self.worker.is_some() {
            if let Err(e) = self.finish() {
                warn!("link writer did not shut down cleanly: {}", e);
            }
        }
    }
}

fn writer_loop<W: Write>(mut link: W, receiver: Receiver<Message>) -> LinkStats {
    let mut stats = LinkStats::default();

    // Ends once every sender is gone and the channel is empty
    for message in receiver {
        match message {
            Message::Write(buffer) => write_buffer(&mut link, &buffer, &mut stats),
            Message::Flush => {
                stats.flushes += 1;
                if let Err(e) = link.flush() {
                    warn!("failed to flush display link: {}", e);
                }
            }
        }
    }

    write_buffer(&mut link, &Command::reset().encode(), &mut stats);
    if let Err(e) = link.flush() {
        warn!("failed to flush display link: {}", e);
    }

    info!(
        "link writer stopped: {} buffers, {} bytes, {} dropped",
        stats.buffers, stats.bytes, stats.failed
    );
    stats
}

fn write_buffer<W: Write>(link: &mut W, buffer: &[u8], stats: &mut LinkStats) {
    match link.write_all(buffer) {
        Ok(()) => {
            stats.buffers += 1;
            stats.bytes += buffer.len() as u64;
        }
        Err(e) => {
            stats.failed += 1;
            warn!("dropped {} byte buffer: {}", buffer.len(), e);
        }
    }
}
