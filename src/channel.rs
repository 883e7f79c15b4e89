use std::io;

use tokio::sync::mpsc;

use crate::sink::LogStream;

/// Forwards every line into an unbounded Tokio channel.
///
/// `write` never waits, so the logger stays synchronous; a consumer task
/// drains the receiver at its own pace. Once the receiver is dropped every
/// write fails with [`io::ErrorKind::BrokenPipe`].
#[derive(Debug, Clone)]
pub struct ChannelStream {
    sender: mpsc::UnboundedSender<String>,
}

impl ChannelStream {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (ChannelStream { sender }, receiver)
    }

    pub fn from_sender(sender: mpsc::UnboundedSender<String>) -> Self {
        ChannelStream { sender }
    }
}

impl LogStream for ChannelStream {
    fn write(&self, chunk: &str) -> io::Result<()> {
        self.sender
            .send(chunk.to_string())
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "log channel receiver dropped"))
    }
}
