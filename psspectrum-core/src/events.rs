//! Log-line delivery from the pipelines to the shell.
//!
//! Everything the operator sees (tool output and orchestrator status lines)
//! flows through a [`LogSink`] in arrival order. Closures are sinks, and a
//! [`ChannelSink`] forwards lines to another thread.

use crossbeam_channel::Sender;

/// Receives log lines one at a time, in order.
pub trait LogSink {
    fn line(&mut self, line: &str);
}

impl<F> LogSink for F
where
    F: FnMut(&str),
{
    fn line(&mut self, line: &str) {
        self(line);
    }
}

/// Sends each line over a channel so the shell can display it from its own
/// thread. Lines sent after the receiver is dropped are discarded.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    sender: Sender<String>,
}

impl ChannelSink {
    pub fn new(sender: Sender<String>) -> Self {
        Self { sender }
    }
}

impl LogSink for ChannelSink {
    fn line(&mut self, line: &str) {
        let _ = self.sender.send(line.to_string());
    }
}
