//! Drives a [`Program`] without a terminal.

use futures::future::join_all;

use super::command::Command;
use super::update::Program;

pub struct Harness<P: Program> {
    pub program: P,
    pending: Vec<Box<dyn Command<P::Msg>>>,
    last_issued: Vec<String>,
    signals: Vec<P::Signal>,
}

impl<P: Program> Harness<P> {
    pub const fn new(program: P) -> Self {
        Self {
            program,
            pending: Vec::new(),
            last_issued: Vec::new(),
            signals: Vec::new(),
        }
    }

    /// Creates the harness and feeds the program's init message.
    pub fn start(program: P) -> Self {
        let mut harness = Self::new(program);
        if let Some(msg) = harness.program.init() {
            harness.send(msg);
        }
        harness
    }

    /// Runs one update. Its commands are queued, not executed.
    pub fn send(&mut self, msg: P::Msg) -> &P::Signal {
        let (cmd, signal) = self.program.update(msg).into_parts();
        self.last_issued = cmd.names();
        self.pending.extend(cmd.into_commands());
        self.signals.push(signal);
        &self.signals[self.signals.len() - 1]
    }

    /// Names of the commands issued by the most recent `send`.
    pub fn last_issued(&self) -> &[String] {
        &self.last_issued
    }

    pub fn pending_names(&self) -> Vec<String> {
        self.pending.iter().map(|c| c.name()).collect()
    }

    pub fn discard_pending(&mut self) {
        self.pending.clear();
    }

    /// Every signal that was not a no-op, oldest first.
    pub fn raised(&self) -> Vec<&P::Signal> {
        use super::signal::Signal;
        self.signals.iter().filter(|s| !s.is_noop()).collect()
    }

    /// Executes the pending commands and returns their messages without
    /// feeding them back.
    pub async fn execute_pending(&mut self) -> Vec<P::Msg> {
        let commands = std::mem::take(&mut self.pending);
        join_all(commands.into_iter().map(|c| c.execute())).await
    }

    /// Executes pending commands and feeds their messages back until no
    /// command is left.
    pub async fn settle(&mut self) {
        while !self.pending.is_empty() {
            for msg in self.execute_pending().await {
                self.send(msg);
            }
        }
    }
}
