//! Spawns commands and routes their messages back to the event loop.

use std::fmt;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::debug;

use super::command::Cmd;

/// Identifies the program instance a command was issued for.
///
/// The shell bumps the generation whenever it replaces the current page, so a
/// completion carrying an older generation is addressed to a page that no
/// longer exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

impl Generation {
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "g{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CommandId(u64);

impl fmt::Display for CommandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A completed command's message, tagged with where it came from.
#[derive(Debug)]
pub struct Delivery<M> {
    pub id: CommandId,
    pub generation: Generation,
    pub message: M,
}

/// Runs every command of a [`Cmd`] on the tokio runtime.
///
/// Each command executes exactly once. Its message is always delivered
/// through the channel, never inline, so an update function has returned
/// before any message it caused is processed. Commands of one batch run
/// concurrently and complete in any order.
pub struct Dispatcher<M> {
    tx: UnboundedSender<Delivery<M>>,
    next_id: u64,
}

impl<M: Send + 'static> Dispatcher<M> {
    pub fn new() -> (Self, UnboundedReceiver<Delivery<M>>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx, next_id: 0 }, rx)
    }

    /// Spawns the commands and returns the id and name of each one.
    pub fn dispatch(&mut self, generation: Generation, cmd: Cmd<M>) -> Vec<(CommandId, String)> {
        cmd.into_commands()
            .into_iter()
            .map(|command| {
                self.next_id += 1;
                let id = CommandId(self.next_id);
                let name = command.name();
                debug!("Spawning command {id} ({name}) for {generation}");

                let tx = self.tx.clone();
                tokio::spawn(async move {
                    let message = command.execute().await;
                    if tx
                        .send(Delivery {
                            id,
                            generation,
                            message,
                        })
                        .is_err()
                    {
                        debug!("Dropping result of command {id}: event loop has stopped");
                    }
                });

                (id, name)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[derive(Debug, PartialEq, Eq)]
    enum Msg {
        Loaded(Result<u32, String>),
    }

    #[tokio::test]
    async fn deliveries_carry_generation_and_id() {
        let (mut dispatcher, mut rx) = Dispatcher::new();
        let generation = Generation::default().next();
        let issued = dispatcher.dispatch(
            generation,
            Cmd::task("Loading", |n: u32| async move { n }, 3, Msg::Loaded),
        );
        assert_eq!(issued.len(), 1);
        assert_eq!(issued[0].1, "Loading");

        let delivery = rx.recv().await.unwrap();
        assert_eq!(delivery.id, issued[0].0);
        assert_eq!(delivery.generation, generation);
        assert_eq!(delivery.message, Msg::Loaded(Ok(3)));
    }

    #[tokio::test]
    async fn batch_members_complete_independently() {
        let (mut dispatcher, mut rx) = Dispatcher::new();
        let slow = Cmd::task(
            "slow",
            |(): ()| async {
                tokio::time::sleep(Duration::from_millis(50)).await;
                1
            },
            (),
            Msg::Loaded,
        );
        let fast = Cmd::task("fast", |(): ()| async { 2 }, (), Msg::Loaded);
        let issued = dispatcher.dispatch(Generation::default(), Cmd::batch([slow, fast]));
        assert_ne!(issued[0].0, issued[1].0);

        assert_eq!(rx.recv().await.unwrap().message, Msg::Loaded(Ok(2)));
        assert_eq!(rx.recv().await.unwrap().message, Msg::Loaded(Ok(1)));
    }

    #[tokio::test]
    async fn nothing_is_delivered_for_an_empty_batch() {
        let (mut dispatcher, mut rx) = Dispatcher::<Msg>::new();
        assert!(dispatcher.dispatch(Generation::default(), Cmd::none()).is_empty());
        assert!(rx.try_recv().is_err());
    }
}
