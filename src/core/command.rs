//! Async command pattern for side effects.
//!
//! Commands describe async operations that run outside the update function.
//! Programs return them inside a [`Cmd`]; the [`Dispatcher`](super::Dispatcher)
//! spawns each one and feeds the message it produces back into the owning
//! program.
//!
//! Two outcome conventions are supported:
//! - **either-mapping** ([`Cmd::perform`], [`Cmd::task`]): success and failure
//!   reach one message constructor as `Result<T, String>`
//! - **split-mapping** ([`Cmd::attempt`]): success and failure go to two
//!   separate callbacks
//!
//! In both cases a panic inside the operation is caught and reported as an
//! error string, so an update function never has to tell a declared failure
//! from a crashed one.

use std::any::Any;
use std::fmt::{self, Display};
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;
use futures::future::BoxFuture;

/// Async command that performs a side effect and yields one message.
#[async_trait]
pub trait Command<M>: Send + 'static {
    /// Human-readable name for status display.
    fn name(&self) -> String;

    /// Execute the command. Called exactly once.
    async fn execute(self: Box<Self>) -> M;
}

type Thunk<M> = Box<dyn FnOnce() -> BoxFuture<'static, M> + Send>;

struct Task<M> {
    name: String,
    run: Thunk<M>,
}

#[async_trait]
impl<M: Send + 'static> Command<M> for Task<M> {
    fn name(&self) -> String {
        self.name.clone()
    }

    async fn execute(self: Box<Self>) -> M {
        let this = *self;
        (this.run)().await
    }
}

struct Mapped<M, N> {
    inner: Box<dyn Command<M>>,
    f: Arc<dyn Fn(M) -> N + Send + Sync>,
}

#[async_trait]
impl<M: Send + 'static, N: Send + 'static> Command<N> for Mapped<M, N> {
    fn name(&self) -> String {
        self.inner.name()
    }

    async fn execute(self: Box<Self>) -> N {
        let Self { inner, f } = *self;
        let message = inner.execute().await;
        f(message)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .map_or_else(
            || "operation panicked".to_string(),
            |message| format!("operation panicked: {message}"),
        )
}

/// Runs a future, converting a panic into an error message.
async fn guarded<T>(future: impl Future<Output = T> + Send) -> Result<T, String> {
    AssertUnwindSafe(future)
        .catch_unwind()
        .await
        .map_err(|payload| panic_message(payload.as_ref()))
}

/// An opaque batch of commands returned by an update function.
#[must_use]
pub struct Cmd<M> {
    commands: Vec<Box<dyn Command<M>>>,
}

impl<M> Default for Cmd<M> {
    fn default() -> Self {
        Self {
            commands: Vec::new(),
        }
    }
}

impl<M: 'static> fmt::Debug for Cmd<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.commands.iter().map(|c| c.name()))
            .finish()
    }
}

impl<M: Send + 'static> Cmd<M> {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn single(command: impl Command<M>) -> Self {
        Self {
            commands: vec![Box::new(command)],
        }
    }

    pub fn batch(cmds: impl IntoIterator<Item = Self>) -> Self {
        Self {
            commands: cmds.into_iter().flat_map(|c| c.commands).collect(),
        }
    }

    /// Appends the commands of `other`.
    pub fn and(mut self, other: Self) -> Self {
        self.commands.extend(other.commands);
        self
    }

    pub const fn len(&self) -> usize {
        self.commands.len()
    }

    pub const fn is_none(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn names(&self) -> Vec<String> {
        self.commands.iter().map(|c| c.name()).collect()
    }

    pub fn into_commands(self) -> Vec<Box<dyn Command<M>>> {
        self.commands
    }

    fn from_thunk(name: impl Into<String>, run: Thunk<M>) -> Self {
        Self::single(Task {
            name: name.into(),
            run,
        })
    }

    /// Either-mapping over a fallible operation.
    ///
    /// `op(arg)` runs once when the command executes; its outcome, or the
    /// message of a panic, reaches `to_msg` as `Result<T, String>`.
    pub fn perform<A, T, E, Op, Fut>(
        name: impl Into<String>,
        op: Op,
        arg: A,
        to_msg: impl FnOnce(Result<T, String>) -> M + Send + 'static,
    ) -> Self
    where
        A: Send + 'static,
        T: Send + 'static,
        E: Display + Send + 'static,
        Op: FnOnce(A) -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        Self::from_thunk(
            name,
            Box::new(move || {
                async move {
                    let outcome = guarded(async move { op(arg).await }).await;
                    to_msg(outcome.and_then(|result| result.map_err(|e| e.to_string())))
                }
                .boxed()
            }),
        )
    }

    /// Either-mapping over an operation that cannot fail on its own. Only a
    /// panic produces the `Err` case.
    pub fn task<A, T, Op, Fut>(
        name: impl Into<String>,
        op: Op,
        arg: A,
        to_msg: impl FnOnce(Result<T, String>) -> M + Send + 'static,
    ) -> Self
    where
        A: Send + 'static,
        T: Send + 'static,
        Op: FnOnce(A) -> Fut + Send + 'static,
        Fut: Future<Output = T> + Send + 'static,
    {
        Self::from_thunk(
            name,
            Box::new(move || {
                async move { to_msg(guarded(async move { op(arg).await }).await) }.boxed()
            }),
        )
    }

    /// Split-mapping: success goes to `on_ok`, any failure to `on_err`.
    pub fn attempt<A, T, E, Op, Fut>(
        name: impl Into<String>,
        op: Op,
        arg: A,
        on_ok: impl FnOnce(T) -> M + Send + 'static,
        on_err: impl FnOnce(String) -> M + Send + 'static,
    ) -> Self
    where
        A: Send + 'static,
        T: Send + 'static,
        E: Display + Send + 'static,
        Op: FnOnce(A) -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        Self::perform(name, op, arg, move |result| match result {
            Ok(value) => on_ok(value),
            Err(message) => on_err(message),
        })
    }

    /// Lifts every command into a parent's message type.
    pub fn map<N: Send + 'static>(self, f: impl Fn(M) -> N + Send + Sync + 'static) -> Cmd<N> {
        let f: Arc<dyn Fn(M) -> N + Send + Sync> = Arc::new(f);
        Cmd {
            commands: self
                .commands
                .into_iter()
                .map(|inner| {
                    Box::new(Mapped {
                        inner,
                        f: f.clone(),
                    }) as Box<dyn Command<N>>
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use futures::future::join_all;

    use super::*;

    #[derive(Debug, PartialEq, Eq)]
    enum Msg {
        Done(Result<u32, String>),
        Ok(u32),
        Failed(String),
    }

    async fn run(cmd: Cmd<Msg>) -> Vec<Msg> {
        join_all(cmd.into_commands().into_iter().map(|c| c.execute())).await
    }

    #[tokio::test]
    async fn perform_wraps_success_and_failure() {
        let ok = Cmd::perform("double", |n: u32| async move { Ok::<_, String>(n * 2) }, 21, Msg::Done);
        assert_eq!(run(ok).await, vec![Msg::Done(Ok(42))]);

        let err = Cmd::perform(
            "fail",
            |_: ()| async { Err::<u32, _>("disk full") },
            (),
            Msg::Done,
        );
        assert_eq!(run(err).await, vec![Msg::Done(Err("disk full".to_string()))]);
    }

    #[tokio::test]
    async fn panics_become_error_messages() {
        let cmd = Cmd::perform(
            "explode",
            |_: ()| async {
                if true {
                    panic!("kaboom");
                }
                Ok::<u32, String>(1)
            },
            (),
            Msg::Done,
        );
        let messages = run(cmd).await;
        assert!(matches!(&messages[0], Msg::Done(Err(m)) if m.contains("kaboom")));
    }

    #[tokio::test]
    async fn task_never_fails_on_its_own() {
        let cmd = Cmd::task("count", |n: u32| async move { n + 1 }, 1, Msg::Done);
        assert_eq!(run(cmd).await, vec![Msg::Done(Ok(2))]);
    }

    #[tokio::test]
    async fn attempt_routes_to_separate_callbacks() {
        let ok = Cmd::attempt(
            "ok",
            |_: ()| async { Ok::<u32, String>(5) },
            (),
            Msg::Ok,
            Msg::Failed,
        );
        let err = Cmd::attempt(
            "err",
            |_: ()| async { Err::<u32, _>("nope") },
            (),
            Msg::Ok,
            Msg::Failed,
        );
        assert_eq!(
            run(Cmd::batch([ok, err])).await,
            vec![Msg::Ok(5), Msg::Failed("nope".to_string())]
        );
    }

    #[tokio::test]
    async fn operations_do_not_run_until_executed() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let cmd = Cmd::task(
            "touch",
            move |_: ()| async move { counter.fetch_add(1, Ordering::SeqCst) },
            (),
            |_| Msg::Ok(0),
        );
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        run(cmd).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn map_lifts_messages_and_keeps_names() {
        let cmd = Cmd::task("inner", |n: u32| async move { n }, 7, Msg::Done).map(Box::new);
        assert_eq!(cmd.names(), vec!["inner".to_string()]);
        let results = join_all(cmd.into_commands().into_iter().map(|c| c.execute())).await;
        assert_eq!(results, vec![Box::new(Msg::Done(Ok(7)))]);
    }

    #[test]
    fn batch_flattens() {
        let one = Cmd::task("a", |(): ()| async {}, (), |_| Msg::Ok(1));
        let two = Cmd::task("b", |(): ()| async {}, (), |_| Msg::Ok(2));
        let cmd = Cmd::batch([one, Cmd::none(), two]);
        assert_eq!(cmd.len(), 2);
        assert_eq!(cmd.names(), vec!["a".to_string(), "b".to_string()]);
        assert!(Cmd::<Msg>::none().is_none());
    }

    #[test]
    fn debug_lists_command_names() {
        let cmd = Cmd::batch([
            Cmd::task("a", |(): ()| async {}, (), |_| Msg::Ok(1)),
            Cmd::task("b", |(): ()| async {}, (), |_| Msg::Ok(2)),
        ]);
        assert_eq!(format!("{cmd:?}"), r#"["a", "b"]"#);
    }
}
