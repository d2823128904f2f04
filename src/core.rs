//! The message loop every screen is built on.
//!
//! - [`RemoteData`] / [`Remote`] model a value fetched by a command
//! - [`Cmd`] describes side effects, run by the [`Dispatcher`]
//! - [`Update`] and [`Program`] define the update contract
//! - signals ([`AppSignal`], [`FormSignal`], [`ConfirmSignal`]) report
//!   outcomes to the owner of a program

mod command;
mod dispatch;
#[cfg(test)]
pub mod harness;
mod remote;
mod signal;
mod update;

pub use command::Cmd;
pub use dispatch::{CommandId, Delivery, Dispatcher, Generation};
pub use remote::{Remote, RemoteData, Ticket};
pub use signal::{AppSignal, ConfirmSignal, FormSignal, Notice};
pub use update::{Program, Update};
