//! Command model, transmission scheduler, and the listen/respond loop.

pub mod command;
pub mod hijack;
pub mod listener;
pub mod scheduler;

pub use command::{Action, CommandLists, ListenCommand, Responder, TransmitCommand};
pub use hijack::HijackResponder;
