//! Events, commands and the envelope that carries a committed event to read models.

pub mod command;
pub mod envelope;
pub mod event;

pub use command::Command;
pub use envelope::EventEnvelope;
pub use event::Event;
