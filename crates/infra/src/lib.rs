//! Infrastructure layer: event storage, command dispatch, read models and the one-click
//! creation service.

pub mod command_dispatcher;
pub mod event_store;
pub mod oneclick;
pub mod projections;
pub mod read_model;

pub use command_dispatcher::{CommandDispatcher, DispatchError};
pub use oneclick::{Created, OneClickService, OneClickServiceError};
