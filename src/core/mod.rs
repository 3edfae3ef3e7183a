//! Core mapper module
//!
//! Contains the main KeyMapper struct, its options, the action event queue,
//! and the error type.

mod error;
mod events;
mod mapper;

pub use error::MapperError;
pub use events::{ActionEvent, ActionQueue};
pub use mapper::{KeyMapper, MapperOptions};
