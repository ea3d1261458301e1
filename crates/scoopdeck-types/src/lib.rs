//! Shared types for the Scoopdeck front-end service.

mod notification;
mod record;
mod request;

pub use notification::*;
pub use record::*;
pub use request::*;
