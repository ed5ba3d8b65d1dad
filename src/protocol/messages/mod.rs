//! Bridge message definitions.
//!
//! Each message implements the `Message` trait.

pub mod connect;
pub mod execute;
pub mod fetch;

pub use connect::{CloseSessionMessage, CreateSessionMessage, SessionInfoMessage, StatusMessage};
pub use execute::{encode_parameters, CloseCursorMessage, CreateCursorMessage, ExecuteMessage};
pub use fetch::FetchMessage;
