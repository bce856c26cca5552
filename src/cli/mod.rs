//! Command-line interface module.
//!
//! - `publish`: feed host lifecycle callbacks (JSON lines on stdin) through
//!   the listener and publisher
//! - `listen`: subscribe to a running publisher and print its events

pub mod commands;
pub mod handlers;

pub use commands::{Commands, ListenCommand, PublishCommand};
pub use handlers::{handle_listen, handle_publish};
