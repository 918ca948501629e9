mod command;
pub mod error;
mod service;

pub use command::*;
pub use error::*;
pub use service::*;
