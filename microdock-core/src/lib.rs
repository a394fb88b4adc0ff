pub mod compose;
pub mod config;
pub mod constants;
pub mod container;
pub mod error;
pub mod lifecycle;
pub mod local;
pub mod naming;
pub mod presentation;
pub mod scaffold;
pub mod status;
pub mod workspace;

pub use error::{MicrodockError, Result};
