#![forbid(unsafe_code)]

pub mod error;
pub mod identity;
pub mod model;
pub mod time;

pub use error::{Error, ValidationError};
pub use identity::{Identity, IdentityContext};
pub use time::Clock;
