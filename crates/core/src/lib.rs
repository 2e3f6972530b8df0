#![forbid(unsafe_code)]

pub mod error;
pub mod exam;
pub mod model;
pub mod progression;
pub mod time;

pub use error::Error;
pub use time::Clock;
