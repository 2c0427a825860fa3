//! Utility modules

pub mod clock;
pub mod feeds;
pub mod observer;
pub mod validation;

pub use clock::*;
pub use feeds::*;
pub use observer::*;
pub use validation::*;
