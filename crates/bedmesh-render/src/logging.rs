#![forbid(unsafe_code)]

//! Logging facade.
//!
//! With the `tracing` feature enabled this module re-exports the `tracing`
//! macros. Without it, the same macro names are defined as no-ops at the
//! crate root so call sites compile unchanged:
//!
//! ```ignore
//! #[cfg(feature = "tracing")]
//! use crate::logging::{debug, warn};
//! #[cfg(not(feature = "tracing"))]
//! use crate::{debug, warn};
//! ```

#[cfg(feature = "tracing")]
pub use tracing::{debug, error, info, trace, warn};

#[cfg(not(feature = "tracing"))]
#[macro_export]
#[doc(hidden)]
macro_rules! trace {
    ($($arg:tt)*) => {};
}

#[cfg(not(feature = "tracing"))]
#[macro_export]
#[doc(hidden)]
macro_rules! debug {
    ($($arg:tt)*) => {};
}

#[cfg(not(feature = "tracing"))]
#[macro_export]
#[doc(hidden)]
macro_rules! info {
    ($($arg:tt)*) => {};
}

#[cfg(not(feature = "tracing"))]
#[macro_export]
#[doc(hidden)]
macro_rules! warn {
    ($($arg:tt)*) => {};
}

#[cfg(not(feature = "tracing"))]
#[macro_export]
#[doc(hidden)]
macro_rules! error {
    ($($arg:tt)*) => {};
}
