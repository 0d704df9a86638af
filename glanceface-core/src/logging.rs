//! Log macro selection
//!
//! `log` wins over `defmt` when both features are on; with neither the
//! macros only borrow their arguments and emit nothing.

#![allow(unused_imports, unused_macros)]

cfg_if::cfg_if! {
    if #[cfg(feature = "log")] {
        pub(crate) use log::{debug, info, trace, warn};
    } else if #[cfg(feature = "defmt")] {
        pub(crate) use defmt::{debug, info, trace, warn};
    } else {
        // Private names: `warn` alone would clash with the built-in lint attribute
        macro_rules! log_noop {
            ($fmt:literal $(, $arg:expr)* $(,)?) => {{
                $(let _ = &$arg;)*
            }};
        }
        macro_rules! log_trace {
            ($($tt:tt)*) => { $crate::logging::log_noop!($($tt)*) };
        }
        macro_rules! log_debug {
            ($($tt:tt)*) => { $crate::logging::log_noop!($($tt)*) };
        }
        macro_rules! log_info {
            ($($tt:tt)*) => { $crate::logging::log_noop!($($tt)*) };
        }
        macro_rules! log_warn {
            ($($tt:tt)*) => { $crate::logging::log_noop!($($tt)*) };
        }
        pub(crate) use log_noop;
        pub(crate) use {
            log_debug as debug, log_info as info, log_trace as trace, log_warn as warn,
        };
    }
}
