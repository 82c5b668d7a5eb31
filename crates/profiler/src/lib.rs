
pub use instrumentation_macro::*;

#[cfg(feature = "stats")]
mod stats;

#[cfg(feature = "stats")]
pub use stats::*;

#[macro_export]
macro_rules! add_file_line {
    ($a:expr) => { concat!($a, " (", file!(), ":", line!() ,")") }
}

/// Marks the beginning of a profiled session, the guard lives until the end of enclosing scope.
#[macro_export]
macro_rules! session_begin {
    ($a:expr) => {
        #[cfg(feature = "stats")]
        let _session_guard = profiler::SessionGuard::new($a);
    };
}

/// Measures the rest of the enclosing scope.
///  - `pinned` scopes are reported on debug level, all other on trace level
#[macro_export(local_inner_macros)]
macro_rules! scope {
    ($a:expr) => {
        #[cfg(feature = "stats")]
        let _stat_guard = profiler::TimedScope::new(add_file_line!($a), false);
    };
    ($a:expr, pinned) => {
        #[cfg(feature = "stats")]
        let _stat_guard = profiler::TimedScope::new(add_file_line!($a), true);
    };
}

/// Measures a single expression and evaluates to its value.
#[macro_export]
macro_rules! call {
    ($($a:tt)*) => {
        {
            profiler::scope!(stringify!($($a)*));
            $($a)*
        }
    };
}
