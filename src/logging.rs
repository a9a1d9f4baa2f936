/// Conditional logging module for development builds
///
/// The `log!` macro provides informational logging that is compiled out in
/// production (release) builds by default. Warnings should keep using
/// `log::warn!` directly so they survive release builds.
///
/// Logging is enabled when either:
/// - Building in debug mode (`cfg(debug_assertions)`)
/// - The `debug_logging` feature is explicitly enabled
///
/// Output goes through the `log` facade; the binary installs `env_logger`.
///
/// # Examples
///
/// ```rust
/// use spacetime_chart::log;
///
/// let count = 3;
/// log!("Built {} paths", count);
/// ```
#[macro_export]
macro_rules! log {
    ($($arg:expr),+ $(,)?) => {
        #[cfg(any(debug_assertions, feature = "debug_logging"))]
        {
            ::log::debug!($($arg),+);
        }
    };
}

/// Time a block and log its duration when the `perf_timing` feature is on.
///
/// Without the feature the block is evaluated as-is.
#[macro_export]
macro_rules! timed {
    ($label:expr, $body:expr) => {{
        #[cfg(feature = "perf_timing")]
        let __start = ::std::time::Instant::now();
        let __result = $body;
        #[cfg(feature = "perf_timing")]
        {
            ::log::debug!("{} took {:.2}ms", $label, __start.elapsed().as_secs_f64() * 1000.0);
        }
        __result
    }};
}
