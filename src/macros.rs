/// Enters a trace span for the rest of the enclosing block.
///
/// Compiled out unless built with `--cfg enable_trace`.
#[macro_export]
macro_rules! op_span {
    ($name:literal) => {
        #[cfg(enable_trace)]
        let _span = tracing::span!(tracing::Level::TRACE, $name).entered();
    };
    ($name:literal, $($field:tt)+) => {
        #[cfg(enable_trace)]
        let _span = tracing::span!(tracing::Level::TRACE, $name, $($field)+).entered();
    };
}
