//! Engine logging
//!
//! In the browser the messages go straight to the devtools console, the same
//! way `init()` announces itself. Native builds (tests, tools) route through
//! the `log` facade so any installed logger picks them up.

#[doc(hidden)]
pub fn emit_info(msg: &str) {
    #[cfg(target_arch = "wasm32")]
    web_sys::console::log_1(&msg.into());
    #[cfg(not(target_arch = "wasm32"))]
    log::info!("{}", msg);
}

#[doc(hidden)]
pub fn emit_warn(msg: &str) {
    #[cfg(target_arch = "wasm32")]
    web_sys::console::warn_1(&msg.into());
    #[cfg(not(target_arch = "wasm32"))]
    log::warn!("{}", msg);
}

#[doc(hidden)]
pub fn emit_error(msg: &str) {
    #[cfg(target_arch = "wasm32")]
    web_sys::console::error_1(&msg.into());
    #[cfg(not(target_arch = "wasm32"))]
    log::error!("{}", msg);
}

#[macro_export]
macro_rules! sim_log {
    ($($arg:tt)*) => {
        $crate::core::logging::emit_info(&format!($($arg)*))
    };
}

#[macro_export]
macro_rules! sim_warn {
    ($($arg:tt)*) => {
        $crate::core::logging::emit_warn(&format!($($arg)*))
    };
}

#[macro_export]
macro_rules! sim_error {
    ($($arg:tt)*) => {
        $crate::core::logging::emit_error(&format!($($arg)*))
    };
}
