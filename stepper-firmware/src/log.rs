//! Logging shim so the rest of the crate can call `log::info!`/`log::warn!`
//! regardless of whether the `defmt-logging` feature (and its `defmt-rtt`
//! transport) is enabled for this build.

#[cfg(feature = "defmt-logging")]
macro_rules! info {
    ($($arg:tt)*) => { defmt::info!($($arg)*) };
}
#[cfg(not(feature = "defmt-logging"))]
macro_rules! info {
    ($($arg:tt)*) => {{}};
}

pub(crate) use info;
