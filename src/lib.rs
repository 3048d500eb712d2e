//! Drive `avdmanager`, `emulator` and `adb` from Rust.
//!
//! Listings from `avdmanager` are parsed into [`Target`], [`Device`] and
//! [`Avd`] records, and an [`Avd`] owns the emulator process started for it.
//! Everything goes through [`AvdManager`], which runs the tools with a
//! [`Runtime`].

#[cfg(test)]
#[macro_use]
extern crate derive_builder;

pub use crate::avd::{Avd, CreateAvd};
pub use crate::device::{resolve_device, Device};
pub use crate::emulator::{ProcessState, StartOptions, DEFAULT_CONSOLE_PORT, DETACH_GRACE};
pub use crate::error::{Error, Result};
pub use crate::manager::AvdManager;
pub use crate::runtime::{RealRuntime, Runtime};
pub use crate::target::Target;
pub use crate::tool::{Tool, ToolPaths};

#[macro_use]
mod runtime;

mod adb;
mod avd;
mod device;
mod emulator;
mod error;
mod exitstatus;
mod manager;
mod parser;
mod target;
mod tool;

#[cfg(test)]
pub(crate) fn debug_log() {
    let _ = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(true)
        .with_test_writer()
        .try_init();
}
