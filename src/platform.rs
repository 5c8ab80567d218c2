// Copyright The Rusted Firmware-A Contributors.
//
// SPDX-License-Identifier: BSD-3-Clause

macro_rules! select_platform {
    (platform = $condition:literal, $mod:ident::$plat_impl:ident) => {
        #[cfg(any(test, platform = $condition))]
        pub mod $mod;

        #[cfg(all(not(test), platform = $condition))]
        pub use $mod::$plat_impl as PlatformImpl;
    };
    (test, $mod:ident::$plat_impl:ident) => {
        #[cfg(test)]
        pub mod $mod;

        #[cfg(test)]
        pub use $mod::$plat_impl as PlatformImpl;
    };
}

select_platform!(platform = "imx95", imx95::Imx95);
select_platform!(platform = "imx8m", imx8m::Imx8m);
select_platform!(test, test::TestPlatform);

use crate::{logger::LogSink, psci::PsciPlatformInterface};

/// Type alias for convenience, to avoid having to use the complicated type name everywhere.
pub type LogSinkImpl = <PlatformImpl as Platform>::LogSinkImpl;

/// The PSCI callbacks of the selected platform.
pub type PsciPlatformImpl = <PlatformImpl as Platform>::PsciPlatformImpl;
/// The local power state type of the selected platform.
pub type PlatformPowerState = <PsciPlatformImpl as PsciPlatformInterface>::PlatformPowerState;

/// The hooks implemented by all platforms.
pub trait Platform {
    /// Platform dependent LogSink implementation type for Logger.
    type LogSinkImpl: LogSink;

    /// Platform dependent PsciPlatformInterface implementation type.
    type PsciPlatformImpl: PsciPlatformInterface;

    /// Initialises the logger.
    ///
    /// Any logs sent before this is called will be ignored.
    fn init_logger();

    /// Returns an option with a PSCI platform implementation handle, and programs the initial power
    /// configuration. The function should only be called once, when it returns `Some`. All
    /// subsequent calls must return `None`.
    ///
    /// `secure_entrypoint` is the address cores start executing BL31 from when they are powered on
    /// or resume from a power down state.
    fn psci_platform(secure_entrypoint: u64) -> Option<Self::PsciPlatformImpl>;
}

#[cfg(not(test))]
unsafe extern "C" {
    /// Writes a character to the console registered by BL31, returning it or a negative value on
    /// error.
    safe fn console_putc(c: i32) -> i32;
}

/// The BL31 console, which is set up before the platform code runs.
#[cfg(not(test))]
pub struct Console;

#[cfg(not(test))]
impl core::fmt::Write for Console {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        for byte in s.bytes() {
            if byte == b'\n' && console_putc(b'\r'.into()) < 0 {
                return Err(core::fmt::Error);
            }
            if console_putc(byte.into()) < 0 {
                return Err(core::fmt::Error);
            }
        }
        Ok(())
    }
}
