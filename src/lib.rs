// Copyright The Rusted Firmware-A Contributors.
//
// SPDX-License-Identifier: BSD-3-Clause

//! Platform power management for NXP i.MX SoCs.
//!
//! This crate provides the platform half of PSCI for BL31: the generic PSCI state machine decides
//! which power levels a core, cluster or the whole system should enter, and calls into the
//! [`PsciPlatformInterface`] implementation selected here to actually get there. On i.MX95 that
//! means talking to the System Manager over SCMI, while the older i.MX8M family drives its GPC
//! directly.

#![cfg_attr(not(test), no_std)]

mod aarch64;
mod debug;
mod gicv3;
mod logger;
/// Platform selection and the hooks each platform implements.
pub mod platform;
pub mod psci;
pub mod scmi;
mod sysregs;

pub use platform::{Platform, PlatformImpl, PsciPlatformImpl};
pub use psci::{PlatformPowerStateInterface, PsciCompositePowerState, PsciPlatformInterface};

/// Brings up logging and returns the platform's PSCI callback implementation.
///
/// `secure_entrypoint` is the warm boot entry point of BL31, which is programmed as the reset
/// vector of cores being powered on or resumed. This must be called on the primary core before any
/// secondary core is released. Only the first call returns `Some`.
pub fn setup_psci_ops(secure_entrypoint: u64) -> Option<PsciPlatformImpl> {
    PlatformImpl::init_logger();
    PlatformImpl::psci_platform(secure_entrypoint)
}
