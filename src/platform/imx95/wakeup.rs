// Copyright The Rusted Firmware-A Contributors.
//
// SPDX-License-Identifier: BSD-3-Clause

//! Works out which interrupts can wake the system while the GIC is powered down.
//!
//! While the NOC mix is off, wakeups go through the interrupt mask registers of the GPC instead of
//! the GIC. Each GPC mask word covers 32 SPIs, and a set bit masks the interrupt, which is the
//! opposite sense to the GIC enable registers.

use crate::gicv3::GicDistributor;

/// Number of GPC interrupt mask registers.
pub const IMR_NUM: usize = 12;

/// One GPC mask word per group of 32 SPIs. A set bit means the interrupt can't wake the core.
pub type WakeupMasks = [u32; IMR_NUM];

/// Masks with every interrupt masked, for when only a software or GIC wakeup is wanted.
pub const ALL_MASKED: WakeupMasks = [u32::MAX; IMR_NUM];

/// Interrupts which can only wake the system if the wakeup mix stays powered.
///
/// LPUART3-8 (64-69), FlexCAN2-5 (38, 40, 42, 44), uSDHC1-3 (86, 87, 191) and NETC (304).
pub const WAKEUP_MIX_INTERRUPTS: WakeupMasks = [
    0x0,
    0x1540,
    0xc0_000f,
    0x0,
    0x0,
    0x8000_0000,
    0x0,
    0x0,
    0x0,
    0x1_0000,
    0x0,
    0x0,
];

/// SPI of the NETC IREC PCI INT_X0 interrupt. This needs the 24 MHz oscillator rather than the
/// wakeup mix.
pub const NETC_WAKEUP_SPI: u32 = 304;

/// What the current wakeup configuration needs to stay powered during system suspend.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct WakeupSummary {
    /// An interrupt from the wakeup mix is enabled.
    pub has_wakeup_irq: bool,
    /// The NETC wakeup interrupt is enabled.
    pub has_netc_irq: bool,
}

/// Converts a GIC enable register value to the GPC mask for the same interrupts.
///
/// | GICD_ISENABLER bit | GPC mask bit |
/// |--------------------|--------------|
/// | 1 (enabled)        | 0 (wakes)    |
/// | 0 (disabled)       | 1 (masked)   |
pub const fn gpc_mask_from_gic_enabled(enabled: u32) -> u32 {
    !enabled
}

/// Reads the SPIs currently enabled in the GIC and returns the equivalent GPC masks.
pub fn wakeup_masks(gicd: &mut GicDistributor) -> WakeupMasks {
    core::array::from_fn(|group| gpc_mask_from_gic_enabled(gicd.enabled_spis(group)))
}

/// Returns the group and bit of the given SPI in [`WakeupMasks`].
pub const fn spi_position(spi: u32) -> (usize, u32) {
    ((spi / 32) as usize, 1 << (spi % 32))
}

/// Checks which of [`WAKEUP_MIX_INTERRUPTS`] are unmasked in `masks`.
///
/// Each group is classified at most once: a group whose only wakeup mix interrupt is the NETC one
/// counts towards `has_netc_irq`, any other group towards `has_wakeup_irq`.
pub fn classify(masks: &WakeupMasks) -> WakeupSummary {
    let (netc_group, netc_bit) = spi_position(NETC_WAKEUP_SPI);
    let mut summary = WakeupSummary::default();
    for (group, (&mask, &required)) in masks.iter().zip(&WAKEUP_MIX_INTERRUPTS).enumerate() {
        if mask & required == required {
            continue;
        }
        if group == netc_group && required & netc_bit != 0 {
            summary.has_netc_irq = true;
        } else {
            summary.has_wakeup_irq = true;
        }
    }
    summary
}
