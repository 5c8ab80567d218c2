// Copyright The Rusted Firmware-A Contributors.
//
// SPDX-License-Identifier: BSD-3-Clause

//! Q-channel handshakes of peripherals which can wake the system asynchronously.
//!
//! CAN, UART and GPIO controllers can wake the system while their clocks are gated, but only if
//! their LPCG is handed over to the CPU LPM logic during suspend.

use super::wakeup::{WakeupMasks, spi_position};
use crate::scmi::{
    Scmi, ScmiChannel, ScmiError,
    imx9::{LpmSetting, PerLpmConfig},
};
use arrayvec::ArrayVec;

const HANDSHAKE_COUNT: usize = 15;

/// A peripheral low power interface, and the SPI it wakes the system with.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct HandshakeEntry {
    /// Index of the peripheral low power interface.
    pub peripheral: u32,
    /// `None` if the peripheral's handshake is always handed over.
    pub wakeup_irq: Option<u32>,
    /// Whether the handshake has been handed over for the current suspend.
    pub active: bool,
}

impl HandshakeEntry {
    const fn new(peripheral: u32, wakeup_irq: Option<u32>) -> Self {
        Self {
            peripheral,
            wakeup_irq,
            active: false,
        }
    }
}

const HANDSHAKES: [HandshakeEntry; HANDSHAKE_COUNT] = [
    // CAN1-5
    HandshakeEntry::new(5, Some(8)),
    HandshakeEntry::new(6, Some(38)),
    HandshakeEntry::new(7, Some(40)),
    HandshakeEntry::new(8, Some(42)),
    HandshakeEntry::new(9, Some(44)),
    // LPUART1, LPUART4-8
    HandshakeEntry::new(10, Some(19)),
    HandshakeEntry::new(13, Some(65)),
    HandshakeEntry::new(14, Some(66)),
    HandshakeEntry::new(15, Some(67)),
    HandshakeEntry::new(16, Some(68)),
    HandshakeEntry::new(17, Some(69)),
    // GPIO2-5
    HandshakeEntry::new(1, None),
    HandshakeEntry::new(2, None),
    HandshakeEntry::new(3, None),
    HandshakeEntry::new(4, None),
];

/// The handshake configuration of one suspend and resume.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct QchannelHandshake {
    entries: [HandshakeEntry; HANDSHAKE_COUNT],
}

impl QchannelHandshake {
    /// Creates a new handshake table with nothing active.
    pub const fn new() -> Self {
        Self {
            entries: HANDSHAKES,
        }
    }

    /// Marks the peripherals whose wakeup interrupt is unmasked in `masks` as active, and the
    /// others as inactive.
    pub fn mark_active_wakeups(&mut self, masks: &WakeupMasks) {
        for entry in &mut self.entries {
            let Some(irq) = entry.wakeup_irq else {
                continue;
            };
            let (group, bit) = spi_position(irq);
            if let Some(mask) = masks.get(group) {
                entry.active = mask & bit == 0;
            }
        }
    }

    /// Returns whether no handshake is currently handed over.
    pub fn is_idle(&self) -> bool {
        self.entries.iter().all(|entry| !entry.active)
    }

    /// Hands the handshakes of the active peripherals, and of those without a wakeup interrupt,
    /// over to the LPM logic of `cpu_id`.
    pub fn enable<C: ScmiChannel>(
        &mut self,
        scmi: &mut Scmi<C>,
        cpu_id: u32,
    ) -> Result<(), ScmiError> {
        let mut configs = ArrayVec::<PerLpmConfig, HANDSHAKE_COUNT>::new();
        for entry in &mut self.entries {
            if entry.wakeup_irq.is_none() {
                entry.active = true;
            }
            if entry.active {
                configs.push(PerLpmConfig::new(
                    entry.peripheral,
                    LpmSetting::OnRunWaitStop,
                ));
            }
        }
        scmi.per_set_lpm_mode(cpu_id, &configs)
    }

    /// Puts back the handshakes handed over by [`Self::enable`].
    pub fn disable<C: ScmiChannel>(
        &mut self,
        scmi: &mut Scmi<C>,
        cpu_id: u32,
    ) -> Result<(), ScmiError> {
        let mut configs = ArrayVec::<PerLpmConfig, HANDSHAKE_COUNT>::new();
        for entry in self.entries.iter_mut().filter(|entry| entry.active) {
            configs.push(PerLpmConfig::new(entry.peripheral, LpmSetting::Always));
            entry.active = false;
        }
        scmi.per_set_lpm_mode(cpu_id, &configs)
    }
}
