// Copyright The Rusted Firmware-A Contributors.
//
// SPDX-License-Identifier: BSD-3-Clause

//! Save and restore of the GPIO banks in the wakeup mix, which lose their state when it is powered
//! down.

use core::mem::offset_of;
use safe_mmio::{UniqueMmioPointer, field, fields::ReadPureWrite};
use zerocopy::FromZeros;

/// Number of GPIO banks in the wakeup mix.
pub const GPIO_BANK_COUNT: usize = 4;

const MAX_PIN_COUNT: usize = 32;

/// Base address and number of pins of each GPIO bank in the wakeup mix, GPIO2 to GPIO5.
pub const GPIO_BANKS: [(usize, usize); GPIO_BANK_COUNT] = [
    (0x4381_0000, 32),
    (0x4382_0000, 32),
    (0x4384_0000, 30),
    (0x4385_0000, 18),
];

/// RGPIO registers.
#[derive(FromZeros)]
#[repr(C)]
pub struct GpioRegisters {
    _version: [u32; 3],
    /// LOCK, PCNS, ICNS and PCNP: the secure access control registers.
    pub permission: [ReadPureWrite<u32>; 4],
    /// Interrupt control non-secure privilege.
    pub icnp: ReadPureWrite<u32>,
    _reserved0: [u32; 8],
    /// Port data output.
    pub pdor: ReadPureWrite<u32>,
    _set_clear_toggle: [u32; 4],
    /// Port data direction.
    pub pddr: ReadPureWrite<u32>,
    /// Port input disable.
    pub pidr: ReadPureWrite<u32>,
    _reserved1: [u32; 9],
    /// Interrupt control register of each pin.
    pub icr: [ReadPureWrite<u32>; MAX_PIN_COUNT],
}

const _: () = assert!(offset_of!(GpioRegisters, permission) == 0x0c);
const _: () = assert!(offset_of!(GpioRegisters, icnp) == 0x1c);
const _: () = assert!(offset_of!(GpioRegisters, pdor) == 0x40);
const _: () = assert!(offset_of!(GpioRegisters, pddr) == 0x54);
const _: () = assert!(offset_of!(GpioRegisters, pidr) == 0x58);
const _: () = assert!(offset_of!(GpioRegisters, icr) == 0x80);

/// A stage of restoring a bank.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum RestoreStep {
    ClearPermission,
    InterruptControl,
    PortControl,
    Permission,
}

/// The non-secure configuration is written with secure access control cleared, as it was read by
/// [`GpioBank::save`]. Access control is written once, last.
const RESTORE_ORDER: [RestoreStep; 4] = [
    RestoreStep::ClearPermission,
    RestoreStep::InterruptControl,
    RestoreStep::PortControl,
    RestoreStep::Permission,
];

/// Saved state of one bank.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
struct GpioBankContext {
    permission: [u32; 4],
    /// ICNP, PDOR, PDDR and PIDR.
    control: [u32; 4],
    icr: [u32; MAX_PIN_COUNT],
}

/// State of all the wakeup mix GPIO banks, saved by [`GpioBanks::save`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GpioContext {
    banks: [GpioBankContext; GPIO_BANK_COUNT],
    wakeup: bool,
}

impl GpioContext {
    /// Returns whether any pin had its interrupt enabled when the context was saved, which means it
    /// may be used to wake the system.
    pub fn wakeup_requested(&self) -> bool {
        self.wakeup
    }
}

/// One GPIO bank.
pub struct GpioBank<'a> {
    regs: UniqueMmioPointer<'a, GpioRegisters>,
    pin_count: usize,
}

impl<'a> GpioBank<'a> {
    /// Creates a new instance for the bank at the given registers, with the given number of pins.
    pub fn new(regs: UniqueMmioPointer<'a, GpioRegisters>, pin_count: usize) -> Self {
        Self {
            regs,
            pin_count: pin_count.min(MAX_PIN_COUNT),
        }
    }

    fn save(&mut self) -> GpioBankContext {
        let mut context = GpioBankContext::default();

        // The ICRs only show the non-secure configuration with the secure access control cleared.
        for (saved, mut register) in context
            .permission
            .iter_mut()
            .zip(field!(self.regs, permission).split())
        {
            *saved = register.read();
            register.write(0);
        }
        context.control = [
            field!(self.regs, icnp).read(),
            field!(self.regs, pdor).read(),
            field!(self.regs, pddr).read(),
            field!(self.regs, pidr).read(),
        ];

        let mut icr = field!(self.regs, icr);
        for (pin, saved) in context.icr.iter_mut().enumerate().take(self.pin_count) {
            if let Some(register) = icr.get(pin) {
                *saved = register.read();
            }
        }

        self.write_permission(&context.permission);
        context
    }

    fn restore(&mut self, context: &GpioBankContext) {
        for step in RESTORE_ORDER {
            self.restore_step(step, context);
        }
    }

    fn restore_step(&mut self, step: RestoreStep, context: &GpioBankContext) {
        match step {
            RestoreStep::ClearPermission => self.write_permission(&[0; 4]),
            RestoreStep::InterruptControl => {
                let mut icr = field!(self.regs, icr);
                for (pin, &value) in context.icr.iter().enumerate().take(self.pin_count) {
                    if let Some(mut register) = icr.get(pin) {
                        register.write(value);
                    }
                }
            }
            RestoreStep::PortControl => {
                let [icnp, pdor, pddr, pidr] = context.control;
                field!(self.regs, icnp).write(icnp);
                field!(self.regs, pdor).write(pdor);
                field!(self.regs, pddr).write(pddr);
                field!(self.regs, pidr).write(pidr);
            }
            RestoreStep::Permission => self.write_permission(&context.permission),
        }
    }

    fn write_permission(&mut self, values: &[u32; 4]) {
        for (&value, mut register) in values.iter().zip(field!(self.regs, permission).split()) {
            register.write(value);
        }
    }
}

/// The GPIO banks of the wakeup mix.
pub struct GpioBanks<'a> {
    banks: [GpioBank<'a>; GPIO_BANK_COUNT],
}

impl<'a> GpioBanks<'a> {
    /// Creates a new instance for the banks at the given registers, in the order of
    /// [`GPIO_BANKS`].
    pub fn new(regs: [UniqueMmioPointer<'a, GpioRegisters>; GPIO_BANK_COUNT]) -> Self {
        let mut pin_counts = GPIO_BANKS.iter().map(|&(_, pin_count)| pin_count);
        Self {
            banks: regs.map(|regs| GpioBank::new(regs, pin_counts.next().unwrap_or(0))),
        }
    }

    /// Saves the configuration of all the banks.
    pub fn save(&mut self) -> GpioContext {
        let mut banks = [GpioBankContext::default(); GPIO_BANK_COUNT];
        for (saved, bank) in banks.iter_mut().zip(&mut self.banks) {
            *saved = bank.save();
        }
        GpioContext {
            wakeup: banks.iter().any(|bank| bank.icr.iter().any(|&icr| icr != 0)),
            banks,
        }
    }

    /// Restores the configuration saved by [`Self::save`].
    pub fn restore(&mut self, context: GpioContext) {
        for (saved, bank) in context.banks.iter().zip(&mut self.banks) {
            bank.restore(saved);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fake_banks() -> Box<[GpioRegisters; GPIO_BANK_COUNT]> {
        Box::new(FromZeros::new_zeroed())
    }

    fn fill(regs: &mut GpioRegisters, seed: u32) {
        for (index, register) in regs.permission.iter_mut().enumerate() {
            register.0 = seed + index as u32;
        }
        regs.icnp.0 = seed + 0x10;
        regs.pdor.0 = seed + 0x11;
        regs.pddr.0 = seed + 0x12;
        regs.pidr.0 = seed + 0x13;
    }

    fn banks(regs: &mut [GpioRegisters; GPIO_BANK_COUNT]) -> GpioBanks<'_> {
        GpioBanks::new(regs.each_mut().map(UniqueMmioPointer::from))
    }

    #[test]
    fn save_without_wakeup() {
        let mut regs = fake_banks();
        fill(&mut regs[0], 0x100);
        let context = banks(&mut regs).save();
        assert!(!context.wakeup_requested());
        // Access control is put back after reading the ICRs.
        assert_eq!(regs[0].permission.each_ref().map(|r| r.0), [0x100, 0x101, 0x102, 0x103]);
    }

    #[test]
    fn round_trip() {
        let mut regs = fake_banks();
        for (index, bank) in regs.iter_mut().enumerate() {
            fill(bank, 0x1000 * (index as u32 + 1));
        }
        regs[2].icr[5].0 = 0x000a_0000;
        regs[3].icr[17].0 = 0x0009_0000;
        // Beyond the pins of GPIO5, so neither saved nor restored.
        regs[3].icr[20].0 = 0xdead;

        let context = banks(&mut regs).save();
        assert!(context.wakeup_requested());

        // Power down the wakeup mix.
        let mut lost = fake_banks();
        banks(&mut lost).restore(context);

        for (restored, original) in lost.iter().zip(regs.iter()) {
            assert_eq!(
                restored.permission.each_ref().map(|r| r.0),
                original.permission.each_ref().map(|r| r.0)
            );
            assert_eq!(restored.icnp.0, original.icnp.0);
            assert_eq!(restored.pdor.0, original.pdor.0);
            assert_eq!(restored.pddr.0, original.pddr.0);
            assert_eq!(restored.pidr.0, original.pidr.0);
        }
        assert_eq!(lost[2].icr[5].0, 0x000a_0000);
        assert_eq!(lost[3].icr[17].0, 0x0009_0000);
        assert_eq!(lost[3].icr[20].0, 0);
    }

    #[test]
    fn access_control_is_restored_last() {
        let mut regs = fake_banks();
        fill(&mut regs[0], 0x100);
        regs[0].icr[2].0 = 0x000b_0000;
        let context = banks(&mut regs).save();
        let saved = &context.banks[0];

        // Stale access control left in the bank.
        let mut lost = fake_banks();
        fill(&mut lost[0], 0xdead_0000);
        let mut bank = GpioBank::new(UniqueMmioPointer::from(&mut lost[0]), 32);
        for (index, step) in RESTORE_ORDER.into_iter().enumerate() {
            bank.restore_step(step, saved);
            let permission = field!(bank.regs, permission).split().map(|r| r.read());
            if index + 1 < RESTORE_ORDER.len() {
                assert_eq!(permission, [0; 4], "access control set after {step:?}");
            } else {
                assert_eq!(permission, [0x100, 0x101, 0x102, 0x103]);
            }
        }
        drop(bank);
        assert_eq!(lost[0].icnp.0, 0x110);
        assert_eq!(lost[0].pidr.0, 0x113);
        assert_eq!(lost[0].icr[2].0, 0x000b_0000);
    }

    #[test]
    fn wakeup_pin_beyond_bank_is_ignored() {
        let mut regs = fake_banks();
        regs[3].icr[18].0 = 1;
        assert!(!banks(&mut regs).save().wakeup_requested());
    }
}
