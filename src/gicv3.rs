// Copyright The Rusted Firmware-A Contributors.
//
// SPDX-License-Identifier: BSD-3-Clause

//! GICv3 handling needed around power transitions.
//!
//! When the domain containing the distributor is powered off, its SPI configuration is lost and
//! has to be saved beforehand. The CPU interface of a core has to be disabled before the core goes
//! down, so that no interrupt is acknowledged on the way.

use crate::aarch64::{dsb_sy, isb};
use arm_gic::gicv3::GicCpuInterface;
use bitflags::bitflags;
use core::{hint::spin_loop, mem::offset_of};
use safe_mmio::{
    UniqueMmioPointer, field,
    fields::{ReadPure, ReadPureWrite},
};
use zerocopy::FromZeros;

/// Number of interrupts covered by one 32-bit enable, group or group modifier register.
const INTERRUPTS_PER_WORD: usize = 32;
const PRIORITY_WORDS_PER_GROUP: usize = INTERRUPTS_PER_WORD / 4;
const CONFIG_WORDS_PER_GROUP: usize = INTERRUPTS_PER_WORD / 16;

bitflags! {
    /// GICD_CTLR value.
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    #[repr(transparent)]
    pub struct DistributorControl: u32 {
        const ENABLE_GRP0 = 1 << 0;
        const ENABLE_GRP1NS = 1 << 1;
        const ENABLE_GRP1S = 1 << 2;
        const ARE_S = 1 << 4;
        const ARE_NS = 1 << 5;
        const DS = 1 << 6;
        const RWP = 1 << 31;
    }
}

impl DistributorControl {
    /// All the interrupt group enables.
    pub const ENABLE_ALL: Self = Self::ENABLE_GRP0
        .union(Self::ENABLE_GRP1NS)
        .union(Self::ENABLE_GRP1S);
}

/// The GICD registers which hold SPI configuration.
#[derive(FromZeros)]
#[repr(C, align(8))]
pub struct Gicd {
    pub ctlr: ReadPureWrite<u32>,
    pub typer: ReadPure<u32>,
    _reserved0: [u32; 30],
    pub igroupr: [ReadPureWrite<u32>; 32],
    pub isenabler: [ReadPureWrite<u32>; 32],
    pub icenabler: [ReadPureWrite<u32>; 32],
    _reserved1: [u32; 128],
    pub ipriorityr: [ReadPureWrite<u32>; 256],
    _reserved2: [u32; 256],
    pub icfgr: [ReadPureWrite<u32>; 64],
    pub igrpmodr: [ReadPureWrite<u32>; 32],
    _reserved3: [u32; 5344],
    pub irouter: [ReadPureWrite<u64>; 988],
}

const _: () = assert!(offset_of!(Gicd, igroupr) == 0x80);
const _: () = assert!(offset_of!(Gicd, isenabler) == 0x100);
const _: () = assert!(offset_of!(Gicd, icenabler) == 0x180);
const _: () = assert!(offset_of!(Gicd, ipriorityr) == 0x400);
const _: () = assert!(offset_of!(Gicd, icfgr) == 0xc00);
const _: () = assert!(offset_of!(Gicd, igrpmodr) == 0xd00);
const _: () = assert!(offset_of!(Gicd, irouter) == 0x6100);

/// Saved configuration of 32 SPIs.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct SpiGroupContext {
    route: [u64; INTERRUPTS_PER_WORD],
    priority: [u32; PRIORITY_WORDS_PER_GROUP],
    config: [u32; CONFIG_WORDS_PER_GROUP],
    group: u32,
    group_modifier: u32,
    enable: u32,
}

/// Distributor state saved by [`GicDistributor::save`], covering the first `GROUPS` groups of 32
/// SPIs.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DistributorContext<const GROUPS: usize> {
    control: DistributorControl,
    spi_groups: [SpiGroupContext; GROUPS],
}

/// The GIC distributor.
pub struct GicDistributor<'a> {
    regs: UniqueMmioPointer<'a, Gicd>,
}

impl<'a> GicDistributor<'a> {
    /// Creates a new instance for the distributor at the given registers.
    pub fn new(regs: UniqueMmioPointer<'a, Gicd>) -> Self {
        Self { regs }
    }

    /// Returns the enable bits of the SPIs `32 * spi_group + 32` to `32 * spi_group + 63`.
    pub fn enabled_spis(&mut self, spi_group: usize) -> u32 {
        field!(self.regs, isenabler)
            .get(spi_group + 1)
            .map_or(0, |isenabler| isenabler.read())
    }

    /// Clears the given bits of GICD_CTLR and waits for the write to take effect.
    pub fn clear_control(&mut self, flags: DistributorControl) {
        let control = DistributorControl::from_bits_retain(field!(self.regs, ctlr).read());
        field!(self.regs, ctlr).write((control - flags).bits());
        self.wait_for_pending_write();
    }

    /// Saves the SPI configuration of the distributor.
    pub fn save<const GROUPS: usize>(&mut self) -> DistributorContext<GROUPS> {
        let mut context = DistributorContext {
            control: DistributorControl::from_bits_retain(field!(self.regs, ctlr).read()),
            spi_groups: [SpiGroupContext::new_zeroed(); GROUPS],
        };
        for (index, saved) in context.spi_groups.iter_mut().enumerate() {
            let register = index + 1;
            saved.group = read_word(field!(self.regs, igroupr).as_mut_slice(), register);
            saved.group_modifier = read_word(field!(self.regs, igrpmodr).as_mut_slice(), register);
            saved.enable = read_word(field!(self.regs, isenabler).as_mut_slice(), register);
            for (word, value) in saved.config.iter_mut().enumerate() {
                *value = read_word(
                    field!(self.regs, icfgr).as_mut_slice(),
                    register * CONFIG_WORDS_PER_GROUP + word,
                );
            }
            for (word, value) in saved.priority.iter_mut().enumerate() {
                *value = read_word(
                    field!(self.regs, ipriorityr).as_mut_slice(),
                    register * PRIORITY_WORDS_PER_GROUP + word,
                );
            }
            let mut irouter = field!(self.regs, irouter);
            for (spi, route) in saved.route.iter_mut().enumerate() {
                if let Some(register) = irouter.get(index * INTERRUPTS_PER_WORD + spi) {
                    *route = register.read();
                }
            }
        }
        context
    }

    /// Restores the SPI configuration saved by [`Self::save`].
    ///
    /// The distributor is disabled while its configuration is rewritten, and the SPIs are only
    /// enabled again once everything else is in place.
    pub fn restore<const GROUPS: usize>(&mut self, context: &DistributorContext<GROUPS>) {
        self.clear_control(DistributorControl::ENABLE_ALL);

        for (index, saved) in context.spi_groups.iter().enumerate() {
            let register = index + 1;
            write_word(field!(self.regs, icenabler).as_mut_slice(), register, u32::MAX);
            write_word(field!(self.regs, igroupr).as_mut_slice(), register, saved.group);
            write_word(
                field!(self.regs, igrpmodr).as_mut_slice(),
                register,
                saved.group_modifier,
            );
            for (word, &value) in saved.config.iter().enumerate() {
                write_word(
                    field!(self.regs, icfgr).as_mut_slice(),
                    register * CONFIG_WORDS_PER_GROUP + word,
                    value,
                );
            }
            for (word, &value) in saved.priority.iter().enumerate() {
                write_word(
                    field!(self.regs, ipriorityr).as_mut_slice(),
                    register * PRIORITY_WORDS_PER_GROUP + word,
                    value,
                );
            }
            let mut irouter = field!(self.regs, irouter);
            for (spi, &route) in saved.route.iter().enumerate() {
                if let Some(mut register) = irouter.get(index * INTERRUPTS_PER_WORD + spi) {
                    register.write(route);
                }
            }
        }
        for (index, saved) in context.spi_groups.iter().enumerate() {
            write_word(field!(self.regs, isenabler).as_mut_slice(), index + 1, saved.enable);
        }

        field!(self.regs, ctlr).write(context.control.difference(DistributorControl::RWP).bits());
        self.wait_for_pending_write();
    }

    fn wait_for_pending_write(&mut self) {
        while DistributorControl::from_bits_retain(field!(self.regs, ctlr).read())
            .contains(DistributorControl::RWP)
        {
            spin_loop();
        }
    }
}

impl SpiGroupContext {
    const fn new_zeroed() -> Self {
        Self {
            route: [0; INTERRUPTS_PER_WORD],
            priority: [0; PRIORITY_WORDS_PER_GROUP],
            config: [0; CONFIG_WORDS_PER_GROUP],
            group: 0,
            group_modifier: 0,
            enable: 0,
        }
    }
}

fn read_word(mut registers: UniqueMmioPointer<[ReadPureWrite<u32>]>, index: usize) -> u32 {
    registers.get(index).map_or(0, |register| register.read())
}

fn write_word(mut registers: UniqueMmioPointer<[ReadPureWrite<u32>]>, index: usize, value: u32) {
    if let Some(mut register) = registers.get(index) {
        register.write(value);
    }
}

/// Enables the GIC CPU interface of the calling core.
pub fn enable_cpu_interface() {
    GicCpuInterface::enable_group0(true);
    GicCpuInterface::enable_group1(true);

    isb();
    dsb_sy();
}

/// Disables the GIC CPU interface of the calling core.
pub fn disable_cpu_interface() {
    GicCpuInterface::enable_group0(false);
    GicCpuInterface::enable_group1(false);

    // Synchronize accesses to group enable registers.
    isb();

    // Ensure visibility of system register writes.
    dsb_sy();
}
