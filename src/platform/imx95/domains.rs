// Copyright The Rusted Firmware-A Contributors.
//
// SPDX-License-Identifier: BSD-3-Clause

//! Power domain topology of the i.MX95 A55 complex, as numbered by the System Manager.

use arm_psci::Mpidr;
use arm_sysregs::read_mpidr_el1;

/// Number of A55 cores.
pub const CORE_COUNT: usize = 6;

/// Mix slice ids of the power domains outside the A55 complex which are managed here.
pub const MIX_SLICE_NOC: u32 = 19;
/// Power domain of the wakeup mix, holding the GPIOs and other wakeup capable peripherals.
pub const MIX_SLICE_WAKEUP: u32 = 22;

/// Memory slice ids used in retention masks.
pub const MEM_SLICE_A55L3: u32 = 9;
/// Memory slice of the OCRAM in the NOC mix.
pub const MEM_SLICE_NOC_OCRAM: u32 = 16;

/// SCMI identities of a core, or of the cluster.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PowerDomainDescriptor {
    /// Id of the CPU in the i.MX CPU protocol.
    pub cpu_id: u32,
    /// Mix slice powering the CPU.
    pub power_domain: u32,
    /// Memory slices which depend on the mix slice.
    pub memory_domains: &'static [u32],
}

const fn core(index: u32) -> PowerDomainDescriptor {
    PowerDomainDescriptor {
        cpu_id: 2 + index,
        power_domain: 5 + index,
        memory_domains: match index {
            0 => &[2],
            1 => &[3],
            2 => &[4],
            3 => &[5],
            4 => &[6],
            _ => &[7],
        },
    }
}

static DESCRIPTORS: [PowerDomainDescriptor; CORE_COUNT + 1] = [
    core(0),
    core(1),
    core(2),
    core(3),
    core(4),
    core(5),
    // A55P, the cluster and its L3.
    PowerDomainDescriptor {
        cpu_id: 8,
        power_domain: 11,
        memory_domains: &[MEM_SLICE_A55L3],
    },
];

/// Index of one of the A55 cores.
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub struct CoreId(usize);

impl CoreId {
    /// The core which boots BL31.
    pub const BOOT: Self = Self(0);

    /// Returns the core with the given linear index, if there is one.
    pub const fn new(index: usize) -> Option<Self> {
        if index < CORE_COUNT {
            Some(Self(index))
        } else {
            None
        }
    }

    /// Returns the core with the given MPIDR, if there is one.
    ///
    /// The A55 reports its core number in affinity level 1.
    pub fn from_mpidr(mpidr: Mpidr) -> Option<Self> {
        if mpidr.aff0 != 0 || mpidr.aff2 != 0 || mpidr.aff3.unwrap_or(0) != 0 {
            return None;
        }
        Self::new(mpidr.aff1.into())
    }

    /// Returns the core this code is running on.
    pub fn current() -> Self {
        let index = read_mpidr_el1().aff1().into();
        let Some(core) = Self::new(index) else {
            panic!("Running on unexpected core {index}");
        };
        core
    }

    /// Returns the linear index of the core.
    pub const fn index(self) -> usize {
        self.0
    }

    /// Returns the SCMI identities of the core.
    pub fn descriptor(self) -> &'static PowerDomainDescriptor {
        &DESCRIPTORS[self.0]
    }
}

/// Returns the SCMI identities of the A55 cluster.
pub fn cluster() -> &'static PowerDomainDescriptor {
    &DESCRIPTORS[CORE_COUNT]
}
