// Copyright The Rusted Firmware-A Contributors.
//
// SPDX-License-Identifier: BSD-3-Clause

//! System register helpers, and the implementation defined registers which `arm-sysregs` doesn't
//! know about.

#[cfg(test)]
pub mod fake;

use crate::aarch64::{dsb_sy, isb};
use arm_sysregs::{ScrEl3, read_scr_el3, write_scr_el3};
use bitflags::bitflags;
#[cfg(not(test))]
use core::arch::asm;

bitflags! {
    /// DSU cluster power down register value.
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
    #[repr(transparent)]
    pub struct ClusterPwrdn: u64 {
        /// The cluster must stay powered on. When clear, the cluster may be powered down once all
        /// of its cores are off.
        const PWRDN_ON = 1 << 0;
        /// Keep the L3 cache RAMs in retention while the cluster is powered down.
        const MEM_RET = 1 << 1;
    }
}

/// Generates a safe public function named `$function_name` to read the system register with the
/// given encoding.
#[cfg(not(test))]
macro_rules! read_sysreg {
    ($encoding:literal, $type:ty, $function_name:ident) => {
        pub fn $function_name() -> $type {
            let value;
            // SAFETY: The macro call site's author (i.e. see below) has determined that it is safe
            // to read the given system register.
            unsafe {
                asm!(
                    concat!("mrs {value}, ", $encoding),
                    value = out(reg) value,
                    options(nostack),
                );
            }
            <$type>::from_bits_retain(value)
        }
    };
}

/// Generates a safe public function named `$function_name` to write to the system register with
/// the given encoding.
#[cfg(not(test))]
macro_rules! write_sysreg {
    ($encoding:literal, $type:ty, $function_name:ident) => {
        pub fn $function_name(value: $type) {
            // SAFETY: The macro call site's author (i.e. see below) has determined that it is safe
            // to write `value` to the given system register.
            unsafe {
                asm!(
                    concat!("msr ", $encoding, ", {value}"),
                    value = in(reg) value.bits(),
                    options(nostack),
                );
            }
        }
    };
}

// CLUSTERPWRDN_EL1 only asks the power controller for permission, the cluster stays up until all
// cores have gone through WFI.
#[cfg(not(test))]
read_sysreg!("s3_0_c15_c3_6", ClusterPwrdn, read_clusterpwrdn_el1);
#[cfg(not(test))]
write_sysreg!("s3_0_c15_c3_6", ClusterPwrdn, write_clusterpwrdn_el1);

#[cfg(test)]
pub use fake::{read_clusterpwrdn_el1, write_clusterpwrdn_el1};

/// Routes FIQs to EL3 while a core waits in a shallow low power state.
///
/// With the gate armed, a pending secure interrupt wakes the core from WFI rather than being taken
/// by a lower exception level.
pub fn arm_fiq_gate() {
    dsb_sy();
    // SAFETY: Only the FIQ routing bit is changed; all other SCR_EL3 bits are preserved.
    unsafe {
        write_scr_el3(read_scr_el3() | ScrEl3::FIQ);
    }
    isb();
}

/// Undoes [`arm_fiq_gate`].
pub fn disarm_fiq_gate() {
    // SAFETY: Only the FIQ routing bit is changed; all other SCR_EL3 bits are preserved.
    unsafe {
        write_scr_el3(read_scr_el3() - ScrEl3::FIQ);
    }
    isb();
}
