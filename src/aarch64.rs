// Copyright The Rusted Firmware-A Contributors.
//
// SPDX-License-Identifier: BSD-3-Clause

#[cfg(target_arch = "aarch64")]
use core::arch::asm;

/// Issues a full system data synchronization barrier (`dsb sy`).
pub fn dsb_sy() {
    // SAFETY: `dsb` does not violate safe Rust guarantees.
    #[cfg(target_arch = "aarch64")]
    unsafe {
        asm!("dsb sy", options(nostack));
    }
}

/// Issues an instruction synchronization barrier (`isb`) instruction.
pub fn isb() {
    // SAFETY: `isb` does not violate safe Rust guarantees.
    #[cfg(target_arch = "aarch64")]
    unsafe {
        asm!("isb", options(nostack));
    }
}

/// Waits for an interrupt.
pub fn wfi() {
    // SAFETY: `wfi` does not violate safe Rust guarantees.
    #[cfg(all(target_arch = "aarch64", not(test)))]
    unsafe {
        asm!("wfi", options(nomem, nostack, preserves_flags));
    }
}

/// Message carried by the panic which stands in for [`park`] in unit tests.
#[cfg(test)]
pub const PARK_MAGIC: &str = "PARK_MAGIC";

/// Waits for an interrupt forever.
///
/// This is where a core ends up once it has asked for its own power, or the whole system's power,
/// to be removed.
#[cfg(not(test))]
pub fn park() -> ! {
    dsb_sy();
    loop {
        wfi();
    }
}

/// Stands in for the real `park` in unit tests, panicking with [`PARK_MAGIC`] so that tests can
/// catch the unwind and check what happened before.
#[cfg(test)]
pub fn park() -> ! {
    dsb_sy();
    panic!("{}", PARK_MAGIC)
}

/// Busy-waits for at least the given number of microseconds, using the generic timer.
#[cfg(all(target_arch = "aarch64", not(test)))]
pub fn udelay(microseconds: u64) {
    let frequency = read_cntfrq_el0();
    let start = read_cntpct_el0();
    let ticks = microseconds * frequency / 1_000_000;
    while read_cntpct_el0().wrapping_sub(start) < ticks {
        core::hint::spin_loop();
    }
}

/// Host builds have no generic timer to wait on, so delays are skipped.
#[cfg(not(all(target_arch = "aarch64", not(test))))]
pub fn udelay(_microseconds: u64) {}

#[cfg(all(target_arch = "aarch64", not(test)))]
fn read_cntfrq_el0() -> u64 {
    let value;
    // SAFETY: Reading the counter frequency has no side effects.
    unsafe {
        asm!("mrs {value}, cntfrq_el0", value = out(reg) value, options(nomem, nostack));
    }
    value
}

#[cfg(all(target_arch = "aarch64", not(test)))]
fn read_cntpct_el0() -> u64 {
    let value;
    // SAFETY: Reading the physical count has no side effects.
    unsafe {
        asm!("isb", "mrs {value}, cntpct_el0", value = out(reg) value, options(nostack));
    }
    value
}
