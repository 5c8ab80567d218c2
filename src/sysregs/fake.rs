// Copyright The Rusted Firmware-A Contributors.
//
// SPDX-License-Identifier: BSD-3-Clause

//! Fake implementations of system register getters and setters for unit tests.

use super::ClusterPwrdn;
use std::sync::Mutex;

/// Values of fake system registers.
pub static SYSREGS: Mutex<SystemRegisters> = Mutex::new(SystemRegisters::new());

/// A set of fake system registers.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SystemRegisters {
    pub clusterpwrdn_el1: ClusterPwrdn,
    /// Number of writes to `clusterpwrdn_el1` since the last reset.
    pub clusterpwrdn_el1_writes: usize,
}

impl SystemRegisters {
    const fn new() -> Self {
        Self {
            clusterpwrdn_el1: ClusterPwrdn::PWRDN_ON,
            clusterpwrdn_el1_writes: 0,
        }
    }

    /// Resets the fake system registers to their initial state.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

pub fn read_clusterpwrdn_el1() -> ClusterPwrdn {
    SYSREGS.lock().unwrap().clusterpwrdn_el1
}

pub fn write_clusterpwrdn_el1(value: ClusterPwrdn) {
    let mut sysregs = SYSREGS.lock().unwrap();
    sysregs.clusterpwrdn_el1 = value;
    sysregs.clusterpwrdn_el1_writes += 1;
}
