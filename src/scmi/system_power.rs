// Copyright The Rusted Firmware-A Contributors.
//
// SPDX-License-Identifier: BSD-3-Clause

//! SCMI system power protocol.

use super::{Message, ProtocolId, Scmi, ScmiChannel, ScmiError};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, byteorder::little_endian::U32};

/// Message id of the system power state set message.
pub const SYSTEM_POWER_STATE_SET: u8 = 0x3;

/// Whether the agent asks for a transition to be made now, or for the other agents to be warned
/// first.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum SystemPowerFlags {
    /// Change state immediately.
    Forceful = 0,
    /// Let the agents prepare first.
    Graceful = 1,
}

/// A system power state, as sent in the system power state set message.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SystemState(pub u32);

impl SystemState {
    /// Power the system off.
    pub const SHUTDOWN: Self = Self(0);
    /// Power cycle the system.
    pub const COLD_RESET: Self = Self(1);
    /// Reset the system without removing power.
    pub const WARM_RESET: Self = Self(2);
    /// NXP vendor state which resets the whole board rather than only the SoC.
    pub const FULL_RESET: Self = Self(0x8000_0001);

    /// Vendor states which only change the clock and power mode of the SoC, keeping it running.
    pub const MODE_MASK: u32 = 0xc000_0000;

    /// Keep the System Manager itself running.
    pub const SM_ACTIVE: u32 = 1 << 0;
    /// Keep the FRO running.
    pub const FRO_ACTIVE: u32 = 1 << 1;
    /// Keep the system counter running.
    pub const SYSCTR_ACTIVE: u32 = 1 << 2;
    /// Leave the PMIC standby signal deasserted.
    pub const PMIC_STBY_INACTIVE: u32 = 1 << 3;
    /// Keep the 24 MHz oscillator running.
    pub const OSC24M_ACTIVE: u32 = 1 << 4;
    /// Keep DRAM out of self-refresh.
    pub const DRAM_ACTIVE: u32 = 1 << 5;

    /// Builds a vendor mode state from the given `*_ACTIVE` flags.
    pub const fn mode(flags: u32) -> Self {
        Self(Self::MODE_MASK | flags)
    }
}

/// Changes the power state of the whole system.
#[derive(Clone, Debug, Eq, FromBytes, Immutable, IntoBytes, KnownLayout, PartialEq)]
#[repr(C)]
pub struct SystemPowerStateSet {
    flags: U32,
    system_state: U32,
}

impl Message for SystemPowerStateSet {
    const PROTOCOL: ProtocolId = ProtocolId::SystemPower;
    const MESSAGE_ID: u8 = SYSTEM_POWER_STATE_SET;
    type Response = ();
}

const _: () = assert!(SystemPowerStateSet::REQUEST_LENGTH == 12);
const _: () = assert!(SystemPowerStateSet::RESPONSE_LENGTH == 8);

impl<C: ScmiChannel> Scmi<C> {
    /// Asks the platform to move the system to the given power state.
    pub fn sys_power_state_set(
        &mut self,
        flags: SystemPowerFlags,
        state: SystemState,
    ) -> Result<(), ScmiError> {
        self.send(&SystemPowerStateSet {
            flags: U32::new(flags as u32),
            system_state: U32::new(state.0),
        })
    }
}
