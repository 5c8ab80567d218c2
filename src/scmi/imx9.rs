// Copyright The Rusted Firmware-A Contributors.
//
// SPDX-License-Identifier: BSD-3-Clause

//! NXP i.MX9 CPU protocol, plus the standard performance protocol level set.
//!
//! These messages tell the System Manager how each application core and the power domains around
//! it should behave when the cores go idle: where to restart, which interrupts may wake them, and
//! which domains may be powered down while they sleep.

use super::{
    HEADER_SIZE, Message, ProtocolId, RESPONSE_HEADER_SIZE, Scmi, ScmiChannel, ScmiError,
};
use bitflags::bitflags;
use num_enum::{IntoPrimitive, TryFromPrimitive};
use zerocopy::{
    FromBytes, Immutable, IntoBytes, KnownLayout,
    byteorder::little_endian::{U32, U64},
};

/// Number of interrupt mask words in an IRQ wake set message.
pub const IRQ_WAKE_MASK_COUNT: usize = 12;

/// Largest number of LPM entries in a single LPM mode set message.
pub const MAX_LPM_CONFIGS_PER_COMMAND: usize = 9;

// Message ids of the i.MX CPU protocol.
/// Powers a CPU up and starts it.
pub const CPU_START: u8 = 0x4;
/// Stops a CPU.
pub const CPU_STOP: u8 = 0x5;
/// Sets where a CPU starts on boot or resume.
pub const CPU_RESET_VECTOR_SET: u8 = 0x6;
/// Sets the low power mode a CPU enters on WFI and how it is woken.
pub const CPU_SLEEP_MODE_SET: u8 = 0x7;
/// Sets the GPC interrupt wakeup masks of a CPU.
pub const CPU_IRQ_WAKE_SET: u8 = 0x8;
/// Sets the non-interrupt wakeup mask of a CPU.
pub const CPU_NON_IRQ_WAKE_SET: u8 = 0x9;
/// Sets the LPM policies of power domains depending on a CPU.
pub const CPU_LPM_MODE_SET: u8 = 0xa;
/// Sets the LPM policies of peripherals depending on a CPU.
pub const CPU_PER_LPM_MODE_SET: u8 = 0xb;
/// Reads the run mode, sleep mode and vector of a CPU.
pub const CPU_INFO_GET: u8 = 0xc;
/// Message id of the performance level set message, in the performance protocol.
pub const PERF_LEVEL_SET: u8 = 0x7;

bitflags! {
    /// Flags of the reset vector set message.
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    pub struct ResetVectorFlags: u32 {
        /// Use the vector for the next cold boot of the core.
        const BOOT = 1 << 30;
        /// Use the vector when the core resumes from suspend.
        const RESUME = 1 << 31;
    }
}

bitflags! {
    /// Flags of the sleep mode set message.
    ///
    /// Without [`Self::GIC_WAKEUP`] the core is woken by the GPC, using the masks programmed with
    /// the IRQ wake set message.
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    pub struct SleepFlags: u32 {
        /// Wake the core through the GIC wakeup request lines.
        const GIC_WAKEUP = 1 << 0;
        /// Restart the core when its wakeup is taken.
        const RESUME_CPU = 1 << 1;
    }
}

/// Depth of the low power mode a core enters on WFI.
#[derive(Clone, Copy, Debug, Eq, IntoPrimitive, PartialEq, TryFromPrimitive)]
#[repr(u32)]
pub enum SleepMode {
    /// Keep running.
    Run = 0,
    /// Clock gated.
    Wait = 1,
    /// Clock gated, with the PLLs off.
    Stop = 2,
    /// Powered down.
    Suspend = 3,
}

/// When a power or memory domain has to stay on, relative to the sleep mode of its CPU.
#[derive(Clone, Copy, Debug, Eq, IntoPrimitive, PartialEq, TryFromPrimitive)]
#[repr(u32)]
pub enum LpmSetting {
    /// The domain is never kept on by the CPU.
    Never = 0,
    /// On while the CPU runs.
    OnRun = 1,
    /// On while the CPU runs or waits.
    OnRunWait = 2,
    /// On unless the CPU is suspended.
    OnRunWaitStop = 3,
    /// Always on.
    Always = 4,
}

/// LPM policy of a power domain and the memory domains it keeps in retention.
#[derive(Clone, Copy, Debug, Eq, FromBytes, Immutable, IntoBytes, KnownLayout, PartialEq)]
#[repr(C)]
pub struct LpmConfig {
    power_domain: U32,
    lpm_setting: U32,
    retention_mask: U32,
}

impl LpmConfig {
    /// Creates an LPM entry for the given power domain.
    pub const fn new(power_domain: u32, lpm_setting: LpmSetting, retention_mask: u32) -> Self {
        Self {
            power_domain: U32::new(power_domain),
            lpm_setting: U32::new(lpm_setting as u32),
            retention_mask: U32::new(retention_mask),
        }
    }
}

/// LPM policy of a peripheral's low power interface.
#[derive(Clone, Copy, Debug, Eq, FromBytes, Immutable, IntoBytes, KnownLayout, PartialEq)]
#[repr(C)]
pub struct PerLpmConfig {
    peripheral: U32,
    lpm_setting: U32,
}

impl PerLpmConfig {
    /// Creates an LPM entry for the given peripheral low power interface index.
    pub const fn new(peripheral: u32, lpm_setting: LpmSetting) -> Self {
        Self {
            peripheral: U32::new(peripheral),
            lpm_setting: U32::new(lpm_setting as u32),
        }
    }
}

/// Payload of a message which only names a CPU.
#[derive(Clone, Debug, Eq, FromBytes, Immutable, IntoBytes, KnownLayout, PartialEq)]
#[repr(C)]
pub struct CpuRequest {
    cpu_id: U32,
}

/// Starts a CPU.
#[derive(Clone, Debug, Eq, FromBytes, Immutable, IntoBytes, KnownLayout, PartialEq)]
#[repr(transparent)]
pub struct CpuStart(CpuRequest);

impl Message for CpuStart {
    const PROTOCOL: ProtocolId = ProtocolId::Imx9Cpu;
    const MESSAGE_ID: u8 = CPU_START;
    type Response = ();
}

/// Stops a CPU.
#[derive(Clone, Debug, Eq, FromBytes, Immutable, IntoBytes, KnownLayout, PartialEq)]
#[repr(transparent)]
pub struct CpuStop(CpuRequest);

impl Message for CpuStop {
    const PROTOCOL: ProtocolId = ProtocolId::Imx9Cpu;
    const MESSAGE_ID: u8 = CPU_STOP;
    type Response = ();
}

/// Sets the boot or resume vector of a CPU.
#[derive(Clone, Debug, Eq, FromBytes, Immutable, IntoBytes, KnownLayout, PartialEq)]
#[repr(C)]
pub struct CpuResetVectorSet {
    cpu_id: U32,
    flags: U32,
    vector: U64,
}

impl Message for CpuResetVectorSet {
    const PROTOCOL: ProtocolId = ProtocolId::Imx9Cpu;
    const MESSAGE_ID: u8 = CPU_RESET_VECTOR_SET;
    type Response = ();
}

/// Selects the sleep mode of a CPU and how it is woken.
#[derive(Clone, Debug, Eq, FromBytes, Immutable, IntoBytes, KnownLayout, PartialEq)]
#[repr(C)]
pub struct CpuSleepModeSet {
    cpu_id: U32,
    flags: U32,
    sleep_mode: U32,
}

impl Message for CpuSleepModeSet {
    const PROTOCOL: ProtocolId = ProtocolId::Imx9Cpu;
    const MESSAGE_ID: u8 = CPU_SLEEP_MODE_SET;
    type Response = ();
}

/// Programs the GPC interrupt wakeup masks of a CPU. A set bit masks the interrupt.
#[derive(Clone, Debug, Eq, FromBytes, Immutable, IntoBytes, KnownLayout, PartialEq)]
#[repr(C)]
pub struct CpuIrqWakeSet {
    cpu_id: U32,
    mask_index: U32,
    mask_count: U32,
    masks: [U32; IRQ_WAKE_MASK_COUNT],
}

impl Message for CpuIrqWakeSet {
    const PROTOCOL: ProtocolId = ProtocolId::Imx9Cpu;
    const MESSAGE_ID: u8 = CPU_IRQ_WAKE_SET;
    type Response = ();
}

/// Programs the non-interrupt wakeup masks of a CPU. The message has room for as many masks as
/// [`CpuIrqWakeSet`], but only the first is defined.
#[derive(Clone, Debug, Eq, FromBytes, Immutable, IntoBytes, KnownLayout, PartialEq)]
#[repr(C)]
pub struct CpuNonIrqWakeSet {
    cpu_id: U32,
    mask_index: U32,
    mask_count: U32,
    masks: [U32; IRQ_WAKE_MASK_COUNT],
}

impl Message for CpuNonIrqWakeSet {
    const PROTOCOL: ProtocolId = ProtocolId::Imx9Cpu;
    const MESSAGE_ID: u8 = CPU_NON_IRQ_WAKE_SET;
    type Response = ();
}

/// Fixed part of the LPM mode set messages, followed by the entries.
#[derive(Clone, Debug, Eq, FromBytes, Immutable, IntoBytes, KnownLayout, PartialEq)]
#[repr(C)]
struct LpmModeSetHeader {
    cpu_id: U32,
    count: U32,
}

/// Reads the current state of a CPU.
#[derive(Clone, Debug, Eq, FromBytes, Immutable, IntoBytes, KnownLayout, PartialEq)]
#[repr(transparent)]
pub struct CpuInfoGet(CpuRequest);

/// Response payload of [`CpuInfoGet`].
#[derive(Clone, Debug, Eq, FromBytes, Immutable, IntoBytes, KnownLayout, PartialEq)]
#[repr(C)]
pub struct CpuInfo {
    run_mode: U32,
    sleep_mode: U32,
    vector: U64,
}

impl CpuInfo {
    /// The run mode reported by the System Manager.
    pub fn run_mode(&self) -> u32 {
        self.run_mode.get()
    }

    /// The sleep mode the CPU will enter on its next WFI, if it is a known one.
    pub fn sleep_mode(&self) -> Option<SleepMode> {
        SleepMode::try_from(self.sleep_mode.get()).ok()
    }

    /// The reset vector of the CPU.
    pub fn vector(&self) -> u64 {
        self.vector.get()
    }
}

impl Message for CpuInfoGet {
    const PROTOCOL: ProtocolId = ProtocolId::Imx9Cpu;
    const MESSAGE_ID: u8 = CPU_INFO_GET;
    type Response = CpuInfo;
}

/// Sets the performance level of a performance domain.
#[derive(Clone, Debug, Eq, FromBytes, Immutable, IntoBytes, KnownLayout, PartialEq)]
#[repr(C)]
pub struct PerfLevelSet {
    domain: U32,
    level: U32,
}

impl Message for PerfLevelSet {
    const PROTOCOL: ProtocolId = ProtocolId::Performance;
    const MESSAGE_ID: u8 = PERF_LEVEL_SET;
    type Response = ();
}

const _: () = assert!(CpuStart::REQUEST_LENGTH == 8 && CpuStart::RESPONSE_LENGTH == 8);
const _: () = assert!(CpuStop::REQUEST_LENGTH == 8 && CpuStop::RESPONSE_LENGTH == 8);
const _: () = assert!(CpuResetVectorSet::REQUEST_LENGTH == 20);
const _: () = assert!(CpuResetVectorSet::RESPONSE_LENGTH == 8);
const _: () = assert!(CpuSleepModeSet::REQUEST_LENGTH == 16);
const _: () = assert!(CpuIrqWakeSet::REQUEST_LENGTH == 64);
const _: () = assert!(CpuNonIrqWakeSet::REQUEST_LENGTH == 64);
const _: () = assert!(HEADER_SIZE + size_of::<LpmModeSetHeader>() == 12);
const _: () = assert!(size_of::<LpmConfig>() == 12 && size_of::<PerLpmConfig>() == 8);
const _: () = assert!(CpuInfoGet::REQUEST_LENGTH == 8 && CpuInfoGet::RESPONSE_LENGTH == 24);
const _: () = assert!(PerfLevelSet::REQUEST_LENGTH == 12 && PerfLevelSet::RESPONSE_LENGTH == 8);
const _: () = assert!(
    HEADER_SIZE
        + size_of::<LpmModeSetHeader>()
        + MAX_LPM_CONFIGS_PER_COMMAND * size_of::<LpmConfig>()
        <= super::MAX_MESSAGE_SIZE
);

impl<C: ScmiChannel> Scmi<C> {
    /// Starts the given CPU.
    pub fn core_start(&mut self, cpu_id: u32) -> Result<(), ScmiError> {
        self.send(&CpuStart(CpuRequest::new(cpu_id)))
    }

    /// Stops the given CPU.
    pub fn core_stop(&mut self, cpu_id: u32) -> Result<(), ScmiError> {
        self.send(&CpuStop(CpuRequest::new(cpu_id)))
    }

    /// Sets where the given CPU starts executing on boot or resume.
    pub fn core_set_reset_vector(
        &mut self,
        cpu_id: u32,
        vector: u64,
        flags: ResetVectorFlags,
    ) -> Result<(), ScmiError> {
        self.send(&CpuResetVectorSet {
            cpu_id: U32::new(cpu_id),
            flags: U32::new(flags.bits()),
            vector: U64::new(vector),
        })
    }

    /// Selects the mode the given CPU enters on WFI, and how it is woken from it.
    pub fn core_set_sleep_mode(
        &mut self,
        cpu_id: u32,
        flags: SleepFlags,
        sleep_mode: SleepMode,
    ) -> Result<(), ScmiError> {
        self.send(&CpuSleepModeSet {
            cpu_id: U32::new(cpu_id),
            flags: U32::new(flags.bits()),
            sleep_mode: U32::new(sleep_mode.into()),
        })
    }

    /// Programs the GPC interrupt masks of the given CPU, starting from mask `mask_index`.
    pub fn core_set_irq_wake_masks(
        &mut self,
        cpu_id: u32,
        mask_index: u32,
        masks: &[u32],
    ) -> Result<(), ScmiError> {
        if masks.len() > IRQ_WAKE_MASK_COUNT {
            return Err(ScmiError::PayloadTooLarge);
        }
        let mut request = CpuIrqWakeSet {
            cpu_id: U32::new(cpu_id),
            mask_index: U32::new(mask_index),
            mask_count: U32::new(masks.len() as u32),
            masks: [U32::ZERO; IRQ_WAKE_MASK_COUNT],
        };
        for (word, &mask) in request.masks.iter_mut().zip(masks) {
            *word = U32::new(mask);
        }
        self.send(&request)
    }

    /// Programs the non-interrupt wakeup mask of the given CPU. A set bit masks the source.
    pub fn core_set_non_irq_wake_mask(&mut self, cpu_id: u32, mask: u32) -> Result<(), ScmiError> {
        let mut masks = [U32::ZERO; IRQ_WAKE_MASK_COUNT];
        masks[0] = U32::new(mask);
        self.send(&CpuNonIrqWakeSet {
            cpu_id: U32::new(cpu_id),
            mask_index: U32::new(0),
            mask_count: U32::new(1),
            masks,
        })
    }

    /// Sets the LPM policies of power domains, relative to the sleep mode of the given CPU.
    ///
    /// Long lists are split over several messages. An empty list still sends one message.
    pub fn core_set_lpm_mode(
        &mut self,
        cpu_id: u32,
        configs: &[LpmConfig],
    ) -> Result<(), ScmiError> {
        self.send_lpm_chunks(cpu_id, CPU_LPM_MODE_SET, configs)
    }

    /// Sets the LPM policies of peripheral low power interfaces, relative to the sleep mode of the
    /// given CPU.
    ///
    /// Long lists are split over several messages. An empty list still sends one message.
    pub fn per_set_lpm_mode(
        &mut self,
        cpu_id: u32,
        configs: &[PerLpmConfig],
    ) -> Result<(), ScmiError> {
        self.send_lpm_chunks(cpu_id, CPU_PER_LPM_MODE_SET, configs)
    }

    /// Reads the current state of the given CPU.
    pub fn core_info(&mut self, cpu_id: u32) -> Result<CpuInfo, ScmiError> {
        self.send(&CpuInfoGet(CpuRequest::new(cpu_id)))
    }

    /// Sets the performance level of the given performance domain.
    pub fn perf_set_level(&mut self, domain: u32, level: u32) -> Result<(), ScmiError> {
        self.send(&PerfLevelSet {
            domain: U32::new(domain),
            level: U32::new(level),
        })
    }

    fn send_lpm_chunks<T: Immutable + IntoBytes>(
        &mut self,
        cpu_id: u32,
        message_id: u8,
        configs: &[T],
    ) -> Result<(), ScmiError> {
        let mut chunks = configs.chunks(MAX_LPM_CONFIGS_PER_COMMAND);
        let mut chunk = chunks.next().unwrap_or_default();
        loop {
            let header = LpmModeSetHeader {
                cpu_id: U32::new(cpu_id),
                count: U32::new(chunk.len() as u32),
            };
            let mut response = [0; RESPONSE_HEADER_SIZE];
            self.transact(
                ProtocolId::Imx9Cpu,
                message_id,
                &[header.as_bytes(), chunk.as_bytes()],
                &mut response,
            )?;
            match chunks.next() {
                Some(next) => chunk = next,
                None => return Ok(()),
            }
        }
    }
}

impl CpuRequest {
    const fn new(cpu_id: u32) -> Self {
        Self {
            cpu_id: U32::new(cpu_id),
        }
    }
}
