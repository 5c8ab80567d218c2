// Copyright The Rusted Firmware-A Contributors.
//
// SPDX-License-Identifier: BSD-3-Clause

//! i.MX8M, where BL31 drives the GPC power controller directly rather than through SCMI.

use crate::{
    aarch64::{park, udelay, wfi},
    gicv3::{disable_cpu_interface, enable_cpu_interface},
    psci::{
        PlatformPowerStateInterface, PowerStateType, PsciCompositePowerState,
        PsciPlatformInterface,
    },
    sysregs::{arm_fiq_gate, disarm_fiq_gate},
};
use arm_psci::{Cookie, EntryPoint, ErrorCode, Mpidr, PowerState, ResetType};
use arm_sysregs::read_mpidr_el1;
use bitflags::bitflags;
use core::mem::offset_of;
use log::{debug, info};
use safe_mmio::{
    UniqueMmioPointer, field,
    fields::{ReadPure, ReadPureWrite},
};
use spin::mutex::SpinMutex;
use zerocopy::FromZeros;

/// Number of Cortex-A53 cores.
pub const CORE_COUNT: usize = 4;

/// Lowest address the non-secure world may be entered at.
pub const NS_IMAGE_BASE: u64 = 0x4020_0000;

/// Load address of BL31, where the GPC starts cores which are powered on or resumed.
pub const BL31_BASE: u64 = 0x92_0000;

const WDOG_BASE: usize = 0x3028_0000;
const SNVS_BASE: usize = 0x3037_0000;
const SRC_BASE: usize = 0x3039_0000;

const POWER_DOWN_STATE_ID: u32 = 0x33;
const STATE_ID_MASK: u32 = 0xffff;
const POWER_LEVEL_SHIFT: u32 = 24;
const POWER_LEVEL_MASK: u32 = 0x3;

/// SRC LPA_STATUS value meaning the DSP low power audio buffer is in OCRAM rather than DRAM.
const LPA_BUFFER_IN_OCRAM: u32 = 0xd;

/// Time for the RBC counter, which runs from the 32 kHz oscillator, to start.
const RBC_START_DELAY_US: u64 = 30;

/// Local power states of the i.MX8M power domains.
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub enum Imx8mPowerState {
    /// Powered and running.
    Run = 0,
    /// WFI with clocks gated.
    WaitRetention = 1,
    /// GPC STOP mode with state retained.
    StopRetention = 2,
    /// GPC STOP mode with the domain powered down.
    StopOff = 3,
    /// Powered down.
    Off = 4,
}

impl PlatformPowerStateInterface for Imx8mPowerState {
    const OFF: Self = Self::Off;
    const RUN: Self = Self::Run;

    fn power_state_type(&self) -> PowerStateType {
        match self {
            Self::Run => PowerStateType::Run,
            Self::WaitRetention | Self::StopRetention => PowerStateType::StandbyOrRetention,
            Self::StopOff | Self::Off => PowerStateType::PowerDown,
        }
    }
}

impl From<Imx8mPowerState> for usize {
    fn from(value: Imx8mPowerState) -> Self {
        value as usize
    }
}

type CompositeState = PsciCompositePowerState<Imx8mPowerState>;

/// The GPC, DRAM controller and clock drivers which BL31 provides for i.MX8M.
///
/// `core` is always the linear index of a core, i.e. its MPIDR Aff0.
pub trait Imx8mPowerController {
    /// Sets where the given core starts executing when it is next powered up.
    fn set_cpu_secure_entry(&self, core: usize, entry: u64);

    /// Powers the given core on or off.
    fn set_cpu_power(&self, core: usize, on: bool);

    /// Enables or disables the low power mode of the given core, in which the GPC powers it down
    /// on WFI.
    fn set_cpu_lpm(&self, core: usize, enable: bool);

    /// Sets the state the cluster is allowed to enter once all of its cores are in WFI.
    fn set_cluster_powerdown(&self, core: usize, state: Imx8mPowerState);

    /// Enables or disables the system low power mode.
    fn set_sys_lpm(&self, core: usize, enable: bool);

    /// Routes wakeup interrupts through the GPC while the GIC is off, or back to the GIC.
    fn set_sys_wakeup(&self, core: usize, enable: bool);

    /// Enables the RBC counter, which makes the cluster power down even if a wakeup arrives early.
    fn set_rbc_count(&self);

    /// Disables the RBC counter again once the cluster is back up.
    fn clear_rbc_count(&self);

    /// Overrides the ANAMIX PLL power downs, so the PLLs are powered down in system suspend.
    fn anamix_override(&self, enable: bool);

    /// Lets the NOC power domain go down with the system.
    fn noc_wrapper_pre_suspend(&self, core: usize);

    /// Undoes [`Self::noc_wrapper_pre_suspend`].
    fn noc_wrapper_post_resume(&self, core: usize);

    /// Returns whether the M4 core is playing low power audio, which needs the system to stay
    /// partly up.
    fn m4_lpa_active(&self) -> bool;

    /// Puts DRAM into self-refresh retention.
    fn dram_enter_retention(&self);

    /// Takes DRAM out of self-refresh retention.
    fn dram_exit_retention(&self);
}

bitflags! {
    /// Watchdog control register value.
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    #[repr(transparent)]
    pub struct WatchdogControl: u16 {
        /// Watchdog low power enable.
        const WDZST = 1 << 0;
        /// Watchdog debug enable.
        const WDBG = 1 << 1;
        /// Watchdog enable.
        const WDE = 1 << 2;
        /// WDOG_B time-out assertion.
        const WDT = 1 << 3;
        /// Software reset signal, active low.
        const SRS = 1 << 4;
        /// WDOG_B assertion, active low.
        const WDA = 1 << 5;
        /// Software reset extension, needed for SRS to take effect.
        const SRE = 1 << 6;
        /// Watchdog disable for wait.
        const WDW = 1 << 7;
    }
}

bitflags! {
    /// SNVS low power control register value.
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    #[repr(transparent)]
    pub struct SnvsLpControl: u32 {
        /// Secure real time counter enable.
        const SRTC_ENV = 1 << 0;
        /// Allow the PMIC to be turned off.
        const DP_EN = 1 << 5;
        /// Turn off the system power.
        const TOP = 1 << 6;
    }
}

/// Watchdog registers.
#[derive(FromZeros)]
#[repr(C)]
pub struct WdogRegisters {
    /// Watchdog control, see [`WatchdogControl`].
    pub wcr: ReadPureWrite<u16>,
    /// Watchdog service, written with the `0x5555`, `0xaaaa` sequence.
    pub wsr: ReadPureWrite<u16>,
}

/// The part of the SNVS registers which controls system power.
#[derive(FromZeros)]
#[repr(C)]
pub struct SnvsRegisters {
    _reserved: [u32; 14],
    /// Low power control, see [`SnvsLpControl`].
    pub lpcr: ReadPureWrite<u32>,
}

/// The part of the SRC registers used to find out about low power audio.
#[derive(FromZeros)]
#[repr(C)]
pub struct SrcRegisters {
    _reserved: [u32; 37],
    /// Where the M4 placed its low power audio buffer.
    pub lpa_status: ReadPure<u32>,
}

const _: () = assert!(offset_of!(WdogRegisters, wsr) == 0x2);
const _: () = assert!(offset_of!(SnvsRegisters, lpcr) == 0x38);
const _: () = assert!(offset_of!(SrcRegisters, lpa_status) == 0x94);

/// The MMIO register blocks used by the i.MX8M power management.
pub struct Imx8mRegisters<'a> {
    /// WDOG1, used for system reset.
    pub wdog: UniqueMmioPointer<'a, WdogRegisters>,
    /// SNVS, used for system off.
    pub snvs: UniqueMmioPointer<'a, SnvsRegisters>,
    /// System reset controller, which reports the low power audio state.
    pub src: UniqueMmioPointer<'a, SrcRegisters>,
}

/// Returns the watchdog control value which resets the system.
///
/// The WDBG, WDE and WDT bits which may have been set by an earlier boot stage are kept, as WDE
/// and WDT can only be written once.
pub fn restart_watchdog_control(previous: u16, external_reset: bool) -> WatchdogControl {
    let kept = WatchdogControl::from_bits_retain(previous)
        & (WatchdogControl::WDBG | WatchdogControl::WDE | WatchdogControl::WDT);
    if external_reset {
        // WDA clear asserts WDOG_B, SRS set has no effect.
        kept | WatchdogControl::WDE | WatchdogControl::SRS
    } else {
        // SRS clear asserts the software reset, WDA set has no effect.
        kept | WatchdogControl::WDE | WatchdogControl::SRE | WatchdogControl::WDA
    }
}

/// PSCI platform callbacks for i.MX8M.
pub struct Imx8mPsciPlatformImpl<'a, P> {
    controller: P,
    registers: SpinMutex<Imx8mRegisters<'a>>,
    secure_entry: u64,
}

impl<'a, P: Imx8mPowerController> Imx8mPsciPlatformImpl<'a, P> {
    /// Creates the platform callbacks. Cores powered on or resumed start at `secure_entry`.
    pub fn new(controller: P, registers: Imx8mRegisters<'a>, secure_entry: u64) -> Self {
        Self {
            controller,
            registers: SpinMutex::new(registers),
            secure_entry,
        }
    }

    fn current_core() -> usize {
        read_mpidr_el1().aff0().into()
    }

    fn core_from_mpidr(mpidr: Mpidr) -> Option<usize> {
        let core = usize::from(mpidr.aff0);
        (core < CORE_COUNT && mpidr.aff1 == 0 && mpidr.aff2 == 0 && mpidr.aff3.unwrap_or(0) == 0)
            .then_some(core)
    }

    fn lpa_buffer_in_ocram(&self) -> bool {
        let mut registers = self.registers.lock();
        field!(registers.src, lpa_status).read() == LPA_BUFFER_IN_OCRAM
    }

    /// Resets the system through the watchdog, either internally or by asserting WDOG_B.
    fn watchdog_restart(&self, external_reset: bool) -> ! {
        let mut registers = self.registers.lock();
        let previous = field!(registers.wdog, wcr).read();
        let control = restart_watchdog_control(previous, external_reset);
        field!(registers.wdog, wcr).write(control.bits());

        // Service sequence, to load the timeout.
        field!(registers.wdog, wsr).write(0x5555);
        field!(registers.wdog, wsr).write(0xaaaa);
        park()
    }
}

impl<P: Imx8mPowerController> PsciPlatformInterface for Imx8mPsciPlatformImpl<'_, P> {
    type PlatformPowerState = Imx8mPowerState;

    fn try_parse_power_state(power_state: PowerState) -> Option<CompositeState> {
        let (power_down, value) = match power_state {
            PowerState::StandbyOrRetention(value) => (false, value),
            PowerState::PowerDown(value) => (true, value),
        };
        let level = (value >> POWER_LEVEL_SHIFT) & POWER_LEVEL_MASK;
        if level as usize > crate::psci::MAX_POWER_LEVEL {
            return None;
        }
        if !power_down {
            Some(CompositeState::new([
                Imx8mPowerState::StopRetention,
                Imx8mPowerState::StopRetention,
                Imx8mPowerState::Run,
            ]))
        } else if value & STATE_ID_MASK == POWER_DOWN_STATE_ID {
            Some(CompositeState::new([
                Imx8mPowerState::Off,
                Imx8mPowerState::WaitRetention,
                Imx8mPowerState::Run,
            ]))
        } else {
            None
        }
    }

    fn is_valid_ns_entrypoint(&self, entry: &EntryPoint) -> bool {
        entry.entry_point_address() >= NS_IMAGE_BASE
    }

    fn cpu_standby(&self, cpu_state: Imx8mPowerState) {
        assert_eq!(cpu_state.power_state_type(), PowerStateType::StandbyOrRetention);

        arm_fiq_gate();
        wfi();
        disarm_fiq_gate();
    }

    fn power_domain_on(&self, mpidr: Mpidr) -> Result<(), ErrorCode> {
        let core = Self::core_from_mpidr(mpidr).ok_or(ErrorCode::InvalidParameters)?;
        self.controller.set_cpu_secure_entry(core, self.secure_entry);
        self.controller.set_cpu_power(core, true);
        debug!("Core {core} powered on");
        Ok(())
    }

    fn power_domain_on_finish(&self, _previous_state: &CompositeState) -> Result<(), ErrorCode> {
        enable_cpu_interface();
        Ok(())
    }

    fn power_domain_off(&self, _target_state: &CompositeState) -> Result<(), ErrorCode> {
        disable_cpu_interface();
        self.controller.set_cpu_power(Self::current_core(), false);
        Ok(())
    }

    fn power_domain_suspend(&self, target_state: &CompositeState) -> Result<(), ErrorCode> {
        let core = Self::current_core();

        if target_state.cpu_level_state().is_off() {
            disable_cpu_interface();
            self.controller.set_cpu_secure_entry(core, self.secure_entry);
            self.controller.set_cpu_lpm(core, true);
        } else {
            arm_fiq_gate();
        }

        if !target_state.cluster_level_state().is_run() {
            self.controller
                .set_cluster_powerdown(core, target_state.cluster_level_state());
        }

        if target_state.highest_level_state().is_off() {
            if !self.controller.m4_lpa_active() {
                self.controller.set_sys_lpm(core, true);
                self.controller.dram_enter_retention();
                self.controller.anamix_override(true);
                self.controller.noc_wrapper_pre_suspend(core);
            } else if self.lpa_buffer_in_ocram() {
                self.controller.dram_enter_retention();
            }
            self.controller.set_sys_wakeup(core, true);
        }
        Ok(())
    }

    fn power_domain_suspend_finish(&self, previous_state: &CompositeState) -> Result<(), ErrorCode> {
        let core = Self::current_core();

        if previous_state.highest_level_state().is_off() {
            if !self.controller.m4_lpa_active() {
                self.controller.noc_wrapper_post_resume(core);
                self.controller.anamix_override(false);
                self.controller.dram_exit_retention();
                self.controller.set_sys_lpm(core, false);
            } else if self.lpa_buffer_in_ocram() {
                self.controller.dram_exit_retention();
            }
            self.controller.set_sys_wakeup(core, false);
        }

        if !previous_state.cluster_level_state().is_run() {
            self.controller.clear_rbc_count();
            self.controller
                .set_cluster_powerdown(core, Imx8mPowerState::Run);
        }

        if previous_state.cpu_level_state().is_off() {
            self.controller.set_cpu_lpm(core, false);
            enable_cpu_interface();
        } else {
            disarm_fiq_gate();
        }
        Ok(())
    }

    fn power_domain_power_down_wfi(&self, target_state: &CompositeState) -> ! {
        // With the cluster going down, a wakeup which is already pending would otherwise stop it
        // from powering down.
        if target_state.cluster_level_state().is_off() {
            self.controller.set_rbc_count();
            udelay(RBC_START_DELAY_US);
        }
        park()
    }

    fn sys_suspend_power_state(&self) -> CompositeState {
        CompositeState::new([Imx8mPowerState::StopOff; 3])
    }

    fn system_off(&self) -> ! {
        info!("System off");
        let mut registers = self.registers.lock();
        let mut lpcr = field!(registers.snvs, lpcr);
        let value = SnvsLpControl::from_bits_retain(lpcr.read())
            | SnvsLpControl::SRTC_ENV
            | SnvsLpControl::DP_EN
            | SnvsLpControl::TOP;
        lpcr.write(value.bits());
        park()
    }

    fn system_reset(&self) -> ! {
        info!("System reset");
        self.watchdog_restart(cfg!(feature = "wdog-b-reset"))
    }

    fn system_reset2(&self, _reset_type: ResetType, _cookie: Cookie) -> Result<(), ErrorCode> {
        info!("System reset2");
        self.watchdog_restart(false)
    }
}

#[cfg(not(test))]
mod gpc {
    use super::{Imx8mPowerController, Imx8mPowerState};

    unsafe extern "C" {
        safe fn imx_set_cpu_secure_entry(core_id: u32, secure_entry: u64);
        safe fn imx_set_cpu_pwr_on(core_id: u32);
        safe fn imx_set_cpu_pwr_off(core_id: u32);
        safe fn imx_set_cpu_lpm(core_id: u32, pdn: bool);
        safe fn imx_set_cluster_powerdown(last_core: u32, power_state: u8);
        safe fn imx_set_sys_lpm(last_core: u32, retention: bool);
        safe fn imx_set_sys_wakeup(last_core: u32, pdn: bool);
        safe fn imx_set_rbc_count();
        safe fn imx_clear_rbc_count();
        safe fn imx_anamix_override(enable: bool);
        safe fn imx_noc_wrapper_pre_suspend(core_id: u32);
        safe fn imx_noc_wrapper_post_resume(core_id: u32);
        safe fn imx_m4_lpa_active() -> bool;
        safe fn dram_enter_retention();
        safe fn dram_exit_retention();
    }

    /// The GPC and DRAM drivers linked into BL31.
    pub struct GpcDriver;

    // Core indices are below CORE_COUNT, so always fit.
    impl Imx8mPowerController for GpcDriver {
        fn set_cpu_secure_entry(&self, core: usize, entry: u64) {
            imx_set_cpu_secure_entry(core as u32, entry);
        }

        fn set_cpu_power(&self, core: usize, on: bool) {
            if on {
                imx_set_cpu_pwr_on(core as u32);
            } else {
                imx_set_cpu_pwr_off(core as u32);
            }
        }

        fn set_cpu_lpm(&self, core: usize, enable: bool) {
            imx_set_cpu_lpm(core as u32, enable);
        }

        fn set_cluster_powerdown(&self, core: usize, state: Imx8mPowerState) {
            imx_set_cluster_powerdown(core as u32, state as u8);
        }

        fn set_sys_lpm(&self, core: usize, enable: bool) {
            imx_set_sys_lpm(core as u32, enable);
        }

        fn set_sys_wakeup(&self, core: usize, enable: bool) {
            imx_set_sys_wakeup(core as u32, enable);
        }

        fn set_rbc_count(&self) {
            imx_set_rbc_count();
        }

        fn clear_rbc_count(&self) {
            imx_clear_rbc_count();
        }

        fn anamix_override(&self, enable: bool) {
            imx_anamix_override(enable);
        }

        fn noc_wrapper_pre_suspend(&self, core: usize) {
            imx_noc_wrapper_pre_suspend(core as u32);
        }

        fn noc_wrapper_post_resume(&self, core: usize) {
            imx_noc_wrapper_post_resume(core as u32);
        }

        fn m4_lpa_active(&self) -> bool {
            imx_m4_lpa_active()
        }

        fn dram_enter_retention(&self) {
            dram_enter_retention();
        }

        fn dram_exit_retention(&self) {
            dram_exit_retention();
        }
    }
}

#[cfg(not(test))]
pub use self::platform::Imx8m;

#[cfg(not(test))]
mod platform {
    use super::{
        BL31_BASE, Imx8mPsciPlatformImpl, Imx8mRegisters, SNVS_BASE, SRC_BASE, WDOG_BASE,
        gpc::GpcDriver,
    };
    use crate::{
        logger::{self, LockedWriter},
        platform::{Console, Platform},
    };
    use core::{
        ptr::NonNull,
        sync::atomic::{AtomicBool, Ordering},
    };
    use log::debug;
    use safe_mmio::UniqueMmioPointer;

    static TAKEN: AtomicBool = AtomicBool::new(false);

    /// The i.MX8M SoC family.
    pub struct Imx8m;

    impl Platform for Imx8m {
        type LogSinkImpl = LockedWriter<Console>;
        type PsciPlatformImpl = Imx8mPsciPlatformImpl<'static, GpcDriver>;

        fn init_logger() {
            // Fails only if already initialised by an earlier call.
            let _ = logger::init(LockedWriter::new(Console));
        }

        fn psci_platform(secure_entrypoint: u64) -> Option<Self::PsciPlatformImpl> {
            if TAKEN.swap(true, Ordering::AcqRel) {
                return None;
            }
            // The GPC always starts cores at the start of the BL31 image.
            debug!("Warm boot entry point {secure_entrypoint:#x}, cores start at {BL31_BASE:#x}");

            // SAFETY: These are the addresses of the watchdog, SNVS and SRC, which are mapped as
            // device memory by BL31 and not used by anything else in EL3. TAKEN ensures that only
            // one pointer to each is created.
            let registers = unsafe {
                Imx8mRegisters {
                    wdog: UniqueMmioPointer::new(NonNull::new(WDOG_BASE as *mut _)?),
                    snvs: UniqueMmioPointer::new(NonNull::new(SNVS_BASE as *mut _)?),
                    src: UniqueMmioPointer::new(NonNull::new(SRC_BASE as *mut _)?),
                }
            };
            Some(Imx8mPsciPlatformImpl::new(GpcDriver, registers, BL31_BASE))
        }
    }
}
