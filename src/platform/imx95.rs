// Copyright The Rusted Firmware-A Contributors.
//
// SPDX-License-Identifier: BSD-3-Clause

//! i.MX95, where power is controlled by the System Manager over SCMI.
//!
//! Each A55 core, and the A55 cluster as a whole, is a CPU of the i.MX CPU protocol. The System
//! Manager powers a CPU down once it has executed WFI in a sleep mode deeper than RUN, and brings
//! it back on a wakeup from either the GIC or the GPC. When the whole system suspends, the NOC mix
//! holding the GIC goes down too, so wakeups have to be routed through the GPC instead and the GIC
//! and GPIO state saved.

pub mod domains;
pub mod gpio;
pub mod qchannel;
pub mod wakeup;

use self::{
    domains::{
        CORE_COUNT, CoreId, MEM_SLICE_NOC_OCRAM, MIX_SLICE_NOC, MIX_SLICE_WAKEUP,
        PowerDomainDescriptor, cluster,
    },
    gpio::{GpioBanks, GpioContext},
    qchannel::QchannelHandshake,
    wakeup::{ALL_MASKED, IMR_NUM, WakeupMasks, WakeupSummary, classify, wakeup_masks},
};
use crate::{
    aarch64::{park, wfi},
    gicv3::{
        DistributorContext, DistributorControl, GicDistributor, disable_cpu_interface,
        enable_cpu_interface,
    },
    psci::{
        PlatformPowerStateInterface, PowerStateType, PsciCompositePowerState,
        PsciPlatformInterface,
    },
    scmi::{
        Scmi, ScmiChannel, ScmiError,
        imx9::{LpmConfig, LpmSetting, ResetVectorFlags, SleepFlags, SleepMode},
        system_power::{SystemPowerFlags, SystemState},
    },
    sysregs::{
        ClusterPwrdn, arm_fiq_gate, disarm_fiq_gate, read_clusterpwrdn_el1,
        write_clusterpwrdn_el1,
    },
};
use arm_psci::{
    ArchitecturalResetType, Cookie, EntryPoint, ErrorCode, Mpidr, PowerState, ResetType,
};
use core::sync::atomic::{AtomicBool, Ordering};
use log::{debug, info, warn};
use spin::mutex::SpinMutex;

/// Lowest address the non-secure world may be entered at.
pub const NS_IMAGE_BASE: u64 = 0x9020_0000;

/// Base address of the GIC distributor.
pub const GICD_BASE: usize = 0x4800_0000;

/// The only power down state id with a meaning on i.MX95, asking for the core to go off and the
/// cluster to retention.
const POWER_DOWN_STATE_ID: u32 = 0x33;
const STATE_ID_MASK: u32 = 0xffff;
const POWER_LEVEL_SHIFT: u32 = 24;
const POWER_LEVEL_MASK: u32 = 0x3;

/// Non-IRQ wakeup sources: debug and event. Both are masked.
const NON_IRQ_WAKE_MASK: u32 = 0b11;

/// Vendor specific reset types of `SYSTEM_RESET2`.
const VENDOR_RESET_COLD: u32 = 0;
const VENDOR_RESET_BOARD: u32 = 1;

/// Local power states of the i.MX95 power domains.
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub enum Imx95PowerState {
    /// Powered and running.
    Run = 0,
    /// Clocks gated with state kept. Only the cluster can be in retention.
    Retention = 2,
    /// Powered down.
    Off = 4,
}

impl PlatformPowerStateInterface for Imx95PowerState {
    const OFF: Self = Self::Off;
    const RUN: Self = Self::Run;

    fn power_state_type(&self) -> PowerStateType {
        match self {
            Self::Run => PowerStateType::Run,
            Self::Retention => PowerStateType::StandbyOrRetention,
            Self::Off => PowerStateType::PowerDown,
        }
    }
}

impl From<Imx95PowerState> for usize {
    fn from(value: Imx95PowerState) -> Self {
        value as usize
    }
}

type CompositeState = PsciCompositePowerState<Imx95PowerState>;

/// Proof that the calling core is the last one up and is taking the whole system down or bringing
/// it back up.
///
/// The generic PSCI code only gives a system level state other than RUN to the last core, so this
/// can only be made from such a state.
struct LastCore {
    core: CoreId,
}

impl LastCore {
    fn new(core: CoreId, state: &CompositeState) -> Option<Self> {
        state.highest_level_state().is_off().then_some(Self { core })
    }

    fn descriptor(&self) -> &'static PowerDomainDescriptor {
        self.core.descriptor()
    }
}

/// Everything saved by a system suspend which its resume needs.
struct SuspendSession {
    distributor: DistributorContext<IMR_NUM>,
    wakeup: WakeupSummary,
    handshake: QchannelHandshake,
    gpio: Option<GpioContext>,
}

impl SuspendSession {
    fn gpio_wakeup(&self) -> bool {
        self.gpio.as_ref().is_some_and(GpioContext::wakeup_requested)
    }
}

/// Keeps the first error from a sequence of steps which must all be attempted.
#[derive(Debug, Default)]
struct FirstError(Option<ScmiError>);

impl FirstError {
    fn record(&mut self, result: Result<(), ScmiError>) {
        if let (None, Err(e)) = (&self.0, result) {
            self.0 = Some(e);
        }
    }

    fn into_result(self) -> Result<(), ScmiError> {
        self.0.map_or(Ok(()), Err)
    }
}

/// Returns the bitmask of the given memory slices, as used in LPM retention masks.
fn retention_mask(memory_domains: &[u32]) -> u32 {
    memory_domains.iter().fold(0, |mask, &slice| mask | 1 << slice)
}

/// LPM policies of the cluster, NOC and wakeup mixes while the system is running.
fn run_mode_lpm_configs() -> [LpmConfig; 3] {
    [
        LpmConfig::new(
            cluster().power_domain,
            LpmSetting::Always,
            retention_mask(cluster().memory_domains),
        ),
        LpmConfig::new(MIX_SLICE_NOC, LpmSetting::Always, 0),
        LpmConfig::new(MIX_SLICE_WAKEUP, LpmSetting::Always, 0),
    ]
}

/// Undoes the core and cluster level steps of a suspend to `previous_state`.
fn finish_core_and_cluster(previous_state: &CompositeState) {
    if !previous_state.cluster_level_state().is_run() {
        // The power down may have been aborted by a wakeup, in which case the request is still
        // pending.
        let value = read_clusterpwrdn_el1() - ClusterPwrdn::MEM_RET;
        write_clusterpwrdn_el1(value | ClusterPwrdn::PWRDN_ON);
    }

    if previous_state.cpu_level_state().is_off() {
        enable_cpu_interface();
    } else {
        disarm_fiq_gate();
    }
}

/// PSCI platform callbacks for i.MX95.
pub struct Imx95PsciPlatformImpl<'a, C> {
    scmi: SpinMutex<Scmi<C>>,
    gicd: SpinMutex<GicDistributor<'a>>,
    gpio: SpinMutex<GpioBanks<'a>>,
    secure_entrypoint: u64,
    /// Whether each core still needs its boot vector programmed before it is first started.
    first_boot: [AtomicBool; CORE_COUNT],
    session: SpinMutex<Option<SuspendSession>>,
}

impl<'a, C: ScmiChannel> Imx95PsciPlatformImpl<'a, C> {
    /// Creates the platform callbacks, without touching the hardware.
    ///
    /// `secure_entrypoint` is where cores start executing BL31 after being powered on or resumed.
    pub fn new(
        scmi: Scmi<C>,
        gicd: GicDistributor<'a>,
        gpio: GpioBanks<'a>,
        secure_entrypoint: u64,
    ) -> Self {
        Self {
            scmi: SpinMutex::new(scmi),
            gicd: SpinMutex::new(gicd),
            gpio: SpinMutex::new(gpio),
            secure_entrypoint,
            // Core 0 is already running.
            first_boot: core::array::from_fn(|index| AtomicBool::new(index != 0)),
            session: SpinMutex::new(None),
        }
    }

    /// Programs the initial power configuration, on the boot core.
    ///
    /// The boot core and the cluster wake through the GIC and stay powered whenever they are
    /// running, and the cluster, NOC and wakeup mixes stay on.
    pub fn setup(&self) -> Result<(), ScmiError> {
        let boot_core = CoreId::BOOT.descriptor();
        let mut scmi = self.scmi.lock();

        scmi.core_set_reset_vector(
            boot_core.cpu_id,
            self.secure_entrypoint,
            ResetVectorFlags::BOOT,
        )?;
        scmi.core_set_non_irq_wake_mask(boot_core.cpu_id, NON_IRQ_WAKE_MASK)?;
        scmi.core_set_non_irq_wake_mask(cluster().cpu_id, NON_IRQ_WAKE_MASK)?;
        scmi.core_set_lpm_mode(cluster().cpu_id, &run_mode_lpm_configs())?;
        scmi.core_set_lpm_mode(
            boot_core.cpu_id,
            &[LpmConfig::new(
                boot_core.power_domain,
                LpmSetting::OnRun,
                0,
            )],
        )?;
        scmi.core_set_sleep_mode(boot_core.cpu_id, SleepFlags::GIC_WAKEUP, SleepMode::Wait)?;
        scmi.core_set_sleep_mode(cluster().cpu_id, SleepFlags::GIC_WAKEUP, SleepMode::Wait)?;

        info!(
            "i.MX95 power management ready, warm boot entry point {:#x}",
            self.secure_entrypoint
        );
        Ok(())
    }

    /// Routes the wakeups of the last core and the cluster through the GPC on the way down, or back
    /// to the GIC on the way up.
    ///
    /// The last core never gets GPC wakeups, they all go to the cluster.
    fn route_system_wakeup(
        scmi: &mut Scmi<C>,
        last_core: &LastCore,
        cluster_masks: &WakeupMasks,
        handshake: &mut QchannelHandshake,
        power_down: bool,
    ) -> Result<(), ScmiError> {
        let (flags, mode) = if power_down {
            (SleepFlags::empty(), SleepMode::Suspend)
        } else {
            (SleepFlags::GIC_WAKEUP, SleepMode::Wait)
        };
        let last_cpu = last_core.descriptor().cpu_id;
        let cluster_cpu = cluster().cpu_id;

        let mut result = FirstError::default();
        result.record(scmi.core_set_irq_wake_masks(last_cpu, 0, &ALL_MASKED));
        result.record(scmi.core_set_irq_wake_masks(cluster_cpu, 0, cluster_masks));
        result.record(scmi.core_set_sleep_mode(last_cpu, flags | SleepFlags::RESUME_CPU, mode));
        result.record(scmi.core_set_sleep_mode(cluster_cpu, flags, mode));
        result.record(if power_down {
            handshake.enable(scmi, cluster_cpu)
        } else {
            handshake.disable(scmi, cluster_cpu)
        });
        result.into_result()
    }

    /// Prepares the NOC and wakeup mixes to be powered down along with the cluster.
    ///
    /// If any step fails, everything done so far is undone as on resume, and the system is left
    /// running with no suspend session open.
    fn suspend_system(&self, last_core: &LastCore, l3_retention: u32) -> Result<(), ErrorCode> {
        let result = {
            let mut session = self.session.lock();
            if session.is_some() {
                warn!("System suspend while already suspended");
                return Err(ErrorCode::Denied);
            }

            let (distributor, masks) = {
                let mut gicd = self.gicd.lock();
                (gicd.save(), wakeup_masks(&mut gicd))
            };
            let session = session.insert(SuspendSession {
                distributor,
                wakeup: classify(&masks),
                handshake: QchannelHandshake::new(),
                gpio: None,
            });
            session.handshake.mark_active_wakeups(&masks);
            self.enter_system_suspend(session, last_core, &masks, l3_retention)
        };

        if let Err(e) = result {
            warn!("System suspend failed: {e}");
            if let Err(e) = self.resume_system(last_core) {
                warn!("Undoing system suspend failed: {e}");
            }
            return Err(e.into());
        }
        Ok(())
    }

    /// The SCMI and GPIO steps of [`Self::suspend_system`], once `session` has been opened.
    fn enter_system_suspend(
        &self,
        session: &mut SuspendSession,
        last_core: &LastCore,
        masks: &WakeupMasks,
        l3_retention: u32,
    ) -> Result<(), ScmiError> {
        let mut scmi = self.scmi.lock();
        Self::route_system_wakeup(&mut scmi, last_core, masks, &mut session.handshake, true)?;

        session.gpio = Some(self.gpio.lock().save());
        let keep_wakeup_mix_on = session.gpio_wakeup() || session.wakeup.has_wakeup_irq;
        debug!(
            "System suspend: {:?}, GPIO wakeup {}",
            session.wakeup,
            session.gpio_wakeup()
        );

        scmi.core_set_lpm_mode(
            cluster().cpu_id,
            &[
                LpmConfig::new(
                    cluster().power_domain,
                    LpmSetting::OnRunWaitStop,
                    l3_retention,
                ),
                LpmConfig::new(
                    MIX_SLICE_NOC,
                    LpmSetting::OnRunWaitStop,
                    retention_mask(&[MEM_SLICE_NOC_OCRAM]),
                ),
                LpmConfig::new(
                    MIX_SLICE_WAKEUP,
                    if keep_wakeup_mix_on {
                        LpmSetting::Always
                    } else {
                        LpmSetting::OnRunWaitStop
                    },
                    0,
                ),
            ],
        )?;

        // The System Manager would otherwise gate the oscillator NETC needs to wake the system.
        if session.wakeup.has_netc_irq {
            scmi.sys_power_state_set(
                SystemPowerFlags::Forceful,
                SystemState::mode(SystemState::OSC24M_ACTIVE),
            )?;
        }
        Ok(())
    }

    /// Undoes [`Self::suspend_system`], as far as it got.
    fn resume_system(&self, last_core: &LastCore) -> Result<(), ScmiError> {
        let session = self.session.lock().take();
        let mut result = FirstError::default();

        let (mut handshake, gpio) = match session {
            Some(session) => {
                if session.wakeup.has_netc_irq {
                    result.record(
                        self.scmi
                            .lock()
                            .sys_power_state_set(SystemPowerFlags::Forceful, SystemState::mode(0)),
                    );
                }
                self.gicd.lock().restore(&session.distributor);
                (session.handshake, session.gpio)
            }
            None => {
                warn!("System resume without a matching suspend");
                (QchannelHandshake::new(), None)
            }
        };

        let mut scmi = self.scmi.lock();
        result.record(Self::route_system_wakeup(
            &mut scmi,
            last_core,
            &ALL_MASKED,
            &mut handshake,
            false,
        ));
        if let Some(gpio) = gpio {
            self.gpio.lock().restore(gpio);
        }
        result.record(scmi.core_set_lpm_mode(cluster().cpu_id, &run_mode_lpm_configs()));
        result.into_result()
    }

    /// Sends a forceful system power state request, then waits for the power to go.
    fn request_system_state(&self, state: SystemState) -> ! {
        if let Err(e) = self
            .scmi
            .lock()
            .sys_power_state_set(SystemPowerFlags::Forceful, state)
        {
            warn!("System power state {:#x} request failed: {e}", state.0);
        }
        park()
    }

    /// Resets or shuts down the system into the given state.
    ///
    /// The transition doesn't complete while the distributor has interrupt groups enabled, so they
    /// are disabled first.
    fn reset(&self, state: SystemState) -> ! {
        self.gicd
            .lock()
            .clear_control(DistributorControl::ENABLE_ALL);
        self.request_system_state(state)
    }
}

impl<C: ScmiChannel> PsciPlatformInterface for Imx95PsciPlatformImpl<'_, C> {
    type PlatformPowerState = Imx95PowerState;

    fn try_parse_power_state(power_state: PowerState) -> Option<CompositeState> {
        let (power_down, value) = match power_state {
            PowerState::StandbyOrRetention(value) => (false, value),
            PowerState::PowerDown(value) => (true, value),
        };
        let level = (value >> POWER_LEVEL_SHIFT) & POWER_LEVEL_MASK;
        if level as usize > crate::psci::MAX_POWER_LEVEL {
            return None;
        }
        if power_down && value & STATE_ID_MASK != POWER_DOWN_STATE_ID {
            return None;
        }
        // Standby and the recognised power down state both put the core off and the cluster in
        // retention.
        Some(CompositeState::new([
            Imx95PowerState::Off,
            Imx95PowerState::Retention,
            Imx95PowerState::Run,
        ]))
    }

    fn is_valid_ns_entrypoint(&self, entry: &EntryPoint) -> bool {
        entry.entry_point_address() >= NS_IMAGE_BASE
    }

    fn cpu_standby(&self, cpu_state: Imx95PowerState) {
        assert_eq!(cpu_state.power_state_type(), PowerStateType::StandbyOrRetention);

        arm_fiq_gate();
        wfi();
        disarm_fiq_gate();
    }

    fn power_domain_on(&self, mpidr: Mpidr) -> Result<(), ErrorCode> {
        let core = CoreId::from_mpidr(mpidr).ok_or(ErrorCode::InvalidParameters)?;
        let descriptor = core.descriptor();
        let first_boot = &self.first_boot[core.index()];
        let mut scmi = self.scmi.lock();

        if first_boot.load(Ordering::Acquire) {
            scmi.core_set_reset_vector(
                descriptor.cpu_id,
                self.secure_entrypoint,
                ResetVectorFlags::BOOT,
            )?;
            first_boot.store(false, Ordering::Release);
        }
        scmi.core_start(descriptor.cpu_id)?;
        scmi.core_set_non_irq_wake_mask(descriptor.cpu_id, NON_IRQ_WAKE_MASK)?;
        scmi.core_set_lpm_mode(
            descriptor.cpu_id,
            &[LpmConfig::new(descriptor.power_domain, LpmSetting::OnRun, 0)],
        )?;
        debug!("Core {} started", core.index());
        Ok(())
    }

    fn power_domain_on_finish(&self, _previous_state: &CompositeState) -> Result<(), ErrorCode> {
        let descriptor = CoreId::current().descriptor();
        let result = self.scmi.lock().core_set_sleep_mode(
            descriptor.cpu_id,
            SleepFlags::GIC_WAKEUP,
            SleepMode::Wait,
        );
        enable_cpu_interface();
        Ok(result?)
    }

    fn power_domain_off(&self, target_state: &CompositeState) -> Result<(), ErrorCode> {
        assert!(target_state.cpu_level_state().is_off());
        let descriptor = CoreId::current().descriptor();

        disable_cpu_interface();
        write_clusterpwrdn_el1(ClusterPwrdn::empty());

        let mut scmi = self.scmi.lock();
        scmi.core_set_lpm_mode(
            descriptor.cpu_id,
            &[LpmConfig::new(
                descriptor.power_domain,
                LpmSetting::OnRunWaitStop,
                0,
            )],
        )?;
        // A hotplugged core is only woken by software, through CPU start.
        scmi.core_set_irq_wake_masks(descriptor.cpu_id, 0, &ALL_MASKED)?;
        scmi.core_set_sleep_mode(descriptor.cpu_id, SleepFlags::empty(), SleepMode::Suspend)?;
        Ok(())
    }

    fn power_domain_suspend(&self, target_state: &CompositeState) -> Result<(), ErrorCode> {
        let core = CoreId::current();

        if target_state.cpu_level_state().is_off() {
            self.scmi.lock().core_set_reset_vector(
                core.descriptor().cpu_id,
                self.secure_entrypoint,
                ResetVectorFlags::RESUME,
            )?;
            disable_cpu_interface();
        } else {
            arm_fiq_gate();
        }

        let mut l3_retention = 0;
        match target_state.cluster_level_state() {
            Imx95PowerState::Run => {}
            Imx95PowerState::Retention => {
                write_clusterpwrdn_el1(ClusterPwrdn::MEM_RET);
                l3_retention = retention_mask(cluster().memory_domains);
            }
            Imx95PowerState::Off => write_clusterpwrdn_el1(ClusterPwrdn::empty()),
        }

        if let Some(last_core) = LastCore::new(core, target_state) {
            if let Err(e) = self.suspend_system(&last_core, l3_retention) {
                // The core won't go down, so leave it as if it had woken straight away.
                finish_core_and_cluster(target_state);
                return Err(e);
            }
        }
        Ok(())
    }

    fn power_domain_suspend_finish(&self, previous_state: &CompositeState) -> Result<(), ErrorCode> {
        let core = CoreId::current();
        let mut result = FirstError::default();

        if let Some(last_core) = LastCore::new(core, previous_state) {
            result.record(self.resume_system(&last_core));
        }

        finish_core_and_cluster(previous_state);
        Ok(result.into_result()?)
    }

    fn power_domain_power_down_wfi(&self, _target_state: &CompositeState) -> ! {
        park()
    }

    fn sys_suspend_power_state(&self) -> CompositeState {
        CompositeState::OFF
    }

    fn system_off(&self) -> ! {
        info!("System off");
        self.reset(SystemState::SHUTDOWN)
    }

    fn system_reset(&self) -> ! {
        info!("System reset");
        self.reset(SystemState::COLD_RESET)
    }

    fn system_reset2(&self, reset_type: ResetType, _cookie: Cookie) -> Result<(), ErrorCode> {
        let state = match reset_type {
            ResetType::Architectural(ArchitecturalResetType::SystemWarmReset) => {
                SystemState::WARM_RESET
            }
            ResetType::VendorSpecific(VENDOR_RESET_COLD) => SystemState::COLD_RESET,
            ResetType::VendorSpecific(VENDOR_RESET_BOARD) => SystemState::FULL_RESET,
            _ => return Err(ErrorCode::InvalidParameters),
        };
        info!("System reset {state:?}");
        self.reset(state)
    }
}

#[cfg(not(test))]
mod mailbox {
    use crate::scmi::{ScmiChannel, ScmiError};

    unsafe extern "C" {
        /// Sends an SCMI request to the System Manager over the A55 mailbox and waits for the
        /// response.
        ///
        /// Returns the length of the response copied to `response`, or a negative value if the
        /// transport failed or timed out.
        unsafe fn imx_scmi_mailbox_exchange(
            request: *const u8,
            request_length: usize,
            response: *mut u8,
            response_capacity: usize,
        ) -> isize;
    }

    /// The SCMI channel to the System Manager.
    pub struct MailboxChannel;

    impl ScmiChannel for MailboxChannel {
        fn exchange(&mut self, request: &[u8], response: &mut [u8]) -> Result<usize, ScmiError> {
            // SAFETY: Both buffers are valid for their lengths for the duration of the call, and
            // the transport doesn't keep any reference to them afterwards.
            let length = unsafe {
                imx_scmi_mailbox_exchange(
                    request.as_ptr(),
                    request.len(),
                    response.as_mut_ptr(),
                    response.len(),
                )
            };
            usize::try_from(length)
                .ok()
                .filter(|&length| length <= response.len())
                .ok_or(ScmiError::Transport)
        }
    }
}

#[cfg(not(test))]
pub use self::platform::Imx95;

#[cfg(not(test))]
mod platform {
    use super::{
        GICD_BASE, Imx95PsciPlatformImpl,
        gpio::{GPIO_BANKS, GpioBanks, GpioRegisters},
        mailbox::MailboxChannel,
    };
    use crate::{
        gicv3::{GicDistributor, Gicd},
        logger::{self, LockedWriter},
        platform::{Console, Platform},
        scmi::Scmi,
    };
    use core::{
        ptr::NonNull,
        sync::atomic::{AtomicBool, Ordering},
    };
    use log::error;
    use safe_mmio::UniqueMmioPointer;

    static TAKEN: AtomicBool = AtomicBool::new(false);

    /// The i.MX95 SoC.
    pub struct Imx95;

    impl Platform for Imx95 {
        type LogSinkImpl = LockedWriter<Console>;
        type PsciPlatformImpl = Imx95PsciPlatformImpl<'static, MailboxChannel>;

        fn init_logger() {
            // Fails only if already initialised by an earlier call.
            let _ = logger::init(LockedWriter::new(Console));
        }

        fn psci_platform(secure_entrypoint: u64) -> Option<Self::PsciPlatformImpl> {
            if TAKEN.swap(true, Ordering::AcqRel) {
                return None;
            }

            // SAFETY: GICD_BASE is the address of the GIC distributor, which is mapped as device
            // memory by BL31. TAKEN ensures no other reference to it is created here, and the GIC
            // driver of BL31 only touches the distributor while this is not using it.
            let gicd = unsafe {
                UniqueMmioPointer::new(NonNull::new(GICD_BASE as *mut Gicd)?)
            };
            let gpio = GPIO_BANKS.map(|(base, _)| {
                // SAFETY: Each of GPIO_BANKS is the address of a distinct GPIO bank, mapped as
                // device memory by BL31 and not used by anything else in EL3. TAKEN ensures that
                // only one pointer to each is created.
                Some(unsafe { UniqueMmioPointer::new(NonNull::new(base as *mut GpioRegisters)?) })
            });
            let [Some(gpio2), Some(gpio3), Some(gpio4), Some(gpio5)] = gpio else {
                return None;
            };

            let platform = Imx95PsciPlatformImpl::new(
                Scmi::new(MailboxChannel),
                GicDistributor::new(gicd),
                GpioBanks::new([gpio2, gpio3, gpio4, gpio5]),
                secure_entrypoint,
            );
            if let Err(e) = platform.setup() {
                error!("Failed to set up power management: {e}");
            }
            Some(platform)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        aarch64::PARK_MAGIC,
        platform::test::{FakeImx95Registers, FakeScmiChannel, RecordedRequest, lock_sysregs},
        scmi::{
            ProtocolId,
            imx9::{
                CPU_IRQ_WAKE_SET, CPU_LPM_MODE_SET, CPU_NON_IRQ_WAKE_SET, CPU_PER_LPM_MODE_SET,
                CPU_RESET_VECTOR_SET, CPU_SLEEP_MODE_SET, CPU_START,
            },
            system_power::SYSTEM_POWER_STATE_SET,
        },
        sysregs::fake::SYSREGS as FAKE_CLUSTER_REGS,
    };
    use arm_sysregs::{MpidrEl1, fake::SYSREGS};
    use std::panic::{AssertUnwindSafe, catch_unwind};

    const ENTRY: u64 = 0x8a20_0000;
    const SUSPEND_TO_RAM: CompositeState = CompositeState::OFF;
    const CORE_IDLE: CompositeState = CompositeState::new([
        Imx95PowerState::Off,
        Imx95PowerState::Retention,
        Imx95PowerState::Run,
    ]);

    fn mpidr(core: u8) -> Mpidr {
        Mpidr::from_aff3210(0, 0, core, 0)
    }

    fn run_on_core(core: u8) {
        SYSREGS.lock().unwrap().mpidr_el1 = MpidrEl1::from_psci_mpidr(mpidr(core).into());
    }

    fn cpu_requests(requests: &[RecordedRequest], message_id: u8) -> Vec<&RecordedRequest> {
        requests
            .iter()
            .filter(|request| request.is(ProtocolId::Imx9Cpu, message_id))
            .collect()
    }

    fn system_power_requests(requests: &[RecordedRequest]) -> Vec<Vec<u32>> {
        requests
            .iter()
            .filter(|request| request.is(ProtocolId::SystemPower, SYSTEM_POWER_STATE_SET))
            .map(RecordedRequest::words)
            .collect()
    }

    /// Returns the (domain, setting, retention) triples of the last LPM mode set for `cpu_id`.
    fn last_lpm_configs(requests: &[RecordedRequest], cpu_id: u32) -> Vec<[u32; 3]> {
        let request = cpu_requests(requests, CPU_LPM_MODE_SET)
            .into_iter()
            .rev()
            .find(|request| request.words()[0] == cpu_id)
            .unwrap();
        request.words()[2..]
            .chunks(3)
            .map(|config| [config[0], config[1], config[2]])
            .collect()
    }

    #[test]
    fn parse_power_state() {
        let expected = Some(CORE_IDLE);
        type Platform = Imx95PsciPlatformImpl<'static, FakeScmiChannel>;
        assert_eq!(Platform::try_parse_power_state(PowerState::StandbyOrRetention(0)), expected);
        assert_eq!(
            Platform::try_parse_power_state(PowerState::StandbyOrRetention(0x0100_0000)),
            expected
        );
        assert_eq!(Platform::try_parse_power_state(PowerState::PowerDown(0x33)), expected);
        assert_eq!(
            Platform::try_parse_power_state(PowerState::PowerDown(0x0200_0033)),
            expected
        );
        // Level 3 doesn't exist.
        assert_eq!(Platform::try_parse_power_state(PowerState::PowerDown(0x0300_0033)), None);
        assert_eq!(
            Platform::try_parse_power_state(PowerState::StandbyOrRetention(0x0300_0000)),
            None
        );
        // Nor does any other power down state.
        assert_eq!(Platform::try_parse_power_state(PowerState::PowerDown(0x3)), None);
        assert!(expected.unwrap().is_ordered());
    }

    #[test]
    fn entry_point_must_be_in_dram() {
        let mut registers = FakeImx95Registers::new();
        let platform = registers.platform(FakeScmiChannel::new(), ENTRY);
        let entry = |address| EntryPoint::Entry64 {
            entry_point_address: address,
            context_id: 0,
        };
        assert!(platform.is_valid_ns_entrypoint(&entry(NS_IMAGE_BASE)));
        assert!(!platform.is_valid_ns_entrypoint(&entry(NS_IMAGE_BASE - 4)));
    }

    #[test]
    fn setup_sequence() {
        let mut registers = FakeImx95Registers::new();
        let channel = FakeScmiChannel::new();
        registers.platform(channel.clone(), ENTRY).setup().unwrap();

        let requests = channel.requests();
        let ids: Vec<_> = requests.iter().map(RecordedRequest::message_id).collect();
        assert_eq!(
            ids,
            [
                CPU_RESET_VECTOR_SET,
                CPU_NON_IRQ_WAKE_SET,
                CPU_NON_IRQ_WAKE_SET,
                CPU_LPM_MODE_SET,
                CPU_LPM_MODE_SET,
                CPU_SLEEP_MODE_SET,
                CPU_SLEEP_MODE_SET,
            ]
        );
        assert_eq!(requests[0].words(), [2, 1 << 30, 0x8a20_0000, 0]);
        assert_eq!(requests[1].words()[..4], [2, 0, 1, 0b11]);
        assert_eq!(requests[2].words()[..4], [8, 0, 1, 0b11]);
        assert_eq!(
            last_lpm_configs(&requests, 8),
            [[11, 4, 1 << 9], [19, 4, 0], [22, 4, 0]]
        );
        assert_eq!(last_lpm_configs(&requests, 2), [[5, 1, 0]]);
        assert_eq!(requests[5].words(), [2, 1, 1]);
        assert_eq!(requests[6].words(), [8, 1, 1]);
    }

    #[test]
    fn boot_vector_only_on_first_power_on() {
        let mut registers = FakeImx95Registers::new();
        let channel = FakeScmiChannel::new();
        let platform = registers.platform(channel.clone(), ENTRY);

        platform.power_domain_on(mpidr(3)).unwrap();
        platform.power_domain_on(mpidr(3)).unwrap();
        // Core 0 was booted before BL31.
        platform.power_domain_on(mpidr(0)).unwrap();

        let requests = channel.requests();
        let vectors = cpu_requests(&requests, CPU_RESET_VECTOR_SET);
        assert_eq!(vectors.len(), 1);
        assert_eq!(vectors[0].words()[..2], [5, 1 << 30]);
        let starts: Vec<_> = cpu_requests(&requests, CPU_START)
            .iter()
            .map(|request| request.words())
            .collect();
        assert_eq!(starts, [[5], [5], [2]]);
        assert_eq!(last_lpm_configs(&requests, 5), [[8, 1, 0]]);
        assert_eq!(
            platform.power_domain_on(mpidr(6)),
            Err(ErrorCode::InvalidParameters)
        );
    }

    #[test]
    fn boot_vector_failure_is_retried() {
        let mut registers = FakeImx95Registers::new();
        let channel = FakeScmiChannel::new();
        let platform = registers.platform(channel.clone(), ENTRY);

        channel.set_status(-6);
        assert_eq!(
            platform.power_domain_on(mpidr(1)),
            Err(ErrorCode::InternalFailure)
        );
        channel.set_status(0);
        platform.power_domain_on(mpidr(1)).unwrap();

        let requests = channel.requests();
        assert_eq!(cpu_requests(&requests, CPU_RESET_VECTOR_SET).len(), 2);
    }

    #[test]
    fn hotplug_off() {
        let _lock = lock_sysregs();
        run_on_core(4);
        let mut registers = FakeImx95Registers::new();
        let channel = FakeScmiChannel::new();
        let platform = registers.platform(channel.clone(), ENTRY);

        platform
            .power_domain_off(&CompositeState::new([
                Imx95PowerState::Off,
                Imx95PowerState::Run,
                Imx95PowerState::Run,
            ]))
            .unwrap();

        let requests = channel.requests();
        let masks = cpu_requests(&requests, CPU_IRQ_WAKE_SET);
        assert_eq!(masks.len(), 1);
        let words = masks[0].words();
        assert_eq!(words[..3], [6, 0, 12]);
        assert!(words[3..].iter().all(|&mask| mask == u32::MAX));

        let sleep_modes = cpu_requests(&requests, CPU_SLEEP_MODE_SET);
        assert_eq!(sleep_modes.len(), 1);
        // GPC wakeup, SUSPEND.
        assert_eq!(sleep_modes[0].words(), [6, 0, 3]);
        assert_eq!(last_lpm_configs(&requests, 6), [[9, 3, 0]]);

        let cluster = FAKE_CLUSTER_REGS.lock().unwrap();
        assert_eq!(cluster.clusterpwrdn_el1, ClusterPwrdn::empty());
        assert_eq!(cluster.clusterpwrdn_el1_writes, 1);
    }

    #[test]
    fn system_suspend_without_wakeup_sources() {
        let _lock = lock_sysregs();
        run_on_core(0);
        let mut registers = FakeImx95Registers::new();
        let channel = FakeScmiChannel::new();
        let platform = registers.platform(channel.clone(), ENTRY);

        platform.power_domain_suspend(&SUSPEND_TO_RAM).unwrap();

        let requests = channel.requests();
        assert_eq!(
            last_lpm_configs(&requests, 8),
            [[11, 3, 0], [19, 3, 1 << 16], [22, 3, 0]]
        );
        assert!(system_power_requests(&requests).is_empty());

        // Both the last core and the cluster are routed to the GPC with everything masked.
        let masks = cpu_requests(&requests, CPU_IRQ_WAKE_SET);
        assert_eq!(masks.len(), 2);
        assert!(masks.iter().all(|request| request.words()[3..].iter().all(|&m| m == u32::MAX)));
        let sleep_modes: Vec<_> = cpu_requests(&requests, CPU_SLEEP_MODE_SET)
            .iter()
            .map(|request| request.words())
            .collect();
        assert_eq!(sleep_modes, [[2, 0b10, 3], [8, 0, 3]]);

        // The GPIO handshakes are handed over regardless.
        let handshakes = cpu_requests(&requests, CPU_PER_LPM_MODE_SET);
        assert_eq!(handshakes[0].words()[..2], [8, 4]);

        // Cluster goes off.
        assert_eq!(
            FAKE_CLUSTER_REGS.lock().unwrap().clusterpwrdn_el1,
            ClusterPwrdn::empty()
        );
    }

    #[test]
    fn gpio_wakeup_keeps_wakeup_mix_on() {
        let _lock = lock_sysregs();
        run_on_core(0);
        let mut registers = FakeImx95Registers::new();
        registers.gpio[1].icr[7].0 = 0x000a_0000;
        let channel = FakeScmiChannel::new();
        let platform = registers.platform(channel.clone(), ENTRY);

        platform.power_domain_suspend(&SUSPEND_TO_RAM).unwrap();

        assert_eq!(
            last_lpm_configs(&channel.requests(), 8),
            [[11, 3, 0], [19, 3, 1 << 16], [22, 4, 0]]
        );
    }

    #[test]
    fn uart_wakeup_keeps_wakeup_mix_on() {
        let _lock = lock_sysregs();
        run_on_core(0);
        let mut registers = FakeImx95Registers::new();
        // LPUART5, SPI 66.
        registers.gicd.isenabler[3].0 = 1 << 2;
        let channel = FakeScmiChannel::new();
        let platform = registers.platform(channel.clone(), ENTRY);

        platform.power_domain_suspend(&SUSPEND_TO_RAM).unwrap();

        let requests = channel.requests();
        assert_eq!(last_lpm_configs(&requests, 8)[2], [22, 4, 0]);
        let cluster_masks = cpu_requests(&requests, CPU_IRQ_WAKE_SET)[1].words();
        assert_eq!(cluster_masks[0], 8);
        assert_eq!(cluster_masks[3 + 2], !(1 << 2));
        // LPUART5 joins the GPIOs.
        let handshakes = cpu_requests(&requests, CPU_PER_LPM_MODE_SET)[0].words();
        assert_eq!(handshakes[..4], [8, 5, 14, 3]);
    }

    #[test]
    fn netc_wakeup_keeps_oscillator_on() {
        let _lock = lock_sysregs();
        run_on_core(0);
        let mut registers = FakeImx95Registers::new();
        registers.gicd.isenabler[10].0 = 1 << 16;
        let channel = FakeScmiChannel::new();
        let platform = registers.platform(channel.clone(), ENTRY);

        platform.power_domain_suspend(&SUSPEND_TO_RAM).unwrap();
        assert_eq!(
            system_power_requests(&channel.requests()),
            [[0, 0xc000_0010]]
        );
        // NETC alone doesn't need the wakeup mix.
        assert_eq!(last_lpm_configs(&channel.requests(), 8)[2], [22, 3, 0]);

        platform.power_domain_suspend_finish(&SUSPEND_TO_RAM).unwrap();
        assert_eq!(
            system_power_requests(&channel.requests()),
            [[0, 0xc000_0010], [0, 0xc000_0000]]
        );
    }

    #[test]
    fn suspend_resume_round_trip() {
        let _lock = lock_sysregs();
        run_on_core(0);
        let mut registers = FakeImx95Registers::new();
        registers.gicd.ctlr.0 = 0x37;
        registers.gicd.isenabler[2].0 = 1 << 6;
        registers.gpio[0].icr[3].0 = 0x0009_0000;
        let channel = FakeScmiChannel::new();
        let platform = registers.platform(channel.clone(), ENTRY);

        platform.power_domain_suspend(&SUSPEND_TO_RAM).unwrap();
        channel.clear_requests();
        platform.power_domain_suspend_finish(&SUSPEND_TO_RAM).unwrap();
        assert!(platform.session.lock().is_none());

        let requests = channel.requests();
        // Back to GIC wakeup at WAIT, with everything masked in the GPC.
        let sleep_modes: Vec<_> = cpu_requests(&requests, CPU_SLEEP_MODE_SET)
            .iter()
            .map(|request| request.words())
            .collect();
        assert_eq!(sleep_modes, [[2, 0b11, 1], [8, 0b01, 1]]);
        let masks = cpu_requests(&requests, CPU_IRQ_WAKE_SET);
        assert!(masks.iter().all(|request| request.words()[3..].iter().all(|&m| m == u32::MAX)));
        // The handshakes handed over (FlexCAN2 and the GPIOs) are put back.
        let handshakes = cpu_requests(&requests, CPU_PER_LPM_MODE_SET)[0].words();
        assert_eq!(handshakes[..2], [8, 5]);
        assert!(handshakes[2..].chunks(2).all(|pair| pair[1] == 4));
        assert_eq!(
            last_lpm_configs(&requests, 8),
            [[11, 4, 1 << 9], [19, 4, 0], [22, 4, 0]]
        );

        // Cluster is powered on again.
        assert_eq!(
            FAKE_CLUSTER_REGS.lock().unwrap().clusterpwrdn_el1,
            ClusterPwrdn::PWRDN_ON
        );
        drop(platform);
        assert_eq!(registers.gicd.ctlr.0, 0x37);
        assert_eq!(registers.gicd.isenabler[2].0, 1 << 6);
        assert_eq!(registers.gpio[0].icr[3].0, 0x0009_0000);
    }

    #[test]
    fn failed_system_suspend_is_undone() {
        let _lock = lock_sysregs();
        run_on_core(0);
        let mut registers = FakeImx95Registers::new();
        registers.gicd.ctlr.0 = 0x37;
        registers.gpio[1].icr[7].0 = 0x000a_0000;
        let channel = FakeScmiChannel::new();
        let platform = registers.platform(channel.clone(), ENTRY);

        // Reset vector, wakeup routing and handshakes go through, then the LPM set fails.
        channel.set_status_after(6, -6);
        assert_eq!(
            platform.power_domain_suspend(&SUSPEND_TO_RAM),
            Err(ErrorCode::InternalFailure)
        );
        assert!(platform.session.lock().is_none());
        assert_eq!(
            FAKE_CLUSTER_REGS.lock().unwrap().clusterpwrdn_el1,
            ClusterPwrdn::PWRDN_ON
        );

        // Wakeups are routed back to the GIC, and the handshakes taken back.
        let requests = channel.requests();
        let undo = &requests[7..];
        let sleep_modes: Vec<_> = cpu_requests(undo, CPU_SLEEP_MODE_SET)
            .iter()
            .map(|request| request.words())
            .collect();
        assert_eq!(sleep_modes, [[2, 0b11, 1], [8, 0b01, 1]]);
        let handshakes = cpu_requests(undo, CPU_PER_LPM_MODE_SET)[0].words();
        assert!(handshakes[2..].chunks(2).all(|pair| pair[1] == 4));

        // Once the System Manager recovers the system can suspend again.
        channel.set_status(0);
        channel.clear_requests();
        platform.power_domain_suspend(&SUSPEND_TO_RAM).unwrap();
        assert!(platform.session.lock().is_some());
        assert_eq!(
            last_lpm_configs(&channel.requests(), 8),
            [[11, 3, 0], [19, 3, 1 << 16], [22, 4, 0]]
        );

        drop(platform);
        assert_eq!(registers.gicd.ctlr.0, 0x37);
        assert_eq!(registers.gpio[1].icr[7].0, 0x000a_0000);
    }

    #[test]
    fn failed_wakeup_routing_is_undone() {
        let _lock = lock_sysregs();
        run_on_core(0);
        let mut registers = FakeImx95Registers::new();
        let channel = FakeScmiChannel::new();
        let platform = registers.platform(channel.clone(), ENTRY);

        channel.set_status_after(1, -6);
        assert_eq!(
            platform.power_domain_suspend(&SUSPEND_TO_RAM),
            Err(ErrorCode::InternalFailure)
        );
        assert!(platform.session.lock().is_none());

        channel.set_status(0);
        platform.power_domain_suspend(&SUSPEND_TO_RAM).unwrap();
        platform.power_domain_suspend_finish(&SUSPEND_TO_RAM).unwrap();
        assert!(platform.session.lock().is_none());
    }

    #[test]
    fn second_system_suspend_is_denied() {
        let _lock = lock_sysregs();
        run_on_core(0);
        let mut registers = FakeImx95Registers::new();
        let channel = FakeScmiChannel::new();
        let platform = registers.platform(channel.clone(), ENTRY);

        platform.power_domain_suspend(&SUSPEND_TO_RAM).unwrap();
        channel.clear_requests();
        assert_eq!(
            platform.power_domain_suspend(&SUSPEND_TO_RAM),
            Err(ErrorCode::Denied)
        );
        // Only the core's own resume vector was sent, and the open session is kept.
        assert_eq!(channel.requests().len(), 1);
        assert!(platform.session.lock().is_some());
    }

    #[test]
    fn aborted_suspend_restores_cluster() {
        let _lock = lock_sysregs();
        run_on_core(2);
        let mut registers = FakeImx95Registers::new();
        let channel = FakeScmiChannel::new();
        let platform = registers.platform(channel.clone(), ENTRY);

        platform.power_domain_suspend(&CORE_IDLE).unwrap();
        assert_eq!(
            FAKE_CLUSTER_REGS.lock().unwrap().clusterpwrdn_el1,
            ClusterPwrdn::MEM_RET
        );
        let requests = channel.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].words()[..2], [4, 1 << 31]);

        platform.power_domain_suspend_finish(&CORE_IDLE).unwrap();
        assert_eq!(
            FAKE_CLUSTER_REGS.lock().unwrap().clusterpwrdn_el1,
            ClusterPwrdn::PWRDN_ON
        );
        assert_eq!(channel.requests().len(), 1);
    }

    #[test]
    fn spurious_suspend_finish() {
        let _lock = lock_sysregs();
        run_on_core(0);
        FAKE_CLUSTER_REGS.lock().unwrap().clusterpwrdn_el1 =
            ClusterPwrdn::PWRDN_ON | ClusterPwrdn::MEM_RET;
        let mut registers = FakeImx95Registers::new();
        registers.gicd.ctlr.0 = 0x12;
        let channel = FakeScmiChannel::new();
        let platform = registers.platform(channel.clone(), ENTRY);

        platform.power_domain_suspend_finish(&SUSPEND_TO_RAM).unwrap();

        assert_eq!(
            FAKE_CLUSTER_REGS.lock().unwrap().clusterpwrdn_el1,
            ClusterPwrdn::PWRDN_ON
        );
        let requests = channel.requests();
        assert!(system_power_requests(&requests).is_empty());
        assert_eq!(
            last_lpm_configs(&requests, 8),
            [[11, 4, 1 << 9], [19, 4, 0], [22, 4, 0]]
        );
        // Nothing was handed over, so nothing is put back.
        assert_eq!(cpu_requests(&requests, CPU_PER_LPM_MODE_SET)[0].words(), [8, 0]);
        drop(platform);
        // The distributor wasn't touched.
        assert_eq!(registers.gicd.ctlr.0, 0x12);
    }

    #[test]
    fn resume_reports_first_error_but_finishes() {
        let _lock = lock_sysregs();
        run_on_core(0);
        let mut registers = FakeImx95Registers::new();
        registers.gpio[0].icr[0].0 = 1;
        let channel = FakeScmiChannel::new();
        let platform = registers.platform(channel.clone(), ENTRY);

        platform.power_domain_suspend(&SUSPEND_TO_RAM).unwrap();
        channel.clear_requests();
        channel.set_status(-8);
        assert_eq!(
            platform.power_domain_suspend_finish(&SUSPEND_TO_RAM),
            Err(ErrorCode::InternalFailure)
        );
        assert!(platform.session.lock().is_none());
        // Every step was still attempted.
        let requests = channel.requests();
        assert_eq!(cpu_requests(&requests, CPU_IRQ_WAKE_SET).len(), 2);
        assert_eq!(cpu_requests(&requests, CPU_LPM_MODE_SET).len(), 1);
        drop(platform);
        assert_eq!(registers.gpio[0].icr[0].0, 1);
    }

    #[test]
    fn system_reset_disables_distributor_first() {
        let _lock = lock_sysregs();
        let mut registers = FakeImx95Registers::new();
        registers.gicd.ctlr.0 = (DistributorControl::ENABLE_ALL | DistributorControl::ARE_S).bits();
        let channel = FakeScmiChannel::new();
        let gicd_ctlr = {
            let platform = registers.platform(channel.clone(), ENTRY);
            let result = catch_unwind(AssertUnwindSafe(|| platform.system_reset()));
            assert_eq!(
                *result.unwrap_err().downcast_ref::<String>().unwrap(),
                PARK_MAGIC
            );
            drop(platform);
            registers.gicd.ctlr.0
        };
        assert_eq!(gicd_ctlr, DistributorControl::ARE_S.bits());
        assert_eq!(system_power_requests(&channel.requests()), [[0, 1]]);
    }

    #[test]
    fn system_off_disables_distributor() {
        let mut registers = FakeImx95Registers::new();
        registers.gicd.ctlr.0 = DistributorControl::ENABLE_ALL.bits();
        let channel = FakeScmiChannel::new();
        {
            let platform = registers.platform(channel.clone(), ENTRY);
            let result = catch_unwind(AssertUnwindSafe(|| platform.system_off()));
            assert!(result.is_err());
        }
        assert_eq!(registers.gicd.ctlr.0, 0);
        assert_eq!(system_power_requests(&channel.requests()), [[0, 0]]);
    }

    #[test]
    fn reset2_types() {
        let cases = [
            (
                ResetType::Architectural(ArchitecturalResetType::SystemWarmReset),
                2,
            ),
            (ResetType::VendorSpecific(0), 1),
            (ResetType::VendorSpecific(1), 0x8000_0001),
        ];
        for (reset_type, state) in cases {
            let mut registers = FakeImx95Registers::new();
            let channel = FakeScmiChannel::new();
            let platform = registers.platform(channel.clone(), ENTRY);
            let result = catch_unwind(AssertUnwindSafe(|| {
                let _ = platform.system_reset2(reset_type, Cookie::Cookie64(0));
            }));
            assert!(result.is_err());
            assert_eq!(system_power_requests(&channel.requests()), [[0, state]]);
        }
    }

    #[test]
    fn unknown_reset2_is_rejected() {
        let mut registers = FakeImx95Registers::new();
        registers.gicd.ctlr.0 = DistributorControl::ENABLE_ALL.bits();
        let channel = FakeScmiChannel::new();
        let platform = registers.platform(channel.clone(), ENTRY);
        assert_eq!(
            platform.system_reset2(ResetType::VendorSpecific(7), Cookie::Cookie64(0)),
            Err(ErrorCode::InvalidParameters)
        );
        assert!(channel.requests().is_empty());
        drop(platform);
        assert_eq!(registers.gicd.ctlr.0, DistributorControl::ENABLE_ALL.bits());
    }

    #[test]
    fn sys_suspend_is_all_off() {
        let mut registers = FakeImx95Registers::new();
        let platform = registers.platform(FakeScmiChannel::new(), ENTRY);
        assert_eq!(
            platform.sys_suspend_power_state().states,
            [Imx95PowerState::Off; 3]
        );
    }
}
