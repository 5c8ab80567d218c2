// Copyright The Rusted Firmware-A Contributors.
//
// SPDX-License-Identifier: BSD-3-Clause

//! The platform callback surface of PSCI.
//!
//! The generic PSCI state machine coordinates the requests of all cores, then calls the methods of
//! [`PsciPlatformInterface`] on the core which is changing state.

use crate::aarch64::{dsb_sy, wfi};
use arm_psci::{Cookie, EntryPoint, ErrorCode, Mpidr, PowerState, ResetType};
use core::fmt::Debug;

/// Index of the core level in a [`PsciCompositePowerState`].
pub const CPU_POWER_LEVEL: usize = 0;
/// Index of the cluster level in a [`PsciCompositePowerState`].
pub const CLUSTER_POWER_LEVEL: usize = 1;
/// Index of the system level in a [`PsciCompositePowerState`].
pub const SYSTEM_POWER_LEVEL: usize = 2;
/// Highest power level of the i.MX power domain topology.
pub const MAX_POWER_LEVEL: usize = SYSTEM_POWER_LEVEL;

/// Platform-specific power state interface
///
/// The platform has to provide a platform-specific power state type which implements this trait
/// and all of the dependent traits.
///
/// The type has to implement the `Ord` trait in a way the states are in ascending order from
/// running state to power down state.
pub trait PlatformPowerStateInterface:
    Debug + Clone + Copy + PartialEq + Ord + Into<usize>
{
    /// The deepest power down state.
    const OFF: Self;
    /// The running state.
    const RUN: Self;

    /// Returns the type of the platform-specific power state.
    fn power_state_type(&self) -> PowerStateType;

    /// Returns whether the state powers the domain down.
    fn is_off(&self) -> bool {
        self.power_state_type() == PowerStateType::PowerDown
    }

    /// Returns whether the state keeps the domain running.
    fn is_run(&self) -> bool {
        self.power_state_type() == PowerStateType::Run
    }
}

/// The kind of a platform power state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerStateType {
    /// The domain is powered down and loses its context.
    PowerDown,
    /// The domain is clock gated or in retention, and keeps its context.
    StandbyOrRetention,
    /// The domain is running.
    Run,
}

/// Object for storing platform-specific power state for multiple power levels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PsciCompositePowerState<S> {
    /// The state of each power level, indexed by [`CPU_POWER_LEVEL`], [`CLUSTER_POWER_LEVEL`] and
    /// [`SYSTEM_POWER_LEVEL`].
    pub states: [S; MAX_POWER_LEVEL + 1],
}

impl<S: PlatformPowerStateInterface> PsciCompositePowerState<S> {
    /// States set to OFF on all levels.
    pub const OFF: Self = Self {
        states: [S::OFF; MAX_POWER_LEVEL + 1],
    };

    /// States set to RUN on all levels.
    pub const RUN: Self = Self {
        states: [S::RUN; MAX_POWER_LEVEL + 1],
    };

    /// Creates a composite state from the states of the core, cluster and system levels.
    pub const fn new(states: [S; MAX_POWER_LEVEL + 1]) -> Self {
        Self { states }
    }

    /// Returns the power state of the CPU level.
    pub fn cpu_level_state(&self) -> S {
        self.states[CPU_POWER_LEVEL]
    }

    /// Returns the power state of the cluster level.
    pub fn cluster_level_state(&self) -> S {
        self.states[CLUSTER_POWER_LEVEL]
    }

    /// Returns the power state of the highest level of the topology.
    pub fn highest_level_state(&self) -> S {
        self.states[MAX_POWER_LEVEL]
    }

    /// Find the highest power level which is not set to running state.
    pub fn find_highest_non_run_level(&self) -> Option<usize> {
        self.states
            .iter()
            .rposition(|state| state.power_state_type() != PowerStateType::Run)
    }

    /// Find the highest power level which is set to power down state.
    pub fn find_highest_power_down_level(&self) -> Option<usize> {
        self.states
            .iter()
            .rposition(|state| state.power_state_type() == PowerStateType::PowerDown)
    }

    /// Checks that no level is shallower than the level above it, i.e. that a domain is never
    /// asked to be in a deeper state than its children.
    pub fn is_ordered(&self) -> bool {
        self.states.windows(2).all(|pair| pair[0] >= pair[1])
    }
}

/// PSCI platform interface
///
/// The generic PSCI implementation calls these functions on the core which is changing state, after
/// having worked out the target state of every power level. Only the last core to go down in a
/// domain gets a non-RUN state for that domain's level.
pub trait PsciPlatformInterface {
    /// Platform-specific power state type
    type PlatformPowerState: PlatformPowerStateInterface;

    /// Tries to convert a PSCI power state value into a `PsciCompositePowerState`.
    ///
    /// Returns `None` if the power state is not supported by the platform.
    fn try_parse_power_state(
        power_state: PowerState,
    ) -> Option<PsciCompositePowerState<Self::PlatformPowerState>>;

    /// Validates a non-secure entry point, optional.
    fn is_valid_ns_entrypoint(&self, _entry: &EntryPoint) -> bool {
        true
    }

    /// Places the current CPU into standby state and continues execution on interrupt.
    /// The caller has to guarantee that `cpu_state` is a standby power state, otherwise
    /// `cpu_standby` should panic.
    fn cpu_standby(&self, cpu_state: Self::PlatformPowerState);

    /// Turn on power domain, which is identified by its MPIDR.
    fn power_domain_on(&self, mpidr: Mpidr) -> Result<(), ErrorCode>;

    /// Perform platform-specific actions after the CPU has been turned on.
    fn power_domain_on_finish(
        &self,
        previous_state: &PsciCompositePowerState<Self::PlatformPowerState>,
    ) -> Result<(), ErrorCode>;

    /// Perform platform-specific actions to turn this cpu off e.g. program the power controller.
    fn power_domain_off(
        &self,
        target_state: &PsciCompositePowerState<Self::PlatformPowerState>,
    ) -> Result<(), ErrorCode>;

    /// Performs the necessary actions to suspend this cpu and any higher levels which are not
    /// staying at RUN.
    ///
    /// On error every level is left running, and `power_domain_suspend_finish` must not be called.
    fn power_domain_suspend(
        &self,
        target_state: &PsciCompositePowerState<Self::PlatformPowerState>,
    ) -> Result<(), ErrorCode>;

    /// Performs platform-specific operations after a wake-up from standby/retention states.
    ///
    /// This is also called when the suspend was aborted by a wakeup before the power domains
    /// actually went down, so it must not assume that they did.
    fn power_domain_suspend_finish(
        &self,
        previous_state: &PsciCompositePowerState<Self::PlatformPowerState>,
    ) -> Result<(), ErrorCode>;

    /// Platform-specific function for entering WFI on power down, optional.
    fn power_domain_power_down_wfi(
        &self,
        _target_state: &PsciCompositePowerState<Self::PlatformPowerState>,
    ) -> ! {
        dsb_sy();
        loop {
            wfi();
        }
    }

    /// Returns the power state for `SYSTEM_SUSPEND`.
    fn sys_suspend_power_state(&self) -> PsciCompositePowerState<Self::PlatformPowerState>;

    /// Shuts down the system.
    fn system_off(&self) -> !;

    /// Resets the system, the behavior is equivalent to a hardware power-cycle sequence.
    fn system_reset(&self) -> !;

    /// Architectural or vendor specific reset.
    ///
    /// Returns an error without touching the hardware if the reset type is not supported.
    /// Otherwise it does not return.
    fn system_reset2(&self, reset_type: ResetType, cookie: Cookie) -> Result<(), ErrorCode>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
    enum State {
        Run,
        Retention,
        Off,
    }

    impl PlatformPowerStateInterface for State {
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

    impl From<State> for usize {
        fn from(value: State) -> Self {
            value as usize
        }
    }

    #[test]
    fn highest_levels() {
        let state = PsciCompositePowerState::new([State::Off, State::Retention, State::Run]);
        assert_eq!(state.find_highest_non_run_level(), Some(CLUSTER_POWER_LEVEL));
        assert_eq!(state.find_highest_power_down_level(), Some(CPU_POWER_LEVEL));
        assert_eq!(state.cluster_level_state(), State::Retention);
        assert_eq!(state.highest_level_state(), State::Run);

        assert_eq!(PsciCompositePowerState::<State>::RUN.find_highest_non_run_level(), None);
        assert_eq!(
            PsciCompositePowerState::<State>::OFF.find_highest_power_down_level(),
            Some(SYSTEM_POWER_LEVEL)
        );
    }

    #[test]
    fn ordering() {
        assert!(PsciCompositePowerState::new([State::Off, State::Retention, State::Run]).is_ordered());
        assert!(!PsciCompositePowerState::new([State::Retention, State::Off, State::Run]).is_ordered());
        assert!(!PsciCompositePowerState::new([State::Run, State::Run, State::Off]).is_ordered());
    }
}
