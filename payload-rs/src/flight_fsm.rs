use shared::{payload_hal::FlightMode, ControllerFsm, ControllerState};

use crate::MissionCtl;

mod ascent;
mod ascent_monitored;
mod ascent_timeout;
mod descent_burst;
mod descent_pyro;
mod descent_recovery;
mod landed;
mod prelaunch;
mod prelaunch_gps;

pub use ascent::Ascent;
pub use ascent_monitored::AscentMonitored;
pub use ascent_timeout::AscentTimeout;
pub use descent_burst::DescentBurst;
pub use descent_pyro::DescentPyro;
pub use descent_recovery::DescentRecovery;
pub use landed::Landed;
pub use prelaunch::Prelaunch;
pub use prelaunch_gps::PrelaunchGps;

pub enum FsmState {
    Prelaunch(Prelaunch),
    PrelaunchGps(PrelaunchGps),
    Ascent(Ascent),
    AscentMonitored(AscentMonitored),
    AscentTimeout(AscentTimeout),
    DescentBurst(DescentBurst),
    DescentPyro(DescentPyro),
    DescentRecovery(DescentRecovery),
    Landed(Landed),
}

impl FsmState {
    /// Resumes the machine from a persisted mode byte. Modes that never
    /// reach the state machine (command mode, or an error byte from a
    /// blank part) restart the flight logic from prelaunch.
    pub fn from_mode(mode: FlightMode) -> FsmState {
        match mode {
            FlightMode::Ascent => Ascent::new(),
            FlightMode::AscentMonitored => AscentMonitored::new(),
            FlightMode::AscentTimeout => AscentTimeout::new(),
            FlightMode::DescentBurst => DescentBurst::new(),
            FlightMode::DescentPyro => DescentPyro::new(),
            FlightMode::DescentRecovery => DescentRecovery::new(),
            FlightMode::Landed => Landed::new(),
            FlightMode::PrelaunchGps => PrelaunchGps::new(),
            FlightMode::Prelaunch
            | FlightMode::GroundCommand
            | FlightMode::Error => Prelaunch::new(),
        }
    }
}

impl<'a, const RECORDS_PER_BANK: usize>
    ControllerFsm<FsmState, MissionCtl<'a, RECORDS_PER_BANK>, FlightMode> for FsmState
{
    fn to_controller_state(
        &mut self,
    ) -> &mut dyn ControllerState<FsmState, MissionCtl<'a, RECORDS_PER_BANK>> {
        match self {
            FsmState::Prelaunch(state) => state,
            FsmState::PrelaunchGps(state) => state,
            FsmState::Ascent(state) => state,
            FsmState::AscentMonitored(state) => state,
            FsmState::AscentTimeout(state) => state,
            FsmState::DescentBurst(state) => state,
            FsmState::DescentPyro(state) => state,
            FsmState::DescentRecovery(state) => state,
            FsmState::Landed(state) => state,
        }
    }

    fn hal_state(&self) -> FlightMode {
        match self {
            FsmState::Prelaunch(_) => FlightMode::Prelaunch,
            FsmState::PrelaunchGps(_) => FlightMode::PrelaunchGps,
            FsmState::Ascent(_) => FlightMode::Ascent,
            FsmState::AscentMonitored(_) => FlightMode::AscentMonitored,
            FsmState::AscentTimeout(_) => FlightMode::AscentTimeout,
            FsmState::DescentBurst(_) => FlightMode::DescentBurst,
            FsmState::DescentPyro(_) => FlightMode::DescentPyro,
            FsmState::DescentRecovery(_) => FlightMode::DescentRecovery,
            FsmState::Landed(_) => FlightMode::Landed,
        }
    }
}
