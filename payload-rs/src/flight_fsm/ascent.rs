use shared::ControllerState;

use crate::{silprintln, MissionCtl};

use super::{ascent_monitored::AscentMonitored, FsmState};

/// Climbing through the lower atmosphere; burst watching only starts
/// above the monitoring altitude.
pub struct Ascent;

impl<'a, const N: usize> ControllerState<FsmState, MissionCtl<'a, N>> for Ascent {
    fn update(&mut self, ctl: &mut MissionCtl<N>) -> Option<FsmState> {
        if ctl.current.altitude_m > ctl.params.monitor_altitude_m {
            return Some(AscentMonitored::new());
        }

        None
    }

    fn enter_state(&mut self, _ctl: &mut MissionCtl<N>) {
        silprintln!("FSM: ascent");
    }

    fn exit_state(&mut self, _ctl: &mut MissionCtl<N>) {
        // Nothing
    }
}

impl Ascent {
    pub fn new() -> FsmState {
        FsmState::Ascent(Self {})
    }
}
