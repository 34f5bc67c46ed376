use shared::ControllerState;

use crate::{silprintln, MissionCtl};

use super::{descent_recovery::DescentRecovery, FsmState};

/// Falling under the parachute, balloon jettisoned.
pub struct DescentPyro;

impl<'a, const N: usize> ControllerState<FsmState, MissionCtl<'a, N>> for DescentPyro {
    fn update(&mut self, ctl: &mut MissionCtl<N>) -> Option<FsmState> {
        if ctl.current.altitude_m < ctl.params.recovery_altitude_m {
            return Some(DescentRecovery::new());
        }

        None
    }

    fn enter_state(&mut self, _ctl: &mut MissionCtl<N>) {
        silprintln!("FSM: descending under parachute");
    }

    fn exit_state(&mut self, _ctl: &mut MissionCtl<N>) {
        // Nothing
    }
}

impl DescentPyro {
    pub fn new() -> FsmState {
        FsmState::DescentPyro(Self {})
    }
}
