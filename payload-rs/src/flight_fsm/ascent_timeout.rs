use shared::ControllerState;

use crate::{silprintln, MissionCtl};

use super::{descent_pyro::DescentPyro, FsmState};

/// The mission clock ran out while still airborne. Pass-through: cut
/// away and descend regardless of what the altitude says.
pub struct AscentTimeout;

impl<'a, const N: usize> ControllerState<FsmState, MissionCtl<'a, N>> for AscentTimeout {
    fn update(&mut self, ctl: &mut MissionCtl<N>) -> Option<FsmState> {
        ctl.effects.deploy_recovery = true;
        Some(DescentPyro::new())
    }

    fn enter_state(&mut self, _ctl: &mut MissionCtl<N>) {
        silprintln!("FSM: ascent timeout, deploying");
    }

    fn exit_state(&mut self, _ctl: &mut MissionCtl<N>) {
        // Nothing
    }
}

impl AscentTimeout {
    pub fn new() -> FsmState {
        FsmState::AscentTimeout(Self {})
    }
}
