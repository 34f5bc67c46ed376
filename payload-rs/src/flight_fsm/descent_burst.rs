use shared::ControllerState;

use crate::{silprintln, MissionCtl};

use super::{descent_pyro::DescentPyro, FsmState};

/// The envelope has burst. Pass-through: request the pyro and move on.
pub struct DescentBurst;

impl<'a, const N: usize> ControllerState<FsmState, MissionCtl<'a, N>> for DescentBurst {
    fn update(&mut self, ctl: &mut MissionCtl<N>) -> Option<FsmState> {
        ctl.effects.deploy_recovery = true;
        Some(DescentPyro::new())
    }

    fn enter_state(&mut self, _ctl: &mut MissionCtl<N>) {
        silprintln!("FSM: burst detected, deploying");
    }

    fn exit_state(&mut self, _ctl: &mut MissionCtl<N>) {
        // Nothing
    }
}

impl DescentBurst {
    pub fn new() -> FsmState {
        FsmState::DescentBurst(Self {})
    }
}
