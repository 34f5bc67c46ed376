use shared::ControllerState;

use crate::{silprintln, MissionCtl};

use super::FsmState;

/// Down. Keeps announcing the position on both links until someone
/// picks the payload up.
pub struct Landed;

impl<'a, const N: usize> ControllerState<FsmState, MissionCtl<'a, N>> for Landed {
    fn update(&mut self, ctl: &mut MissionCtl<N>) -> Option<FsmState> {
        ctl.effects.transmit_record = true;
        ctl.effects.ensure_cellular = true;
        ctl.effects.transmit_cellular = true;

        None
    }

    fn enter_state(&mut self, _ctl: &mut MissionCtl<N>) {
        silprintln!("FSM: landed");
    }

    fn exit_state(&mut self, _ctl: &mut MissionCtl<N>) {
        // Nothing
    }
}

impl Landed {
    pub fn new() -> FsmState {
        FsmState::Landed(Self {})
    }
}
