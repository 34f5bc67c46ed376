use shared::ControllerState;

use crate::{silprintln, MissionCtl};

use super::{landed::Landed, FsmState};

/// Below the recovery altitude, announcing position on both links.
/// Radio goes out first; the modem boot takes too long to be allowed
/// to delay it.
pub struct DescentRecovery;

impl<'a, const N: usize> ControllerState<FsmState, MissionCtl<'a, N>> for DescentRecovery {
    fn update(&mut self, ctl: &mut MissionCtl<N>) -> Option<FsmState> {
        ctl.effects.transmit_record = true;
        ctl.effects.ensure_cellular = true;
        ctl.effects.transmit_cellular = true;

        if !ctl.current.status.moving {
            // Landing is worth persisting before any slow transmission.
            ctl.effects.persist_config_early = true;
            return Some(Landed::new());
        }

        None
    }

    fn enter_state(&mut self, _ctl: &mut MissionCtl<N>) {
        silprintln!("FSM: recovery descent");
    }

    fn exit_state(&mut self, _ctl: &mut MissionCtl<N>) {
        // Nothing
    }
}

impl DescentRecovery {
    pub fn new() -> FsmState {
        FsmState::DescentRecovery(Self {})
    }
}
