use shared::ControllerState;

use crate::{silprintln, MissionCtl};

use super::{ascent::Ascent, prelaunch::Prelaunch, FsmState};

/// On the ground with a GPS lock. The only state allowed to move the
/// mission backward: losing the lock drops back to plain prelaunch.
pub struct PrelaunchGps;

impl<'a, const N: usize> ControllerState<FsmState, MissionCtl<'a, N>> for PrelaunchGps {
    fn update(&mut self, ctl: &mut MissionCtl<N>) -> Option<FsmState> {
        if !ctl.current.status.moving {
            if !ctl.current.status.gps_lock {
                return Some(Prelaunch::new());
            }
            return None;
        }

        if ctl.current.status.ascending {
            return Some(Ascent::new());
        }

        None
    }

    fn enter_state(&mut self, _ctl: &mut MissionCtl<N>) {
        silprintln!("FSM: prelaunch, GPS locked");
    }

    fn exit_state(&mut self, _ctl: &mut MissionCtl<N>) {
        // Nothing
    }
}

impl PrelaunchGps {
    pub fn new() -> FsmState {
        FsmState::PrelaunchGps(Self {})
    }
}
