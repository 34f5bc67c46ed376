use shared::ControllerState;

use crate::{silprintln, MissionCtl};

use super::{ascent::Ascent, prelaunch_gps::PrelaunchGps, FsmState};

/// On the ground, waiting for a GPS lock or for launch.
pub struct Prelaunch;

impl<'a, const N: usize> ControllerState<FsmState, MissionCtl<'a, N>> for Prelaunch {
    fn update(&mut self, ctl: &mut MissionCtl<N>) -> Option<FsmState> {
        if !ctl.current.status.moving {
            // Not moving; a lock is all that can change here.
            if ctl.current.status.gps_lock {
                return Some(PrelaunchGps::new());
            }
            return None;
        }

        // Moving implies a lock; with ascent that means launch.
        if ctl.current.status.ascending {
            return Some(Ascent::new());
        }

        None
    }

    fn enter_state(&mut self, _ctl: &mut MissionCtl<N>) {
        silprintln!("FSM: prelaunch");
    }

    fn exit_state(&mut self, _ctl: &mut MissionCtl<N>) {
        // Nothing
    }
}

impl Prelaunch {
    pub fn new() -> FsmState {
        FsmState::Prelaunch(Self {})
    }
}
