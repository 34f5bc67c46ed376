use shared::ControllerState;

use crate::{history::HistoryVerdict, silprintln, MissionCtl};

use super::{ascent_timeout::AscentTimeout, descent_burst::DescentBurst, FsmState};

/// Above the monitoring altitude, reading the altitude history back
/// from storage every cycle to catch the burst.
pub struct AscentMonitored;

impl<'a, const N: usize> ControllerState<FsmState, MissionCtl<'a, N>> for AscentMonitored {
    fn update(&mut self, ctl: &mut MissionCtl<N>) -> Option<FsmState> {
        match ctl.history_verdict() {
            HistoryVerdict::BurstDetected => Some(DescentBurst::new()),
            HistoryVerdict::Timeout => Some(AscentTimeout::new()),
            HistoryVerdict::InsufficientHistory | HistoryVerdict::Continue => None,
        }
    }

    fn enter_state(&mut self, _ctl: &mut MissionCtl<N>) {
        silprintln!("FSM: ascent, monitoring for burst");
    }

    fn exit_state(&mut self, _ctl: &mut MissionCtl<N>) {
        // Nothing
    }
}

impl AscentMonitored {
    pub fn new() -> FsmState {
        FsmState::AscentMonitored(Self {})
    }
}
