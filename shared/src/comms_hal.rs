use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommsError {
    LinkDown,
    ModemNotReady,
    SendFailure,
}

/// Short-range downlink. Takes a fully framed ASCII sentence; modulation
/// details live behind this trait and are not the core's concern.
pub trait TelemetryLink {
    fn transmit(&mut self, sentence: &[u8]) -> Result<(), CommsError>;
}

/// Cellular modem collaborator. Best effort; callers check readiness and
/// power the modem up before sending.
pub trait CellularLink {
    fn modem_ready(&mut self) -> bool;
    fn enable(&mut self);
    fn disable(&mut self);
    fn send_position(&mut self, message: &[u8]) -> Result<(), CommsError>;
}
