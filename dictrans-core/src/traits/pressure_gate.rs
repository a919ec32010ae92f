use crate::models::PressureLevel;

/// Current memory pressure, consulted before a translation call starts.
pub trait IPressureGate: Send + Sync {
    fn current_level(&self) -> PressureLevel;
}
