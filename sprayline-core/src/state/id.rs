//! State identifiers

use sprayline_protocol::SideId;

/// Which scripted sequence is active
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StateId {
    /// Parked, accepting commands
    Idle,
    /// Running the homing sequence
    Homing,
    /// Paint-all-sides sequencer between sides and coats
    Painting,
    /// One side pattern
    Side(SideId),
    /// Gun cleaning routine
    Cleaning,
    /// Pick-and-place
    Pnp,
    /// Carriage parked in front of the operator for tip inspection
    InspectTip,
    /// Paused from Idle
    Paused,
    /// Outputs off, waiting for the operator
    Error,
}

impl StateId {
    /// Name reported on the console
    pub fn name(self) -> &'static str {
        match self {
            StateId::Idle => "IDLE",
            StateId::Homing => "HOMING",
            StateId::Painting => "PAINTING",
            StateId::Side(SideId::One) => "PAINTING_SIDE_1",
            StateId::Side(SideId::Two) => "PAINTING_SIDE_2",
            StateId::Side(SideId::Three) => "PAINTING_SIDE_3",
            StateId::Side(SideId::Four) => "PAINTING_SIDE_4",
            StateId::Cleaning => "CLEANING",
            StateId::Pnp => "PNP",
            StateId::InspectTip => "INSPECT_TIP",
            StateId::Paused => "PAUSED",
            StateId::Error => "ERROR",
        }
    }

    /// A long operation owns the machine
    pub fn is_busy(self) -> bool {
        !matches!(self, StateId::Idle | StateId::Paused | StateId::Error)
    }
}
