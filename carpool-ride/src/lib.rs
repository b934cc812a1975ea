pub mod lifecycle;
pub mod mock;
pub mod presentation;
pub mod seats;
pub mod view_model;

pub use lifecycle::RideLifecycle;
pub use mock::InMemoryRideGateway;
pub use seats::SeatMachine;
pub use view_model::{RideViewModel, SeatGroups};

use carpool_core::{RideEvent, Role, SeatEvent};
use carpool_shared::{RideStatus, SeatStatus};

/// Why a ride or seat transition is not allowed.
///
/// The backend is the authority; these mirror its rules so screens only offer valid controls.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("Cannot {event} a ride that is {from}")]
    InvalidTransition {
        from: RideStatus,
        event: RideEvent,
    },

    #[error("Cannot {event} a seat that is {from}")]
    InvalidSeatTransition {
        from: SeatStatus,
        event: SeatEvent,
    },

    #[error("Only the {required} can {action}")]
    NotPermitted {
        required: Role,
        action: String,
    },

    #[error("{0}")]
    PreconditionFailed(String),

    #[error("Seat is not held by this passenger")]
    NotSeatOwner,
}
