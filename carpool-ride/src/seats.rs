use carpool_core::{Role, SeatEvent};
use carpool_shared::{Seat, SeatOccupancy};

use crate::TransitionError;

/// Per-seat reservation transitions.
///
/// | From    | Event           | To      | Actor                 |
/// |---------|-----------------|---------|-----------------------|
/// | free    | request         | pending | passenger             |
/// | pending | accept          | taken   | driver                |
/// | pending | decline         | free    | driver                |
/// | taken   | remove          | free    | driver                |
/// | pending | passenger_cancel| free    | owning passenger      |
/// | taken   | passenger_cancel| free    | owning passenger      |
pub struct SeatMachine;

impl SeatMachine {
    pub fn permitted_role(event: SeatEvent) -> Role {
        match event {
            SeatEvent::Request | SeatEvent::PassengerCancel => Role::Passenger,
            SeatEvent::Accept | SeatEvent::Decline | SeatEvent::Remove => Role::Driver,
        }
    }

    /// Occupancy after `actor_email`, acting as `role`, fires `event` on `seat`
    pub fn transition(
        seat: &Seat,
        event: SeatEvent,
        actor_email: &str,
        role: Role,
    ) -> Result<SeatOccupancy, TransitionError> {
        let required = Self::permitted_role(event);
        if role != required {
            return Err(TransitionError::NotPermitted {
                required,
                action: format!("{event} seat {}", seat.seat_number),
            });
        }

        let invalid = || TransitionError::InvalidSeatTransition {
            from: seat.status(),
            event,
        };

        match (&seat.occupancy, event) {
            (SeatOccupancy::Free, SeatEvent::Request) => Ok(SeatOccupancy::Pending {
                passenger_email: actor_email.to_string(),
            }),
            (SeatOccupancy::Pending { passenger_email }, SeatEvent::Accept) => {
                Ok(SeatOccupancy::Taken {
                    passenger_email: passenger_email.clone(),
                })
            }
            (SeatOccupancy::Pending { .. }, SeatEvent::Decline)
            | (SeatOccupancy::Taken { .. }, SeatEvent::Remove) => Ok(SeatOccupancy::Free),
            (
                SeatOccupancy::Pending { passenger_email }
                | SeatOccupancy::Taken { passenger_email },
                SeatEvent::PassengerCancel,
            ) => {
                if passenger_email == actor_email {
                    Ok(SeatOccupancy::Free)
                } else {
                    Err(TransitionError::NotSeatOwner)
                }
            }
            _ => Err(invalid()),
        }
    }

    /// Driver-side removal: declines a pending request or removes a taken seat
    pub fn removal_event(seat: &Seat) -> Option<SeatEvent> {
        match seat.occupancy {
            SeatOccupancy::Free => None,
            SeatOccupancy::Pending { .. } => Some(SeatEvent::Decline),
            SeatOccupancy::Taken { .. } => Some(SeatEvent::Remove),
        }
    }
}
