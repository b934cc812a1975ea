use carpool_core::{RideEvent, Role};
use carpool_shared::{Ride, RideStatus};

use crate::TransitionError;

/// Ride status transitions and who may trigger them.
///
/// ```text
/// awaiting --confirm--> confirmed --start--> active --complete--> complete
///     |                     |
///     +------cancel---------+-----> cancelled
/// ```
pub struct RideLifecycle;

impl RideLifecycle {
    /// Target status for `event` fired in `from`, or `None` when the table has no such edge
    pub fn next_status(from: RideStatus, event: RideEvent) -> Option<RideStatus> {
        match (from, event) {
            (RideStatus::Awaiting, RideEvent::Confirm) => Some(RideStatus::Confirmed),
            (RideStatus::Awaiting, RideEvent::Cancel) => Some(RideStatus::Cancelled),
            (RideStatus::Confirmed, RideEvent::Cancel) => Some(RideStatus::Cancelled),
            (RideStatus::Confirmed, RideEvent::Start) => Some(RideStatus::Active),
            (RideStatus::Active, RideEvent::Complete) => Some(RideStatus::Complete),
            _ => None,
        }
    }

    /// Every lifecycle event belongs to the driver
    pub fn permitted_role(_event: RideEvent) -> Role {
        Role::Driver
    }

    /// Check `event` against the table, the role and the event's precondition
    pub fn transition(
        ride: &Ride,
        event: RideEvent,
        role: Role,
    ) -> Result<RideStatus, TransitionError> {
        let required = Self::permitted_role(event);
        if role != required {
            return Err(TransitionError::NotPermitted {
                required,
                action: format!("{event} a ride"),
            });
        }

        let next = Self::next_status(ride.status, event).ok_or(TransitionError::InvalidTransition {
            from: ride.status,
            event,
        })?;

        // Confirm: at least one seat must be taken
        if event == RideEvent::Confirm && !ride.has_taken_seat() {
            return Err(TransitionError::PreconditionFailed(
                "A ride needs at least one accepted passenger before it can be confirmed"
                    .to_string(),
            ));
        }

        Ok(next)
    }

    /// Whether a control for `event` should be offered to `role`
    pub fn is_offered(ride: &Ride, event: RideEvent, role: Role) -> bool {
        Self::transition(ride, event, role).is_ok()
    }

    pub fn offered_events(ride: &Ride, role: Role) -> Vec<RideEvent> {
        RideEvent::ALL
            .into_iter()
            .filter(|event| Self::is_offered(ride, *event, role))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::new_ride;
    use carpool_shared::SeatOccupancy;

    const STATUSES: [RideStatus; 5] = [
        RideStatus::Awaiting,
        RideStatus::Confirmed,
        RideStatus::Active,
        RideStatus::Cancelled,
        RideStatus::Complete,
    ];

    fn ride_with_taken_seat(status: RideStatus) -> Ride {
        let mut ride = new_ride("R1", "driver@example.com", 2);
        ride.seats[0].occupancy = SeatOccupancy::Taken {
            passenger_email: "p1@example.com".to_string(),
        };
        ride.status = status;
        ride
    }

    #[test]
    fn test_ride_lifecycle() {
        let mut ride = ride_with_taken_seat(RideStatus::Awaiting);

        for (event, expected) in [
            (RideEvent::Confirm, RideStatus::Confirmed),
            (RideEvent::Start, RideStatus::Active),
            (RideEvent::Complete, RideStatus::Complete),
        ] {
            ride.status = RideLifecycle::transition(&ride, event, Role::Driver).unwrap();
            assert_eq!(ride.status, expected);
        }
    }

    #[test]
    fn test_cancel_only_from_awaiting_or_confirmed() {
        for status in STATUSES {
            let ride = ride_with_taken_seat(status);
            let result = RideLifecycle::transition(&ride, RideEvent::Cancel, Role::Driver);
            match status {
                RideStatus::Awaiting | RideStatus::Confirmed => {
                    assert_eq!(result, Ok(RideStatus::Cancelled))
                }
                _ => assert!(matches!(result, Err(TransitionError::InvalidTransition { .. }))),
            }
        }
    }

    #[test]
    fn test_confirm_requires_taken_seat() {
        let mut ride = new_ride("R1", "driver@example.com", 2);
        ride.seats[0].occupancy = SeatOccupancy::Pending {
            passenger_email: "p1@example.com".to_string(),
        };

        let result = RideLifecycle::transition(&ride, RideEvent::Confirm, Role::Driver);
        assert!(matches!(result, Err(TransitionError::PreconditionFailed(_))));
        assert!(!RideLifecycle::is_offered(&ride, RideEvent::Confirm, Role::Driver));
    }

    #[test]
    fn test_confirm_is_offered_only_in_awaiting_with_taken_seat() {
        for status in STATUSES {
            let ride = ride_with_taken_seat(status);
            assert_eq!(
                RideLifecycle::is_offered(&ride, RideEvent::Confirm, Role::Driver),
                status == RideStatus::Awaiting
            );
        }
    }

    #[test]
    fn test_passenger_cannot_drive_lifecycle() {
        let ride = ride_with_taken_seat(RideStatus::Confirmed);
        for event in RideEvent::ALL {
            let result = RideLifecycle::transition(&ride, event, Role::Passenger);
            assert!(matches!(
                result,
                Err(TransitionError::NotPermitted { required: Role::Driver, .. })
            ));
        }
        assert!(RideLifecycle::offered_events(&ride, Role::Passenger).is_empty());
    }

    #[test]
    fn test_offered_events_for_driver() {
        let ride = ride_with_taken_seat(RideStatus::Confirmed);
        assert_eq!(
            RideLifecycle::offered_events(&ride, Role::Driver),
            vec![RideEvent::Cancel, RideEvent::Start]
        );

        let finished = ride_with_taken_seat(RideStatus::Complete);
        assert!(RideLifecycle::offered_events(&finished, Role::Driver).is_empty());
    }
}
