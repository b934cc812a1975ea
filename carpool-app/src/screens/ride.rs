use carpool_core::{Actor, GatewayResult, RideEvent, RideGateway, RideView, Role, SeatEvent};
use carpool_ride::presentation::{ride_status_style, seat_status_style, StatusStyle};
use carpool_ride::{RideViewModel, SeatGroups, SeatMachine};
use carpool_shared::{Masked, Ride, RideId, Seat, SeatId};
use std::sync::Arc;

use crate::screen::ScreenError;

/// Something the actor can press on a ride screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RideAction {
    Lifecycle(RideEvent),
    RequestSeats(u32),
    AcceptSeat(SeatId),
    DeclineSeat(SeatId),
    RemoveSeat(SeatId),
    LeaveRide,
}

/// Per-seat row on the driver's screen
#[derive(Debug, Clone, PartialEq)]
pub struct SeatControl {
    pub seat_id: SeatId,
    pub seat_number: u32,
    pub style: StatusStyle,
    pub passenger: Option<Masked<String>>,
    pub actions: Vec<RideAction>,
}

/// Ride detail screen, for either side of the ride.
///
/// Wraps a `RideViewModel`; every failure lands in `error` and the last snapshot stays on
/// screen.
pub struct RideScreen {
    view_model: RideViewModel,
    error: Option<String>,
}

impl RideScreen {
    pub fn driver(gateway: Arc<dyn RideGateway>, ride_id: RideId, actor: Actor) -> Self {
        Self::new(RideViewModel::new(gateway, ride_id, RideView::Driver, actor))
    }

    pub fn passenger(gateway: Arc<dyn RideGateway>, ride_id: RideId, actor: Actor) -> Self {
        Self::new(RideViewModel::new(gateway, ride_id, RideView::Passenger, actor))
    }

    fn new(view_model: RideViewModel) -> Self {
        Self {
            view_model,
            error: None,
        }
    }

    /// Screen focus: fetch the ride
    pub async fn open(&mut self) {
        let result = self.view_model.load_ride().await.map(|_| ());
        self.settle(result);
    }

    pub async fn perform(&mut self, action: RideAction) {
        tracing::debug!("Ride {}: {:?}", self.view_model.ride_id(), action);
        let view_model = &mut self.view_model;
        let result = match action {
            RideAction::Lifecycle(RideEvent::Confirm) => view_model.confirm().await,
            RideAction::Lifecycle(RideEvent::Start) => view_model.start().await,
            RideAction::Lifecycle(RideEvent::Complete) => view_model.complete().await,
            RideAction::Lifecycle(RideEvent::Cancel) => view_model.cancel().await,
            RideAction::RequestSeats(count) => view_model.request_seats(count).await,
            RideAction::AcceptSeat(seat_id) => view_model.accept_seat(&seat_id).await,
            RideAction::DeclineSeat(seat_id) => view_model.decline_seat(&seat_id).await,
            RideAction::RemoveSeat(seat_id) => view_model.remove_seat(&seat_id).await,
            RideAction::LeaveRide => view_model.leave_ride().await,
        };
        self.settle(result);
    }

    fn settle(&mut self, result: GatewayResult<()>) {
        self.error = result.err().map(|err| ScreenError::from(err).message());
    }

    pub fn ride(&self) -> Option<&Ride> {
        self.view_model.ride()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn view_model(&self) -> &RideViewModel {
        &self.view_model
    }

    pub fn status_style(&self) -> Option<StatusStyle> {
        self.ride().map(|ride| ride_status_style(ride.status))
    }

    pub fn seat_groups(&self) -> SeatGroups<'_> {
        self.view_model.seats_by_status()
    }

    /// Ride-level buttons, in display order
    pub fn ride_controls(&self) -> Vec<RideAction> {
        let vm = &self.view_model;
        let mut controls: Vec<RideAction> = vm
            .offered_events()
            .into_iter()
            .map(RideAction::Lifecycle)
            .collect();
        if vm.can_request_seats(1) {
            controls.push(RideAction::RequestSeats(1));
        }
        if vm.can_leave_ride() {
            controls.push(RideAction::LeaveRide);
        }
        controls
    }

    /// Seat rows with the buttons the driver may use on each
    pub fn seat_controls(&self) -> Vec<SeatControl> {
        let Some(ride) = self.ride() else {
            return Vec::new();
        };
        let is_driver = self.view_model.role() == Some(Role::Driver);

        ride.seats
            .iter()
            .map(|seat| SeatControl {
                seat_id: seat.seat_id.clone(),
                seat_number: seat.seat_number,
                style: seat_status_style(seat.status()),
                passenger: seat.passenger_email().map(|email| Masked(email.to_string())),
                actions: if is_driver { self.driver_seat_actions(seat) } else { Vec::new() },
            })
            .collect()
    }

    fn driver_seat_actions(&self, seat: &Seat) -> Vec<RideAction> {
        let mut actions = Vec::new();
        if self.view_model.can_accept_seat(seat) {
            actions.push(RideAction::AcceptSeat(seat.seat_id.clone()));
        }
        if self.view_model.can_remove_seat(seat) {
            match SeatMachine::removal_event(seat) {
                Some(SeatEvent::Decline) => {
                    actions.push(RideAction::DeclineSeat(seat.seat_id.clone()))
                }
                Some(_) => actions.push(RideAction::RemoveSeat(seat.seat_id.clone())),
                None => {}
            }
        }
        actions
    }
}
