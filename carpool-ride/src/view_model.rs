use carpool_core::search::MAX_SEATS_PER_REQUEST;
use carpool_core::{
    Actor, GatewayError, GatewayResult, RideEvent, RideGateway, RideSnapshot, RideView, Role,
};
use carpool_shared::{Ride, RideId, RideStatus, Seat, SeatId, SeatStatus};
use std::sync::Arc;

use crate::lifecycle::RideLifecycle;

/// Seats of one ride split by status, each group in seat-number order
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeatGroups<'a> {
    pub free: Vec<&'a Seat>,
    pub pending: Vec<&'a Seat>,
    pub taken: Vec<&'a Seat>,
}

impl<'a> SeatGroups<'a> {
    pub fn of(ride: &'a Ride) -> Self {
        let mut groups = Self::default();
        for seat in &ride.seats {
            match seat.status() {
                SeatStatus::Free => groups.free.push(seat),
                SeatStatus::Pending => groups.pending.push(seat),
                SeatStatus::Taken => groups.taken.push(seat),
            }
        }
        groups
    }
}

/// Holds the last fetched snapshot of one ride for one actor.
///
/// The snapshot is only ever replaced by a fetch. Every mutation goes to the gateway and,
/// when it succeeds, is followed by exactly one re-fetch; nothing is patched locally.
pub struct RideViewModel {
    gateway: Arc<dyn RideGateway>,
    ride_id: RideId,
    view: RideView,
    actor: Actor,
    snapshot: Option<RideSnapshot>,
    fetch_count: u64,
}

impl RideViewModel {
    pub fn new(
        gateway: Arc<dyn RideGateway>,
        ride_id: RideId,
        view: RideView,
        actor: Actor,
    ) -> Self {
        Self {
            gateway,
            ride_id,
            view,
            actor,
            snapshot: None,
            fetch_count: 0,
        }
    }

    /// Fetch the ride and replace the held snapshot.
    ///
    /// On failure the previous snapshot, if any, stays in place.
    pub async fn load_ride(&mut self) -> GatewayResult<&Ride> {
        tracing::debug!("Loading ride {} for {:?}", self.ride_id, self.actor);
        let fetched = self.gateway.fetch_ride(&self.ride_id, self.view, &self.actor).await;
        match fetched {
            Ok(snapshot) => {
                self.fetch_count += 1;
                tracing::debug!(
                    "Ride {} is {} with {} seats available",
                    self.ride_id,
                    snapshot.ride.status,
                    snapshot.ride.available_seats
                );
                Ok(&self.snapshot.insert(snapshot).ride)
            }
            Err(e) => {
                tracing::warn!("Failed to load ride {}: {}", self.ride_id, e);
                Err(e)
            }
        }
    }

    pub fn ride_id(&self) -> &RideId {
        &self.ride_id
    }

    pub fn actor(&self) -> &Actor {
        &self.actor
    }

    pub fn ride(&self) -> Option<&Ride> {
        self.snapshot.as_ref().map(|snapshot| &snapshot.ride)
    }

    pub fn snapshot(&self) -> Option<&RideSnapshot> {
        self.snapshot.as_ref()
    }

    /// Successful fetches so far
    pub fn fetch_count(&self) -> u64 {
        self.fetch_count
    }

    // ------------------------------------------------------------------
    // Projections
    // ------------------------------------------------------------------

    pub fn seats_by_status(&self) -> SeatGroups<'_> {
        self.ride().map(SeatGroups::of).unwrap_or_default()
    }

    pub fn is_owned_by_actor(&self, actor_email: &str) -> bool {
        self.ride().is_some_and(|ride| ride.is_driven_by(actor_email))
    }

    pub fn has_actor_requested_any_seat(&self, actor_email: &str) -> bool {
        self.ride()
            .is_some_and(|ride| ride.seats.iter().any(|seat| seat.is_held_by(actor_email)))
    }

    /// Removal is closed once the ride is underway or finished
    pub fn can_remove_seat(&self, _seat: &Seat) -> bool {
        self.ride()
            .is_some_and(|ride| !ride.status.is_underway_or_finished())
    }

    /// As reported by the last fetch
    pub fn available_seats(&self) -> Option<u32> {
        self.ride().map(|ride| ride.available_seats)
    }

    /// The actor's side of this ride. The backend's `is_driver` flag wins when present.
    pub fn role(&self) -> Option<Role> {
        let snapshot = self.snapshot.as_ref()?;
        let is_driver = match snapshot.is_driver {
            Some(flag) => flag,
            None => self.actor.is(&snapshot.ride.driver_email),
        };
        Some(if is_driver { Role::Driver } else { Role::Passenger })
    }

    fn offers(&self, event: RideEvent) -> bool {
        match (self.ride(), self.role()) {
            (Some(ride), Some(role)) => RideLifecycle::is_offered(ride, event, role),
            _ => false,
        }
    }

    pub fn can_cancel(&self) -> bool {
        self.offers(RideEvent::Cancel)
    }

    pub fn can_confirm(&self) -> bool {
        self.offers(RideEvent::Confirm)
    }

    pub fn can_start(&self) -> bool {
        self.offers(RideEvent::Start)
    }

    pub fn can_complete(&self) -> bool {
        self.offers(RideEvent::Complete)
    }

    pub fn offered_events(&self) -> Vec<RideEvent> {
        match (self.ride(), self.role()) {
            (Some(ride), Some(role)) => RideLifecycle::offered_events(ride, role),
            _ => Vec::new(),
        }
    }

    pub fn can_accept_seat(&self, seat: &Seat) -> bool {
        self.role() == Some(Role::Driver)
            && seat.status() == SeatStatus::Pending
            && self.ride().is_some_and(|ride| {
                matches!(ride.status, RideStatus::Awaiting | RideStatus::Confirmed)
            })
    }

    /// Whether the actor may ask for `count` more seats on this ride
    pub fn can_request_seats(&self, count: u32) -> bool {
        let Some(ride) = self.ride() else {
            return false;
        };
        let Ok(email) = self.actor.email() else {
            return false;
        };

        ride.status == RideStatus::Awaiting
            && self.role() == Some(Role::Passenger)
            && !self.has_actor_requested_any_seat(email)
            && (1..=MAX_SEATS_PER_REQUEST).contains(&count)
            && count <= ride.available_seats
    }

    pub fn can_leave_ride(&self) -> bool {
        let Ok(email) = self.actor.email() else {
            return false;
        };
        self.ride().is_some_and(|ride| {
            ride.status != RideStatus::Cancelled && !ride.status.is_underway_or_finished()
        }) && self.has_actor_requested_any_seat(email)
    }

    // ------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------

    pub async fn confirm(&mut self) -> GatewayResult<()> {
        self.apply(RideEvent::Confirm).await
    }

    pub async fn start(&mut self) -> GatewayResult<()> {
        self.apply(RideEvent::Start).await
    }

    pub async fn complete(&mut self) -> GatewayResult<()> {
        self.apply(RideEvent::Complete).await
    }

    pub async fn cancel(&mut self) -> GatewayResult<()> {
        self.apply(RideEvent::Cancel).await
    }

    pub async fn request_seats(&mut self, count: u32) -> GatewayResult<()> {
        let result = self.gateway.request_seats(&self.ride_id, count, &self.actor).await;
        self.refresh_after("request seats", result).await
    }

    pub async fn accept_seat(&mut self, seat_id: &SeatId) -> GatewayResult<()> {
        let result = self.gateway.accept_seat(&self.ride_id, seat_id, &self.actor).await;
        self.refresh_after("accept seat", result).await
    }

    /// Decline a pending request or remove a passenger from a taken seat
    pub async fn remove_seat(&mut self, seat_id: &SeatId) -> GatewayResult<()> {
        let result = self.gateway.remove_seat(&self.ride_id, seat_id, &self.actor).await;
        self.refresh_after("remove seat", result).await
    }

    pub async fn decline_seat(&mut self, seat_id: &SeatId) -> GatewayResult<()> {
        self.remove_seat(seat_id).await
    }

    pub async fn leave_ride(&mut self) -> GatewayResult<()> {
        let result = self.gateway.leave_ride(&self.ride_id, &self.actor).await;
        self.refresh_after("leave ride", result).await
    }

    async fn apply(&mut self, event: RideEvent) -> GatewayResult<()> {
        let result = self.gateway.apply_ride_event(&self.ride_id, event, &self.actor).await;
        self.refresh_after(&event.to_string(), result).await
    }

    async fn refresh_after(
        &mut self,
        action: &str,
        result: GatewayResult<()>,
    ) -> GatewayResult<()> {
        if let Err(e) = result {
            log_rejection(&self.ride_id, action, &e);
            return Err(e);
        }
        tracing::info!("{} on ride {} succeeded", action, self.ride_id);
        self.load_ride().await.map(|_| ())
    }
}

fn log_rejection(ride_id: &RideId, action: &str, error: &GatewayError) {
    match error {
        GatewayError::Business(detail) => {
            tracing::info!("Backend rejected {} on ride {}: {}", action, ride_id, detail)
        }
        other => tracing::warn!("{} on ride {} failed: {}", action, ride_id, other),
    }
}
