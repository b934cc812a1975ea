use async_trait::async_trait;
use carpool_shared::{NewVehicle, Ride, RideId, RideSummary, SeatId, Vehicle};

use crate::events::RideEvent;
use crate::identity::Actor;
use crate::search::RideSearch;
use crate::GatewayResult;

/// Which detail endpoint a screen reads its ride from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RideView {
    Driver,
    Passenger,
}

/// A decoded ride-detail response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RideSnapshot {
    pub ride: Ride,
    /// Set by the backend on ride-detail responses when it knows the caller's role
    pub is_driver: Option<bool>,
}

/// Outbound port for the external ride backend.
///
/// Implementations issue exactly one request per call: no retries, no caching, no local
/// bookkeeping. Mutations return nothing useful; callers re-fetch.
#[async_trait]
pub trait RideGateway: Send + Sync {
    async fn fetch_ride(
        &self,
        ride_id: &RideId,
        view: RideView,
        actor: &Actor,
    ) -> GatewayResult<RideSnapshot>;

    /// Confirm, start, complete or cancel a ride (driver only)
    async fn apply_ride_event(
        &self,
        ride_id: &RideId,
        event: RideEvent,
        actor: &Actor,
    ) -> GatewayResult<()>;

    /// Ask for `count` seats. The backend picks which free seats to hold.
    async fn request_seats(&self, ride_id: &RideId, count: u32, actor: &Actor) -> GatewayResult<()>;

    async fn accept_seat(
        &self,
        ride_id: &RideId,
        seat_id: &SeatId,
        actor: &Actor,
    ) -> GatewayResult<()>;

    /// Decline a pending request or remove a taken seat (driver)
    async fn remove_seat(
        &self,
        ride_id: &RideId,
        seat_id: &SeatId,
        actor: &Actor,
    ) -> GatewayResult<()>;

    /// Passenger gives up every seat they hold on the ride
    async fn leave_ride(&self, ride_id: &RideId, actor: &Actor) -> GatewayResult<()>;

    async fn search_rides(
        &self,
        search: &RideSearch,
        actor: &Actor,
    ) -> GatewayResult<Vec<RideSummary>>;

    async fn passenger_rides(&self, actor: &Actor) -> GatewayResult<Vec<RideSummary>>;

    async fn cancelled_rides(&self, actor: &Actor) -> GatewayResult<Vec<RideSummary>>;

    async fn completed_rides(&self, actor: &Actor) -> GatewayResult<Vec<RideSummary>>;
}

/// Outbound port for the driver's vehicles
#[async_trait]
pub trait VehicleGateway: Send + Sync {
    async fn list_vehicles(&self, actor: &Actor) -> GatewayResult<Vec<Vehicle>>;

    async fn add_vehicle(&self, vehicle: &NewVehicle, actor: &Actor) -> GatewayResult<()>;
}
