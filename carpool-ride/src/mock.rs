use async_trait::async_trait;
use carpool_core::gateway::{RideGateway, RideSnapshot, RideView, VehicleGateway};
use carpool_core::{Actor, GatewayError, GatewayResult, RideEvent, RideSearch, Role, SeatEvent};
use carpool_shared::{
    NewVehicle, Ride, RideId, RideStatus, RideSummary, Seat, SeatId, SeatStatus, Vehicle,
};
use chrono::{TimeZone, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::lifecycle::RideLifecycle;
use crate::seats::SeatMachine;
use crate::TransitionError;

/// In-process stand-in for the ride backend.
///
/// Applies the same lifecycle and seat tables the real service enforces and reports
/// rejections as `GatewayError::Business`, so view-models and screens can be exercised
/// without a network.
pub struct InMemoryRideGateway {
    rides: Mutex<HashMap<RideId, Ride>>,
    vehicles: Mutex<HashMap<String, Vec<Vehicle>>>,
    requests: AtomicUsize,
    fail_next: Mutex<Option<GatewayError>>,
}

impl InMemoryRideGateway {
    pub fn new() -> Self {
        Self {
            rides: Mutex::new(HashMap::new()),
            vehicles: Mutex::new(HashMap::new()),
            requests: AtomicUsize::new(0),
            fail_next: Mutex::new(None),
        }
    }

    pub fn with_rides(rides: impl IntoIterator<Item = Ride>) -> Self {
        let rides = rides
            .into_iter()
            .map(|mut ride| {
                recount_available(&mut ride);
                (ride.ride_id.clone(), ride)
            })
            .collect();
        Self {
            rides: Mutex::new(rides),
            ..Self::new()
        }
    }

    pub async fn insert_ride(&self, mut ride: Ride) {
        recount_available(&mut ride);
        self.rides.lock().await.insert(ride.ride_id.clone(), ride);
    }

    /// Server-side view of a ride, for assertions
    pub async fn ride(&self, ride_id: &RideId) -> Option<Ride> {
        self.rides.lock().await.get(ride_id).cloned()
    }

    /// Number of calls that got past the identity check
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    /// Make the next call fail with `error`, as a flaky network or a racing client would
    pub async fn fail_next_with(&self, error: GatewayError) {
        *self.fail_next.lock().await = Some(error);
    }

    async fn begin<'a>(&self, actor: &'a Actor) -> GatewayResult<&'a str> {
        let email = actor.email()?;
        self.requests.fetch_add(1, Ordering::SeqCst);
        match self.fail_next.lock().await.take() {
            Some(error) => Err(error),
            None => Ok(email),
        }
    }

    async fn mutate_ride<F>(&self, ride_id: &RideId, mutation: F) -> GatewayResult<()>
    where
        F: FnOnce(&mut Ride) -> Result<(), TransitionError>,
    {
        let mut rides = self.rides.lock().await;
        let ride = rides
            .get_mut(ride_id)
            .ok_or_else(|| GatewayError::Business(format!("Ride {ride_id} not found")))?;

        // Work on a copy so a rejected multi-seat change leaves the ride untouched
        let mut draft = ride.clone();
        mutation(&mut draft).map_err(rejection)?;
        recount_available(&mut draft);
        *ride = draft;
        Ok(())
    }

    async fn list_rides<F>(&self, filter: F) -> Vec<RideSummary>
    where
        F: Fn(&Ride) -> bool,
    {
        let rides = self.rides.lock().await;
        let mut summaries: Vec<RideSummary> = rides
            .values()
            .filter(|ride| filter(*ride))
            .map(RideSummary::from)
            .collect();
        summaries.sort_by(|a, b| {
            a.ride_start
                .cmp(&b.ride_start)
                .then_with(|| a.ride_id.cmp(&b.ride_id))
        });
        summaries
    }
}

impl Default for InMemoryRideGateway {
    fn default() -> Self {
        Self::new()
    }
}

/// A fresh awaiting ride with `seat_count` free seats, numbered from 1
pub fn new_ride(ride_id: &str, driver_email: &str, seat_count: u32) -> Ride {
    let seats: Vec<Seat> = (1..=seat_count)
        .map(|number| Seat::free(format!("{ride_id}-seat-{number}"), number))
        .collect();

    Ride {
        ride_id: RideId::from(ride_id),
        driver_email: driver_email.to_string(),
        vehicle_id: format!("{ride_id}-vehicle"),
        origin: "Campus".to_string(),
        destination: "Downtown".to_string(),
        available_seats: seat_count,
        ride_start: Utc.with_ymd_and_hms(2025, 3, 1, 9, 30, 0).single().unwrap_or_default(),
        status: RideStatus::Awaiting,
        seats,
        vehicle: None,
    }
}

fn role_of(ride: &Ride, email: &str) -> Role {
    if ride.is_driven_by(email) {
        Role::Driver
    } else {
        Role::Passenger
    }
}

// Taken seats no longer count as available; pending requests still do
fn recount_available(ride: &mut Ride) {
    ride.available_seats = ride
        .seats
        .iter()
        .filter(|seat| seat.status() != SeatStatus::Taken)
        .count() as u32;
}

fn rejection(error: TransitionError) -> GatewayError {
    tracing::debug!("In-memory backend rejected change: {}", error);
    GatewayError::Business(error.to_string())
}

fn seat_mut<'a>(ride: &'a mut Ride, seat_id: &SeatId) -> Result<&'a mut Seat, TransitionError> {
    ride.seats
        .iter_mut()
        .find(|seat| &seat.seat_id == seat_id)
        .ok_or_else(|| TransitionError::PreconditionFailed(format!("Seat {seat_id} not found")))
}

fn ensure_seats_editable(ride: &Ride) -> Result<(), TransitionError> {
    if ride.status.is_underway_or_finished() || ride.status == RideStatus::Cancelled {
        return Err(TransitionError::PreconditionFailed(format!(
            "Seats cannot change once a ride is {}",
            ride.status
        )));
    }
    Ok(())
}

fn apply_seat_event(
    ride: &mut Ride,
    seat_id: &SeatId,
    event: SeatEvent,
    email: &str,
) -> Result<(), TransitionError> {
    let role = role_of(ride, email);
    let seat = seat_mut(ride, seat_id)?;
    seat.occupancy = SeatMachine::transition(seat, event, email, role)?;
    Ok(())
}

#[async_trait]
impl RideGateway for InMemoryRideGateway {
    async fn fetch_ride(
        &self,
        ride_id: &RideId,
        _view: RideView,
        actor: &Actor,
    ) -> GatewayResult<RideSnapshot> {
        let email = self.begin(actor).await?;
        let rides = self.rides.lock().await;
        let ride = rides
            .get(ride_id)
            .cloned()
            .ok_or_else(|| GatewayError::Business(format!("Ride {ride_id} not found")))?;
        let is_driver = Some(ride.is_driven_by(email));
        Ok(RideSnapshot { ride, is_driver })
    }

    async fn apply_ride_event(
        &self,
        ride_id: &RideId,
        event: RideEvent,
        actor: &Actor,
    ) -> GatewayResult<()> {
        let email = self.begin(actor).await?;
        self.mutate_ride(ride_id, |ride| {
            ride.status = RideLifecycle::transition(ride, event, role_of(ride, email))?;
            Ok(())
        })
        .await
    }

    async fn request_seats(
        &self,
        ride_id: &RideId,
        count: u32,
        actor: &Actor,
    ) -> GatewayResult<()> {
        let email = self.begin(actor).await?;
        self.mutate_ride(ride_id, |ride| {
            if ride.status != RideStatus::Awaiting {
                return Err(TransitionError::PreconditionFailed(format!(
                    "Seats can only be requested while a ride is awaiting, not {}",
                    ride.status
                )));
            }
            if count == 0 {
                return Err(TransitionError::PreconditionFailed(
                    "At least one seat must be requested".to_string(),
                ));
            }

            // Allocation is the backend's call: lowest free seat numbers first
            let free: Vec<SeatId> = ride
                .seats
                .iter()
                .filter(|seat| seat.status() == SeatStatus::Free)
                .map(|seat| seat.seat_id.clone())
                .take(count as usize)
                .collect();
            if free.len() < count as usize {
                return Err(TransitionError::PreconditionFailed(format!(
                    "Only {} seats are available",
                    free.len()
                )));
            }

            for seat_id in &free {
                apply_seat_event(ride, seat_id, SeatEvent::Request, email)?;
            }
            Ok(())
        })
        .await
    }

    async fn accept_seat(
        &self,
        ride_id: &RideId,
        seat_id: &SeatId,
        actor: &Actor,
    ) -> GatewayResult<()> {
        let email = self.begin(actor).await?;
        self.mutate_ride(ride_id, |ride| {
            ensure_seats_editable(ride)?;
            apply_seat_event(ride, seat_id, SeatEvent::Accept, email)
        })
        .await
    }

    async fn remove_seat(
        &self,
        ride_id: &RideId,
        seat_id: &SeatId,
        actor: &Actor,
    ) -> GatewayResult<()> {
        let email = self.begin(actor).await?;
        self.mutate_ride(ride_id, |ride| {
            ensure_seats_editable(ride)?;
            let seat = seat_mut(ride, seat_id)?;
            let event =
                SeatMachine::removal_event(seat).ok_or(TransitionError::InvalidSeatTransition {
                    from: SeatStatus::Free,
                    event: SeatEvent::Remove,
                })?;
            apply_seat_event(ride, seat_id, event, email)
        })
        .await
    }

    async fn leave_ride(&self, ride_id: &RideId, actor: &Actor) -> GatewayResult<()> {
        let email = self.begin(actor).await?;
        self.mutate_ride(ride_id, |ride| {
            ensure_seats_editable(ride)?;
            let held: Vec<SeatId> = ride
                .seats
                .iter()
                .filter(|seat| seat.is_held_by(email))
                .map(|seat| seat.seat_id.clone())
                .collect();
            if held.is_empty() {
                return Err(TransitionError::NotSeatOwner);
            }
            for seat_id in &held {
                apply_seat_event(ride, seat_id, SeatEvent::PassengerCancel, email)?;
            }
            Ok(())
        })
        .await
    }

    async fn search_rides(
        &self,
        search: &RideSearch,
        actor: &Actor,
    ) -> GatewayResult<Vec<RideSummary>> {
        let email = self.begin(actor).await?;
        let origin = search.origin.to_lowercase();
        let destination = search.destination.to_lowercase();
        Ok(self
            .list_rides(|ride| {
                ride.status == RideStatus::Awaiting
                    && !ride.is_driven_by(email)
                    && ride.origin.to_lowercase().contains(&origin)
                    && ride.destination.to_lowercase().contains(&destination)
                    && ride.ride_start.date_naive() == search.date
                    && ride.available_seats >= search.seats
            })
            .await)
    }

    async fn passenger_rides(&self, actor: &Actor) -> GatewayResult<Vec<RideSummary>> {
        let email = self.begin(actor).await?;
        Ok(self
            .list_rides(|ride| ride.seats.iter().any(|seat| seat.is_held_by(email)))
            .await)
    }

    async fn cancelled_rides(&self, actor: &Actor) -> GatewayResult<Vec<RideSummary>> {
        let email = self.begin(actor).await?;
        Ok(self
            .list_rides(|ride| ride.is_driven_by(email) && ride.status == RideStatus::Cancelled)
            .await)
    }

    async fn completed_rides(&self, actor: &Actor) -> GatewayResult<Vec<RideSummary>> {
        let email = self.begin(actor).await?;
        Ok(self
            .list_rides(|ride| ride.is_driven_by(email) && ride.status == RideStatus::Complete)
            .await)
    }
}

#[async_trait]
impl VehicleGateway for InMemoryRideGateway {
    async fn list_vehicles(&self, actor: &Actor) -> GatewayResult<Vec<Vehicle>> {
        let email = self.begin(actor).await?;
        Ok(self.vehicles.lock().await.get(email).cloned().unwrap_or_default())
    }

    async fn add_vehicle(&self, vehicle: &NewVehicle, actor: &Actor) -> GatewayResult<()> {
        let email = self.begin(actor).await?;
        if vehicle.user_email != email {
            return Err(GatewayError::Business(
                "Vehicles can only be added for yourself".to_string(),
            ));
        }

        let stored = Vehicle {
            id: Uuid::new_v4().to_string(),
            car_brand: vehicle.car_brand.clone(),
            car_model: vehicle.car_model.clone(),
            car_year: vehicle.car_year.to_string(),
            car_color: vehicle.car_color.clone(),
            car_license_plate: vehicle.car_license_plate.clone(),
        };
        self.vehicles
            .lock()
            .await
            .entry(email.to_string())
            .or_default()
            .push(stored);
        Ok(())
    }
}
