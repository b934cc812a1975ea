use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::fmt;

use super::wire;

/// Opaque ride identifier assigned by the backend
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RideId(pub String);

/// Seat identifier, unique within one ride
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeatId(pub String);

macro_rules! string_id {
    ($name:ident) => {
        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

string_id!(RideId);
string_id!(SeatId);

/// Ride status in the lifecycle
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum RideStatus {
    Awaiting,
    Confirmed,
    Active,
    Cancelled,
    Complete,
}

impl RideStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RideStatus::Awaiting => "awaiting",
            RideStatus::Confirmed => "confirmed",
            RideStatus::Active => "active",
            RideStatus::Cancelled => "cancelled",
            RideStatus::Complete => "complete",
        }
    }

    /// Once a ride is underway or finished its seat inventory is frozen
    pub fn is_underway_or_finished(&self) -> bool {
        matches!(self, RideStatus::Active | RideStatus::Complete)
    }
}

impl fmt::Display for RideStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Seat status as reported by the backend
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SeatStatus {
    Free,
    Pending,
    Taken,
}

impl SeatStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SeatStatus::Free => "free",
            SeatStatus::Pending => "pending",
            SeatStatus::Taken => "taken",
        }
    }
}

impl fmt::Display for SeatStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who holds a seat. A passenger is attached exactly when the seat is not free.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeatOccupancy {
    Free,
    Pending { passenger_email: String },
    Taken { passenger_email: String },
}

/// One bookable position within a ride
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Seat {
    pub seat_id: SeatId,
    pub seat_number: u32,
    pub occupancy: SeatOccupancy,
}

impl Seat {
    pub fn free(seat_id: impl Into<SeatId>, seat_number: u32) -> Self {
        Self {
            seat_id: seat_id.into(),
            seat_number,
            occupancy: SeatOccupancy::Free,
        }
    }

    pub fn status(&self) -> SeatStatus {
        match self.occupancy {
            SeatOccupancy::Free => SeatStatus::Free,
            SeatOccupancy::Pending { .. } => SeatStatus::Pending,
            SeatOccupancy::Taken { .. } => SeatStatus::Taken,
        }
    }

    pub fn passenger_email(&self) -> Option<&str> {
        match &self.occupancy {
            SeatOccupancy::Free => None,
            SeatOccupancy::Pending { passenger_email }
            | SeatOccupancy::Taken { passenger_email } => Some(passenger_email),
        }
    }

    /// True when `email` occupies this seat, pending or taken
    pub fn is_held_by(&self, email: &str) -> bool {
        self.passenger_email() == Some(email)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleDetails {
    pub car_brand: String,
    pub car_model: String,
    #[serde(deserialize_with = "wire::string_or_number")]
    pub car_year: String,
    pub car_color: String,
    pub car_license_plate: String,
}

impl VehicleDetails {
    /// "2019 Toyota Corolla"
    pub fn headline(&self) -> String {
        format!("{} {} {}", self.car_year, self.car_brand, self.car_model)
    }
}

/// Last snapshot of one carpool trip, as fetched from the backend.
///
/// Snapshots are replaced wholesale on every fetch and never patched locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ride {
    pub ride_id: RideId,
    pub driver_email: String,
    pub vehicle_id: String,
    pub origin: String,
    pub destination: String,
    /// Server-authoritative; never recomputed from the seat list
    pub available_seats: u32,
    pub ride_start: DateTime<Utc>,
    pub status: RideStatus,
    /// Ordered by seat number
    pub seats: Vec<Seat>,
    pub vehicle: Option<VehicleDetails>,
}

impl Ride {
    pub fn seat(&self, seat_id: &SeatId) -> Option<&Seat> {
        self.seats.iter().find(|seat| &seat.seat_id == seat_id)
    }

    pub fn has_taken_seat(&self) -> bool {
        self.seats.iter().any(|seat| seat.status() == SeatStatus::Taken)
    }

    pub fn is_driven_by(&self, email: &str) -> bool {
        self.driver_email == email
    }
}

// ============================================================================
// Wire DTOs
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeatDto {
    pub seat_id: String,
    pub seat_number: u32,
    pub seat_status: SeatStatus,
    #[serde(default)]
    pub passenger_email: Option<String>,
}

/// Ride detail payload exactly as the backend sends it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RideDto {
    pub ride_id: String,
    pub driver_email: String,
    pub vehicle_id: String,
    pub origin: String,
    pub destination: String,
    pub available_seats: u32,
    #[serde(deserialize_with = "wire::timestamp")]
    pub ride_start_datetime: DateTime<Utc>,
    pub ride_status: RideStatus,
    #[serde(default)]
    pub seats_details: BTreeMap<String, SeatDto>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicle_details: Option<VehicleDetails>,
}

impl TryFrom<SeatDto> for Seat {
    type Error = String;

    fn try_from(dto: SeatDto) -> Result<Self, Self::Error> {
        let email = dto.passenger_email.filter(|email| !email.trim().is_empty());
        let occupancy = match (dto.seat_status, email) {
            (SeatStatus::Free, None) => SeatOccupancy::Free,
            (SeatStatus::Pending, Some(passenger_email)) => {
                SeatOccupancy::Pending { passenger_email }
            }
            (SeatStatus::Taken, Some(passenger_email)) => SeatOccupancy::Taken { passenger_email },
            (SeatStatus::Free, Some(_)) => {
                return Err(format!("seat {} is free but names a passenger", dto.seat_id));
            }
            (status, None) => {
                return Err(format!("seat {} is {} without a passenger", dto.seat_id, status));
            }
        };

        Ok(Seat {
            seat_id: SeatId(dto.seat_id),
            seat_number: dto.seat_number,
            occupancy,
        })
    }
}

impl From<&Seat> for SeatDto {
    fn from(seat: &Seat) -> Self {
        Self {
            seat_id: seat.seat_id.0.clone(),
            seat_number: seat.seat_number,
            seat_status: seat.status(),
            passenger_email: seat.passenger_email().map(str::to_string),
        }
    }
}

impl TryFrom<RideDto> for Ride {
    type Error = String;

    fn try_from(dto: RideDto) -> Result<Self, Self::Error> {
        let mut seats = dto
            .seats_details
            .into_values()
            .map(Seat::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        seats.sort_by_key(|seat| seat.seat_number);

        Ok(Ride {
            ride_id: RideId(dto.ride_id),
            driver_email: dto.driver_email,
            vehicle_id: dto.vehicle_id,
            origin: dto.origin,
            destination: dto.destination,
            available_seats: dto.available_seats,
            ride_start: dto.ride_start_datetime,
            status: dto.ride_status,
            seats,
            vehicle: dto.vehicle_details,
        })
    }
}

impl From<&Ride> for RideDto {
    fn from(ride: &Ride) -> Self {
        Self {
            ride_id: ride.ride_id.0.clone(),
            driver_email: ride.driver_email.clone(),
            vehicle_id: ride.vehicle_id.clone(),
            origin: ride.origin.clone(),
            destination: ride.destination.clone(),
            available_seats: ride.available_seats,
            ride_start_datetime: ride.ride_start,
            ride_status: ride.status,
            seats_details: ride
                .seats
                .iter()
                .map(|seat| (seat.seat_id.0.clone(), SeatDto::from(seat)))
                .collect(),
            vehicle_details: ride.vehicle.clone(),
        }
    }
}

/// Row in the search results and ride history lists
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RideSummary {
    pub ride_id: RideId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver_email: Option<String>,
    pub origin: String,
    pub destination: String,
    pub available_seats: u32,
    #[serde(rename = "ride_start_datetime", deserialize_with = "wire::timestamp")]
    pub ride_start: DateTime<Utc>,
    #[serde(rename = "ride_status", default, skip_serializing_if = "Option::is_none")]
    pub status: Option<RideStatus>,
    #[serde(rename = "vehicle_details", default, skip_serializing_if = "Option::is_none")]
    pub vehicle: Option<VehicleDetails>,
}

impl From<&Ride> for RideSummary {
    fn from(ride: &Ride) -> Self {
        Self {
            ride_id: ride.ride_id.clone(),
            driver_email: Some(ride.driver_email.clone()),
            origin: ride.origin.clone(),
            destination: ride.destination.clone(),
            available_seats: ride.available_seats,
            ride_start: ride.ride_start,
            status: Some(ride.status),
            vehicle: ride.vehicle.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ride_json(seats: serde_json::Value) -> serde_json::Value {
        json!({
            "ride_id": "R1",
            "driver_email": "driver@example.com",
            "vehicle_id": "V1",
            "origin": "Campus",
            "destination": "Downtown",
            "available_seats": 2,
            "ride_start_datetime": "2025-03-01T09:30:00",
            "ride_status": "awaiting",
            "seats_details": seats,
        })
    }

    fn seat_json(
        seat_id: &str,
        number: u32,
        status: &str,
        email: serde_json::Value,
    ) -> serde_json::Value {
        json!({
            "seat_id": seat_id,
            "seat_number": number,
            "seat_status": status,
            "passenger_email": email,
        })
    }

    #[test]
    fn test_seats_are_ordered_by_seat_number() {
        let dto: RideDto = serde_json::from_value(ride_json(json!({
            "b": seat_json("b", 2, "free", json!(null)),
            "a": seat_json("a", 3, "taken", json!("p1@example.com")),
            "c": seat_json("c", 1, "pending", json!("p2@example.com")),
        })))
        .unwrap();

        let ride = Ride::try_from(dto).unwrap();
        let numbers: Vec<u32> = ride.seats.iter().map(|s| s.seat_number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert_eq!(ride.seats[0].passenger_email(), Some("p2@example.com"));
        assert_eq!(ride.seats[1].passenger_email(), None);
        assert!(ride.has_taken_seat());
    }

    #[test]
    fn test_free_seat_with_passenger_is_rejected() {
        let dto: RideDto = serde_json::from_value(ride_json(json!({
            "s1": seat_json("s1", 1, "free", json!("p1@example.com")),
        })))
        .unwrap();

        assert!(Ride::try_from(dto).is_err());
    }

    #[test]
    fn test_occupied_seat_without_passenger_is_rejected() {
        let dto: RideDto = serde_json::from_value(ride_json(json!({
            "s1": seat_json("s1", 1, "taken", json!("")),
        })))
        .unwrap();

        let err = Ride::try_from(dto).unwrap_err();
        assert!(err.contains("without a passenger"));
    }

    #[test]
    fn test_unknown_ride_status_fails_to_decode() {
        let mut value = ride_json(json!({}));
        value["ride_status"] = json!("unfilled");
        assert!(serde_json::from_value::<RideDto>(value).is_err());
    }

    #[test]
    fn test_summary_accepts_numeric_vehicle_year() {
        let summary: RideSummary = serde_json::from_value(json!({
            "ride_id": "R9",
            "origin": "A",
            "destination": "B",
            "available_seats": 1,
            "ride_start_datetime": "2025-03-01T09:30:00Z",
            "vehicle_details": {
                "car_brand": "Toyota",
                "car_model": "Corolla",
                "car_year": 2019,
                "car_color": "Blue",
                "car_license_plate": "ABC-123"
            }
        }))
        .unwrap();

        assert_eq!(summary.status, None);
        assert_eq!(summary.vehicle.unwrap().headline(), "2019 Toyota Corolla");
    }
}
