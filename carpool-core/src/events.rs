use serde::{Deserialize, Serialize};
use std::fmt;

/// Which side of a ride an actor is on
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Driver,
    Passenger,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Driver => f.write_str("driver"),
            Role::Passenger => f.write_str("passenger"),
        }
    }
}

/// Ride-level lifecycle events
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum RideEvent {
    Confirm,
    Cancel,
    Start,
    Complete,
}

impl RideEvent {
    pub const ALL: [RideEvent; 4] = [
        RideEvent::Confirm,
        RideEvent::Cancel,
        RideEvent::Start,
        RideEvent::Complete,
    ];
}

impl fmt::Display for RideEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RideEvent::Confirm => "confirm",
            RideEvent::Cancel => "cancel",
            RideEvent::Start => "start",
            RideEvent::Complete => "complete",
        };
        f.write_str(name)
    }
}

/// Per-seat reservation events
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SeatEvent {
    /// Passenger asks for a free seat
    Request,
    /// Driver accepts a pending request
    Accept,
    /// Driver turns down a pending request
    Decline,
    /// Driver removes a passenger from a taken seat
    Remove,
    /// Passenger gives up their own seat
    PassengerCancel,
}

impl fmt::Display for SeatEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SeatEvent::Request => "request",
            SeatEvent::Accept => "accept",
            SeatEvent::Decline => "decline",
            SeatEvent::Remove => "remove",
            SeatEvent::PassengerCancel => "passenger_cancel",
        };
        f.write_str(name)
    }
}
