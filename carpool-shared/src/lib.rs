pub mod models;
pub mod pii;

pub use models::envelope::{Envelope, ErrorBody, STATUS_OK};
pub use models::ride::{
    Ride, RideDto, RideId, RideStatus, RideSummary, Seat, SeatDto, SeatId, SeatOccupancy,
    SeatStatus, VehicleDetails,
};
pub use models::vehicle::{NewVehicle, Vehicle};
pub use pii::Masked;
