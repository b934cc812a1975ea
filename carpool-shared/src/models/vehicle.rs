use serde::{Deserialize, Serialize};

use super::wire;

/// A driver-owned vehicle, as listed by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: String,
    pub car_brand: String,
    pub car_model: String,
    #[serde(deserialize_with = "wire::string_or_number")]
    pub car_year: String,
    pub car_color: String,
    pub car_license_plate: String,
}

/// Registration payload for a new vehicle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewVehicle {
    pub user_email: String,
    pub car_brand: String,
    pub car_model: String,
    pub car_year: i32,
    pub car_color: String,
    pub car_license_plate: String,
}
