use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::validation::ValidationError;

pub const MAX_SEATS_PER_REQUEST: u32 = 9;

/// Passenger search for rides with enough free seats
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RideSearch {
    pub origin: String,
    pub destination: String,
    pub date: NaiveDate,
    pub seats: u32,
}

impl RideSearch {
    /// Build a search from raw form input (`date` as `YYYY-MM-DD`)
    pub fn new(
        origin: &str,
        destination: &str,
        date: &str,
        seats: u32,
    ) -> Result<Self, ValidationError> {
        let origin = origin.trim();
        let destination = destination.trim();
        if origin.is_empty() {
            return Err(ValidationError("origin is required".to_string()));
        }
        if destination.is_empty() {
            return Err(ValidationError("destination is required".to_string()));
        }

        let date = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
            .map_err(|_| ValidationError("date format is invalid".to_string()))?;

        if !(1..=MAX_SEATS_PER_REQUEST).contains(&seats) {
            return Err(ValidationError(format!(
                "seats must be between 1 and {MAX_SEATS_PER_REQUEST}"
            )));
        }

        Ok(Self {
            origin: origin.to_string(),
            destination: destination.to_string(),
            date,
            seats,
        })
    }

    /// Query-string pairs in the order the backend documents them
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("origin", self.origin.clone()),
            ("destination", self.destination.clone()),
            ("date", self.date.format("%Y-%m-%d").to_string()),
            ("seats", self.seats.to_string()),
        ]
    }
}
