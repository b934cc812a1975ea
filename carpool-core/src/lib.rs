pub mod events;
pub mod gateway;
pub mod geo;
pub mod identity;
pub mod search;
pub mod validation;

pub use events::{RideEvent, Role, SeatEvent};
pub use gateway::{RideGateway, RideSnapshot, RideView, VehicleGateway};
pub use identity::{Actor, IdentityProvider};
pub use search::RideSearch;

/// Failure taxonomy for every call that crosses the HTTP boundary.
///
/// None of these are fatal: screens catch them, show `user_message()` inline and keep
/// whatever they were showing before.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    #[error("No signed-in user: an identity is required for this request")]
    IdentityMissing,
    #[error("Network error: {0}")]
    Network(String),
    #[error("Unexpected response from server: {0}")]
    Decode(String),
    #[error("{0}")]
    Business(String),
}

const NETWORK_MESSAGE: &str =
    "Could not reach the server. Please check your connection and try again.";

impl GatewayError {
    /// Inline text for the screen that triggered the call
    pub fn user_message(&self) -> String {
        match self {
            GatewayError::IdentityMissing => "User email is required".to_string(),
            GatewayError::Network(_) => NETWORK_MESSAGE.to_string(),
            GatewayError::Decode(_) => "Invalid response from server".to_string(),
            GatewayError::Business(detail) => detail.clone(),
        }
    }
}

pub type GatewayResult<T> = Result<T, GatewayError>;
