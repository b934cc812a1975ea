use anyhow::Context;
use carpool_app::screens::RideScreen;
use carpool_app::telemetry;
use carpool_client::{Config, HttpRideGateway};
use carpool_core::identity::{EnvIdentity, IdentityProvider};
use carpool_shared::RideId;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("Failed to load config")?;
    telemetry::init(&config.logging.filter);
    tracing::info!("Using ride backend at {}", config.api.base_url);

    let ride_id = std::env::args()
        .nth(1)
        .map(RideId::from)
        .context("Usage: carpool <ride-id>")?;

    let gateway =
        Arc::new(HttpRideGateway::new(&config.api).context("Failed to build HTTP client")?);
    let actor = EnvIdentity::new("CARPOOL_ACTOR_EMAIL").current_actor().await;

    let mut screen = RideScreen::driver(gateway, ride_id.clone(), actor);
    screen.open().await;

    if let Some(message) = screen.error() {
        tracing::warn!("Ride {} could not be loaded: {}", ride_id, message);
        return Ok(());
    }

    if let (Some(ride), Some(style)) = (screen.ride(), screen.status_style()) {
        tracing::info!(
            "Ride {} from {} to {} at {}: {} ({} seats available)",
            ride.ride_id,
            ride.origin,
            ride.destination,
            ride.ride_start,
            style.label,
            ride.available_seats
        );
    }

    let groups = screen.seat_groups();
    tracing::info!(
        "Seats: {} free, {} pending, {} taken",
        groups.free.len(),
        groups.pending.len(),
        groups.taken.len()
    );

    for control in screen.seat_controls() {
        tracing::info!(
            "Seat {} [{}] {:?}: {:?}",
            control.seat_number,
            control.style.label,
            control.passenger,
            control.actions
        );
    }
    tracing::info!("Ride controls: {:?}", screen.ride_controls());

    Ok(())
}
