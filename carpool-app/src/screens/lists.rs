use carpool_core::{Actor, GatewayResult, RideGateway, RideSearch};
use carpool_shared::RideSummary;
use std::sync::Arc;

use crate::screen::{ScreenError, ScreenState};

/// Which history list a screen shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RideList {
    /// Rides the actor has requested or holds a seat on
    Passenger,
    /// Driver's cancelled rides
    Cancelled,
    /// Driver's completed rides
    Completed,
}

pub struct RideListScreen {
    gateway: Arc<dyn RideGateway>,
    actor: Actor,
    list: RideList,
    state: ScreenState<Vec<RideSummary>>,
}

impl RideListScreen {
    pub fn new(gateway: Arc<dyn RideGateway>, actor: Actor, list: RideList) -> Self {
        Self {
            gateway,
            actor,
            list,
            state: ScreenState::default(),
        }
    }

    /// Runs on focus; there is no background polling
    pub async fn refresh(&mut self) {
        self.state.begin_loading();
        let mut result = self.fetch().await;
        if let Ok(rides) = &mut result {
            tracing::debug!("{:?} list has {} rides", self.list, rides.len());
            if self.list == RideList::Passenger {
                newest_first(rides);
            }
        }
        self.state.finish(result.map_err(ScreenError::from));
    }

    async fn fetch(&self) -> GatewayResult<Vec<RideSummary>> {
        match self.list {
            RideList::Passenger => self.gateway.passenger_rides(&self.actor).await,
            RideList::Cancelled => self.gateway.cancelled_rides(&self.actor).await,
            RideList::Completed => self.gateway.completed_rides(&self.actor).await,
        }
    }

    pub fn state(&self) -> &ScreenState<Vec<RideSummary>> {
        &self.state
    }

    pub fn rides(&self) -> &[RideSummary] {
        self.state.value().map(Vec::as_slice).unwrap_or_default()
    }
}

// Stable, so rides sharing a start time keep the backend's order
fn newest_first(rides: &mut [RideSummary]) {
    rides.sort_by(|a, b| b.ride_start.cmp(&a.ride_start));
}

/// Raw input of the passenger search form
#[derive(Debug, Clone, Default)]
pub struct SearchForm {
    pub origin: String,
    pub destination: String,
    /// `YYYY-MM-DD`
    pub date: String,
    pub seats: u32,
}

pub struct SearchScreen {
    gateway: Arc<dyn RideGateway>,
    actor: Actor,
    state: ScreenState<Vec<RideSummary>>,
}

impl SearchScreen {
    pub fn new(gateway: Arc<dyn RideGateway>, actor: Actor) -> Self {
        Self {
            gateway,
            actor,
            state: ScreenState::default(),
        }
    }

    /// Validate the form and search. Invalid input never reaches the backend.
    pub async fn submit(&mut self, form: &SearchForm) {
        let search = RideSearch::new(&form.origin, &form.destination, &form.date, form.seats);
        let search = match search {
            Ok(search) => search,
            Err(err) => {
                self.state.fail(err.into());
                return;
            }
        };

        self.state.begin_loading();
        let result = self.gateway.search_rides(&search, &self.actor).await;
        self.state.finish(result.map_err(ScreenError::from));
    }

    pub fn state(&self) -> &ScreenState<Vec<RideSummary>> {
        &self.state
    }

    pub fn results(&self) -> &[RideSummary] {
        self.state.value().map(Vec::as_slice).unwrap_or_default()
    }
}
