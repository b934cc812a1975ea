//! Reqwest-backed adapter for the ride and vehicle backend.
//!
//! Owns transport details only: identity header, URL building, HTTP error mapping and
//! envelope decoding into domain types. One request per call, no retries.

use std::time::Duration;

use async_trait::async_trait;
use carpool_core::gateway::{RideGateway, RideSnapshot, RideView, VehicleGateway};
use carpool_core::{Actor, GatewayError, GatewayResult, RideEvent, RideSearch};
use carpool_shared::{
    Envelope, ErrorBody, NewVehicle, Ride, RideDto, RideId, RideSummary, SeatId, Vehicle,
};
use reqwest::header::{HeaderName, ACCEPT};
use reqwest::{Client, Method, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::app_config::ApiConfig;

#[derive(Debug, thiserror::Error)]
pub enum ClientSetupError {
    #[error("Invalid API base URL {url}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("Invalid identity header name {0:?}")]
    InvalidIdentityHeader(String),

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}

/// Ride and vehicle gateway that talks to the backend over HTTP
pub struct HttpRideGateway {
    client: Client,
    base_url: Url,
    identity_header: HeaderName,
    passenger_identity_header: HeaderName,
}

impl HttpRideGateway {
    /// # Errors
    ///
    /// Returns an error when the base URL or header name is unusable, or the reqwest
    /// client cannot be constructed.
    pub fn new(api: &ApiConfig) -> Result<Self, ClientSetupError> {
        let base_url = Url::parse(&api.base_url).map_err(|e| ClientSetupError::InvalidBaseUrl {
            url: api.base_url.clone(),
            reason: e.to_string(),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ClientSetupError::InvalidBaseUrl {
                url: api.base_url.clone(),
                reason: "not a hierarchical URL".to_string(),
            });
        }

        let identity_header = header_name(&api.identity_header)?;
        let passenger_identity_header = header_name(&api.passenger_identity_header)?;

        let mut builder = Client::builder();
        if let Some(seconds) = api.request_timeout_seconds {
            builder = builder.timeout(Duration::from_secs(seconds));
        }

        Ok(Self {
            client: builder.build()?,
            base_url,
            identity_header,
            passenger_identity_header,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // Checked in `new`: the base URL always has a path
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Start a request on behalf of `actor`. Fails before any I/O when nobody is signed in.
    fn request(
        &self,
        method: Method,
        segments: &[&str],
        actor: &Actor,
    ) -> GatewayResult<RequestBuilder> {
        self.request_with_identity(method, segments, actor, &self.identity_header)
    }

    fn request_with_identity(
        &self,
        method: Method,
        segments: &[&str],
        actor: &Actor,
        identity_header: &HeaderName,
    ) -> GatewayResult<RequestBuilder> {
        let email = actor.email()?;
        let url = self.endpoint(segments);
        tracing::debug!("{} {} as {:?}", method, url.path(), actor);

        Ok(self
            .client
            .request(method, url)
            .header(identity_header.clone(), email)
            .header(ACCEPT, "application/json"))
    }

    /// Send and unwrap the `{status, data}` envelope
    async fn execute(
        &self,
        operation: &str,
        request: RequestBuilder,
    ) -> GatewayResult<Envelope<Value>> {
        let response = request.send().await.map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            let error = map_status_error(status, body.as_ref());
            tracing::warn!("{} failed: {}", operation, error);
            return Err(error);
        }

        let envelope: Envelope<Value> = serde_json::from_slice(body.as_ref()).map_err(|e| {
            GatewayError::Decode(format!("invalid {operation} envelope: {e}"))
        })?;
        if !envelope.is_ok() {
            let detail = envelope.detail.clone().unwrap_or_else(|| {
                format!("{operation} was rejected with status {:?}", envelope.status)
            });
            tracing::info!("{} rejected by backend: {}", operation, detail);
            return Err(GatewayError::Business(detail));
        }

        Ok(envelope)
    }

    async fn mutate(&self, operation: &str, request: RequestBuilder) -> GatewayResult<()> {
        self.execute(operation, request).await.map(|_| ())
    }

    async fn list<T: DeserializeOwned>(
        &self,
        operation: &str,
        request: RequestBuilder,
    ) -> GatewayResult<Vec<T>> {
        let envelope = self.execute(operation, request).await?;
        decode_list(operation, envelope.data)
    }
}

fn header_name(name: &str) -> Result<HeaderName, ClientSetupError> {
    HeaderName::from_bytes(name.as_bytes())
        .map_err(|_| ClientSetupError::InvalidIdentityHeader(name.to_string()))
}

fn ride_event_path(event: RideEvent) -> &'static str {
    match event {
        RideEvent::Confirm => "driver-confirms-ride",
        RideEvent::Start => "ride-start",
        RideEvent::Complete => "ride-complete",
        RideEvent::Cancel => "cancel-ride",
    }
}

fn ride_view_path(view: RideView) -> &'static str {
    match view {
        RideView::Driver => "get-ride",
        RideView::Passenger => "get-awaiting-ride-detail-passenger",
    }
}

fn decode_ride(envelope: Envelope<Value>) -> GatewayResult<RideSnapshot> {
    let data = envelope
        .data
        .ok_or_else(|| GatewayError::Decode("ride response has no data".to_string()))?;
    let dto: RideDto = serde_json::from_value(data)
        .map_err(|e| GatewayError::Decode(format!("invalid ride payload: {e}")))?;
    let ride = Ride::try_from(dto).map_err(GatewayError::Decode)?;

    Ok(RideSnapshot {
        ride,
        is_driver: envelope.is_driver,
    })
}

// `null` or missing list data is an empty list
fn decode_list<T: DeserializeOwned>(operation: &str, data: Option<Value>) -> GatewayResult<Vec<T>> {
    let Some(data) = data else {
        return Ok(Vec::new());
    };
    serde_json::from_value::<Option<Vec<T>>>(data)
        .map(Option::unwrap_or_default)
        .map_err(|e| GatewayError::Decode(format!("invalid {operation} payload: {e}")))
}

fn map_transport_error(error: reqwest::Error) -> GatewayError {
    if error.is_decode() {
        GatewayError::Decode(error.to_string())
    } else {
        GatewayError::Network(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> GatewayError {
    let detail = serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .and_then(|body| body.detail)
        .filter(|detail| !detail.trim().is_empty());
    if let Some(detail) = detail {
        return GatewayError::Business(detail);
    }

    let body_preview = body_preview(body);
    if body_preview.is_empty() {
        GatewayError::Business(format!("status {}", status.as_u16()))
    } else {
        GatewayError::Business(format!("status {}: {}", status.as_u16(), body_preview))
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}

#[async_trait]
impl RideGateway for HttpRideGateway {
    async fn fetch_ride(
        &self,
        ride_id: &RideId,
        view: RideView,
        actor: &Actor,
    ) -> GatewayResult<RideSnapshot> {
        let segments = ["rides", ride_view_path(view), ride_id.as_str()];
        let request = self.request(Method::GET, &segments, actor)?;
        let envelope = self.execute("fetch ride", request).await?;
        decode_ride(envelope)
    }

    async fn apply_ride_event(
        &self,
        ride_id: &RideId,
        event: RideEvent,
        actor: &Actor,
    ) -> GatewayResult<()> {
        let segments = ["rides", ride_event_path(event), ride_id.as_str()];
        let request = self.request(Method::PUT, &segments, actor)?;
        self.mutate(&format!("{event} ride"), request).await
    }

    async fn request_seats(
        &self,
        ride_id: &RideId,
        count: u32,
        actor: &Actor,
    ) -> GatewayResult<()> {
        let request = self
            .request(Method::POST, &["rides", "request-seat", ride_id.as_str()], actor)?
            .json(&json!({ "seats": count }));
        self.mutate("request seats", request).await
    }

    async fn accept_seat(
        &self,
        ride_id: &RideId,
        seat_id: &SeatId,
        actor: &Actor,
    ) -> GatewayResult<()> {
        let request = self.request(
            Method::PUT,
            &["rides", "accept-passenger-seat", ride_id.as_str(), seat_id.as_str()],
            actor,
        )?;
        self.mutate("accept seat", request).await
    }

    async fn remove_seat(
        &self,
        ride_id: &RideId,
        seat_id: &SeatId,
        actor: &Actor,
    ) -> GatewayResult<()> {
        let request = self.request(
            Method::PUT,
            &["rides", "remove-passenger-seat", ride_id.as_str(), seat_id.as_str()],
            actor,
        )?;
        self.mutate("remove seat", request).await
    }

    async fn leave_ride(&self, ride_id: &RideId, actor: &Actor) -> GatewayResult<()> {
        let segments = ["rides", "remove-passenger", ride_id.as_str()];
        let request = self.request(Method::PUT, &segments, actor)?;
        self.mutate("leave ride", request).await
    }

    async fn search_rides(
        &self,
        search: &RideSearch,
        actor: &Actor,
    ) -> GatewayResult<Vec<RideSummary>> {
        let request = self
            .request(Method::GET, &["rides", "search-rides"], actor)?
            .query(&search.query_pairs());
        self.list("search rides", request).await
    }

    async fn passenger_rides(&self, actor: &Actor) -> GatewayResult<Vec<RideSummary>> {
        let request = self.request_with_identity(
            Method::GET,
            &["rides", "passenger-rides"],
            actor,
            &self.passenger_identity_header,
        )?;
        self.list("passenger rides", request).await
    }

    async fn cancelled_rides(&self, actor: &Actor) -> GatewayResult<Vec<RideSummary>> {
        let request = self.request(Method::GET, &["rides", "get-cancelled-rides"], actor)?;
        self.list("cancelled rides", request).await
    }

    async fn completed_rides(&self, actor: &Actor) -> GatewayResult<Vec<RideSummary>> {
        let request = self.request(Method::GET, &["rides", "get-completed-rides"], actor)?;
        self.list("completed rides", request).await
    }
}

#[async_trait]
impl VehicleGateway for HttpRideGateway {
    async fn list_vehicles(&self, actor: &Actor) -> GatewayResult<Vec<Vehicle>> {
        let request = self.request(Method::GET, &["vehicles", "user-vehicles"], actor)?;
        self.list("list vehicles", request).await
    }

    async fn add_vehicle(&self, vehicle: &NewVehicle, actor: &Actor) -> GatewayResult<()> {
        let request = self.request(Method::POST, &["vehicles"], actor)?.json(vehicle);
        self.mutate("add vehicle", request).await
    }
}
