use axum::extract::{Path, Request, State};
use axum::http::{HeaderMap, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use carpool_client::app_config::ApiConfig;
use carpool_client::HttpRideGateway;
use carpool_core::{
    Actor, GatewayError, RideEvent, RideGateway, RideSearch, RideView, VehicleGateway,
};
use carpool_shared::{NewVehicle, RideId, RideStatus, SeatId, SeatStatus};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

const DRIVER: &str = "driver@example.com";
const P1: &str = "p1@example.com";

/// What the stub backend saw
#[derive(Clone, Default)]
struct Stub {
    hits: Arc<AtomicUsize>,
    seen: Arc<Mutex<Vec<Seen>>>,
    bodies: Arc<Mutex<Vec<Value>>>,
}

#[derive(Debug, Clone)]
struct Seen {
    method: String,
    path: String,
    query: Option<String>,
    identity: Option<String>,
    passenger_identity: Option<String>,
}

impl Stub {
    fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    fn last(&self) -> Seen {
        self.seen.lock().unwrap().last().cloned().unwrap()
    }
}

fn header(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

async fn record(State(stub): State<Stub>, request: Request, next: Next) -> Response {
    stub.hits.fetch_add(1, Ordering::SeqCst);
    stub.seen.lock().unwrap().push(Seen {
        method: request.method().to_string(),
        path: request.uri().path().to_string(),
        query: request.uri().query().map(str::to_string),
        identity: header(request.headers(), "user-email"),
        passenger_identity: header(request.headers(), "passenger-email"),
    });
    next.run(request).await
}

fn ride_json(ride_id: &str, status: &str, seats: Value) -> Value {
    json!({
        "ride_id": ride_id,
        "driver_email": DRIVER,
        "vehicle_id": "V1",
        "origin": "Campus",
        "destination": "Downtown",
        "available_seats": 1,
        "ride_start_datetime": "2025-03-01T09:30:00",
        "ride_status": status,
        "seats_details": seats,
        "vehicle_details": {
            "car_brand": "Toyota",
            "car_model": "Corolla",
            "car_year": 2019,
            "car_color": "Blue",
            "car_license_plate": "ABC-123"
        }
    })
}

async fn get_ride(Path(ride_id): Path<String>, headers: HeaderMap) -> Response {
    let is_driver = headers.get("user-email").and_then(|v| v.to_str().ok()) == Some(DRIVER);
    let seats = json!({
        "s2": {"seat_id": "s2", "seat_number": 2, "seat_status": "free", "passenger_email": null},
        "s1": {"seat_id": "s1", "seat_number": 1, "seat_status": "taken", "passenger_email": P1},
    });
    Json(json!({
        "status": "ok",
        "is_driver": is_driver,
        "data": ride_json(&ride_id, "awaiting", seats),
    }))
    .into_response()
}

// Passenger view returns a seat that contradicts itself
async fn get_passenger_ride(Path(ride_id): Path<String>) -> Response {
    let seats = json!({
        "s1": {"seat_id": "s1", "seat_number": 1, "seat_status": "free", "passenger_email": P1},
    });
    Json(json!({"status": "ok", "data": ride_json(&ride_id, "awaiting", seats)})).into_response()
}

async fn confirm(Path(ride_id): Path<String>) -> Response {
    if ride_id == "R2" {
        let detail = Json(json!({"detail": "Ride already confirmed"}));
        return (StatusCode::BAD_REQUEST, detail).into_response();
    }
    Json(json!({"status": "ok"})).into_response()
}

async fn start() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "upstream\n   exploded").into_response()
}

async fn complete() -> Response {
    Json(json!({"status": "error", "detail": "Ride is not active"})).into_response()
}

async fn cancel() -> Response {
    (StatusCode::OK, "<html>ok</html>").into_response()
}

async fn request_seat(State(stub): State<Stub>, Json(body): Json<Value>) -> Response {
    stub.bodies.lock().unwrap().push(body);
    Json(json!({"status": "ok"})).into_response()
}

async fn ok() -> Response {
    Json(json!({"status": "ok"})).into_response()
}

async fn search() -> Response {
    Json(json!({
        "status": "ok",
        "data": [{
            "ride_id": "R9",
            "driver_email": DRIVER,
            "origin": "Campus",
            "destination": "Downtown",
            "available_seats": 3,
            "ride_start_datetime": "2025-03-01T09:30:00Z"
        }]
    }))
    .into_response()
}

async fn null_list() -> Response {
    Json(json!({"status": "ok", "data": null})).into_response()
}

async fn passenger_rides(headers: HeaderMap) -> Response {
    if header(&headers, "passenger-email").is_none() {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": "passenger-email header missing"})),
        )
            .into_response();
    }
    null_list().await
}

async fn missing_status() -> Response {
    Json(json!({"data": []})).into_response()
}

async fn vehicles() -> Response {
    Json(json!({
        "status": "ok",
        "data": [{
            "id": "V1",
            "car_brand": "Toyota",
            "car_model": "Corolla",
            "car_year": "2019",
            "car_color": "Blue",
            "car_license_plate": "ABC-123"
        }]
    }))
    .into_response()
}

async fn add_vehicle(State(stub): State<Stub>, Json(body): Json<Value>) -> Response {
    stub.bodies.lock().unwrap().push(body);
    Json(json!({"status": "ok"})).into_response()
}

async fn spawn_stub() -> (HttpRideGateway, Stub) {
    let stub = Stub::default();
    let router = Router::new()
        .route("/rides/get-ride/{ride_id}", get(get_ride))
        .route("/rides/get-awaiting-ride-detail-passenger/{ride_id}", get(get_passenger_ride))
        .route("/rides/driver-confirms-ride/{ride_id}", put(confirm))
        .route("/rides/ride-start/{ride_id}", put(start))
        .route("/rides/ride-complete/{ride_id}", put(complete))
        .route("/rides/cancel-ride/{ride_id}", put(cancel))
        .route("/rides/request-seat/{ride_id}", post(request_seat))
        .route("/rides/accept-passenger-seat/{ride_id}/{seat_id}", put(ok))
        .route("/rides/remove-passenger-seat/{ride_id}/{seat_id}", put(ok))
        .route("/rides/remove-passenger/{ride_id}", put(ok))
        .route("/rides/search-rides", get(search))
        .route("/rides/passenger-rides", get(passenger_rides))
        .route("/rides/get-cancelled-rides", get(missing_status))
        .route("/rides/get-completed-rides", get(null_list))
        .route("/vehicles/user-vehicles", get(vehicles))
        .route("/vehicles", post(add_vehicle))
        .layer(middleware::from_fn_with_state(stub.clone(), record))
        .with_state(stub.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    (gateway_for(&format!("http://{addr}")), stub)
}

fn gateway_for(base_url: &str) -> HttpRideGateway {
    HttpRideGateway::new(&ApiConfig {
        base_url: base_url.to_string(),
        identity_header: "user-email".to_string(),
        passenger_identity_header: "passenger-email".to_string(),
        request_timeout_seconds: Some(5),
    })
    .unwrap()
}

#[tokio::test]
async fn test_fetch_ride_decodes_snapshot() {
    let (gateway, stub) = spawn_stub().await;

    let snapshot = gateway
        .fetch_ride(&RideId::from("R1"), RideView::Driver, &Actor::new(DRIVER))
        .await
        .unwrap();

    assert_eq!(snapshot.is_driver, Some(true));
    assert_eq!(snapshot.ride.status, RideStatus::Awaiting);
    assert_eq!(snapshot.ride.seats[0].seat_id, SeatId::from("s1"));
    assert_eq!(snapshot.ride.seats[0].status(), SeatStatus::Taken);
    assert_eq!(snapshot.ride.vehicle.unwrap().car_year, "2019");

    let seen = stub.last();
    assert_eq!(seen.method, "GET");
    assert_eq!(seen.path, "/rides/get-ride/R1");
    assert_eq!(seen.identity.as_deref(), Some(DRIVER));
}

#[tokio::test]
async fn test_missing_identity_issues_no_request() {
    let (gateway, stub) = spawn_stub().await;
    let anonymous = Actor::new("");
    let ride_id = RideId::from("R1");

    assert_eq!(
        gateway.fetch_ride(&ride_id, RideView::Driver, &anonymous).await,
        Err(GatewayError::IdentityMissing)
    );
    assert_eq!(
        gateway.apply_ride_event(&ride_id, RideEvent::Confirm, &anonymous).await,
        Err(GatewayError::IdentityMissing)
    );
    assert_eq!(
        gateway.request_seats(&ride_id, 1, &anonymous).await,
        Err(GatewayError::IdentityMissing)
    );
    assert_eq!(gateway.passenger_rides(&anonymous).await, Err(GatewayError::IdentityMissing));
    assert_eq!(gateway.list_vehicles(&anonymous).await, Err(GatewayError::IdentityMissing));

    assert_eq!(stub.hits(), 0);
}

#[tokio::test]
async fn test_lifecycle_event_endpoints_and_errors() {
    let (gateway, stub) = spawn_stub().await;
    let driver = Actor::new(DRIVER);

    gateway
        .apply_ride_event(&RideId::from("R1"), RideEvent::Confirm, &driver)
        .await
        .unwrap();
    let seen = stub.last();
    assert_eq!(seen.method, "PUT");
    assert_eq!(seen.path, "/rides/driver-confirms-ride/R1");

    // Non-2xx with a detail
    let result = gateway.apply_ride_event(&RideId::from("R2"), RideEvent::Confirm, &driver).await;
    assert_eq!(result, Err(GatewayError::Business("Ride already confirmed".to_string())));

    // Non-2xx without JSON
    let result = gateway.apply_ride_event(&RideId::from("R1"), RideEvent::Start, &driver).await;
    assert_eq!(result, Err(GatewayError::Business("status 500: upstream exploded".to_string())));

    // 2xx envelope that is not ok
    let result = gateway.apply_ride_event(&RideId::from("R1"), RideEvent::Complete, &driver).await;
    assert_eq!(result, Err(GatewayError::Business("Ride is not active".to_string())));

    // 2xx body that is not JSON
    let result = gateway.apply_ride_event(&RideId::from("R1"), RideEvent::Cancel, &driver).await;
    assert!(matches!(result, Err(GatewayError::Decode(_))));
    assert_eq!(stub.last().path, "/rides/cancel-ride/R1");
}

#[tokio::test]
async fn test_seat_operations() {
    let (gateway, stub) = spawn_stub().await;
    let ride_id = RideId::from("R1");
    let seat_id = SeatId::from("s1");

    gateway.request_seats(&ride_id, 2, &Actor::new(P1)).await.unwrap();
    let seen = stub.last();
    assert_eq!((seen.method.as_str(), seen.path.as_str()), ("POST", "/rides/request-seat/R1"));
    assert_eq!(seen.identity.as_deref(), Some(P1));
    assert_eq!(stub.bodies.lock().unwrap().last().cloned(), Some(json!({"seats": 2})));

    gateway.accept_seat(&ride_id, &seat_id, &Actor::new(DRIVER)).await.unwrap();
    assert_eq!(stub.last().path, "/rides/accept-passenger-seat/R1/s1");

    gateway.remove_seat(&ride_id, &seat_id, &Actor::new(DRIVER)).await.unwrap();
    assert_eq!(stub.last().path, "/rides/remove-passenger-seat/R1/s1");

    gateway.leave_ride(&ride_id, &Actor::new(P1)).await.unwrap();
    assert_eq!(stub.last().path, "/rides/remove-passenger/R1");
    assert_eq!(stub.hits(), 4);
}

#[tokio::test]
async fn test_inconsistent_seat_is_a_decode_error() {
    let (gateway, _stub) = spawn_stub().await;
    let result = gateway
        .fetch_ride(&RideId::from("R1"), RideView::Passenger, &Actor::new(P1))
        .await;
    assert!(matches!(result, Err(GatewayError::Decode(_))));
}

#[tokio::test]
async fn test_lists() {
    let (gateway, stub) = spawn_stub().await;
    let passenger = Actor::new(P1);

    let search = RideSearch::new("Campus", "Downtown", "2025-03-01", 2).unwrap();
    let results = gateway.search_rides(&search, &passenger).await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].ride_id, RideId::from("R9"));
    assert_eq!(
        stub.last().query.as_deref(),
        Some("origin=Campus&destination=Downtown&date=2025-03-01&seats=2")
    );

    assert!(gateway.passenger_rides(&passenger).await.unwrap().is_empty());
    assert!(gateway.completed_rides(&passenger).await.unwrap().is_empty());
    assert!(matches!(
        gateway.cancelled_rides(&passenger).await,
        Err(GatewayError::Decode(_))
    ));
}

#[tokio::test]
async fn test_passenger_rides_sends_passenger_identity_header() {
    let (gateway, stub) = spawn_stub().await;

    let rides = gateway.passenger_rides(&Actor::new(P1)).await.unwrap();
    assert!(rides.is_empty());

    let seen = stub.last();
    assert_eq!(seen.path, "/rides/passenger-rides");
    assert_eq!(seen.passenger_identity.as_deref(), Some(P1));
    assert_eq!(seen.identity, None);

    // Every other request keeps the regular identity header
    gateway.completed_rides(&Actor::new(P1)).await.unwrap();
    let seen = stub.last();
    assert_eq!(seen.identity.as_deref(), Some(P1));
    assert_eq!(seen.passenger_identity, None);
}

#[tokio::test]
async fn test_vehicles() {
    let (gateway, stub) = spawn_stub().await;
    let driver = Actor::new(DRIVER);

    let vehicles = gateway.list_vehicles(&driver).await.unwrap();
    assert_eq!(vehicles[0].car_brand, "Toyota");

    let vehicle = NewVehicle {
        user_email: DRIVER.to_string(),
        car_brand: "Honda".to_string(),
        car_model: "Civic".to_string(),
        car_year: 2021,
        car_color: "Red".to_string(),
        car_license_plate: "XYZ-789".to_string(),
    };
    gateway.add_vehicle(&vehicle, &driver).await.unwrap();

    let seen = stub.last();
    assert_eq!((seen.method.as_str(), seen.path.as_str()), ("POST", "/vehicles"));
    let body = stub.bodies.lock().unwrap().last().cloned().unwrap();
    assert_eq!(body["car_year"], 2021);
    assert_eq!(body["user_email"], DRIVER);
}

#[tokio::test]
async fn test_unreachable_backend_is_a_network_error() {
    // Grab a free port and close it again
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let gateway = gateway_for(&format!("http://{addr}"));
    let result = gateway.passenger_rides(&Actor::new(P1)).await;
    assert!(matches!(result, Err(GatewayError::Network(_))));
}
