use carpool_core::validation::{validate_form, FieldRules, ValidationError};
use carpool_core::{Actor, VehicleGateway};
use carpool_shared::{NewVehicle, Vehicle};
use std::sync::Arc;

use crate::screen::{ScreenError, ScreenState};

/// Add-vehicle form, as typed
#[derive(Debug, Clone, Default)]
pub struct VehicleForm {
    pub make: String,
    pub model: String,
    pub year: String,
    pub color: String,
    pub license_plate: String,
}

impl VehicleForm {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let fields = [
            ("make", self.make.as_str()),
            ("model", self.model.as_str()),
            ("year", self.year.as_str()),
            ("color", self.color.as_str()),
            ("licensePlate", self.license_plate.as_str()),
        ];
        let rules = [
            ("make", FieldRules::required()),
            ("model", FieldRules::required()),
            ("year", FieldRules::required().numeric()),
            ("color", FieldRules::required()),
            ("licensePlate", FieldRules::required()),
        ];
        validate_form(&fields, &rules)
    }

    /// Registration payload for `owner_email`
    pub fn to_new_vehicle(&self, owner_email: &str) -> Result<NewVehicle, ValidationError> {
        self.validate()?;
        let car_year = self
            .year
            .trim()
            .parse::<i32>()
            .map_err(|_| ValidationError("year must be a whole number".to_string()))?;

        Ok(NewVehicle {
            user_email: owner_email.to_string(),
            car_brand: self.make.trim().to_string(),
            car_model: self.model.trim().to_string(),
            car_year,
            car_color: self.color.trim().to_string(),
            car_license_plate: self.license_plate.trim().to_string(),
        })
    }
}

pub struct VehiclesScreen {
    gateway: Arc<dyn VehicleGateway>,
    actor: Actor,
    state: ScreenState<Vec<Vehicle>>,
}

impl VehiclesScreen {
    pub fn new(gateway: Arc<dyn VehicleGateway>, actor: Actor) -> Self {
        Self {
            gateway,
            actor,
            state: ScreenState::default(),
        }
    }

    pub async fn refresh(&mut self) {
        self.state.begin_loading();
        let result = self.gateway.list_vehicles(&self.actor).await;
        self.state.finish(result.map_err(ScreenError::from));
    }

    /// Validate, save, then reload the list. Returns the inline message on failure.
    pub async fn add(&mut self, form: &VehicleForm) -> Result<(), String> {
        let result = self.save(form).await;
        match result {
            Ok(()) => {
                self.refresh().await;
                Ok(())
            }
            Err(err) => Err(err.message()),
        }
    }

    async fn save(&self, form: &VehicleForm) -> Result<(), ScreenError> {
        let email = self.actor.email()?;
        let vehicle = form.to_new_vehicle(email)?;
        self.gateway.add_vehicle(&vehicle, &self.actor).await?;
        tracing::info!("Added vehicle {} {}", vehicle.car_brand, vehicle.car_model);
        Ok(())
    }

    pub fn state(&self) -> &ScreenState<Vec<Vehicle>> {
        &self.state
    }

    pub fn vehicles(&self) -> &[Vehicle] {
        self.state.value().map(Vec::as_slice).unwrap_or_default()
    }
}
