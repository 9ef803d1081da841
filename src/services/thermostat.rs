use chrono::Utc;
use log::{debug, info};

use crate::client::ThermostatApi;
use crate::models::honeywell::{DeviceId, LocationId};
use crate::translate::command::{translate_command, Command, CommandRequest, Mutation};
use crate::translate::drivers::{DeviceClass, Driver, DriverSet, DriverValue};
use crate::translate::state::{fetch_settled_thermostat, translate_thermostat, Backoff, ThermostatSnapshot};

/// One thermostat as exposed to the host.
#[derive(Debug, Clone)]
pub struct ThermostatNode {
    pub address: String,
    pub name: String,
    pub location_id: LocationId,
    pub device_id: DeviceId,
    pub class: DeviceClass,
    drivers: DriverSet,
}

impl ThermostatNode {
    pub fn new(address: String, name: String, location_id: LocationId, device_id: DeviceId, use_celsius: bool) -> Self {
        let class = DeviceClass::thermostat(use_celsius);
        ThermostatNode {
            address,
            name,
            location_id,
            device_id,
            class,
            drivers: DriverSet::initial(class),
        }
    }

    pub fn drivers(&self) -> &DriverSet {
        &self.drivers
    }

    fn set_driver(&mut self, driver: Driver, value: DriverValue) {
        if self.drivers.set(driver, value) {
            debug!("{}:{}: setDriver({}, {})", self.class.id(), self.address, driver, value);
        }
    }

    /// Fetch and translate current state. On failure previous values stay.
    pub fn query(&mut self, api: &dyn ThermostatApi, backoff: &dyn Backoff) -> Result<(), String> {
        let label = self.device_id.0.clone();
        let thermostat = fetch_settled_thermostat(&label, backoff, || {
            api.get_thermostat(self.location_id, &self.device_id)
        })
        .map_err(|e| format!("get_thermostat({}) failed: {}", label, e))?;

        let snapshot = ThermostatSnapshot::from(&thermostat);
        let drivers = translate_thermostat(&snapshot, self.class, Utc::now())
            .map_err(|e| format!("Thermostat {} state rejected: {}", label, e))?;
        for (driver, value) in drivers.iter() {
            self.set_driver(driver, value);
        }
        Ok(())
    }

    pub fn handle_command(
        &mut self,
        api: &dyn ThermostatApi,
        backoff: &dyn Backoff,
        request: &CommandRequest,
    ) -> Result<(), String> {
        let command = Command::parse(request).map_err(|e| format!("{}: {}", self.address, e))?;
        info!("{}: {} -> {}", self.address, command.driver(), request.value);

        let current = if command.needs_current_state() {
            let label = self.device_id.0.clone();
            let thermostat = fetch_settled_thermostat(&label, backoff, || {
                api.get_thermostat(self.location_id, &self.device_id)
            })
            .map_err(|e| format!("get_thermostat({}) failed: {}", label, e))?;
            Some(ThermostatSnapshot::from(&thermostat))
        } else {
            None
        };

        let translated = translate_command(&command, current.as_ref(), self.class)
            .map_err(|e| format!("{}: {}", self.address, e))?;

        match &translated.mutation {
            Mutation::Setpoint(update) => {
                debug!("{}: set_setpoint {:?}", self.address, update);
                api.set_setpoint(self.location_id, &self.device_id, update)
                    .map_err(|e| format!("set_setpoint({}) failed: {}", self.device_id.0, e))?;
            }
            Mutation::FanMode(update) => {
                debug!("{}: set_fan_mode {:?}", self.address, update);
                api.set_fan_mode(self.location_id, &self.device_id, update)
                    .map_err(|e| format!("set_fan_mode({}) failed: {}", self.device_id.0, e))?;
            }
        }

        // Fan mode is reported optimistically; everything else waits for the re-query.
        if let Command::SetFanMode(code) = command {
            self.set_driver(Driver::Clifs, code.into());
        }
        if translated.requery {
            self.query(api, backoff)?;
        }
        Ok(())
    }
}
