use log::debug;

use crate::client::ThermostatApi;
use crate::models::honeywell::{DeviceId, GroupId, LocationId, RoomId};
use crate::translate::drivers::{DeviceClass, DriverSet};
use crate::translate::state::{translate_sensor, TranslateError};
use crate::translate::units::TemperatureEncoding;

/// A room sensor reached through its parent thermostat's group.
#[derive(Debug, Clone)]
pub struct SensorNode {
    pub address: String,
    pub name: String,
    pub location_id: LocationId,
    pub device_id: DeviceId,
    pub group_id: GroupId,
    pub room_id: RoomId,
    pub class: DeviceClass,
    pub encoding: TemperatureEncoding,
    drivers: DriverSet,
}

impl SensorNode {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        address: String,
        name: String,
        location_id: LocationId,
        device_id: DeviceId,
        group_id: GroupId,
        room_id: RoomId,
        use_celsius: bool,
        encoding: TemperatureEncoding,
    ) -> Self {
        let class = DeviceClass::sensor(use_celsius);
        SensorNode {
            address,
            name,
            location_id,
            device_id,
            group_id,
            room_id,
            class,
            encoding,
            drivers: DriverSet::initial(class),
        }
    }

    pub fn drivers(&self) -> &DriverSet {
        &self.drivers
    }

    pub fn query(&mut self, api: &dyn ThermostatApi) -> Result<(), String> {
        let group = api
            .get_sensors(self.location_id, &self.device_id, self.group_id)
            .map_err(|e| format!("get_sensors({}, group {}) failed: {}", self.device_id.0, self.group_id.0, e))?;

        // Errors are reported by the caller; previous values stay in place.
        let drivers = translate_sensor(&group, self.room_id, self.class, self.encoding).map_err(|e| match e {
            TranslateError::SensorNotFound { .. } => format!("{}: {}; keeping last reported values", self.address, e),
            _ => format!("{}: sensor state rejected: {}", self.address, e),
        })?;

        for (driver, value) in drivers.iter() {
            if self.drivers.set(driver, value) {
                debug!("{}:{}: setDriver({}, {})", self.class.id(), self.address, driver, value);
            }
        }
        Ok(())
    }
}
