//! In-memory `ThermostatApi` backed by the JSON fixtures under `tests/data`.
//! Writes are recorded and applied to the stored thermostat so a follow-up
//! query observes them.

use std::cell::{Cell, RefCell};

use crate::client::{decode_json, HoneywellClientError, ThermostatApi};
use crate::models::honeywell::*;
use crate::translate::state::Backoff;

pub const LOCATION: LocationId = LocationId(42);
/// Listed ahead of `LOCATION` and holds no thermostats.
pub const EMPTY_LOCATION: LocationId = LocationId(7);

/// Counts sleeps instead of sleeping.
#[derive(Default)]
pub struct NoBackoff(pub Cell<u32>);

impl Backoff for NoBackoff {
    fn sleep(&self, _duration: std::time::Duration) {
        self.0.set(self.0.get() + 1);
    }
}

pub struct FakeApi {
    pub thermostats: RefCell<Vec<Thermostat>>,
    pub groups: RefCell<Vec<RoomGroup>>,
    pub failing_devices: RefCell<Vec<DeviceId>>,
    pub failing_groups: RefCell<Vec<GroupId>>,
    pub failing_locations: RefCell<Vec<LocationId>>,
    /// Upcoming thermostat reads that report both setpoints as 0.
    pub zero_setpoint_reads: Cell<u32>,
    pub setpoint_writes: RefCell<Vec<UpdateThermostat>>,
    pub fan_writes: RefCell<Vec<UpdateFanMode>>,
    pub thermostat_fetches: Cell<u32>,
}

fn fixture<T: serde::de::DeserializeOwned>(name: &str) -> T {
    let file = std::fs::File::open(format!("tests/data/{}", name)).expect("fixture present");
    decode_json(file).expect("fixture parses")
}

fn unavailable(what: &str) -> HoneywellClientError {
    HoneywellClientError::Http {
        status: 503,
        message: format!("{} unavailable", what),
    }
}

impl FakeApi {
    /// One location holding the fixture thermostat and its room group.
    pub fn from_fixtures() -> Self {
        FakeApi {
            thermostats: RefCell::new(vec![fixture("thermostat.json")]),
            groups: RefCell::new(vec![fixture("rooms.json")]),
            failing_devices: RefCell::new(Vec::new()),
            failing_groups: RefCell::new(Vec::new()),
            failing_locations: RefCell::new(Vec::new()),
            zero_setpoint_reads: Cell::new(0),
            setpoint_writes: RefCell::new(Vec::new()),
            fan_writes: RefCell::new(Vec::new()),
            thermostat_fetches: Cell::new(0),
        }
    }

    pub fn device_id() -> DeviceId {
        DeviceId("LCC-00D02DB1C2E3".into())
    }

    pub fn edit_thermostat(&self, device_id: &DeviceId, edit: impl FnOnce(&mut Thermostat)) {
        let mut thermostats = self.thermostats.borrow_mut();
        if let Some(t) = thermostats.iter_mut().find(|t| t.device_id.as_ref() == Some(device_id)) {
            edit(t);
        }
    }
}

impl ThermostatApi for FakeApi {
    fn get_locations(&self) -> Result<Vec<Location>, HoneywellClientError> {
        Ok(vec![
            Location {
                location_id: Some(EMPTY_LOCATION),
                name: Some("Cabin".into()),
                devices: None,
            },
            Location {
                location_id: Some(LOCATION),
                name: Some("Home".into()),
                devices: None,
            },
        ])
    }

    fn get_thermostats(&self, location_id: LocationId) -> Result<Vec<Thermostat>, HoneywellClientError> {
        if self.failing_locations.borrow().contains(&location_id) {
            return Err(unavailable(&format!("location {}", location_id.0)));
        }
        if location_id != LOCATION {
            return Ok(Vec::new());
        }
        Ok(self.thermostats.borrow().clone())
    }

    fn get_thermostat(&self, location_id: LocationId, device_id: &DeviceId) -> Result<Thermostat, HoneywellClientError> {
        self.thermostat_fetches.set(self.thermostat_fetches.get() + 1);
        if location_id != LOCATION || self.failing_devices.borrow().contains(device_id) {
            return Err(unavailable(&device_id.0));
        }
        let mut thermostat = self
            .thermostats
            .borrow()
            .iter()
            .find(|t| t.device_id.as_ref() == Some(device_id))
            .cloned()
            .ok_or_else(|| HoneywellClientError::Http {
                status: 404,
                message: format!("no thermostat {}", device_id.0),
            })?;
        let zero_reads = self.zero_setpoint_reads.get();
        if zero_reads > 0 {
            self.zero_setpoint_reads.set(zero_reads - 1);
            let mut cv = thermostat.changeable_values.take().unwrap_or_default();
            cv.heat_setpoint = Some(0.0);
            cv.cool_setpoint = Some(0.0);
            thermostat.changeable_values = Some(cv);
        }
        Ok(thermostat)
    }

    fn get_sensors(
        &self,
        _location_id: LocationId,
        device_id: &DeviceId,
        group_id: GroupId,
    ) -> Result<RoomGroup, HoneywellClientError> {
        if self.failing_groups.borrow().contains(&group_id) {
            return Err(unavailable(&format!("group {}", group_id.0)));
        }
        self.groups
            .borrow()
            .iter()
            .find(|g| g.device_id.as_ref() == Some(device_id) && g.group_id == Some(group_id))
            .cloned()
            .ok_or_else(|| HoneywellClientError::Http {
                status: 404,
                message: format!("no group {}", group_id.0),
            })
    }

    fn set_setpoint(
        &self,
        _location_id: LocationId,
        device_id: &DeviceId,
        update: &UpdateThermostat,
    ) -> Result<(), HoneywellClientError> {
        self.setpoint_writes.borrow_mut().push(update.clone());
        self.edit_thermostat(device_id, |t| {
            let mut cv = t.changeable_values.clone().unwrap_or_default();
            cv.mode = Some(update.mode.clone());
            cv.heat_setpoint = Some(update.heat_setpoint);
            cv.cool_setpoint = Some(update.cool_setpoint);
            cv.thermostat_setpoint_status = Some(update.thermostat_setpoint_status.clone());
            t.changeable_values = Some(cv);
        });
        Ok(())
    }

    fn set_fan_mode(
        &self,
        _location_id: LocationId,
        device_id: &DeviceId,
        update: &UpdateFanMode,
    ) -> Result<(), HoneywellClientError> {
        self.fan_writes.borrow_mut().push(update.clone());
        self.edit_thermostat(device_id, |t| {
            t.settings = Some(ThermostatSettings {
                fan: Some(FanSettings {
                    allowed_modes: None,
                    changeable_values: Some(FanChangeableValues {
                        mode: Some(update.mode.clone()),
                    }),
                }),
            });
        });
        Ok(())
    }
}
