//! Models for the subset of the Honeywell Home (Resideo) v2 REST API this
//! bridge reads and writes.
//!
//! Notes
//! - Every response field is optional; the vendor omits fields freely.
//! - Enumerated values stay plain strings here. Mapping them to driver codes
//!   happens in `crate::translate::codec`, where unknown values are handled.

use serde::{Deserialize, Serialize};

// =====================
// Scalar ID newtype wrappers
// =====================

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocationId(pub i64);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(pub String);

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(pub i64);

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(pub i64);

// =====================
// Locations and thermostats
// =====================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    #[serde(rename = "locationID")]
    pub location_id: Option<LocationId>,
    pub name: Option<String>,
    pub devices: Option<Vec<Thermostat>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Thermostat {
    #[serde(rename = "deviceID")]
    pub device_id: Option<DeviceId>,
    pub user_defined_device_name: Option<String>,
    pub device_class: Option<String>, // "Thermostat" for the devices handled here
    pub device_model: Option<String>,
    pub units: Option<String>, // "Fahrenheit" | "Celsius"
    pub indoor_temperature: Option<f64>,
    pub indoor_humidity: Option<f64>,
    pub is_alive: Option<bool>,
    pub priority_type: Option<String>,
    pub schedule_status: Option<String>,
    pub changeable_values: Option<ChangeableValues>,
    pub operation_status: Option<OperationStatus>,
    pub settings: Option<ThermostatSettings>,
    pub current_schedule_period: Option<SchedulePeriod>,
    pub vacation_hold: Option<VacationHold>,
    pub groups: Option<Vec<Group>>,
}

impl Thermostat {
    pub fn uses_celsius(&self) -> bool {
        self.units.as_deref() == Some("Celsius")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ChangeableValues {
    pub mode: Option<String>,
    pub auto_changeover_active: Option<bool>,
    pub heat_setpoint: Option<f64>,
    pub cool_setpoint: Option<f64>,
    pub thermostat_setpoint_status: Option<String>,
    pub next_period_time: Option<String>, // HH:MM:SS
    pub heat_cool_mode: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct OperationStatus {
    pub mode: Option<String>,
    pub fan_request: Option<bool>,
    pub circulation_fan_request: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ThermostatSettings {
    pub fan: Option<FanSettings>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct FanSettings {
    pub allowed_modes: Option<Vec<String>>,
    pub changeable_values: Option<FanChangeableValues>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct FanChangeableValues {
    pub mode: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SchedulePeriod {
    pub day: Option<String>,
    pub period: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct VacationHold {
    pub enabled: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: Option<GroupId>,
}

// =====================
// Room sensors
// =====================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RoomGroup {
    pub device_id: Option<DeviceId>,
    pub group_id: Option<GroupId>,
    pub rooms: Option<Vec<Room>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: Option<RoomId>,
    pub name: Option<String>,
    pub avg_temperature: Option<f64>,
    pub avg_humidity: Option<f64>,
    pub accessories: Option<Vec<Accessory>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Accessory {
    pub accessory_id: Option<i64>,
    pub accessory_value: Option<AccessoryValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AccessoryValue {
    pub status: Option<String>,
    pub indoor_temperature: Option<f64>,
    pub indoor_humidity: Option<f64>,
    pub motion_det: Option<bool>,
    pub occupancy_det: Option<bool>,
    pub battery_status: Option<String>,
}

// =====================
// Mutation bodies
// =====================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateThermostat {
    pub mode: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_changeover_active: Option<bool>,
    pub heat_setpoint: f64,
    pub cool_setpoint: f64,
    pub thermostat_setpoint_status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_period_time: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFanMode {
    pub mode: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_body_uses_vendor_field_names() {
        let body = UpdateThermostat {
            mode: "Heat".into(),
            auto_changeover_active: Some(false),
            heat_setpoint: 68.0,
            cool_setpoint: 76.0,
            thermostat_setpoint_status: "TemporaryHold".into(),
            next_period_time: None,
        };
        let v = serde_json::to_value(&body).expect("serialize");
        assert_eq!(v["heatSetpoint"], 68.0);
        assert_eq!(v["thermostatSetpointStatus"], "TemporaryHold");
        assert_eq!(v["autoChangeoverActive"], false);
        assert!(v.get("nextPeriodTime").is_none());
    }

    #[test]
    fn ids_use_vendor_capitalisation() {
        let loc: Location =
            serde_json::from_str(r#"{"locationID": 42, "devices": [{"deviceID": "LCC-00D02DB1C2E3"}]}"#)
                .expect("parse");
        assert_eq!(loc.location_id, Some(LocationId(42)));
        let dev = &loc.devices.as_deref().unwrap_or_default()[0];
        assert_eq!(dev.device_id, Some(DeviceId("LCC-00D02DB1C2E3".into())));
    }
}
