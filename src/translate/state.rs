//! Vendor state to driver values.
//!
//! A translation either yields every driver of the device class, in class
//! order, or fails as a whole. Optional vendor fields are resolved to their
//! defaults by the small `*_code` functions below rather than inline.

use chrono::{DateTime, Utc};
use core::fmt;
use log::warn;
use std::error::Error;
use std::thread;
use std::time::Duration;

use crate::models::honeywell::{GroupId, Room, RoomGroup, RoomId, SchedulePeriod, Thermostat};
use crate::translate::codec::{self, EnumDomain, UnknownEnumValue};
use crate::translate::drivers::{DeviceClass, Driver, DriverSet, DriverValue};
use crate::translate::units::{convert_temperature, to_driver_value, TemperatureEncoding, TemperatureUnit};

/// Fetches made before a zero heat+cool reading is accepted.
pub const ZERO_SETPOINT_ATTEMPTS: u32 = 10;
/// Backoff before retry `n` is `n * ZERO_SETPOINT_BACKOFF_STEP`.
pub const ZERO_SETPOINT_BACKOFF_STEP: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, PartialEq)]
pub enum TranslateError {
    UnknownEnum(UnknownEnumValue),
    /// The room is not (or no longer) part of the fetched group.
    SensorNotFound { room_id: RoomId, group_id: Option<GroupId> },
    MissingAccessory(RoomId),
    WrongClass(DeviceClass),
}

impl fmt::Display for TranslateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TranslateError::UnknownEnum(e) => write!(f, "{}", e),
            TranslateError::SensorNotFound { room_id, group_id } => match group_id {
                Some(g) => write!(f, "sensor {} in group {} doesn't exist", room_id.0, g.0),
                None => write!(f, "sensor {} doesn't exist", room_id.0),
            },
            TranslateError::MissingAccessory(r) => write!(f, "room {} has no accessory block", r.0),
            TranslateError::WrongClass(c) => write!(f, "device class {} does not fit this snapshot", c.id()),
        }
    }
}

impl Error for TranslateError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            TranslateError::UnknownEnum(e) => Some(e),
            _ => None,
        }
    }
}

impl From<UnknownEnumValue> for TranslateError {
    fn from(value: UnknownEnumValue) -> Self {
        TranslateError::UnknownEnum(value)
    }
}

// =====================
// Snapshots
// =====================

/// The thermostat fields one translation needs.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ThermostatSnapshot {
    pub units: Option<TemperatureUnit>,
    pub indoor_temperature: Option<f64>,
    pub indoor_humidity: Option<f64>,
    pub heat_setpoint: Option<f64>,
    pub cool_setpoint: Option<f64>,
    pub mode: Option<String>,
    pub auto_changeover_active: Option<bool>,
    pub hold_status: Option<String>,
    pub next_period_time: Option<String>,
    pub fan_mode: Option<String>,
    pub running_state: Option<String>,
    pub fan_request: Option<bool>,
    pub circulation_fan_request: Option<bool>,
    pub priority_type: Option<String>,
    pub schedule_status: Option<String>,
    pub schedule_period: Option<SchedulePeriod>,
    pub vacation_hold: Option<bool>,
    pub is_alive: Option<bool>,
}

impl From<&Thermostat> for ThermostatSnapshot {
    fn from(t: &Thermostat) -> Self {
        let cv = t.changeable_values.clone().unwrap_or_default();
        let op = t.operation_status.clone().unwrap_or_default();
        let fan_mode = t
            .settings
            .as_ref()
            .and_then(|s| s.fan.as_ref())
            .and_then(|f| f.changeable_values.as_ref())
            .and_then(|c| c.mode.clone());

        ThermostatSnapshot {
            units: t.units.as_deref().and_then(TemperatureUnit::parse),
            indoor_temperature: t.indoor_temperature,
            indoor_humidity: t.indoor_humidity,
            heat_setpoint: cv.heat_setpoint,
            cool_setpoint: cv.cool_setpoint,
            mode: cv.mode,
            auto_changeover_active: cv.auto_changeover_active,
            hold_status: cv.thermostat_setpoint_status,
            next_period_time: cv.next_period_time,
            fan_mode,
            running_state: op.mode,
            fan_request: op.fan_request,
            circulation_fan_request: op.circulation_fan_request,
            priority_type: t.priority_type.clone(),
            schedule_status: t.schedule_status.clone(),
            schedule_period: t.current_schedule_period.clone(),
            vacation_hold: t.vacation_hold.as_ref().and_then(|v| v.enabled),
            is_alive: t.is_alive,
        }
    }
}

impl ThermostatSnapshot {
    /// Both setpoints read back as exactly zero, which the vendor reports briefly after a write.
    /// Absent setpoints do not count.
    pub fn has_transient_zero_setpoints(&self) -> bool {
        self.heat_setpoint == Some(0.0) && self.cool_setpoint == Some(0.0)
    }
}

/// One room's sensor fields.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SensorSnapshot {
    pub room_id: Option<RoomId>,
    pub status: Option<String>,
    pub indoor_temperature: Option<f64>,
    pub indoor_humidity: Option<f64>,
    pub avg_temperature: Option<f64>,
    pub avg_humidity: Option<f64>,
    pub motion: Option<bool>,
    pub occupancy: Option<bool>,
    pub battery_status: Option<String>,
}

impl SensorSnapshot {
    /// Uses the first accessory block of the room.
    pub fn from_room(room: &Room) -> Result<Self, TranslateError> {
        let room_id = room.id.unwrap_or(RoomId(-1));
        let value = room
            .accessories
            .as_deref()
            .and_then(|a| a.first())
            .ok_or(TranslateError::MissingAccessory(room_id))?
            .accessory_value
            .clone()
            .unwrap_or_default();

        Ok(SensorSnapshot {
            room_id: room.id,
            status: value.status,
            indoor_temperature: value.indoor_temperature,
            indoor_humidity: value.indoor_humidity,
            avg_temperature: room.avg_temperature,
            avg_humidity: room.avg_humidity,
            motion: value.motion_det,
            occupancy: value.occupancy_det,
            battery_status: value.battery_status,
        })
    }
}

/// Pick one room out of a group response.
pub fn find_sensor(group: &RoomGroup, room_id: RoomId) -> Result<SensorSnapshot, TranslateError> {
    let room = group
        .rooms
        .as_deref()
        .unwrap_or_default()
        .iter()
        .find(|r| r.id == Some(room_id))
        .ok_or(TranslateError::SensorNotFound {
            room_id,
            group_id: group.group_id,
        })?;
    SensorSnapshot::from_room(room)
}

// =====================
// Optional-field defaults
// =====================

/// Absent flags read as off.
pub fn flag_code(flag: Option<bool>) -> DriverValue {
    DriverValue::from(flag.unwrap_or(false))
}

/// Absent priority type reads as NotSupported.
pub fn priority_type_code(priority: Option<&str>) -> Result<i32, UnknownEnumValue> {
    codec::encode(EnumDomain::PriorityType, priority)
}

/// No current period reads as NotSupported; a period name outside the table
/// (or a period block without a name) reads as Custom.
pub fn schedule_period_code(period: Option<&SchedulePeriod>) -> Result<i32, UnknownEnumValue> {
    match period {
        None => codec::encode(EnumDomain::SchedulePeriod, Some("NotSupported")),
        Some(p) => match p.period.as_deref() {
            Some(name) if codec::SCHEDULE_PERIOD.entries.iter().any(|(n, _)| *n == name) => {
                codec::encode(EnumDomain::SchedulePeriod, Some(name))
            }
            _ => codec::encode(EnumDomain::SchedulePeriod, Some("Custom")),
        },
    }
}

/// Fan is considered running when either request flag is set.
pub fn fan_running_code(fan_request: Option<bool>, circulation_fan_request: Option<bool>) -> DriverValue {
    flag_code(Some(fan_request.unwrap_or(false) || circulation_fan_request.unwrap_or(false)))
}

// =====================
// Translation
// =====================

pub fn translate_thermostat(
    snapshot: &ThermostatSnapshot,
    class: DeviceClass,
    polled_at: DateTime<Utc>,
) -> Result<DriverSet, TranslateError> {
    if !matches!(class, DeviceClass::ThermostatF | DeviceClass::ThermostatC) {
        return Err(TranslateError::WrongClass(class));
    }
    let unit = TemperatureUnit::from_celsius_flag(class.use_celsius());
    let source = snapshot.units.unwrap_or(unit);
    let temp = |v: Option<f64>| v.map(|v| convert_temperature(v, source, unit));

    class
        .drivers()
        .iter()
        .map(|spec| -> Result<(Driver, DriverValue), TranslateError> {
            let value = match spec.driver {
                Driver::St => to_driver_value(temp(snapshot.indoor_temperature), false),
                Driver::Clisph => to_driver_value(temp(snapshot.heat_setpoint), true),
                Driver::Clispc => to_driver_value(temp(snapshot.cool_setpoint), true),
                Driver::Climd => codec::encode(EnumDomain::Mode, snapshot.mode.as_deref())?.into(),
                Driver::Clifs => codec::encode(EnumDomain::FanMode, snapshot.fan_mode.as_deref())?.into(),
                Driver::Clihum => to_driver_value(snapshot.indoor_humidity, false),
                Driver::Clihcs => codec::encode(EnumDomain::RunningState, snapshot.running_state.as_deref())?.into(),
                Driver::Clifrs => fan_running_code(snapshot.fan_request, snapshot.circulation_fan_request),
                Driver::Gv1 => priority_type_code(snapshot.priority_type.as_deref())?.into(),
                Driver::Gv2 => codec::encode(EnumDomain::ScheduleStatus, snapshot.schedule_status.as_deref())?.into(),
                Driver::Gv3 => schedule_period_code(snapshot.schedule_period.as_ref())?.into(),
                Driver::Gv4 => codec::encode(EnumDomain::HoldStatus, snapshot.hold_status.as_deref())?.into(),
                Driver::Gv5 => flag_code(snapshot.vacation_hold),
                Driver::Gv6 => flag_code(snapshot.is_alive),
                Driver::Gv7 => DriverValue::Integer(polled_at.timestamp()),
                Driver::Gv0 => return Err(TranslateError::WrongClass(class)),
            };
            Ok((spec.driver, value))
        })
        .collect()
}

pub fn translate_sensor_snapshot(
    snapshot: &SensorSnapshot,
    class: DeviceClass,
    encoding: TemperatureEncoding,
) -> Result<DriverSet, TranslateError> {
    if !matches!(class, DeviceClass::SensorF | DeviceClass::SensorC) {
        return Err(TranslateError::WrongClass(class));
    }

    class
        .drivers()
        .iter()
        .map(|spec| -> Result<(Driver, DriverValue), TranslateError> {
            let value = match spec.driver {
                Driver::Gv0 => codec::encode(EnumDomain::SensorStatus, snapshot.status.as_deref())?.into(),
                Driver::St => to_driver_value(encoding.decode(snapshot.indoor_temperature), false),
                Driver::Gv1 => to_driver_value(encoding.decode(snapshot.avg_temperature), false),
                Driver::Clihum => to_driver_value(snapshot.indoor_humidity, true),
                Driver::Gv2 => to_driver_value(snapshot.avg_humidity, true),
                Driver::Gv3 => flag_code(snapshot.motion),
                Driver::Gv4 => flag_code(snapshot.occupancy),
                Driver::Gv5 => codec::encode(EnumDomain::BatteryStatus, snapshot.battery_status.as_deref())?.into(),
                _ => return Err(TranslateError::WrongClass(class)),
            };
            Ok((spec.driver, value))
        })
        .collect()
}

/// Locate `room_id` in a group response and translate it.
pub fn translate_sensor(
    group: &RoomGroup,
    room_id: RoomId,
    class: DeviceClass,
    encoding: TemperatureEncoding,
) -> Result<DriverSet, TranslateError> {
    let snapshot = find_sensor(group, room_id)?;
    translate_sensor_snapshot(&snapshot, class, encoding)
}

// =====================
// Zero-setpoint guard
// =====================

pub trait Backoff {
    fn sleep(&self, duration: Duration);
}

pub struct ThreadBackoff;

impl Backoff for ThreadBackoff {
    fn sleep(&self, duration: Duration) {
        thread::sleep(duration);
    }
}

/// Fetch a thermostat, re-fetching while both setpoints read zero.
///
/// Gives up after `ZERO_SETPOINT_ATTEMPTS` fetches and returns the last
/// reading as-is. Fetch errors are returned immediately.
pub fn fetch_settled_thermostat<F, E>(label: &str, backoff: &dyn Backoff, mut fetch: F) -> Result<Thermostat, E>
where
    F: FnMut() -> Result<Thermostat, E>,
{
    let mut attempt: u32 = 1;
    loop {
        let thermostat = fetch()?;
        if !ThermostatSnapshot::from(&thermostat).has_transient_zero_setpoints() {
            return Ok(thermostat);
        }
        if attempt >= ZERO_SETPOINT_ATTEMPTS {
            warn!(
                "Thermostat {} still reports zero heat/cool setpoints after {} attempts; accepting",
                label, attempt
            );
            return Ok(thermostat);
        }
        warn!(
            "Refreshing thermostat {} returned invalid heat/cool setpoints. Retry request #{}",
            label, attempt
        );
        backoff.sleep(ZERO_SETPOINT_BACKOFF_STEP * attempt);
        attempt += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::decode_json;
    use crate::models::honeywell::{ChangeableValues, VacationHold};
    use chrono::TimeZone;
    use std::cell::RefCell;

    fn thermostat_fixture() -> Thermostat {
        let file = std::fs::File::open("tests/data/thermostat.json").expect("fixture present");
        decode_json(file).expect("parse thermostat")
    }

    fn rooms_fixture() -> RoomGroup {
        let file = std::fs::File::open("tests/data/rooms.json").expect("fixture present");
        decode_json(file).expect("parse rooms")
    }

    fn polled_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn thermostat_fixture_translates_completely() {
        let snap = ThermostatSnapshot::from(&thermostat_fixture());
        let set = translate_thermostat(&snap, DeviceClass::ThermostatF, polled_at()).expect("translate");

        assert_eq!(set.len(), DeviceClass::ThermostatF.drivers().len());
        let order: Vec<Driver> = set.iter().map(|(d, _)| d).collect();
        let declared: Vec<Driver> = DeviceClass::ThermostatF.drivers().iter().map(|s| s.driver).collect();
        assert_eq!(order, declared);

        assert_eq!(set.get(Driver::St), Some(DriverValue::Decimal(71.5)));
        assert_eq!(set.get(Driver::Clisph), Some(DriverValue::Integer(68)));
        assert_eq!(set.get(Driver::Clispc), Some(DriverValue::Integer(76)));
        assert_eq!(set.get(Driver::Climd), Some(DriverValue::Integer(1)));
        assert_eq!(set.get(Driver::Clifs), Some(DriverValue::Integer(6)));
        assert_eq!(set.get(Driver::Clihum), Some(DriverValue::Decimal(41.0)));
        assert_eq!(set.get(Driver::Clihcs), Some(DriverValue::Integer(1)));
        assert_eq!(set.get(Driver::Clifrs), Some(DriverValue::Integer(1)));
        assert_eq!(set.get(Driver::Gv1), Some(DriverValue::Integer(3)));
        assert_eq!(set.get(Driver::Gv2), Some(DriverValue::Integer(1)));
        assert_eq!(set.get(Driver::Gv3), Some(DriverValue::Integer(3)));
        assert_eq!(set.get(Driver::Gv4), Some(DriverValue::Integer(3)));
        assert_eq!(set.get(Driver::Gv5), Some(DriverValue::Integer(0)));
        assert_eq!(set.get(Driver::Gv6), Some(DriverValue::Integer(1)));
        assert_eq!(set.get(Driver::Gv7), Some(DriverValue::Integer(polled_at().timestamp())));
    }

    #[test]
    fn absent_optional_fields_use_defaults() {
        let snap = ThermostatSnapshot {
            mode: Some("Off".into()),
            fan_mode: Some("Auto".into()),
            running_state: Some("EquipmentOff".into()),
            schedule_status: Some("Resume".into()),
            hold_status: Some("NoHold".into()),
            ..Default::default()
        };
        let set = translate_thermostat(&snap, DeviceClass::ThermostatC, polled_at()).expect("translate");
        assert_eq!(set.get(Driver::Gv1), Some(DriverValue::Integer(0)));
        assert_eq!(set.get(Driver::Gv3), Some(DriverValue::Integer(0)));
        assert_eq!(set.get(Driver::Gv5), Some(DriverValue::Integer(0)));
        assert_eq!(set.get(Driver::Gv6), Some(DriverValue::Integer(0)));
        assert_eq!(set.get(Driver::Clifrs), Some(DriverValue::Integer(0)));
        assert_eq!(set.get(Driver::St), Some(DriverValue::Decimal(0.0)));
    }

    #[test]
    fn unlisted_schedule_period_reads_as_custom() {
        let named = |p: &str| SchedulePeriod {
            day: Some("Monday".into()),
            period: Some(p.into()),
        };
        assert_eq!(schedule_period_code(None), Ok(0));
        assert_eq!(schedule_period_code(Some(&named("Sleep"))), Ok(4));
        assert_eq!(schedule_period_code(Some(&named("P7"))), Ok(5));
        assert_eq!(schedule_period_code(Some(&SchedulePeriod::default())), Ok(5));
        // a listed name keeps its own code, NotSupported included
        assert_eq!(schedule_period_code(Some(&named("NotSupported"))), Ok(0));
        assert_eq!(schedule_period_code(Some(&named("Custom"))), Ok(5));
    }

    #[test]
    fn unknown_mode_fails_the_whole_snapshot() {
        let mut t = thermostat_fixture();
        t.changeable_values = Some(ChangeableValues {
            mode: Some("EmergencyHeat".into()),
            ..t.changeable_values.clone().unwrap_or_default()
        });
        let err = translate_thermostat(&ThermostatSnapshot::from(&t), DeviceClass::ThermostatF, polled_at())
            .expect_err("unknown mode");
        assert!(matches!(err, TranslateError::UnknownEnum(_)));
    }

    #[test]
    fn vacation_hold_flag_is_carried() {
        let mut t = thermostat_fixture();
        t.vacation_hold = Some(VacationHold { enabled: Some(true) });
        let set = translate_thermostat(&ThermostatSnapshot::from(&t), DeviceClass::ThermostatF, polled_at())
            .expect("translate");
        assert_eq!(set.get(Driver::Gv5), Some(DriverValue::Integer(1)));
    }

    #[test]
    fn fahrenheit_readings_convert_for_celsius_class() {
        let snap = ThermostatSnapshot::from(&thermostat_fixture());
        let set = translate_thermostat(&snap, DeviceClass::ThermostatC, polled_at()).expect("translate");
        assert_eq!(set.get(Driver::Clisph), Some(DriverValue::Integer(20)));
        assert_eq!(set.get(Driver::Clispc), Some(DriverValue::Integer(24)));
    }

    #[test]
    fn sensor_class_is_rejected_for_thermostats() {
        let snap = ThermostatSnapshot::from(&thermostat_fixture());
        let err = translate_thermostat(&snap, DeviceClass::SensorF, polled_at()).expect_err("wrong class");
        assert_eq!(err, TranslateError::WrongClass(DeviceClass::SensorF));
    }

    #[test]
    fn sensor_fixture_translates() {
        let set = translate_sensor(&rooms_fixture(), RoomId(1), DeviceClass::SensorF, TemperatureEncoding::Degrees)
            .expect("translate");
        assert_eq!(set.len(), 8);
        assert_eq!(set.get(Driver::Gv0), Some(DriverValue::Integer(1)));
        assert_eq!(set.get(Driver::St), Some(DriverValue::Decimal(69.8)));
        assert_eq!(set.get(Driver::Gv1), Some(DriverValue::Decimal(70.3)));
        assert_eq!(set.get(Driver::Clihum), Some(DriverValue::Integer(38)));
        assert_eq!(set.get(Driver::Gv2), Some(DriverValue::Integer(40)));
        assert_eq!(set.get(Driver::Gv3), Some(DriverValue::Integer(1)));
        assert_eq!(set.get(Driver::Gv4), Some(DriverValue::Integer(0)));
        assert_eq!(set.get(Driver::Gv5), Some(DriverValue::Integer(2)));
    }

    #[test]
    fn sensor_unknown_status_and_battery_fall_back() {
        let set = translate_sensor(&rooms_fixture(), RoomId(2), DeviceClass::SensorC, TemperatureEncoding::Degrees)
            .expect("translate");
        assert_eq!(set.get(Driver::Gv0), Some(DriverValue::Integer(0)));
        assert_eq!(set.get(Driver::Gv5), Some(DriverValue::Integer(0)));
    }

    #[test]
    fn sensor_tenths_encoding() {
        let snap = SensorSnapshot {
            indoor_temperature: Some(698.0),
            avg_temperature: Some(0.0),
            ..Default::default()
        };
        let set = translate_sensor_snapshot(&snap, DeviceClass::SensorF, TemperatureEncoding::Tenths).expect("translate");
        assert_eq!(set.get(Driver::St), Some(DriverValue::Decimal(69.8)));
        assert_eq!(set.get(Driver::Gv1), Some(DriverValue::Decimal(0.0)));
    }

    #[test]
    fn missing_sensor_is_reported() {
        let err = translate_sensor(&rooms_fixture(), RoomId(9), DeviceClass::SensorF, TemperatureEncoding::Degrees)
            .expect_err("missing");
        assert_eq!(
            err,
            TranslateError::SensorNotFound {
                room_id: RoomId(9),
                group_id: Some(GroupId(0)),
            }
        );
    }

    #[test]
    fn room_without_accessories_is_an_error() {
        let group = RoomGroup {
            rooms: Some(vec![Room {
                id: Some(RoomId(4)),
                accessories: Some(vec![]),
                ..Default::default()
            }]),
            ..Default::default()
        };
        let err = find_sensor(&group, RoomId(4)).expect_err("no accessory");
        assert_eq!(err, TranslateError::MissingAccessory(RoomId(4)));
    }

    struct RecordingBackoff(RefCell<Vec<Duration>>);

    impl Backoff for RecordingBackoff {
        fn sleep(&self, duration: Duration) {
            self.0.borrow_mut().push(duration);
        }
    }

    fn with_setpoints(heat: f64, cool: f64) -> Thermostat {
        let mut t = thermostat_fixture();
        let mut cv = t.changeable_values.clone().unwrap_or_default();
        cv.heat_setpoint = Some(heat);
        cv.cool_setpoint = Some(cool);
        t.changeable_values = Some(cv);
        t
    }

    #[test]
    fn zero_setpoints_are_retried_with_linear_backoff() {
        let backoff = RecordingBackoff(RefCell::new(Vec::new()));
        let mut calls = 0;
        let t = fetch_settled_thermostat::<_, String>("t1", &backoff, || {
            calls += 1;
            Ok(if calls <= 3 { with_setpoints(0.0, 0.0) } else { with_setpoints(67.0, 75.0) })
        })
        .expect("fetch");

        assert_eq!(calls, 4);
        assert_eq!(t.changeable_values.and_then(|c| c.heat_setpoint), Some(67.0));
        assert_eq!(
            *backoff.0.borrow(),
            vec![Duration::from_millis(500), Duration::from_millis(1000), Duration::from_millis(1500)]
        );
    }

    #[test]
    fn zero_setpoints_are_accepted_after_ten_attempts() {
        let backoff = RecordingBackoff(RefCell::new(Vec::new()));
        let mut calls = 0;
        let t = fetch_settled_thermostat::<_, String>("t1", &backoff, || {
            calls += 1;
            Ok(with_setpoints(0.0, 0.0))
        })
        .expect("fetch");

        assert_eq!(calls, ZERO_SETPOINT_ATTEMPTS);
        assert_eq!(backoff.0.borrow().len(), 9);
        assert!(ThermostatSnapshot::from(&t).has_transient_zero_setpoints());
    }

    #[test]
    fn single_zero_setpoint_is_not_retried() {
        let backoff = RecordingBackoff(RefCell::new(Vec::new()));
        let mut calls = 0;
        fetch_settled_thermostat::<_, String>("t1", &backoff, || {
            calls += 1;
            Ok(with_setpoints(0.0, 75.0))
        })
        .expect("fetch");
        assert_eq!(calls, 1);
        assert!(backoff.0.borrow().is_empty());
    }

    #[test]
    fn near_zero_setpoints_are_not_retried() {
        let backoff = RecordingBackoff(RefCell::new(Vec::new()));
        let mut calls = 0;
        fetch_settled_thermostat::<_, String>("t1", &backoff, || {
            calls += 1;
            Ok(with_setpoints(0.4, 0.0))
        })
        .expect("fetch");
        assert_eq!(calls, 1);
        assert!(!ThermostatSnapshot::default().has_transient_zero_setpoints());
    }

    #[test]
    fn fetch_errors_stop_the_guard() {
        let backoff = RecordingBackoff(RefCell::new(Vec::new()));
        let res = fetch_settled_thermostat("t1", &backoff, || Err::<Thermostat, _>("offline".to_string()));
        assert_eq!(res, Err("offline".to_string()));
    }
}
