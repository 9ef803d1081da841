//! Driver (host attribute) names, value kinds and per-class driver tables.

use core::fmt;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Driver {
    St,
    Clisph,
    Clispc,
    Climd,
    Clifs,
    Clihum,
    Clihcs,
    Clifrs,
    Gv0,
    Gv1,
    Gv2,
    Gv3,
    Gv4,
    Gv5,
    Gv6,
    Gv7,
}

impl Driver {
    pub fn as_str(self) -> &'static str {
        match self {
            Driver::St => "ST",
            Driver::Clisph => "CLISPH",
            Driver::Clispc => "CLISPC",
            Driver::Climd => "CLIMD",
            Driver::Clifs => "CLIFS",
            Driver::Clihum => "CLIHUM",
            Driver::Clihcs => "CLIHCS",
            Driver::Clifrs => "CLIFRS",
            Driver::Gv0 => "GV0",
            Driver::Gv1 => "GV1",
            Driver::Gv2 => "GV2",
            Driver::Gv3 => "GV3",
            Driver::Gv4 => "GV4",
            Driver::Gv5 => "GV5",
            Driver::Gv6 => "GV6",
            Driver::Gv7 => "GV7",
        }
    }

    pub fn parse(name: &str) -> Option<Driver> {
        const ALL: [Driver; 16] = [
            Driver::St,
            Driver::Clisph,
            Driver::Clispc,
            Driver::Climd,
            Driver::Clifs,
            Driver::Clihum,
            Driver::Clihcs,
            Driver::Clifrs,
            Driver::Gv0,
            Driver::Gv1,
            Driver::Gv2,
            Driver::Gv3,
            Driver::Gv4,
            Driver::Gv5,
            Driver::Gv6,
            Driver::Gv7,
        ];
        ALL.into_iter().find(|d| d.as_str().eq_ignore_ascii_case(name.trim()))
    }
}

impl fmt::Display for Driver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum DriverValue {
    Integer(i64),
    /// One decimal place.
    Decimal(f64),
}

impl DriverValue {
    pub fn as_f64(self) -> f64 {
        match self {
            DriverValue::Integer(v) => v as f64,
            DriverValue::Decimal(v) => v,
        }
    }

    pub fn is_zero(self) -> bool {
        self.as_f64() == 0.0
    }
}

impl From<bool> for DriverValue {
    fn from(value: bool) -> Self {
        DriverValue::Integer(value as i64)
    }
}

impl From<i32> for DriverValue {
    fn from(value: i32) -> Self {
        DriverValue::Integer(value as i64)
    }
}

impl fmt::Display for DriverValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriverValue::Integer(v) => write!(f, "{}", v),
            DriverValue::Decimal(v) => write!(f, "{:.1}", v),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ValueKind {
    Integer,
    Decimal,
    Enum,
    Boolean,
    Epoch,
}

impl ValueKind {
    pub fn zero(self) -> DriverValue {
        match self {
            ValueKind::Decimal => DriverValue::Decimal(0.0),
            _ => DriverValue::Integer(0),
        }
    }
}

/// Host unit-of-measure tags.
pub mod uom {
    pub const BOOLEAN: u16 = 2;
    pub const CELSIUS: u16 = 4;
    pub const FAHRENHEIT: u16 = 17;
    pub const HUMIDITY: u16 = 22;
    pub const INDEX: u16 = 25;
    pub const HEAT_COOL_STATE: u16 = 66;
    pub const THERMOSTAT_MODE: u16 = 67;
    pub const FAN_MODE: u16 = 68;
    pub const FAN_RUNNING_STATE: u16 = 80;
    pub const EPOCH: u16 = 110;
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct DriverSpec {
    pub driver: Driver,
    pub uom: u16,
    pub kind: ValueKind,
}

const fn spec(driver: Driver, uom: u16, kind: ValueKind) -> DriverSpec {
    DriverSpec { driver, uom, kind }
}

macro_rules! thermostat_drivers {
    ($temp:expr) => {
        [
            spec(Driver::St, $temp, ValueKind::Decimal),
            spec(Driver::Clisph, $temp, ValueKind::Integer),
            spec(Driver::Clispc, $temp, ValueKind::Integer),
            spec(Driver::Climd, uom::THERMOSTAT_MODE, ValueKind::Enum),
            spec(Driver::Clifs, uom::FAN_MODE, ValueKind::Enum),
            spec(Driver::Clihum, uom::HUMIDITY, ValueKind::Decimal),
            spec(Driver::Clihcs, uom::HEAT_COOL_STATE, ValueKind::Enum),
            spec(Driver::Clifrs, uom::FAN_RUNNING_STATE, ValueKind::Boolean),
            spec(Driver::Gv1, uom::INDEX, ValueKind::Enum), // priority type
            spec(Driver::Gv2, uom::INDEX, ValueKind::Enum), // schedule status
            spec(Driver::Gv3, uom::INDEX, ValueKind::Enum), // schedule period
            spec(Driver::Gv4, uom::INDEX, ValueKind::Enum), // hold status
            spec(Driver::Gv5, uom::BOOLEAN, ValueKind::Boolean), // vacation hold
            spec(Driver::Gv6, uom::BOOLEAN, ValueKind::Boolean), // alive
            spec(Driver::Gv7, uom::EPOCH, ValueKind::Epoch), // poll time
        ]
    };
}

macro_rules! sensor_drivers {
    ($temp:expr) => {
        [
            spec(Driver::Gv0, uom::INDEX, ValueKind::Enum), // status
            spec(Driver::St, $temp, ValueKind::Decimal),
            spec(Driver::Gv1, $temp, ValueKind::Decimal), // avg temp
            spec(Driver::Clihum, uom::HUMIDITY, ValueKind::Integer),
            spec(Driver::Gv2, uom::HUMIDITY, ValueKind::Integer), // avg humidity
            spec(Driver::Gv3, uom::BOOLEAN, ValueKind::Boolean), // motion
            spec(Driver::Gv4, uom::BOOLEAN, ValueKind::Boolean), // occupancy
            spec(Driver::Gv5, uom::INDEX, ValueKind::Enum), // battery
        ]
    };
}

static THERMOSTAT_F: [DriverSpec; 15] = thermostat_drivers!(uom::FAHRENHEIT);
static THERMOSTAT_C: [DriverSpec; 15] = thermostat_drivers!(uom::CELSIUS);
static SENSOR_F: [DriverSpec; 8] = sensor_drivers!(uom::FAHRENHEIT);
static SENSOR_C: [DriverSpec; 8] = sensor_drivers!(uom::CELSIUS);

/// Fixed at discovery from the thermostat's reported units.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum DeviceClass {
    ThermostatF,
    ThermostatC,
    SensorF,
    SensorC,
}

impl DeviceClass {
    pub fn thermostat(use_celsius: bool) -> Self {
        if use_celsius { DeviceClass::ThermostatC } else { DeviceClass::ThermostatF }
    }

    pub fn sensor(use_celsius: bool) -> Self {
        if use_celsius { DeviceClass::SensorC } else { DeviceClass::SensorF }
    }

    /// Node definition id on the host side.
    pub fn id(self) -> &'static str {
        match self {
            DeviceClass::ThermostatF => "HwhF",
            DeviceClass::ThermostatC => "HwhC",
            DeviceClass::SensorF => "HwhSensorF",
            DeviceClass::SensorC => "HwhSensorC",
        }
    }

    pub fn use_celsius(self) -> bool {
        matches!(self, DeviceClass::ThermostatC | DeviceClass::SensorC)
    }

    pub fn drivers(self) -> &'static [DriverSpec] {
        match self {
            DeviceClass::ThermostatF => &THERMOSTAT_F,
            DeviceClass::ThermostatC => &THERMOSTAT_C,
            DeviceClass::SensorF => &SENSOR_F,
            DeviceClass::SensorC => &SENSOR_C,
        }
    }

    pub fn defines(self, driver: Driver) -> bool {
        self.drivers().iter().any(|s| s.driver == driver)
    }
}

/// Driver values in the class's declared order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DriverSet(Vec<(Driver, DriverValue)>);

impl DriverSet {
    /// Every driver of `class` at its zero value.
    pub fn initial(class: DeviceClass) -> Self {
        DriverSet(class.drivers().iter().map(|s| (s.driver, s.kind.zero())).collect())
    }

    pub fn get(&self, driver: Driver) -> Option<DriverValue> {
        self.0.iter().find(|(d, _)| *d == driver).map(|(_, v)| *v)
    }

    /// Overwrites a driver already in the set; returns whether the value changed.
    /// Drivers not in the set are ignored.
    pub fn set(&mut self, driver: Driver, value: DriverValue) -> bool {
        match self.0.iter_mut().find(|(d, _)| *d == driver) {
            Some((_, current)) if *current != value => {
                *current = value;
                true
            }
            _ => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Driver, DriverValue)> + '_ {
        self.0.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(Driver, DriverValue)> for DriverSet {
    fn from_iter<T: IntoIterator<Item = (Driver, DriverValue)>>(iter: T) -> Self {
        DriverSet(iter.into_iter().collect())
    }
}
