//! Static lookup tables between vendor string enums and driver codes.
//!
//! The integer codes are part of the host-side profile (NLS entries) and are
//! fixed here once. Older revisions of the profile numbered priority type and
//! schedule period differently; the tables below are the canonical choice and
//! the tests pin them.

use core::fmt;
use std::error::Error;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum EnumDomain {
    Mode,
    FanMode,
    RunningState,
    PriorityType,
    ScheduleStatus,
    SchedulePeriod,
    /// Read side: everything the vendor may report.
    HoldStatus,
    /// Write side: the subset a host may request.
    SetHoldStatus,
    SensorStatus,
    BatteryStatus,
}

impl EnumDomain {
    pub const ALL: [EnumDomain; 10] = [
        EnumDomain::Mode,
        EnumDomain::FanMode,
        EnumDomain::RunningState,
        EnumDomain::PriorityType,
        EnumDomain::ScheduleStatus,
        EnumDomain::SchedulePeriod,
        EnumDomain::HoldStatus,
        EnumDomain::SetHoldStatus,
        EnumDomain::SensorStatus,
        EnumDomain::BatteryStatus,
    ];

    pub fn table(self) -> &'static EnumTable {
        match self {
            EnumDomain::Mode => &MODE,
            EnumDomain::FanMode => &FAN_MODE,
            EnumDomain::RunningState => &RUNNING_STATE,
            EnumDomain::PriorityType => &PRIORITY_TYPE,
            EnumDomain::ScheduleStatus => &SCHEDULE_STATUS,
            EnumDomain::SchedulePeriod => &SCHEDULE_PERIOD,
            EnumDomain::HoldStatus => &HOLD_STATUS,
            EnumDomain::SetHoldStatus => &SET_HOLD_STATUS,
            EnumDomain::SensorStatus => &SENSOR_STATUS,
            EnumDomain::BatteryStatus => &BATTERY_STATUS,
        }
    }
}

impl fmt::Display for EnumDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EnumDomain::Mode => "mode",
            EnumDomain::FanMode => "fan mode",
            EnumDomain::RunningState => "running state",
            EnumDomain::PriorityType => "priority type",
            EnumDomain::ScheduleStatus => "schedule status",
            EnumDomain::SchedulePeriod => "schedule period",
            EnumDomain::HoldStatus => "hold status",
            EnumDomain::SetHoldStatus => "hold status (write)",
            EnumDomain::SensorStatus => "sensor status",
            EnumDomain::BatteryStatus => "battery status",
        };
        f.write_str(name)
    }
}

#[derive(Debug)]
pub struct EnumTable {
    pub entries: &'static [(&'static str, i32)],
    /// Vendor name of the entry that absorbs unknown or absent values.
    pub fallback: Option<&'static str>,
}

impl EnumTable {
    fn code_of(&self, vendor: &str) -> Option<i32> {
        self.entries.iter().find(|(name, _)| *name == vendor).map(|(_, code)| *code)
    }

    fn name_of(&self, code: i32) -> Option<&'static str> {
        self.entries.iter().find(|(_, c)| *c == code).map(|(name, _)| *name)
    }

    pub fn fallback_code(&self) -> Option<i32> {
        self.fallback.and_then(|name| self.code_of(name))
    }
}

pub static MODE: EnumTable = EnumTable {
    entries: &[("Off", 0), ("Heat", 1), ("Cool", 2), ("Auto", 3)],
    fallback: None,
};

pub static FAN_MODE: EnumTable = EnumTable {
    entries: &[("Auto", 0), ("On", 1), ("Circulate", 6)],
    fallback: None,
};

pub static RUNNING_STATE: EnumTable = EnumTable {
    entries: &[("EquipmentOff", 0), ("Heat", 1), ("Cool", 2)],
    fallback: None,
};

pub static PRIORITY_TYPE: EnumTable = EnumTable {
    entries: &[("NotSupported", 0), ("PickARoom", 1), ("FollowMe", 2), ("WholeHouse", 3)],
    fallback: Some("NotSupported"),
};

pub static SCHEDULE_STATUS: EnumTable = EnumTable {
    entries: &[("Pause", 0), ("Resume", 1)],
    fallback: None,
};

pub static SCHEDULE_PERIOD: EnumTable = EnumTable {
    entries: &[
        ("NotSupported", 0),
        ("Wake", 1),
        ("Away", 2),
        ("Home", 3),
        ("Sleep", 4),
        ("Custom", 5),
    ],
    fallback: Some("NotSupported"),
};

pub static HOLD_STATUS: EnumTable = EnumTable {
    entries: &[
        ("NoHold", 0),
        ("TemporaryHold", 1),
        ("PermanentHold", 2),
        ("HoldUntil", 3),
        ("VacationHold", 4),
    ],
    fallback: None,
};

pub static SET_HOLD_STATUS: EnumTable = EnumTable {
    entries: &[("NoHold", 0), ("TemporaryHold", 1), ("PermanentHold", 2)],
    fallback: None,
};

pub static SENSOR_STATUS: EnumTable = EnumTable {
    entries: &[("Unknown", 0), ("Ok", 1), ("NotAvailable", 2)],
    fallback: Some("Unknown"),
};

pub static BATTERY_STATUS: EnumTable = EnumTable {
    entries: &[("Unknown", 0), ("Ok", 1), ("Low", 2)],
    fallback: Some("Unknown"),
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnumKey {
    Vendor(String),
    Code(i32),
}

/// Lookup miss in a domain without a fallback entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownEnumValue {
    pub domain: EnumDomain,
    pub key: EnumKey,
}

impl fmt::Display for UnknownEnumValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.key {
            EnumKey::Vendor(s) => write!(f, "unknown {} value {:?}", self.domain, s),
            EnumKey::Code(c) => write!(f, "unknown {} code {}", self.domain, c),
        }
    }
}

impl Error for UnknownEnumValue {}

/// Vendor string to driver code. `None` counts as unknown.
pub fn encode(domain: EnumDomain, vendor: Option<&str>) -> Result<i32, UnknownEnumValue> {
    let table = domain.table();
    vendor
        .and_then(|v| table.code_of(v))
        .or_else(|| table.fallback_code())
        .ok_or_else(|| UnknownEnumValue {
            domain,
            key: EnumKey::Vendor(vendor.unwrap_or("<absent>").to_string()),
        })
}

/// Driver code to vendor string.
pub fn decode(domain: EnumDomain, code: i32) -> Result<&'static str, UnknownEnumValue> {
    let table = domain.table();
    table
        .name_of(code)
        .or(table.fallback)
        .ok_or(UnknownEnumValue {
            domain,
            key: EnumKey::Code(code),
        })
}
