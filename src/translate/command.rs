//! Host commands to vendor mutation requests.

use core::fmt;
use std::error::Error;

use crate::models::honeywell::{UpdateFanMode, UpdateThermostat};
use crate::translate::codec::{self, EnumDomain, UnknownEnumValue};
use crate::translate::drivers::{DeviceClass, Driver};
use crate::translate::state::ThermostatSnapshot;
use crate::translate::units::{convert_temperature, parse_numeric, to_half_step, ConversionError, TemperatureUnit};

/// A command as the host delivers it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRequest {
    pub address: String,
    pub driver: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CommandError {
    UnknownAttribute(String),
    Conversion(ConversionError),
    UnknownEnum(UnknownEnumValue),
    MissingField(&'static str),
    MissingSnapshot,
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::UnknownAttribute(a) => write!(f, "no command for attribute {:?}", a),
            CommandError::Conversion(e) => write!(f, "{}", e),
            CommandError::UnknownEnum(e) => write!(f, "{}", e),
            CommandError::MissingField(name) => write!(f, "current state lacks {}", name),
            CommandError::MissingSnapshot => write!(f, "command needs the current thermostat state"),
        }
    }
}

impl Error for CommandError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            CommandError::Conversion(e) => Some(e),
            CommandError::UnknownEnum(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConversionError> for CommandError {
    fn from(value: ConversionError) -> Self {
        CommandError::Conversion(value)
    }
}

impl From<UnknownEnumValue> for CommandError {
    fn from(value: UnknownEnumValue) -> Self {
        CommandError::UnknownEnum(value)
    }
}

/// Setpoints are in the device class's units; the rest are driver codes.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Command {
    SetHeatSetpoint(f64),
    SetCoolSetpoint(f64),
    SetMode(i32),
    SetHoldStatus(i32),
    SetFanMode(i32),
}

fn parse_code(raw: &str) -> Result<i32, ConversionError> {
    let v = parse_numeric(raw)?;
    if v.fract() != 0.0 || v < i32::MIN as f64 || v > i32::MAX as f64 {
        return Err(ConversionError { input: raw.to_string() });
    }
    Ok(v as i32)
}

impl Command {
    pub fn parse(request: &CommandRequest) -> Result<Self, CommandError> {
        let driver =
            Driver::parse(&request.driver).ok_or_else(|| CommandError::UnknownAttribute(request.driver.clone()))?;
        let command = match driver {
            Driver::Clisph => Command::SetHeatSetpoint(parse_numeric(&request.value)?),
            Driver::Clispc => Command::SetCoolSetpoint(parse_numeric(&request.value)?),
            Driver::Climd => Command::SetMode(parse_code(&request.value)?),
            Driver::Gv4 => Command::SetHoldStatus(parse_code(&request.value)?),
            Driver::Clifs => Command::SetFanMode(parse_code(&request.value)?),
            _ => return Err(CommandError::UnknownAttribute(request.driver.clone())),
        };
        Ok(command)
    }

    pub fn driver(&self) -> Driver {
        match self {
            Command::SetHeatSetpoint(_) => Driver::Clisph,
            Command::SetCoolSetpoint(_) => Driver::Clispc,
            Command::SetMode(_) => Driver::Climd,
            Command::SetHoldStatus(_) => Driver::Gv4,
            Command::SetFanMode(_) => Driver::Clifs,
        }
    }

    /// Whether sibling fields must be read from the vendor first.
    pub fn needs_current_state(&self) -> bool {
        !matches!(self, Command::SetFanMode(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    Setpoint(UpdateThermostat),
    FanMode(UpdateFanMode),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TranslatedCommand {
    pub mutation: Mutation,
    /// The write may change other reported state (hold, schedule, priority);
    /// the caller should re-query before reporting.
    pub requery: bool,
}

/// Celsius setpoints go out in half degrees, Fahrenheit in whole degrees.
pub fn to_vendor_setpoint(value: f64, use_celsius: bool) -> f64 {
    if use_celsius { to_half_step(value) } else { value.round() }
}

pub fn translate_command(
    command: &Command,
    current: Option<&ThermostatSnapshot>,
    class: DeviceClass,
) -> Result<TranslatedCommand, CommandError> {
    if let Command::SetFanMode(code) = command {
        let mode = codec::decode(EnumDomain::FanMode, *code)?;
        return Ok(TranslatedCommand {
            mutation: Mutation::FanMode(UpdateFanMode { mode: mode.to_string() }),
            requery: false,
        });
    }

    let current = current.ok_or(CommandError::MissingSnapshot)?;
    let use_celsius = class.use_celsius();
    // Preserved setpoints are re-expressed in the class unit, as the state translator does.
    let unit = TemperatureUnit::from_celsius_flag(use_celsius);
    let source = current.units.unwrap_or(unit);
    let heat = current.heat_setpoint.ok_or(CommandError::MissingField("heatSetpoint"))?;
    let cool = current.cool_setpoint.ok_or(CommandError::MissingField("coolSetpoint"))?;
    let mut heat = convert_temperature(heat, source, unit);
    let mut cool = convert_temperature(cool, source, unit);
    let mut mode = current.mode.clone().ok_or(CommandError::MissingField("mode"))?;
    let mut hold = "TemporaryHold";
    let mut next_period_time = None;

    match *command {
        Command::SetHeatSetpoint(v) => {
            heat = v;
            // Heat-only changes are rejected as TemporaryHold by some API
            // versions; hold until the next period instead when one is known.
            if let Some(t) = &current.next_period_time {
                hold = "HoldUntil";
                next_period_time = Some(t.clone());
            }
        }
        Command::SetCoolSetpoint(v) => cool = v,
        Command::SetMode(code) => mode = codec::decode(EnumDomain::Mode, code)?.to_string(),
        Command::SetHoldStatus(code) => hold = codec::decode(EnumDomain::SetHoldStatus, code)?,
        Command::SetFanMode(_) => {}
    }

    Ok(TranslatedCommand {
        mutation: Mutation::Setpoint(UpdateThermostat {
            mode,
            auto_changeover_active: current.auto_changeover_active,
            heat_setpoint: to_vendor_setpoint(heat, use_celsius),
            cool_setpoint: to_vendor_setpoint(cool, use_celsius),
            thermostat_setpoint_status: hold.to_string(),
            next_period_time,
        }),
        requery: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(driver: &str, value: &str) -> CommandRequest {
        CommandRequest {
            address: "lcc00d02db1c2e3".into(),
            driver: driver.into(),
            value: value.into(),
        }
    }

    fn current() -> ThermostatSnapshot {
        ThermostatSnapshot {
            heat_setpoint: Some(68.0),
            cool_setpoint: Some(76.0),
            mode: Some("Auto".into()),
            auto_changeover_active: Some(true),
            hold_status: Some("NoHold".into()),
            ..Default::default()
        }
    }

    fn setpoint_body(t: TranslatedCommand) -> UpdateThermostat {
        match t.mutation {
            Mutation::Setpoint(u) => u,
            other => panic!("expected setpoint mutation, got {:?}", other),
        }
    }

    #[test]
    fn parses_commands_by_driver_name() {
        assert_eq!(Command::parse(&request("CLISPH", "70")), Ok(Command::SetHeatSetpoint(70.0)));
        assert_eq!(Command::parse(&request("climd", "2")), Ok(Command::SetMode(2)));
        assert_eq!(Command::parse(&request("GV4", "1.0")), Ok(Command::SetHoldStatus(1)));
        assert!(matches!(
            Command::parse(&request("GV4", "1.5")),
            Err(CommandError::Conversion(_))
        ));
        assert!(matches!(
            Command::parse(&request("CLISPC", "cold")),
            Err(CommandError::Conversion(_))
        ));
        assert_eq!(
            Command::parse(&request("ST", "70")),
            Err(CommandError::UnknownAttribute("ST".into()))
        );
    }

    #[test]
    fn heat_setpoint_preserves_siblings() {
        let t = translate_command(&Command::SetHeatSetpoint(70.4), Some(&current()), DeviceClass::ThermostatF)
            .expect("translate");
        assert!(t.requery);
        let body = setpoint_body(t);
        assert_eq!(body.heat_setpoint, 70.0);
        assert_eq!(body.cool_setpoint, 76.0);
        assert_eq!(body.mode, "Auto");
        assert_eq!(body.auto_changeover_active, Some(true));
        assert_eq!(body.thermostat_setpoint_status, "TemporaryHold");
        assert_eq!(body.next_period_time, None);
    }

    #[test]
    fn heat_setpoint_holds_until_next_period_when_known() {
        let snap = ThermostatSnapshot {
            next_period_time: Some("22:00:00".into()),
            ..current()
        };
        let body = setpoint_body(
            translate_command(&Command::SetHeatSetpoint(70.0), Some(&snap), DeviceClass::ThermostatF)
                .expect("translate"),
        );
        assert_eq!(body.thermostat_setpoint_status, "HoldUntil");
        assert_eq!(body.next_period_time.as_deref(), Some("22:00:00"));

        let body = setpoint_body(
            translate_command(&Command::SetCoolSetpoint(74.0), Some(&snap), DeviceClass::ThermostatF)
                .expect("translate"),
        );
        assert_eq!(body.thermostat_setpoint_status, "TemporaryHold");
        assert_eq!(body.next_period_time, None);
        assert_eq!(body.heat_setpoint, 68.0);
    }

    #[test]
    fn celsius_setpoints_round_to_half_degrees() {
        let snap = ThermostatSnapshot {
            heat_setpoint: Some(20.0),
            cool_setpoint: Some(24.5),
            ..current()
        };
        let body = setpoint_body(
            translate_command(&Command::SetCoolSetpoint(23.3), Some(&snap), DeviceClass::ThermostatC)
                .expect("translate"),
        );
        assert_eq!(body.cool_setpoint, 23.5);
        assert_eq!(body.heat_setpoint, 20.0);
    }

    #[test]
    fn preserved_setpoints_follow_the_class_unit() {
        let snap = ThermostatSnapshot {
            units: Some(TemperatureUnit::Fahrenheit),
            ..current()
        };
        let body = setpoint_body(
            translate_command(&Command::SetCoolSetpoint(24.0), Some(&snap), DeviceClass::ThermostatC)
                .expect("translate"),
        );
        assert_eq!(body.heat_setpoint, 20.0);
        assert_eq!(body.cool_setpoint, 24.0);

        let snap = ThermostatSnapshot {
            units: Some(TemperatureUnit::Celsius),
            heat_setpoint: Some(20.0),
            cool_setpoint: Some(24.0),
            ..current()
        };
        let body = setpoint_body(
            translate_command(&Command::SetHeatSetpoint(67.0), Some(&snap), DeviceClass::ThermostatF)
                .expect("translate"),
        );
        assert_eq!(body.heat_setpoint, 67.0);
        assert_eq!(body.cool_setpoint, 75.0);
    }

    #[test]
    fn mode_command_decodes_code() {
        let body = setpoint_body(
            translate_command(&Command::SetMode(2), Some(&current()), DeviceClass::ThermostatF).expect("translate"),
        );
        assert_eq!(body.mode, "Cool");
        assert!(matches!(
            translate_command(&Command::SetMode(9), Some(&current()), DeviceClass::ThermostatF),
            Err(CommandError::UnknownEnum(_))
        ));
    }

    #[test]
    fn hold_status_only_accepts_writable_values() {
        let body = setpoint_body(
            translate_command(&Command::SetHoldStatus(2), Some(&current()), DeviceClass::ThermostatF)
                .expect("translate"),
        );
        assert_eq!(body.thermostat_setpoint_status, "PermanentHold");
        assert_eq!(body.heat_setpoint, 68.0);
        assert_eq!(body.cool_setpoint, 76.0);

        // HoldUntil / VacationHold are read-only
        assert!(translate_command(&Command::SetHoldStatus(3), Some(&current()), DeviceClass::ThermostatF).is_err());
        assert!(translate_command(&Command::SetHoldStatus(4), Some(&current()), DeviceClass::ThermostatF).is_err());
    }

    #[test]
    fn fan_mode_needs_no_snapshot() {
        let cmd = Command::SetFanMode(6);
        assert!(!cmd.needs_current_state());
        let t = translate_command(&cmd, None, DeviceClass::ThermostatF).expect("translate");
        assert!(!t.requery);
        assert_eq!(t.mutation, Mutation::FanMode(UpdateFanMode { mode: "Circulate".into() }));
    }

    #[test]
    fn setpoint_commands_require_current_state() {
        assert_eq!(
            translate_command(&Command::SetCoolSetpoint(74.0), None, DeviceClass::ThermostatF),
            Err(CommandError::MissingSnapshot)
        );
        let snap = ThermostatSnapshot {
            mode: None,
            ..current()
        };
        assert_eq!(
            translate_command(&Command::SetCoolSetpoint(74.0), Some(&snap), DeviceClass::ThermostatF),
            Err(CommandError::MissingField("mode"))
        );
    }
}
