use log::{info, warn};

use crate::client::ThermostatApi;
use crate::models::honeywell::{DeviceId, RoomId};
use crate::services::sensor::SensorNode;
use crate::services::thermostat::ThermostatNode;
use crate::translate::command::CommandRequest;
use crate::translate::state::Backoff;
use crate::translate::units::TemperatureEncoding;

/// Host addresses are limited to this many characters.
pub const MAX_ADDRESS_LEN: usize = 14;

#[derive(Debug, Clone)]
pub enum Node {
    Thermostat(ThermostatNode),
    Sensor(SensorNode),
}

impl Node {
    pub fn address(&self) -> &str {
        match self {
            Node::Thermostat(t) => &t.address,
            Node::Sensor(s) => &s.address,
        }
    }

    pub fn query(&mut self, api: &dyn ThermostatApi, backoff: &dyn Backoff) -> Result<(), String> {
        match self {
            Node::Thermostat(t) => t.query(api, backoff),
            Node::Sensor(s) => s.query(api),
        }
    }

    pub fn handle_command(
        &mut self,
        api: &dyn ThermostatApi,
        backoff: &dyn Backoff,
        request: &CommandRequest,
    ) -> Result<(), String> {
        match self {
            Node::Thermostat(t) => t.handle_command(api, backoff, request),
            Node::Sensor(s) => Err(format!("{}: sensors accept no commands", s.address)),
        }
    }
}

fn sanitize(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Keeps the tail of `base` (the MAC part of a device id) when it has to be cut.
fn fit(base: &str, suffix: &str) -> String {
    let room = MAX_ADDRESS_LEN.saturating_sub(suffix.len());
    let start = base.len().saturating_sub(room);
    format!("{}{}", &base[start..], suffix)
}

pub fn thermostat_address(device_id: &DeviceId) -> String {
    fit(&sanitize(&device_id.0), "")
}

pub fn sensor_address(device_id: &DeviceId, room_id: RoomId) -> String {
    fit(&sanitize(&device_id.0), &format!("r{}", room_id.0))
}

/// Build nodes for every thermostat and room sensor visible to the account.
pub fn discover(api: &dyn ThermostatApi, encoding: TemperatureEncoding) -> Result<Vec<Node>, String> {
    let mut nodes = Vec::new();
    let locations = api.get_locations().map_err(|e| format!("get_locations failed: {}", e))?;

    for location in locations {
        let Some(location_id) = location.location_id else {
            warn!("Skipping location without id: {:?}", location.name);
            continue;
        };
        let thermostats = match api.get_thermostats(location_id) {
            Ok(t) => t,
            Err(e) => {
                warn!("Thermostats of location {} unavailable, skipping: {}", location_id.0, e);
                continue;
            }
        };

        for t in thermostats {
            if t.device_class.as_deref().is_some_and(|c| c != "Thermostat") {
                continue;
            }
            let Some(device_id) = t.device_id.clone() else { continue };
            let use_celsius = t.uses_celsius();
            let name = t.user_defined_device_name.clone().unwrap_or_else(|| device_id.0.clone());
            let address = thermostat_address(&device_id);
            info!("Discovered thermostat {} ({}) at {}", name, device_id.0, address);
            nodes.push(Node::Thermostat(ThermostatNode::new(
                address,
                name,
                location_id,
                device_id.clone(),
                use_celsius,
            )));

            for group_id in t.groups.as_deref().unwrap_or_default().iter().filter_map(|g| g.id) {
                let group = match api.get_sensors(location_id, &device_id, group_id) {
                    Ok(g) => g,
                    Err(e) => {
                        warn!("Sensor group {} of {} unavailable, skipping: {}", group_id.0, device_id.0, e);
                        continue;
                    }
                };
                for room in group.rooms.as_deref().unwrap_or_default() {
                    let Some(room_id) = room.id else { continue };
                    if room.accessories.as_deref().unwrap_or_default().is_empty() {
                        continue;
                    }
                    let name = room.name.clone().unwrap_or_else(|| format!("Room {}", room_id.0));
                    let address = sensor_address(&device_id, room_id);
                    info!("Discovered sensor {} at {}", name, address);
                    nodes.push(Node::Sensor(SensorNode::new(
                        address,
                        name,
                        location_id,
                        device_id.clone(),
                        group_id,
                        room_id,
                        use_celsius,
                        encoding,
                    )));
                }
            }
        }
    }

    info!("Discovery found {} node(s)", nodes.len());
    Ok(nodes)
}
