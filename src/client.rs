//! Blocking HTTP client for the Honeywell Home v2 API (thermostat subset).
//!
//! - Blocking client using `ureq` (no async).
//! - Uses the models in `crate::models::honeywell`.
//! - Covers location/thermostat/room reads plus the setpoint and fan writes.
//!
//! Authentication
//! - Sends a pre-issued bearer token from configuration. Obtaining or
//!   refreshing that token is left to whoever provisions it.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::Read;
use std::time::Duration;

use crate::models::honeywell::*;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug)]
pub enum HoneywellClientError {
    MissingAuth,
    Transport(String),
    Http { status: u16, message: String },
    Json { path: String, message: String },
}

impl core::fmt::Display for HoneywellClientError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            HoneywellClientError::MissingAuth => write!(f, "missing bearer token for authenticated endpoint"),
            HoneywellClientError::Transport(s) => write!(f, "transport error: {}", s),
            HoneywellClientError::Http { status, message } => write!(f, "http {}: {}", status, message),
            HoneywellClientError::Json { path, message } => write!(f, "json error at {}: {}", path, message),
        }
    }
}

impl std::error::Error for HoneywellClientError {}

impl From<ureq::Error> for HoneywellClientError {
    fn from(value: ureq::Error) -> Self {
        HoneywellClientError::Transport(value.to_string())
    }
}

/// The vendor operations the bridge relies on.
///
/// Setpoint values in `UpdateThermostat` are already in vendor units; see
/// `crate::translate::command`.
pub trait ThermostatApi {
    fn get_locations(&self) -> Result<Vec<Location>, HoneywellClientError>;

    fn get_thermostats(&self, location_id: LocationId) -> Result<Vec<Thermostat>, HoneywellClientError>;

    fn get_thermostat(&self, location_id: LocationId, device_id: &DeviceId) -> Result<Thermostat, HoneywellClientError>;

    fn get_sensors(
        &self,
        location_id: LocationId,
        device_id: &DeviceId,
        group_id: GroupId,
    ) -> Result<RoomGroup, HoneywellClientError>;

    fn set_setpoint(
        &self,
        location_id: LocationId,
        device_id: &DeviceId,
        update: &UpdateThermostat,
    ) -> Result<(), HoneywellClientError>;

    fn set_fan_mode(
        &self,
        location_id: LocationId,
        device_id: &DeviceId,
        update: &UpdateFanMode,
    ) -> Result<(), HoneywellClientError>;
}

/// Decode a JSON document, reporting the path of the first mismatching field.
pub fn decode_json<T: DeserializeOwned>(reader: impl Read) -> Result<T, HoneywellClientError> {
    let mut de = serde_json::Deserializer::from_reader(reader);
    serde_path_to_error::deserialize(&mut de).map_err(|e| HoneywellClientError::Json {
        path: e.path().to_string(),
        message: e.inner().to_string(),
    })
}

pub struct HoneywellClient {
    agent: ureq::Agent,
    base_url: String,
    api_key: String,
    user_ref: Option<String>,
    access_token: String,
}

impl HoneywellClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        user_ref: Option<String>,
        access_token: impl Into<String>,
    ) -> Result<Self, HoneywellClientError> {
        let access_token = access_token.into();
        if access_token.trim().is_empty() {
            return Err(HoneywellClientError::MissingAuth);
        }

        let agent: ureq::Agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(REQUEST_TIMEOUT))
            .build()
            .into();

        Ok(HoneywellClient {
            agent,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            user_ref,
            access_token,
        })
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    fn check_status(mut res: http::Response<ureq::Body>) -> Result<http::Response<ureq::Body>, HoneywellClientError> {
        let status = res.status();
        if status.is_success() {
            return Ok(res);
        }
        let body = res
            .body_mut()
            .read_to_string()
            .unwrap_or_else(|_| String::from("<no body>"));
        Err(HoneywellClientError::Http {
            status: status.as_u16(),
            message: body,
        })
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T, HoneywellClientError> {
        let url = self.url(path);
        let mut req = self
            .agent
            .get(&url)
            .header("Accept", "application/json")
            .header("Authorization", format!("Bearer {}", self.access_token))
            .query("apikey", self.api_key.as_str());
        if let Some(user_ref) = &self.user_ref {
            req = req.header("UserRefID", user_ref.as_str());
        }
        for (k, v) in query {
            req = req.query(*k, v.as_str());
        }

        let res = Self::check_status(req.call()?)?;
        decode_json(res.into_body().into_reader())
    }

    fn post_json<B: Serialize>(&self, path: &str, query: &[(&str, String)], body: &B) -> Result<(), HoneywellClientError> {
        let url = self.url(path);
        let mut req = self
            .agent
            .post(&url)
            .header("Accept", "application/json")
            .header("Authorization", format!("Bearer {}", self.access_token))
            .query("apikey", self.api_key.as_str());
        if let Some(user_ref) = &self.user_ref {
            req = req.header("UserRefID", user_ref.as_str());
        }
        for (k, v) in query {
            req = req.query(*k, v.as_str());
        }

        Self::check_status(req.send_json(body)?)?;
        Ok(())
    }
}

impl ThermostatApi for HoneywellClient {
    fn get_locations(&self) -> Result<Vec<Location>, HoneywellClientError> {
        self.get_json("/locations", &[])
    }

    fn get_thermostats(&self, location_id: LocationId) -> Result<Vec<Thermostat>, HoneywellClientError> {
        self.get_json("/devices/thermostats", &[("locationId", location_id.0.to_string())])
    }

    fn get_thermostat(&self, location_id: LocationId, device_id: &DeviceId) -> Result<Thermostat, HoneywellClientError> {
        self.get_json(
            &format!("/devices/thermostats/{}", device_id.0),
            &[("locationId", location_id.0.to_string())],
        )
    }

    fn get_sensors(
        &self,
        location_id: LocationId,
        device_id: &DeviceId,
        group_id: GroupId,
    ) -> Result<RoomGroup, HoneywellClientError> {
        self.get_json(
            &format!("/devices/thermostats/{}/group/{}/rooms", device_id.0, group_id.0),
            &[("locationId", location_id.0.to_string())],
        )
    }

    fn set_setpoint(
        &self,
        location_id: LocationId,
        device_id: &DeviceId,
        update: &UpdateThermostat,
    ) -> Result<(), HoneywellClientError> {
        self.post_json(
            &format!("/devices/thermostats/{}", device_id.0),
            &[("locationId", location_id.0.to_string())],
            update,
        )
    }

    fn set_fan_mode(
        &self,
        location_id: LocationId,
        device_id: &DeviceId,
        update: &UpdateFanMode,
    ) -> Result<(), HoneywellClientError> {
        self.post_json(
            &format!("/devices/thermostats/{}/fan", device_id.0),
            &[("locationId", location_id.0.to_string())],
            update,
        )
    }
}
