use crate::error::{PlannerError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

const OWM_DATA_URL: &str = "https://api.openweathermap.org/data/2.5";
const OWM_ONECALL_URL: &str = "https://api.openweathermap.org/data/3.0/onecall";
const OWM_GEO_URL: &str = "https://api.openweathermap.org/geo/1.0";

const COORDS_REQUIRED: &str = "Latitude and longitude are required";
const CITY_REQUIRED: &str = "City name is required";

/// The six proxied weather operations. Also the card types the layout generator picks from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeatherOperation {
    #[serde(rename = "current")]
    Current,
    #[serde(rename = "forecast")]
    Forecast,
    #[serde(rename = "onecall")]
    OneCall,
    #[serde(rename = "air_pollution")]
    AirPollution,
    #[serde(rename = "geocode/direct")]
    GeocodeDirect,
    #[serde(rename = "geocode/reverse")]
    GeocodeReverse,
}

/// Which configured base URL an operation is sent to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamBase {
    Data,
    OneCall,
    Geo,
}

/// Base URLs of the upstream API families.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamEndpoints {
    pub data_url: String,
    pub onecall_url: String,
    pub geo_url: String,
}

impl Default for UpstreamEndpoints {
    fn default() -> Self {
        Self {
            data_url: OWM_DATA_URL.to_string(),
            onecall_url: OWM_ONECALL_URL.to_string(),
            geo_url: OWM_GEO_URL.to_string(),
        }
    }
}

impl UpstreamEndpoints {
    /// Point every family at one server, e.g. a mock: `{root}/data/2.5`, `{root}/data/3.0/onecall`, `{root}/geo/1.0`.
    pub fn with_root(root: &str) -> Self {
        let root = root.trim_end_matches('/');
        Self {
            data_url: format!("{}/data/2.5", root),
            onecall_url: format!("{}/data/3.0/onecall", root),
            geo_url: format!("{}/geo/1.0", root),
        }
    }

    pub fn base(&self, base: UpstreamBase) -> &str {
        match base {
            UpstreamBase::Data => &self.data_url,
            UpstreamBase::OneCall => &self.onecall_url,
            UpstreamBase::Geo => &self.geo_url,
        }
    }
}

impl WeatherOperation {
    pub const ALL: [WeatherOperation; 6] = [
        WeatherOperation::Current,
        WeatherOperation::Forecast,
        WeatherOperation::OneCall,
        WeatherOperation::AirPollution,
        WeatherOperation::GeocodeDirect,
        WeatherOperation::GeocodeReverse,
    ];

    /// Stable name, used in routes, cache keys and card types.
    pub fn name(self) -> &'static str {
        match self {
            Self::Current => "current",
            Self::Forecast => "forecast",
            Self::OneCall => "onecall",
            Self::AirPollution => "air_pollution",
            Self::GeocodeDirect => "geocode/direct",
            Self::GeocodeReverse => "geocode/reverse",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.name() == name)
    }

    pub fn upstream(self) -> (UpstreamBase, &'static str) {
        match self {
            Self::Current => (UpstreamBase::Data, "weather"),
            Self::Forecast => (UpstreamBase::Data, "forecast"),
            Self::OneCall => (UpstreamBase::OneCall, ""),
            Self::AirPollution => (UpstreamBase::Data, "air_pollution"),
            Self::GeocodeDirect => (UpstreamBase::Geo, "direct"),
            Self::GeocodeReverse => (UpstreamBase::Geo, "reverse"),
        }
    }

    pub fn required_params(self) -> &'static [&'static str] {
        match self {
            Self::GeocodeDirect => &["q"],
            _ => &["lat", "lon"],
        }
    }

    /// Optional parameters and their defaults. `None` means omitted when absent.
    pub fn optional_params(self) -> &'static [(&'static str, Option<&'static str>)] {
        match self {
            Self::Current | Self::Forecast => &[("units", Some("metric"))],
            Self::OneCall => &[("exclude", None), ("units", Some("metric"))],
            Self::AirPollution => &[],
            Self::GeocodeDirect | Self::GeocodeReverse => &[("limit", Some("5"))],
        }
    }

    pub fn needs_coordinates(self) -> bool {
        self.required_params().contains(&"lat")
    }

    /// Message for a generic 500 when the upstream call fails without a usable status.
    pub fn failure_message(self) -> &'static str {
        match self {
            Self::Current => "Failed to fetch weather data",
            Self::Forecast => "Failed to fetch forecast data",
            Self::OneCall => "Failed to fetch one call data",
            Self::AirPollution => "Failed to fetch air pollution data",
            Self::GeocodeDirect => "Failed to geocode location",
            Self::GeocodeReverse => "Failed to reverse geocode location",
        }
    }

    fn missing_message(self) -> &'static str {
        match self {
            Self::GeocodeDirect => CITY_REQUIRED,
            _ => COORDS_REQUIRED,
        }
    }

    /// Validate `raw` and build the upstream parameter set.
    ///
    /// Empty values count as missing. Unknown parameters are dropped and
    /// defaults filled in, so the result is exactly what gets keyed and sent.
    pub fn prepare(self, raw: &HashMap<String, String>) -> Result<BTreeMap<String, String>> {
        let mut params = BTreeMap::new();
        for &name in self.required_params() {
            let value = present(raw, name)
                .ok_or_else(|| PlannerError::MissingParameter(self.missing_message().to_string()))?;
            params.insert(name.to_string(), value.to_string());
        }

        for &(name, default) in self.optional_params() {
            if let Some(value) = present(raw, name).or(default) {
                params.insert(name.to_string(), value.to_string());
            }
        }

        Ok(params)
    }
}

fn present<'a>(raw: &'a HashMap<String, String>, name: &str) -> Option<&'a str> {
    raw.get(name).map(|v| v.trim()).filter(|v| !v.is_empty())
}

impl fmt::Display for WeatherOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
