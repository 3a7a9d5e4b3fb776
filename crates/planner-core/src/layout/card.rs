use crate::weather::WeatherOperation;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Where cards point when the query names no location.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FallbackLocation {
    pub name: &'static str,
    pub lat: f64,
    pub lon: f64,
}

pub const DEFAULT_LOCATION: FallbackLocation = FallbackLocation {
    name: "New York City",
    lat: 40.7128,
    lon: -74.0060,
};

/// One card chosen by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardDescriptor {
    #[serde(rename = "type")]
    pub card_type: WeatherOperation,
    pub parameters: Map<String, Value>,
    pub rationale: String,
}

impl CardDescriptor {
    /// Parameters as query-string pairs, the form the weather proxy accepts.
    ///
    /// Strings are passed as-is, numbers and booleans in their JSON spelling;
    /// nulls, arrays and objects are skipped.
    pub fn query_params(&self) -> HashMap<String, String> {
        self.parameters
            .iter()
            .filter_map(|(name, value)| {
                let text = match value {
                    Value::String(s) => s.clone(),
                    Value::Number(n) => n.to_string(),
                    Value::Bool(b) => b.to_string(),
                    _ => return None,
                };
                Some((name.clone(), text))
            })
            .collect()
    }

    fn has_param(&self, name: &str) -> bool {
        match self.parameters.get(name) {
            None | Some(Value::Null) => false,
            Some(Value::String(s)) => !s.trim().is_empty(),
            Some(_) => true,
        }
    }

    /// Fill in the location the card needs when the model left it out.
    pub fn apply_fallback_location(&mut self, fallback: &FallbackLocation) {
        if self.card_type.needs_coordinates() {
            if !self.has_param("lat") || !self.has_param("lon") {
                self.parameters.insert("lat".into(), Value::from(fallback.lat));
                self.parameters.insert("lon".into(), Value::from(fallback.lon));
            }
        } else if !self.has_param("q") {
            self.parameters.insert("q".into(), Value::from(fallback.name));
        }
    }
}

/// Response body of the generate-layout endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub cards: Vec<CardDescriptor>,
}

impl Layout {
    pub fn apply_fallback_location(&mut self, fallback: &FallbackLocation) {
        for card in &mut self.cards {
            card.apply_fallback_location(fallback);
        }
    }
}
