use crate::weather::WeatherOperation;

/// A card the model may choose, as described to it in the prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardInfo {
    pub card_type: WeatherOperation,
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: &'static [&'static str],
}

pub static CARD_CATALOG: [CardInfo; 6] = [
    CardInfo {
        card_type: WeatherOperation::Current,
        name: "Current Weather",
        description: "Shows the current weather conditions for a location including temperature, humidity, wind speed, and conditions.",
        parameters: &["lat", "lon", "units"],
    },
    CardInfo {
        card_type: WeatherOperation::Forecast,
        name: "5-Day Forecast",
        description: "Shows a 5-day weather forecast with 3-hour intervals for a location.",
        parameters: &["lat", "lon", "units"],
    },
    CardInfo {
        card_type: WeatherOperation::OneCall,
        name: "Complete Weather Data",
        description: "Provides current weather, minute forecast for 1 hour, hourly forecast for 48 hours, daily forecast for 7 days, and historical data for 5 previous days.",
        parameters: &["lat", "lon", "exclude", "units"],
    },
    CardInfo {
        card_type: WeatherOperation::AirPollution,
        name: "Air Pollution",
        description: "Shows air quality data including Air Quality Index (AQI) and concentrations of various pollutants.",
        parameters: &["lat", "lon"],
    },
    CardInfo {
        card_type: WeatherOperation::GeocodeDirect,
        name: "Geocoding",
        description: "Converts location names to geographic coordinates (latitude and longitude).",
        parameters: &["q", "limit"],
    },
    CardInfo {
        card_type: WeatherOperation::GeocodeReverse,
        name: "Reverse Geocoding",
        description: "Converts geographic coordinates to location names and address details.",
        parameters: &["lat", "lon", "limit"],
    },
];

pub fn card_info(card_type: WeatherOperation) -> Option<&'static CardInfo> {
    CARD_CATALOG.iter().find(|info| info.card_type == card_type)
}
