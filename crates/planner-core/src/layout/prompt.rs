use super::card::FallbackLocation;
use super::catalog::CARD_CATALOG;
use super::gemini::FunctionDeclaration;
use serde_json::json;

pub const LAYOUT_FUNCTION_NAME: &str = "generateWeatherLayout";

/// Prompt asking the model to pick cards for `query`.
pub fn build_prompt(query: &str, fallback: &FallbackLocation) -> String {
    let catalog = CARD_CATALOG
        .iter()
        .map(|card| {
            format!(
                "- Type: {}\n  Name: {}\n  Description: {}\n  Parameters: {}",
                card.card_type,
                card.name,
                card.description,
                card.parameters.join(", ")
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        r#"You are a weather planning assistant. Based on the user's query, select the most relevant weather data cards to display.

User query: "{query}"

Available card types:
{catalog}

For each card you select, provide:
1. Type (must be one of the available types)
2. Parameters (provide latitude and longitude for the relevant location, and any other required parameters)
3. Rationale (why this card is useful for the user's query, explain it in a personal way like "this seven day forecast will help you plan your trip")

Return the response as a JSON object with a "cards" array. Each card in the array should have "type", "parameters", and "rationale" properties.

For locations, use real-world coordinates (latitude and longitude). If the user doesn't specify a location, use {name} ({lat}, {lon}) as the default.

Example response format:
{{
  "cards": [
    {{
      "type": "current",
      "parameters": {{
        "lat": {lat},
        "lon": {lon},
        "units": "metric"
      }},
      "rationale": "The user needs to know current conditions for planning today's activities."
    }}
  ]
}}
"#,
        query = query,
        catalog = catalog,
        name = fallback.name,
        lat = format_coordinate(fallback.lat),
        lon = format_coordinate(fallback.lon),
    )
}

/// Four decimals, as coordinates are usually quoted.
fn format_coordinate(value: f64) -> String {
    format!("{:.4}", value)
}

/// Schema the model must fill: `{cards: [{type, parameters, rationale}]}`.
pub fn layout_function() -> FunctionDeclaration {
    let types: Vec<&str> = CARD_CATALOG.iter().map(|c| c.card_type.name()).collect();

    FunctionDeclaration {
        name: LAYOUT_FUNCTION_NAME.to_string(),
        description: "Generate a custom layout of weather cards based on the user query".to_string(),
        parameters: json!({
            "type": "OBJECT",
            "properties": {
                "cards": {
                    "type": "ARRAY",
                    "items": {
                        "type": "OBJECT",
                        "properties": {
                            "type": {"type": "STRING", "enum": types},
                            "parameters": {
                                "type": "OBJECT",
                                "properties": {
                                    "lat": {"type": "NUMBER"},
                                    "lon": {"type": "NUMBER"},
                                    "units": {"type": "STRING", "enum": ["standard", "metric", "imperial"]},
                                    "exclude": {"type": "STRING"},
                                    "q": {"type": "STRING"},
                                    "limit": {"type": "NUMBER"}
                                }
                            },
                            "rationale": {"type": "STRING"}
                        },
                        "required": ["type", "parameters", "rationale"]
                    }
                }
            },
            "required": ["cards"]
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::DEFAULT_LOCATION;

    #[test]
    fn test_prompt_mentions_query_catalog_and_fallback() {
        let prompt = build_prompt("going to Vegas next week", &DEFAULT_LOCATION);

        assert!(prompt.contains(r#"User query: "going to Vegas next week""#));
        for card in &CARD_CATALOG {
            assert!(prompt.contains(&format!("- Type: {}", card.card_type)));
            assert!(prompt.contains(card.description));
        }
        assert!(prompt.contains("use New York City (40.7128, -74.0060) as the default"));
    }

    #[test]
    fn test_layout_function_enumerates_card_types() {
        let function = layout_function();
        assert_eq!(function.name, LAYOUT_FUNCTION_NAME);

        let types = &function.parameters["properties"]["cards"]["items"]["properties"]["type"]["enum"];
        assert_eq!(
            types,
            &json!(["current", "forecast", "onecall", "air_pollution", "geocode/direct", "geocode/reverse"])
        );
        assert_eq!(function.parameters["required"], json!(["cards"]));
    }
}
