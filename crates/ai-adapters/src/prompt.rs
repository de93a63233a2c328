//! Prompt and response-format construction for product ranking.

use domains::ProductSummary;
use serde_json::{json, Value};

pub(crate) const SYSTEM_PROMPT: &str =
    "You are a precise automotive parts search assistant. Always answer with valid JSON.";

pub(crate) fn user_prompt(query: &str, candidates: &[ProductSummary], limit: usize) -> String {
    let catalog = serde_json::to_string_pretty(candidates).unwrap_or_else(|_| "[]".to_string());
    format!(
        "You are an expert automotive parts specialist helping to find steering rack components.\n\n\
         User query: \"{query}\"\n\n\
         Available products (showing up to {shown}):\n{catalog}\n\n\
         Return the most relevant products, most relevant first. Consider:\n\
         - vehicle make, model and year ranges\n\
         - component types (bellows, tie rods, bushings)\n\
         - part numbers (SKU, precision #, quality #, OE #)\n\
         - applications and compatibility\n\
         - natural phrasing (\"2005 Mazda\" should match year ranges such as \"00-05\")\n\n\
         Include up to {limit} results. Each result has:\n\
         - index: the product index from the list above\n\
         - relevanceScore: integer 0-100 (100 = perfect match)\n\
         - reasoning: one or two sentences on why the product matches",
        shown = candidates.len(),
    )
}

/// Strict schema for `{"results": [{index, relevanceScore, reasoning}]}`.
pub(crate) fn response_format() -> Value {
    json!({
        "type": "json_schema",
        "json_schema": {
            "name": "search_results",
            "strict": true,
            "schema": {
                "type": "object",
                "properties": {
                    "results": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "properties": {
                                "index": { "type": "integer" },
                                "relevanceScore": { "type": "integer" },
                                "reasoning": { "type": "string" }
                            },
                            "required": ["index", "relevanceScore", "reasoning"],
                            "additionalProperties": false
                        }
                    }
                },
                "required": ["results"],
                "additionalProperties": false
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_embeds_query_limit_and_catalog() {
        let summary = ProductSummary {
            index: 0,
            sku: "SR-929".into(),
            name: "Mazda 929 rack".into(),
            application: "Mazda 929".into(),
            years: "90-91".into(),
            precision_number: String::new(),
            quality_number: String::new(),
            driver_bellow: String::new(),
            passenger_bellow: String::new(),
            tie_rod_driver: String::new(),
            tie_rod_passenger: String::new(),
            category: String::new(),
            oe_number: String::new(),
        };
        let prompt = user_prompt("mazda 929", &[summary], 3);
        assert!(prompt.contains("\"mazda 929\""));
        assert!(prompt.contains("SR-929"));
        assert!(prompt.contains("Include up to 3 results"));
        assert_eq!(response_format()["json_schema"]["strict"], true);
    }
}
