//! Reorder quantity suggestions from a generative model.
//!
//! This adapter owns no forecasting logic. It renders the product's figures
//! into a prompt, asks the model for a structured answer, and checks the
//! answer has the agreed shape. Anything else is the model's business.

pub mod gemini;

pub use gemini::GeminiModel;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

use crate::domain::aggregates::Product;

#[derive(Debug, Error)]
pub enum SuggestError {
    #[error("invalid suggestion input: {0}")]
    InvalidInput(String),
    #[error("no suggestion model is configured")]
    NotConfigured,
    #[error("model call failed: {0}")]
    Model(String),
    #[error("model answer has the wrong shape: {0}")]
    MalformedResponse(String),
}

/// Input contract. Sales history maps `YYYY-MM-DD` to units sold; seasonal
/// trends map month number (1-12) to an expected demand multiplier. Both travel
/// as JSON text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionRequest {
    pub product_id: String,
    pub current_stock_level: u32,
    pub historical_sales_data: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seasonal_trends: Option<String>,
}

impl SuggestionRequest {
    pub fn for_product(product: &Product, seasonal_trends: Option<String>) -> Self {
        Self {
            product_id: product.id().to_string(),
            current_stock_level: product.stock(),
            historical_sales_data: serde_json::to_string(product.sales_history()).unwrap_or_else(|_| "{}".into()),
            seasonal_trends,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub suggested_order_quantity: u32,
    pub reasoning: String,
}

/// A model that answers a prompt with JSON matching `schema`.
#[async_trait]
pub trait SuggestionModel: Send + Sync {
    async fn generate(&self, prompt: &str, schema: &Value) -> Result<Value, SuggestError>;
}

/// Stand-in used when no model credentials are configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnconfiguredModel;

#[async_trait]
impl SuggestionModel for UnconfiguredModel {
    async fn generate(&self, _prompt: &str, _schema: &Value) -> Result<Value, SuggestError> {
        Err(SuggestError::NotConfigured)
    }
}

pub struct OrderSuggester {
    model: Box<dyn SuggestionModel>,
}

impl OrderSuggester {
    pub fn new(model: impl SuggestionModel + 'static) -> Self {
        Self { model: Box::new(model) }
    }

    #[tracing::instrument(skip(self, request), fields(product_id = %request.product_id))]
    pub async fn suggest(&self, request: &SuggestionRequest) -> Result<Suggestion, SuggestError> {
        check_json_object("historicalSalesData", &request.historical_sales_data)?;
        if let Some(trends) = &request.seasonal_trends {
            check_json_object("seasonalTrends", trends)?;
        }
        let prompt = render_prompt(request);
        let answer = self.model.generate(&prompt, &response_schema()).await?;
        let suggestion = parse_answer(answer)?;
        tracing::info!(quantity = suggestion.suggested_order_quantity, "reorder suggestion received");
        Ok(suggestion)
    }
}

/// Schema handed to the model for its structured answer.
pub fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "suggestedOrderQuantity": {
                "type": "NUMBER",
                "description": "Cantidad de pedido sugerida para el producto."
            },
            "reasoning": {
                "type": "STRING",
                "description": "Razonamiento detrás de la cantidad sugerida y factores considerados."
            }
        },
        "required": ["suggestedOrderQuantity", "reasoning"]
    })
}

fn check_json_object(field: &str, raw: &str) -> Result<(), SuggestError> {
    if raw.trim().is_empty() {
        return Ok(());
    }
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(_)) => Ok(()),
        _ => Err(SuggestError::InvalidInput(format!("{field} must be a JSON object"))),
    }
}

fn render_prompt(request: &SuggestionRequest) -> String {
    let history = match request.historical_sales_data.trim() {
        "" | "{}" => "No se proporcionaron datos históricos de ventas.".to_string(),
        h => h.to_string(),
    };
    let trends = match request.seasonal_trends.as_deref().map(str::trim) {
        None | Some("") | Some("{}") => "No se proporcionaron tendencias estacionales.".to_string(),
        Some(t) => t.to_string(),
    };
    format!(
        "Eres el encargado de inventario de una tienda veterinaria. Con el historial de ventas, \
         el stock actual y las tendencias estacionales, sugiere la cantidad óptima a pedir del producto.\n\n\
         ID del Producto: {}\n\
         Nivel de Stock Actual: {}\n\
         Datos Históricos de Ventas (JSON):\n{}\n\n\
         Tendencias Estacionales (JSON, opcional):\n{}\n\n\
         Explica tu razonamiento de forma clara y breve. Responde en formato JSON.",
        request.product_id, request.current_stock_level, history, trends
    )
}

fn parse_answer(answer: Value) -> Result<Suggestion, SuggestError> {
    let quantity = answer
        .get("suggestedOrderQuantity")
        .and_then(Value::as_f64)
        .ok_or_else(|| SuggestError::MalformedResponse("suggestedOrderQuantity is missing or not a number".into()))?;
    if !quantity.is_finite() || quantity < 0.0 || quantity > f64::from(u32::MAX) {
        return Err(SuggestError::MalformedResponse(format!("suggestedOrderQuantity out of range: {quantity}")));
    }
    let reasoning = answer
        .get("reasoning")
        .and_then(Value::as_str)
        .ok_or_else(|| SuggestError::MalformedResponse("reasoning is missing or not text".into()))?;
    Ok(Suggestion { suggested_order_quantity: quantity.round() as u32, reasoning: reasoning.to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct Canned {
        answer: Value,
        prompts: std::sync::Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl SuggestionModel for Canned {
        async fn generate(&self, prompt: &str, _schema: &Value) -> Result<Value, SuggestError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok(self.answer.clone())
        }
    }

    fn request() -> SuggestionRequest {
        SuggestionRequest {
            product_id: "prod-003".into(),
            current_stock_level: 1,
            historical_sales_data: r#"{"2024-07-22": 3, "2024-07-23": 1}"#.into(),
            seasonal_trends: Some(r#"{"12": 1.5}"#.into()),
        }
    }

    #[tokio::test]
    async fn suggestion_is_parsed_and_rounded() {
        let prompts = std::sync::Arc::new(Mutex::new(vec![]));
        let suggester = OrderSuggester::new(Canned {
            answer: json!({ "suggestedOrderQuantity": 11.6, "reasoning": "Demanda alta en diciembre." }),
            prompts: prompts.clone(),
        });
        let s = suggester.suggest(&request()).await.unwrap();
        assert_eq!(s.suggested_order_quantity, 12);
        assert_eq!(s.reasoning, "Demanda alta en diciembre.");
        let prompt = prompts.lock().unwrap()[0].clone();
        assert!(prompt.contains("prod-003"));
        assert!(prompt.contains("2024-07-22"));
        assert!(prompt.contains(r#"{"12": 1.5}"#));
    }

    #[tokio::test]
    async fn missing_history_is_spelled_out() {
        let prompts = std::sync::Arc::new(Mutex::new(vec![]));
        let suggester = OrderSuggester::new(Canned { answer: json!({ "suggestedOrderQuantity": 4, "reasoning": "x" }), prompts: prompts.clone() });
        let mut req = request();
        req.historical_sales_data = "{}".into();
        req.seasonal_trends = None;
        suggester.suggest(&req).await.unwrap();
        let prompt = prompts.lock().unwrap()[0].clone();
        assert!(prompt.contains("No se proporcionaron datos históricos de ventas."));
        assert!(prompt.contains("No se proporcionaron tendencias estacionales."));
    }

    #[tokio::test]
    async fn wrong_shape_is_rejected() {
        let prompts = std::sync::Arc::new(Mutex::new(vec![]));
        let suggester = OrderSuggester::new(Canned { answer: json!({ "suggestedOrderQuantity": "diez", "reasoning": "x" }), prompts });
        assert!(matches!(suggester.suggest(&request()).await, Err(SuggestError::MalformedResponse(_))));
    }

    #[tokio::test]
    async fn bad_input_never_reaches_model() {
        let prompts = std::sync::Arc::new(Mutex::new(vec![]));
        let suggester = OrderSuggester::new(Canned { answer: json!({}), prompts: prompts.clone() });
        let mut req = request();
        req.historical_sales_data = "[1, 2]".into();
        assert!(matches!(suggester.suggest(&req).await, Err(SuggestError::InvalidInput(_))));
        assert!(prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn unconfigured_model_fails() {
        let suggester = OrderSuggester::new(UnconfiguredModel);
        assert!(matches!(suggester.suggest(&request()).await, Err(SuggestError::NotConfigured)));
    }
}
