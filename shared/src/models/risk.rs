//! Risk assessment models

use serde::{Deserialize, Serialize, Serializer};

use crate::models::{CurrentConditions, DailySummary};

/// Probability above which a prediction is classified as high risk
pub const HIGH_RISK_THRESHOLD: f64 = 0.5;

/// Risk classification level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    #[serde(rename = "ALTO")]
    High,
    #[serde(rename = "MODERADO")]
    Moderate,
    #[serde(rename = "BAIXO")]
    Low,
}

impl RiskLevel {
    /// Binary classification of a model probability
    pub fn from_probability(probability: f64) -> Self {
        if probability > HIGH_RISK_THRESHOLD {
            RiskLevel::High
        } else {
            RiskLevel::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::High => "ALTO",
            RiskLevel::Moderate => "MODERADO",
            RiskLevel::Low => "BAIXO",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Render a probability in [0, 1] as a percentage with two decimals
pub fn format_probability(probability: f64) -> String {
    format!("{:.2}%", probability * 100.0)
}

fn serialize_percentage<S: Serializer>(probability: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_probability(*probability))
}

/// Model-based outbreak risk for a neighborhood over a horizon
#[derive(Debug, Clone, Serialize)]
pub struct RiskAssessment {
    #[serde(rename = "bairro_pesquisado")]
    pub neighborhood: String,
    #[serde(rename = "periodo_analise")]
    pub period: String,
    #[serde(rename = "probabilidade_risco_dengue", serialize_with = "serialize_percentage")]
    pub probability: f64,
    #[serde(rename = "nivel_risco_calculado")]
    pub level: RiskLevel,
    #[serde(rename = "previsao_meteorologica_diaria")]
    pub daily_forecast: Vec<DailySummary>,
}

/// Threshold-rule alert derived from current and forecast weather
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherAlert {
    #[serde(rename = "nivel")]
    pub level: RiskLevel,
    #[serde(rename = "mensagem")]
    pub message: String,
}

/// Weather alert for a neighborhood, with its local attributes
#[derive(Debug, Clone, Serialize)]
pub struct NeighborhoodAlert {
    #[serde(rename = "bairro_pesquisado")]
    pub neighborhood: String,
    #[serde(rename = "alerta_de_risco")]
    pub alert: WeatherAlert,
    #[serde(rename = "dados_locais")]
    pub local_data: serde_json::Map<String, serde_json::Value>,
    #[serde(rename = "dados_meteorologicos_atuais")]
    pub current_weather: CurrentConditions,
}

/// Outcome of a direct (caller-supplied features) prediction
#[derive(Debug, Clone, Serialize)]
pub struct OutbreakPrediction {
    #[serde(rename = "modelo", skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(rename = "probabilidade_surto", serialize_with = "serialize_percentage")]
    pub probability: f64,
    #[serde(rename = "nivel_risco")]
    pub level: RiskLevel,
}

impl OutbreakPrediction {
    pub fn new(model: Option<&str>, probability: f64) -> Self {
        Self {
            model: model.map(str::to_string),
            probability,
            level: RiskLevel::from_probability(probability),
        }
    }
}
