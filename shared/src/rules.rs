//! Threshold weather alert rule
//!
//! A hand-written rule, independent of the trained models: rain in the next
//! three days or high humidity favours mosquito breeding; heat alone speeds
//! up the mosquito life cycle.

use crate::models::{CurrentConditions, ForecastStep, RiskLevel, WeatherAlert};

/// Forecast steps inspected for rain (3 days of 3-hour steps)
pub const RAIN_LOOKAHEAD_STEPS: usize = 24;

/// Relative humidity above which breeding conditions are favourable
pub const HUMIDITY_THRESHOLD_PERCENT: f64 = 75.0;

/// Temperature above which the mosquito cycle accelerates
pub const TEMPERATURE_THRESHOLD_CELSIUS: f64 = 25.0;

const HIGH_MESSAGE: &str = "Condições favoráveis para a proliferação do mosquito. Atenção redobrada com água parada nos próximos dias devido à chuva ou alta umidade.";
const MODERATE_MESSAGE: &str = "Temperatura elevada acelera o ciclo do mosquito. Mantenha a vigilância sobre possíveis criadouros.";
const LOW_MESSAGE: &str = "Condições meteorológicas menos favoráveis à proliferação. Continue com as medidas de prevenção.";

/// Whether any of the leading forecast steps is in a rain condition group
pub fn rain_expected(forecast: &[ForecastStep]) -> bool {
    forecast
        .iter()
        .take(RAIN_LOOKAHEAD_STEPS)
        .any(|step| step.weather_condition.to_lowercase().contains("rain"))
}

/// Classify current and forecast weather into an alert level
pub fn evaluate_weather_alert(current: &CurrentConditions, forecast: &[ForecastStep]) -> WeatherAlert {
    let (level, message) = if rain_expected(forecast)
        || current.humidity_percent > HUMIDITY_THRESHOLD_PERCENT
    {
        (RiskLevel::High, HIGH_MESSAGE)
    } else if current.temperature_celsius > TEMPERATURE_THRESHOLD_CELSIUS {
        (RiskLevel::Moderate, MODERATE_MESSAGE)
    } else {
        (RiskLevel::Low, LOW_MESSAGE)
    };

    WeatherAlert {
        level,
        message: message.to_string(),
    }
}
