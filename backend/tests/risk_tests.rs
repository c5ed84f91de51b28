//! Neighborhood risk integration tests
//!
//! Exercises `GET /prever_risco/{bairro}` end to end through the router with
//! a fake weather provider and constant-probability models.

mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use common::*;
use dengue_risk_backend::Readiness;

fn setup(probability: f64, steps: usize) -> (axum::Router, Arc<FakeWeather>, Vec<(shared::Horizon, Arc<ConstantModel>)>) {
    let models = horizon_models(probability);
    let weather = Arc::new(FakeWeather::new(current(22.0, 50.0), forecast_steps(steps)));
    let app = app(ready(artifacts_with(&models)), weather.clone());
    (app, weather, models)
}

#[tokio::test]
async fn test_one_day_risk_high() {
    let (app, weather, _) = setup(0.73, 40);

    let (status, body) = get(app, "/prever_risco/centro?dias=1").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["bairro_pesquisado"], "CENTRO");
    assert_eq!(body["periodo_analise"], "1 dia(s)");
    assert_eq!(body["probabilidade_risco_dengue"], "73.00%");
    assert_eq!(body["nivel_risco_calculado"], "ALTO");
    assert_eq!(weather.calls(), 1);

    let days = body["previsao_meteorologica_diaria"].as_array().unwrap();
    assert_eq!(days.len(), 1);
    assert_eq!(days[0]["data"], "2025-11-06");
    assert_eq!(days[0]["minima_c"].as_f64(), Some(19.0));
    assert_eq!(days[0]["maxima_c"].as_f64(), Some(28.0));
    assert_eq!(days[0]["probabilidade_chuva_pct"].as_f64(), Some(70.0));
    assert_eq!(days[0]["resumo_tempo"], "nublado");
}

#[tokio::test]
async fn test_five_day_risk_uses_forty_steps() {
    let (app, _, models) = setup(0.2, 40);

    let (status, body) = get(app, "/prever_risco/Vila%20Mauriceia?dias=5").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["bairro_pesquisado"], "VILA MAURICEIA");
    assert_eq!(body["periodo_analise"], "5 dia(s)");
    assert_eq!(body["nivel_risco_calculado"], "BAIXO");
    assert_eq!(body["previsao_meteorologica_diaria"].as_array().unwrap().len(), 5);

    let five_day = &models.iter().find(|(h, _)| *h == shared::Horizon::FiveDays).unwrap().1;
    let batch = five_day.last_batch.lock().unwrap().clone().unwrap();
    assert_eq!(batch.shape(), [1, 40, 4]);
}

#[tokio::test]
async fn test_sequence_is_normalized_with_infestation_index() {
    let (app, _, models) = setup(0.6, 40);

    let (status, _) = get(app, "/prever_risco/CENTRO?dias=3").await;
    assert_eq!(status, StatusCode::OK);

    let three_day = &models.iter().find(|(h, _)| *h == shared::Horizon::ThreeDays).unwrap().1;
    let batch = three_day.last_batch.lock().unwrap().clone().unwrap();
    assert_eq!(batch.shape(), [1, 24, 4]);

    let first: Vec<f64> = batch.samples().next().unwrap().row(0).to_vec();
    let expected = [0.20, 0.70, 0.005, 0.125];
    for (value, expected) in first.iter().zip(expected) {
        assert!((value - expected).abs() < 1e-12, "{} != {}", value, expected);
    }
}

#[tokio::test]
async fn test_probability_at_threshold_is_low() {
    let (app, _, _) = setup(0.5, 40);
    let (_, body) = get(app, "/prever_risco/centro?dias=1").await;
    assert_eq!(body["probabilidade_risco_dengue"], "50.00%");
    assert_eq!(body["nivel_risco_calculado"], "BAIXO");
}

#[tokio::test]
async fn test_invalid_period_skips_weather() {
    let (app, weather, _) = setup(0.7, 40);

    let (status, body) = get(app, "/prever_risco/centro?dias=2").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_PERIOD");
    assert!(body["erro"].as_str().unwrap().contains("'1', '3' ou '5'"));
    assert_eq!(weather.calls(), 0);
}

#[tokio::test]
async fn test_missing_period_is_bad_request() {
    let (app, weather, _) = setup(0.7, 40);
    let (status, body) = get(app, "/prever_risco/centro").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["field"], "dias");
    assert_eq!(weather.calls(), 0);
}

#[tokio::test]
async fn test_unknown_neighborhood_skips_weather() {
    let (app, weather, _) = setup(0.7, 40);

    let (status, body) = get(app, "/prever_risco/INEXISTENTE?dias=1").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["erro"], "Bairro 'INEXISTENTE' não encontrado na base de dados.");
    assert_eq!(weather.calls(), 0);
}

#[tokio::test]
async fn test_missing_infestation_index_is_data_error() {
    let (app, weather, _) = setup(0.7, 40);
    let (status, body) = get(app, "/prever_risco/sem%20indice?dias=1").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["code"], "DATA_INTEGRITY_ERROR");
    assert_eq!(weather.calls(), 0);
}

#[tokio::test]
async fn test_insufficient_forecast() {
    let (app, _, models) = setup(0.7, 30);

    let (status, body) = get(app, "/prever_risco/centro?dias=5").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["code"], "INSUFFICIENT_FORECAST");
    assert!(body["erro"].as_str().unwrap().contains("30 passos"));
    for (_, model) in &models {
        assert!(model.last_batch.lock().unwrap().is_none());
    }
}

#[tokio::test]
async fn test_shorter_forecast_still_serves_shorter_horizon() {
    let (app, _, _) = setup(0.7, 30);
    let (status, body) = get(app, "/prever_risco/centro?dias=3").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["previsao_meteorologica_diaria"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_exactly_eight_steps_serve_one_day() {
    let (app, _, models) = setup(0.4, 8);

    let (status, body) = get(app, "/prever_risco/centro?dias=1").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["periodo_analise"], "1 dia(s)");
    assert_eq!(body["previsao_meteorologica_diaria"].as_array().unwrap().len(), 1);

    let one_day = &models.iter().find(|(h, _)| *h == shared::Horizon::OneDay).unwrap().1;
    let batch = one_day.last_batch.lock().unwrap().clone().unwrap();
    assert_eq!(batch.shape(), [1, 8, 4]);
}

#[tokio::test]
async fn test_five_steps_are_insufficient_for_one_day() {
    let (app, _, models) = setup(0.4, 5);

    let (status, body) = get(app, "/prever_risco/centro?dias=1").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["code"], "INSUFFICIENT_FORECAST");
    let erro = body["erro"].as_str().unwrap();
    assert!(erro.contains("5 passos"), "{}", erro);
    assert!(erro.contains("1 dia(s)"), "{}", erro);
    for (_, model) in &models {
        assert!(model.last_batch.lock().unwrap().is_none());
    }
}

#[tokio::test]
async fn test_weather_failures_pass_through() {
    let models = horizon_models(0.7);

    let unavailable = Arc::new(FakeWeather::failing(WeatherOutcome::Unavailable));
    let (status, body) = get(
        app(ready(artifacts_with(&models)), unavailable),
        "/prever_risco/centro?dias=1",
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"]["code"], "WEATHER_SERVICE_UNAVAILABLE");

    let rejected = Arc::new(FakeWeather::failing(WeatherOutcome::ApiError));
    let (status, body) = get(
        app(ready(artifacts_with(&models)), rejected),
        "/prever_risco/centro?dias=1",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"]["code"], "WEATHER_API_ERROR");
}

#[tokio::test]
async fn test_not_ready_refuses_every_route() {
    let not_ready = || Readiness::NotReady {
        reason: "missing model".to_string(),
    };

    for uri in ["/prever_risco/centro?dias=1", "/previsao/centro"] {
        let weather = Arc::new(FakeWeather::new(current(22.0, 50.0), forecast_steps(40)));
        let (status, body) = get(app(not_ready(), weather.clone()), uri).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{}", uri);
        assert_eq!(body["error"]["code"], "SERVICE_NOT_READY");
        assert_eq!(weather.calls(), 0);
    }

    for uri in ["/prever_surto_rf", "/prever_surto_dengue"] {
        let weather = Arc::new(FakeWeather::new(current(22.0, 50.0), forecast_steps(40)));
        let (status, body) = post_json(app(not_ready(), weather), uri, serde_json::json!({})).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{}", uri);
        assert_eq!(body["error"]["code"], "SERVICE_NOT_READY");
    }
}

#[tokio::test]
async fn test_health_reports_readiness() {
    let (app_ready, _, _) = setup(0.5, 40);
    let (status, body) = get(app_ready, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ready"], true);
    assert_eq!(body["environment"], "test");
    assert_eq!(body["artifacts"]["neighborhoods"], 3);

    let weather = Arc::new(FakeWeather::new(current(22.0, 50.0), forecast_steps(40)));
    let (_, body) = get(
        app(
            Readiness::NotReady {
                reason: "bad normalizer".to_string(),
            },
            weather,
        ),
        "/health",
    )
    .await;
    assert_eq!(body["ready"], false);
    assert_eq!(body["reason"], "bad normalizer");
}
