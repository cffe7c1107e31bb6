use std::fs;
use std::path::Path;
use tracing::info;

mod test_utils {
    use wiremock::matchers::{method, path, path_regex, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Serves a constant USD/COP rate for every day, except `failing_day`
    /// which answers with a server error.
    pub async fn create_rates_mock_server(failing_day: Option<&str>) -> MockServer {
        let mock_server = MockServer::start().await;

        if let Some(day) = failing_day {
            Mock::given(method("GET"))
                .and(path(format!("/{day}")))
                .respond_with(ResponseTemplate::new(500))
                .with_priority(1)
                .mount(&mock_server)
                .await;
        }

        Mock::given(method("GET"))
            .and(path_regex(r"^/\d{4}-\d{2}-\d{2}$"))
            .and(query_param("base", "USD"))
            .and(query_param("symbols", "COP"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"{"success": true, "rates": {"COP": 4650.5}}"#),
            )
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/latest"))
            .and(query_param("base", "USD"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"success": true, "date": "2023-01-31", "rates": {"COP": 4650.5, "EUR": 0.92}}"#,
            ))
            .mount(&mock_server)
            .await;

        mock_server
    }

    pub fn write_config(dir: &std::path::Path, base_url: &str, storage: &str) -> std::path::PathBuf {
        let config_path = dir.join("config.yaml");
        let config_content = format!(
            r#"
            provider:
              base_url: {}
              concurrency: 3
            reference_date: "2023-01-31"
            data_path: {}
            storage: {}
            chart:
              width: 400
              height: 300
        "#,
            base_url,
            dir.join("data").display(),
            storage
        );
        std::fs::write(&config_path, config_content).expect("Failed to write config file");
        config_path
    }
}

fn csv_rows(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .expect("Series file missing")
        .lines()
        .skip(1)
        .map(str::to_string)
        .collect()
}

#[test_log::test(tokio::test)]
async fn test_history_flow_skips_failing_day() {
    let mock_server = test_utils::create_rates_mock_server(Some("2023-01-27")).await;
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config_path = test_utils::write_config(temp_dir.path(), &mock_server.uri(), "csv");

    let result = fxtrend::run_command(
        fxtrend::AppCommand::History {
            pair: "usd/cop".to_string(),
            days: Some(10),
        },
        Some(config_path.to_str().unwrap()),
        None,
    )
    .await;
    assert!(result.is_ok(), "History failed with: {:?}", result.err());

    let rows = csv_rows(&temp_dir.path().join("data/series/USD_COP.csv"));
    info!(?rows, "Stored series");
    assert_eq!(rows.len(), 9);
    assert_eq!(rows.first().unwrap(), "2023-01-22,4650.5");
    assert_eq!(rows.last().unwrap(), "2023-01-31,4650.5");
    assert!(rows.iter().all(|row| !row.starts_with("2023-01-27")));
}

#[test_log::test(tokio::test)]
async fn test_forecast_flow_writes_chart() {
    let mock_server = test_utils::create_rates_mock_server(None).await;
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config_path = test_utils::write_config(temp_dir.path(), &mock_server.uri(), "csv");

    let result = fxtrend::run_command(
        fxtrend::AppCommand::Forecast {
            pair: "USDCOP".to_string(),
            days: Some(7),
        },
        Some(config_path.to_str().unwrap()),
        None,
    )
    .await;
    assert!(result.is_ok(), "Forecast failed with: {:?}", result.err());

    // Default window of 30 days was fetched first
    let rows = csv_rows(&temp_dir.path().join("data/series/USD_COP.csv"));
    assert_eq!(rows.len(), 30);

    let chart = temp_dir.path().join("data/charts/USD_COP_forecast.png");
    let bytes = fs::read(chart).expect("Forecast chart missing");
    assert!(bytes.starts_with(b"\x89PNG"));
}

#[test_log::test(tokio::test)]
async fn test_chart_flow_with_fjall_store() {
    let mock_server = test_utils::create_rates_mock_server(None).await;
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config_path = test_utils::write_config(temp_dir.path(), &mock_server.uri(), "fjall");

    let result = fxtrend::run_command(
        fxtrend::AppCommand::Chart {
            pair: "USD-COP".to_string(),
            show: false,
            forecast: false,
        },
        Some(config_path.to_str().unwrap()),
        None,
    )
    .await;
    assert!(result.is_ok(), "Chart failed with: {:?}", result.err());
    assert!(
        temp_dir
            .path()
            .join("data/charts/USD_COP_historical.png")
            .exists()
    );
    assert!(temp_dir.path().join("data/store").exists());
}

#[test_log::test(tokio::test)]
async fn test_as_of_overrides_reference_date() {
    let mock_server = test_utils::create_rates_mock_server(None).await;
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config_path = test_utils::write_config(temp_dir.path(), &mock_server.uri(), "csv");

    let result = fxtrend::run_command(
        fxtrend::AppCommand::History {
            pair: "USD/COP".to_string(),
            days: Some(3),
        },
        Some(config_path.to_str().unwrap()),
        chrono::NaiveDate::from_ymd_opt(2022, 12, 31),
    )
    .await;
    assert!(result.is_ok(), "History failed with: {:?}", result.err());

    let rows = csv_rows(&temp_dir.path().join("data/series/USD_COP.csv"));
    assert_eq!(
        rows,
        vec!["2022-12-29,4650.5", "2022-12-30,4650.5", "2022-12-31,4650.5"]
    );
}

#[test_log::test(tokio::test)]
async fn test_rates_flow() {
    let mock_server = test_utils::create_rates_mock_server(None).await;
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config_path = test_utils::write_config(temp_dir.path(), &mock_server.uri(), "csv");

    let result = fxtrend::run_command(
        fxtrend::AppCommand::Rates {
            base: "usd".to_string(),
        },
        Some(config_path.to_str().unwrap()),
        None,
    )
    .await;
    assert!(result.is_ok(), "Rates failed with: {:?}", result.err());
}

#[test_log::test(tokio::test)]
async fn test_unreachable_provider_is_no_data() {
    let mock_server = wiremock::MockServer::start().await;
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config_path = test_utils::write_config(temp_dir.path(), &mock_server.uri(), "csv");

    let result = fxtrend::run_command(
        fxtrend::AppCommand::History {
            pair: "USD/COP".to_string(),
            days: Some(5),
        },
        Some(config_path.to_str().unwrap()),
        None,
    )
    .await;

    let err = result.expect_err("History should fail without data");
    let forex_err = err
        .downcast_ref::<fxtrend::core::ForexError>()
        .expect("Expected a ForexError");
    assert!(matches!(forex_err, fxtrend::core::ForexError::NoData { .. }));
}

#[test_log::test(tokio::test)]
async fn test_invalid_pair_is_rejected() {
    let mock_server = test_utils::create_rates_mock_server(None).await;
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config_path = test_utils::write_config(temp_dir.path(), &mock_server.uri(), "csv");

    let result = fxtrend::run_command(
        fxtrend::AppCommand::Chart {
            pair: "dollars".to_string(),
            show: false,
            forecast: false,
        },
        Some(config_path.to_str().unwrap()),
        None,
    )
    .await;
    assert!(result.is_err());
}

#[test_log::test(tokio::test)]
async fn test_chart_show_finds_rendered_chart() {
    let mock_server = test_utils::create_rates_mock_server(None).await;
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config_path = test_utils::write_config(temp_dir.path(), &mock_server.uri(), "csv");
    let config_path = config_path.to_str().unwrap();

    let chart = |show: bool, forecast: bool| fxtrend::AppCommand::Chart {
        pair: "USD/COP".to_string(),
        show,
        forecast,
    };

    // Nothing rendered yet
    assert!(
        fxtrend::run_command(chart(true, false), Some(config_path), None)
            .await
            .is_err()
    );

    fxtrend::run_command(chart(false, false), Some(config_path), None)
        .await
        .expect("Chart failed");
    let result = fxtrend::run_command(chart(true, false), Some(config_path), None).await;
    assert!(result.is_ok(), "Show failed with: {:?}", result.err());

    // Only the historical chart exists
    assert!(
        fxtrend::run_command(chart(true, true), Some(config_path), None)
            .await
            .is_err()
    );
}
