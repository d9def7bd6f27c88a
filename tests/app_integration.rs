use tracing::{error, info};

// Adds automatic logging to test
mod test_utils {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub async fn create_mock_server(base: &str, mock_response: &str) -> MockServer {
        let mock_server = MockServer::start().await;
        let url_path = format!("/{base}");

        Mock::given(method("GET"))
            .and(path(&url_path))
            .respond_with(ResponseTemplate::new(200).set_body_string(mock_response))
            .mount(&mock_server)
            .await;

        mock_server
    }

    pub fn write_config(
        config_file: &tempfile::NamedTempFile,
        base_url: &str,
        data_path: &std::path::Path,
    ) {
        let config_content = format!(
            r#"
        providers:
          exchange_rate:
            base_url: {}
            timeout_secs: 5
        default_from: "USD"
        default_to: "EUR"
        data_path: "{}"
    "#,
            base_url,
            data_path.display()
        );
        std::fs::write(config_file.path(), config_content).expect("Failed to write config file");
    }
}

const GBP_RATES: &str = r#"{
    "result": "success",
    "base_code": "GBP",
    "time_last_update_unix": 1763337751,
    "rates": { "GBP": 1, "JPY": 203.5, "EUR": 1.13 }
}"#;

#[test_log::test(tokio::test)]
async fn test_full_app_flow_with_mock() {
    let mock_server = test_utils::create_mock_server("GBP", GBP_RATES).await;
    let data_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config_file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
    test_utils::write_config(&config_file, &mock_server.uri(), data_dir.path());

    let result = xconv::run_command(
        xconv::AppCommand::Convert {
            amount: "100.00".to_string(),
            from: Some("gbp".to_string()),
            to: Some("JPY".to_string()),
        },
        Some(config_file.path().to_str().unwrap()),
    )
    .await;
    assert!(
        result.is_ok(),
        "Convert command failed with: {:?}",
        result.err()
    );

    assert!(data_dir.path().join("store").exists());
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 1);
}

#[test_log::test(tokio::test)]
async fn test_view_model_against_mock_provider() {
    use xconv::core::ConversionOutcome;

    let mock_server = test_utils::create_mock_server("GBP", GBP_RATES).await;
    let data_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config_file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
    test_utils::write_config(&config_file, &mock_server.uri(), data_dir.path());
    let config = xconv::core::config::AppConfig::load_from_path(config_file.path()).unwrap();

    let view_model = xconv::build_view_model(&config).unwrap();
    assert_eq!(view_model.snapshot().source_currency.as_str(), "USD");

    let outcome = view_model
        .convert_with("2", "GBP".parse().unwrap(), "JPY".parse().unwrap())
        .await;

    assert_eq!(
        outcome,
        ConversionOutcome::Converted {
            amount: 407.0,
            rate: 203.5
        }
    );
    let state = view_model.snapshot();
    assert!(!state.is_loading());
    assert_eq!(state.result_line(), "407.00 JPY");
    assert!(state.rates_updated_at.is_some());
}

#[test_log::test(tokio::test)]
async fn test_convert_rejects_invalid_amount_without_request() {
    let mock_server = test_utils::create_mock_server("USD", GBP_RATES).await;
    let data_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config_file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
    test_utils::write_config(&config_file, &mock_server.uri(), data_dir.path());

    let result = xconv::run_command(
        xconv::AppCommand::Convert {
            amount: "abc".to_string(),
            from: None,
            to: None,
        },
        Some(config_file.path().to_str().unwrap()),
    )
    .await;

    assert_eq!(result.unwrap_err().to_string(), "Invalid amount: 'abc'");
    assert!(mock_server.received_requests().await.unwrap().is_empty());
}

#[test_log::test(tokio::test)]
async fn test_convert_reports_missing_rate() {
    let mock_server = test_utils::create_mock_server("GBP", GBP_RATES).await;
    let data_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config_file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
    test_utils::write_config(&config_file, &mock_server.uri(), data_dir.path());

    let result = xconv::run_command(
        xconv::AppCommand::Convert {
            amount: "50".to_string(),
            from: Some("GBP".to_string()),
            to: Some("XYZ".to_string()),
        },
        Some(config_file.path().to_str().unwrap()),
    )
    .await;

    assert_eq!(
        result.unwrap_err().to_string(),
        "Rate unavailable for target currency: XYZ"
    );
}

#[test_log::test(tokio::test)]
async fn test_convert_reports_malformed_response() {
    let mock_server = test_utils::create_mock_server("USD", r#"{"unexpected": true}"#).await;
    let data_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config_file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
    test_utils::write_config(&config_file, &mock_server.uri(), data_dir.path());

    let result = xconv::run_command(
        xconv::AppCommand::Convert {
            amount: "1".to_string(),
            from: None,
            to: None,
        },
        Some(config_file.path().to_str().unwrap()),
    )
    .await;

    assert!(
        result
            .unwrap_err()
            .to_string()
            .starts_with("Malformed response:")
    );
}

#[test_log::test(tokio::test)]
async fn test_invalid_currency_argument() {
    let data_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config_file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
    test_utils::write_config(&config_file, "http://localhost:1", data_dir.path());

    let result = xconv::run_command(
        xconv::AppCommand::Convert {
            amount: "1".to_string(),
            from: Some("dollars".to_string()),
            to: None,
        },
        Some(config_file.path().to_str().unwrap()),
    )
    .await;

    assert_eq!(
        result.unwrap_err().to_string(),
        "Invalid currency code: 'dollars'"
    );
}

#[test_log::test(tokio::test)]
async fn test_listing_commands() {
    let data_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config_file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
    test_utils::write_config(&config_file, "http://localhost:1", data_dir.path());
    let config_path = config_file.path().to_str().unwrap();

    for command in [xconv::AppCommand::Last, xconv::AppCommand::Currencies] {
        let result = xconv::run_command(command, Some(config_path)).await;
        assert!(result.is_ok(), "Command failed with: {:?}", result.err());
    }
}

#[test_log::test(tokio::test)]
async fn test_missing_config_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.yaml");

    let result = xconv::run_command(xconv::AppCommand::Last, Some(missing.to_str().unwrap())).await;

    assert!(
        result
            .unwrap_err()
            .to_string()
            .contains("Failed to read config file")
    );
}

#[test_log::test(tokio::test)]
#[ignore = "requires network access"]
async fn test_real_open_er_api() {
    use std::time::Duration;
    use xconv::core::RateProvider;
    use xconv::providers::open_er_api::OpenErApiProvider;

    let provider =
        OpenErApiProvider::new("https://open.er-api.com/v6/latest", Duration::from_secs(10))
            .unwrap();

    let base = "USD".parse().unwrap();
    info!(%base, "Fetching rates from open.er-api.com");

    match provider.fetch_rates(&base).await {
        Ok(quote) => {
            info!(rates = quote.rates.len(), "Received successful rates response");
            let rate = quote.rate_for(&"EUR".parse().unwrap()).unwrap();
            assert!(rate > 0.0, "Currency rate should be positive");
        }
        Err(e) => {
            error!("Rates API request failed: {e}\n{e:?}");
            panic!("Rates API request failed: {e}");
        }
    }
}
