use courier_kit::adapters::nhtsa::NhtsaSettings;
use courier_kit::core::vin_decode::decode_vin;
use courier_kit::domain::model::DecodeSource;
use courier_kit::domain::ports::VinDecoder;
use courier_kit::{CourierError, FallbackVinDecoder, LocalVinDecoder, NhtsaVinDecoder};
use httpmock::prelude::*;
use std::time::Duration;

const HONDA: &str = "1HGCM82633A004352";
const TOYOTA: &str = "JTDBU4EE9B9123456";

fn honda_payload() -> serde_json::Value {
    serde_json::json!({
        "Count": 136,
        "Message": "Results returned successfully",
        "SearchCriteria": format!("VIN:{}", HONDA),
        "Results": [
            {"Value": "HONDA", "ValueId": "474", "Variable": "Make", "VariableId": 26},
            {"Value": "Accord", "ValueId": "1861", "Variable": "Model", "VariableId": 28},
            {"Value": "2003", "ValueId": "", "Variable": "Model Year", "VariableId": 29},
            {"Value": "Coupe", "ValueId": "3", "Variable": "Body Class", "VariableId": 5},
            {"Value": "3.0", "ValueId": "", "Variable": "Displacement (L)", "VariableId": 13},
            {"Value": "Gasoline", "ValueId": "4", "Variable": "Fuel Type - Primary", "VariableId": 24},
            {"Value": null, "ValueId": null, "Variable": "Drive Type", "VariableId": 15},
            {"Value": "UNITED STATES (USA)", "ValueId": "6", "Variable": "Plant Country", "VariableId": 75}
        ]
    })
}

fn settings_for(server: &MockServer) -> NhtsaSettings {
    NhtsaSettings {
        endpoint: server.url("/decodevin"),
        ..NhtsaSettings::default()
    }
}

#[tokio::test]
async fn test_decode_from_nhtsa() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path(format!("/decodevin/{}", HONDA))
                .query_param("format", "json");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(honda_payload());
        })
        .await;

    let decoder = NhtsaVinDecoder::new(&settings_for(&server)).unwrap();
    let decoded = decoder.decode(HONDA).await.unwrap().unwrap();

    mock.assert_async().await;
    assert_eq!(decoded.make, "HONDA");
    assert_eq!(decoded.model, "Accord");
    assert_eq!(decoded.year, Some(2003));
    assert_eq!(decoded.body_type.as_deref(), Some("Coupe"));
    assert_eq!(decoded.engine_size.as_deref(), Some("3.0L"));
    assert_eq!(decoded.fuel_type.as_deref(), Some("Gasoline"));
    assert_eq!(decoded.drive_type, None);
    assert_eq!(decoded.country.as_deref(), Some("UNITED STATES (USA)"));
    assert_eq!(decoded.source, DecodeSource::Nhtsa);
}

#[tokio::test]
async fn test_server_error_is_reported() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path(format!("/decodevin/{}", TOYOTA));
            then.status(500).body("upstream unavailable");
        })
        .await;

    let decoder = NhtsaVinDecoder::new(&settings_for(&server)).unwrap();
    let err = decoder.decode(TOYOTA).await.unwrap_err();
    assert!(matches!(err, CourierError::DecodeError { .. }));
}

#[tokio::test]
async fn test_fallback_to_local_tables() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path(format!("/decodevin/{}", TOYOTA));
            then.status(500);
        })
        .await;

    let remote = NhtsaVinDecoder::new(&settings_for(&server)).unwrap();
    let decoder = FallbackVinDecoder::new(remote, LocalVinDecoder);

    let decoded = decode_vin(&decoder, TOYOTA).await.unwrap().unwrap();
    mock.assert_async().await;
    assert_eq!(decoded.make, "Toyota");
    assert_eq!(decoded.model, "Camry");
    assert_eq!(decoded.source, DecodeSource::Local);
}

#[tokio::test]
async fn test_empty_answer_falls_back() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path(format!("/decodevin/{}", TOYOTA));
            then.status(200).json_body(serde_json::json!({
                "Results": [
                    {"Value": "", "Variable": "Make"},
                    {"Value": "", "Variable": "Model Year"}
                ]
            }));
        })
        .await;

    let remote = NhtsaVinDecoder::new(&settings_for(&server)).unwrap();
    assert!(remote.decode(TOYOTA).await.unwrap().is_none());

    let decoder = FallbackVinDecoder::new(remote, LocalVinDecoder);
    let decoded = decoder.decode(TOYOTA).await.unwrap().unwrap();
    assert_eq!(decoded.source, DecodeSource::Local);
}

#[tokio::test]
async fn test_timeout_falls_back() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path(format!("/decodevin/{}", TOYOTA));
            then.status(200)
                .delay(Duration::from_secs(3))
                .json_body(honda_payload());
        })
        .await;

    let settings = NhtsaSettings {
        timeout_seconds: 1,
        ..settings_for(&server)
    };
    let remote = NhtsaVinDecoder::new(&settings).unwrap();
    let err = remote.decode(TOYOTA).await.unwrap_err();
    assert!(matches!(err, CourierError::ApiError(_)));

    let decoder = FallbackVinDecoder::new(remote, LocalVinDecoder);
    let decoded = decoder.decode(TOYOTA).await.unwrap().unwrap();
    assert_eq!(decoded.make, "Toyota");
}

#[test]
fn test_rejects_invalid_settings() {
    let settings = NhtsaSettings {
        endpoint: "not a url".to_string(),
        ..NhtsaSettings::default()
    };
    assert!(matches!(
        NhtsaVinDecoder::new(&settings),
        Err(CourierError::InvalidConfigValueError { .. })
    ));

    let settings = NhtsaSettings {
        timeout_seconds: 0,
        ..NhtsaSettings::default()
    };
    assert!(NhtsaVinDecoder::new(&settings).is_err());
}
