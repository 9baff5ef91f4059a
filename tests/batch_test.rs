use courier_kit::adapters::csv_batch::{decode_csv, BatchRow, BatchSummary};
use courier_kit::adapters::nhtsa::NhtsaSettings;
use courier_kit::{FallbackVinDecoder, LocalVinDecoder, NhtsaVinDecoder};
use httpmock::prelude::*;
use std::fs::File;
use tempfile::TempDir;

fn read_rows(path: &std::path::Path) -> Vec<csv::StringRecord> {
    let mut reader = csv::Reader::from_path(path).unwrap();
    reader.records().map(|r| r.unwrap()).collect()
}

#[tokio::test]
async fn test_batch_file_offline() {
    let temp_dir = TempDir::new().unwrap();
    let input_path = temp_dir.path().join("fleet.csv");
    let output_path = temp_dir.path().join("decoded.csv");
    std::fs::write(
        &input_path,
        "vin\n jtdbu4ee9b9123456 \nWBA3A5C55CF256985\n1HGCM82633A00435O\n",
    )
    .unwrap();

    let summary = decode_csv(
        File::open(&input_path).unwrap(),
        File::create(&output_path).unwrap(),
        &LocalVinDecoder,
    )
    .await
    .unwrap();

    assert_eq!(
        summary,
        BatchSummary {
            total: 3,
            decoded: 2,
            failed: 1
        }
    );

    let rows = read_rows(&output_path);
    assert_eq!(rows.len(), 3);
    assert_eq!(&rows[0][0], "JTDBU4EE9B9123456");
    assert_eq!(&rows[0][2], "Toyota");
    assert_eq!(&rows[1][2], "BMW");
    assert_eq!(&rows[1][3], "Unknown Model");
    assert_eq!(&rows[1][4], "2012");
    assert!(rows[2][7].starts_with("VIN cannot contain I, O, or Q"));
    assert_eq!(&rows[2][1], "false");
}

#[tokio::test]
async fn test_batch_mixes_remote_and_local() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/decodevin/1HGCM82633A004352");
            then.status(200).json_body(serde_json::json!({
                "Results": [
                    {"Value": "HONDA", "Variable": "Make"},
                    {"Value": "Accord", "Variable": "Model"},
                    {"Value": "2003", "Variable": "Model Year"},
                    {"Value": "UNITED STATES (USA)", "Variable": "Plant Country"}
                ]
            }));
        })
        .await;

    let settings = NhtsaSettings {
        endpoint: server.url("/decodevin"),
        ..NhtsaSettings::default()
    };
    let decoder = FallbackVinDecoder::new(NhtsaVinDecoder::new(&settings).unwrap(), LocalVinDecoder);

    let input = "vin\n1HGCM82633A004352\nJTDBU4EE9B9123456\n";
    let mut output = Vec::new();
    let summary = decode_csv(input.as_bytes(), &mut output, &decoder).await.unwrap();
    assert_eq!(summary.decoded, 2);

    let mut reader = csv::Reader::from_reader(output.as_slice());
    let rows: Vec<BatchRowView> = reader.deserialize().map(|r| r.unwrap()).collect();
    assert_eq!(rows[0].make, "HONDA");
    assert_eq!(rows[0].source, "nhtsa");
    assert!(rows[0].valid_checksum);
    assert_eq!(rows[1].make, "Toyota");
    assert_eq!(rows[1].source, "local");
    assert!(!rows[1].valid_checksum);
}

#[derive(Debug, serde::Deserialize)]
struct BatchRowView {
    make: String,
    source: String,
    valid_checksum: bool,
}

#[test]
fn test_row_header_order() {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.serialize(BatchRow::default()).unwrap();
    let text = String::from_utf8(writer.into_inner().unwrap()).unwrap();
    assert_eq!(
        text.lines().next(),
        Some("vin,valid_checksum,make,model,year,country,source,error")
    );
}
