use anyhow::Context;
use clap::Parser;
use courier_kit::adapters::csv_batch::decode_csv;
use courier_kit::adapters::nhtsa::NhtsaVinDecoder;
use courier_kit::adapters::track::TrackReplay;
use courier_kit::config::cli::{Command, VinCommand};
use courier_kit::core::eta_alerts::ArrivalAlerts;
use courier_kit::core::vin::{cleanup_vin, validate_vin};
use courier_kit::core::vin_decode::{decode_vin, FallbackVinDecoder, LocalVinDecoder};
use courier_kit::core::vin_ocr::{
    extract_vin_candidates, find_consensus_vin, validate_user_edit, vin_confidence,
};
use courier_kit::core::watch::EtaWatcher;
use courier_kit::domain::ports::VinDecoder;
use courier_kit::utils::{logger, validation::Validate};
use courier_kit::{calculate_distance, Cli, CourierError, EtaEstimator, TomlConfig};
use serde::Serialize;
use std::io::Read;
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match TomlConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(e.severity().exit_code());
        }
    };

    // 初始化日誌
    let level = config.logging.level.as_deref();
    if cli.log_json || config.logging.json {
        logger::init_json_logger(cli.verbose, level);
    } else {
        logger::init_cli_logger(cli.verbose, level);
    }
    tracing::debug!("CLI arguments: {:?}", cli);

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(e.severity().exit_code());
    }

    if let Err(e) = run(&cli, &config).await {
        // anyhow 包裝的領域錯誤依嚴重程度決定退出碼
        match e.downcast_ref::<CourierError>() {
            Some(err) => {
                tracing::error!(
                    "❌ {} (Category: {:?}, Severity: {:?})",
                    err,
                    err.category(),
                    err.severity()
                );
                eprintln!("❌ {}", err.user_friendly_message());
                eprintln!("💡 {}", err.recovery_suggestion());
                std::process::exit(err.severity().exit_code());
            }
            None => {
                eprintln!("❌ {:#}", e);
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

async fn run(cli: &Cli, config: &TomlConfig) -> anyhow::Result<()> {
    let estimator = EtaEstimator::new(config.eta.settings())?;

    match &cli.command {
        Command::Distance { from, to } => {
            let km = calculate_distance(from.lat, from.lng, to.lat, to.lng);
            #[derive(Serialize)]
            struct Output {
                distance_km: f64,
            }
            emit(cli.json, &Output { distance_km: km }, || format!("{:.2} km", km))?;
        }

        Command::Eta { from, to, buffer } => {
            let eta = estimator.estimate(from, to, *buffer);
            emit(cli.json, &eta, || {
                format!(
                    "🚗 {} ({} km, arriving {}, {} traffic)",
                    eta.countdown_text, eta.distance_km, eta.formatted_eta, eta.traffic
                )
            })?;
        }

        Command::Trip {
            driver,
            pickup,
            delivery,
        } => {
            let trip = estimator.estimate_trip(driver, pickup, delivery);
            emit(cli.json, &trip, || {
                format!(
                    "📦 Pickup: {} ({} km)\n🏁 Delivery: {} ({} km)\n⏱  Total: {} min",
                    trip.to_pickup.countdown_text,
                    trip.to_pickup.distance_km,
                    trip.to_delivery.countdown_text,
                    trip.to_delivery.distance_km,
                    trip.total_minutes
                )
            })?;
        }

        Command::Watch {
            track,
            dest,
            order_id,
            buffer,
            interval,
        } => {
            let source = TrackReplay::from_file(track)
                .with_context(|| format!("loading track {}", track.display()))?;
            let seconds = interval.unwrap_or(config.eta.watch.poll_interval_seconds);
            let json = cli.json;

            EtaWatcher::new(
                estimator,
                ArrivalAlerts::new(config.eta.alerts.clone()),
                source,
                order_id.clone(),
                *dest,
            )
            .with_buffer(*buffer)
            .with_interval(Duration::from_secs(seconds))
            .run(|tick| {
                if json {
                    match serde_json::to_string(tick) {
                        Ok(line) => println!("{}", line),
                        Err(e) => tracing::warn!("Could not serialise tick: {}", e),
                    }
                } else {
                    println!(
                        "[{}] {} -> {} ({} km)",
                        tick.tick, tick.position, tick.eta.countdown_text, tick.eta.distance_km
                    );
                    for alert in &tick.alerts {
                        println!("🔔 {}", alert.message);
                    }
                }
            })
            .await;
        }

        Command::Vin(command) => run_vin(command, cli.json, config).await?,
    }

    Ok(())
}

async fn run_vin(command: &VinCommand, json: bool, config: &TomlConfig) -> anyhow::Result<()> {
    match command {
        VinCommand::Check { vin } => {
            #[derive(Serialize)]
            struct Output<'a> {
                vin: &'a str,
                valid: bool,
                confidence: u8,
                issue: Option<String>,
            }
            let result = validate_vin(vin);
            let output = Output {
                vin,
                valid: result.is_ok(),
                confidence: vin_confidence(&vin.to_ascii_uppercase()),
                issue: result.as_ref().err().map(|issue| issue.to_string()),
            };
            emit(json, &output, || match &output.issue {
                None => format!("✅ {} is valid", vin),
                Some(issue) => format!("❌ {}", issue),
            })?;
        }

        VinCommand::Decode { vin, offline } => {
            let decoder = build_decoder(config, *offline)?;
            let decoded = decode_vin(decoder.as_ref(), vin).await?;
            match decoded {
                Some(decoded) => emit(json, &decoded, || {
                    let mut details = format!("Vehicle: {}", decoded.summary());
                    if let Some(body) = &decoded.body_type {
                        details.push_str(&format!("\nBody: {}", body));
                    }
                    if let Some(engine) = &decoded.engine_size {
                        details.push_str(&format!("\nEngine: {}", engine));
                    }
                    if let Some(fuel) = &decoded.fuel_type {
                        details.push_str(&format!("\nFuel: {}", fuel));
                    }
                    if let Some(country) = &decoded.country {
                        details.push_str(&format!("\nOrigin: {}", country));
                    }
                    if decoded.is_low_confidence() {
                        details.push_str("\n⚠️ Manufacturer matched by prefix only");
                    }
                    details
                })?,
                None => {
                    return Err(CourierError::DecodeError {
                        message: format!("no decoder recognised {}", vin),
                    }
                    .into())
                }
            }
        }

        VinCommand::Cleanup { text } => {
            let cleaned = cleanup_vin(text);
            let valid = cleaned.as_deref().is_some_and(|c| validate_vin(c).is_ok());
            #[derive(Serialize)]
            struct Output {
                vin: Option<String>,
                valid: bool,
            }
            let output = Output {
                vin: cleaned,
                valid,
            };
            emit(json, &output, || match &output.vin {
                Some(vin) if output.valid => format!("✅ {}", vin),
                Some(vin) => format!("⚠️ {} (check digit does not match)", vin),
                None => "❌ No VIN characters found".to_string(),
            })?;
        }

        VinCommand::Scan { file } => {
            let text = match file {
                Some(path) => std::fs::read_to_string(path)
                    .with_context(|| format!("reading {}", path.display()))?,
                None => {
                    let mut buffer = String::new();
                    std::io::stdin().read_to_string(&mut buffer)?;
                    buffer
                }
            };
            let candidates = extract_vin_candidates(&text);
            tracing::info!("Found {} VIN candidates", candidates.len());

            #[derive(Serialize)]
            struct Candidate {
                vin: String,
                confidence: u8,
            }
            let scored: Vec<Candidate> = candidates
                .into_iter()
                .map(|vin| Candidate {
                    confidence: vin_confidence(&vin),
                    vin,
                })
                .collect();
            emit(json, &scored, || {
                scored
                    .iter()
                    .map(|c| format!("{} ({}%)", c.vin, c.confidence))
                    .collect::<Vec<_>>()
                    .join("\n")
            })?;
        }

        VinCommand::Consensus { readings } => {
            let vin = find_consensus_vin(readings);
            emit(json, &vin, || match &vin {
                Some(vin) => format!("✅ {}", vin),
                None => "❌ No valid VIN among the readings".to_string(),
            })?;
        }

        VinCommand::Edit { original, edited } => {
            let result = validate_user_edit(original, edited);
            #[derive(Serialize)]
            struct Output {
                valid: bool,
                message: &'static str,
            }
            let output = Output {
                valid: result.is_ok(),
                message: match &result {
                    Ok(()) => "VIN is valid!",
                    Err(rejection) => rejection.message(),
                },
            };
            emit(json, &output, || output.message.to_string())?;
        }

        VinCommand::Batch {
            input,
            output,
            offline,
        } => {
            let decoder = build_decoder(config, *offline)?;
            let reader = std::fs::File::open(input)
                .with_context(|| format!("opening {}", input.display()))?;

            let summary = match output {
                Some(path) => {
                    let writer = std::fs::File::create(path)
                        .with_context(|| format!("creating {}", path.display()))?;
                    decode_csv(reader, writer, decoder.as_ref()).await?
                }
                None => decode_csv(reader, std::io::stdout(), decoder.as_ref()).await?,
            };
            eprintln!(
                "✅ {} VINs processed, {} decoded, {} failed",
                summary.total, summary.decoded, summary.failed
            );
        }
    }

    Ok(())
}

fn build_decoder(config: &TomlConfig, offline: bool) -> anyhow::Result<Box<dyn VinDecoder>> {
    if offline || !config.vin.nhtsa.enabled {
        tracing::debug!("Using the built-in VIN tables only");
        return Ok(Box::new(LocalVinDecoder));
    }

    let remote = NhtsaVinDecoder::new(&config.vin.nhtsa)?;
    Ok(Box::new(FallbackVinDecoder::new(remote, LocalVinDecoder)))
}

fn emit<T, F>(json: bool, value: &T, human: F) -> anyhow::Result<()>
where
    T: Serialize + ?Sized,
    F: FnOnce() -> String,
{
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        println!("{}", human());
    }
    Ok(())
}
