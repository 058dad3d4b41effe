//! Live readings for one plant.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tabled::Tabled;

use leaflink_core::classify::{
    HUMIDITY_THRESHOLDS, LIGHT_THRESHOLDS, SOIL_THRESHOLDS, TEMPERATURE_THRESHOLDS, classify,
};
use leaflink_core::{DeviceId, PlantMonitor, SessionManager, TelemetrySnapshot, WeatherCode};

use leaflink_api::WeatherClient;

use crate::cli::{GlobalOpts, OutputFormat, WatchArgs};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled, Serialize)]
struct ReadingRow {
    #[tabled(rename = "Metric")]
    metric: &'static str,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(skip)]
    severity: i8,
}

fn reading_rows(snap: TelemetrySnapshot, color: bool) -> Vec<ReadingRow> {
    let metrics = [
        ("Soil moisture", format!("{:.0} %", snap.soil), classify(SOIL_THRESHOLDS, snap.soil)),
        ("Temperature", format!("{:.1} °C", snap.temp), classify(TEMPERATURE_THRESHOLDS, snap.temp)),
        ("Humidity", format!("{:.0} %", snap.humid), classify(HUMIDITY_THRESHOLDS, snap.humid)),
        ("Light", format!("{:.0} lx", snap.light), classify(LIGHT_THRESHOLDS, snap.light)),
    ];

    metrics
        .into_iter()
        .map(|(metric, value, c)| ReadingRow {
            metric,
            value,
            status: if color {
                output::tier_colored(c.label, c.tier)
            } else {
                c.label.to_string()
            },
            severity: c.severity,
        })
        .collect()
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(args: &WatchArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = util::load_config(global);
    let rest = util::rest_client_authed(&cfg)?;
    let weather = WeatherClient::new().map_err(leaflink_core::CoreError::from)?;
    let sessions = Arc::new(SessionManager::new(util::coordinator_config(&cfg)?));

    let device = DeviceId::new(args.uuid.clone());
    let mut monitor = PlantMonitor::bind(rest, weather, Arc::clone(&sessions), device).await?;

    let interval = Duration::from_secs(args.interval.unwrap_or(cfg.defaults.refresh_secs).max(1));

    loop {
        let reading = monitor.refresh().await?;
        render(&monitor, reading, global)?;

        if args.once {
            break;
        }

        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            () = tokio::time::sleep(interval) => {}
        }
    }

    monitor.close().await;
    Ok(())
}

fn render(
    monitor: &PlantMonitor,
    reading: Option<TelemetrySnapshot>,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let plant = monitor.plant();

    match global.output {
        OutputFormat::Json => {
            #[derive(Serialize)]
            struct WatchReport<'a> {
                uuid: String,
                nickname: &'a str,
                reading: Option<TelemetrySnapshot>,
                statuses: Option<Vec<ReadingRow>>,
                weather: Option<&'static str>,
            }

            let report = WatchReport {
                uuid: plant.id.to_string(),
                nickname: &plant.nickname,
                reading,
                statuses: reading.map(|snap| reading_rows(snap, false)),
                weather: (!monitor.weather_code().is_loading())
                    .then(|| monitor.weather_code().description()),
            };
            println!("{}", output::render_json(&report)?);
        }
        OutputFormat::Table => {
            if !global.quiet {
                let species = plant.species.as_deref().unwrap_or("unknown species");
                let age = plant
                    .age_days()
                    .map_or(String::new(), |d| format!(", {d} days old"));
                eprintln!("{} ({species}{age})", plant.nickname);

                let code = monitor.weather_code();
                if code != WeatherCode::LOADING {
                    eprintln!("Weather: {code}");
                }
            }

            match reading {
                Some(snap) => {
                    println!("{}", output::render_list(global.output, &reading_rows(snap, true))?);
                }
                None => eprintln!("No reading received (device offline?)"),
            }
        }
    }
    Ok(())
}
