//! Device pairing and plant joining, driven interactively.

use std::sync::Arc;
use std::time::Duration;

use dialoguer::{Input, Select};
use indicatif::ProgressBar;

use leaflink_api::WeatherClient;
use leaflink_core::{DeviceId, GeoLocation, PairingFlow, SessionKind, SessionManager};

use crate::cli::{GlobalOpts, JoinArgs, PairArgs};
use crate::error::{CliError, prompt_err};

use super::util;

// ── Pair (create branch) ────────────────────────────────────────────

pub async fn handle(args: &PairArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = util::load_config(global);
    let rest = util::rest_client_authed(&cfg)?;
    let weather = WeatherClient::new().map_err(leaflink_core::CoreError::from)?;

    let mut flow = PairingFlow::new();

    let choices = &["Pair a new device", "Join a shared plant"];
    let choice = Select::new()
        .with_prompt("Add a plant")
        .items(choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    if choice == 1 {
        flow.choose_share();
        let code: String = Input::new()
            .with_prompt("Sharing code")
            .interact_text()
            .map_err(prompt_err)?;
        flow.submit_share_code(&code, &rest).await?;
        eprintln!("✓ Joined the shared plant");
        return Ok(());
    }

    flow.choose_create();

    // Nickname + birth date, retrying on validation failures
    loop {
        let nickname: String = Input::new()
            .with_prompt("Nickname")
            .interact_text()
            .map_err(prompt_err)?;
        let birth_text: String = Input::new()
            .with_prompt("Birth date (YYYY-MM-DD)")
            .interact_text()
            .map_err(prompt_err)?;

        let Ok(birth) = chrono::NaiveDate::parse_from_str(&birth_text, "%Y-%m-%d") else {
            eprintln!("  not a valid date, expected YYYY-MM-DD");
            continue;
        };

        if flow.submit_nickname(&nickname, birth).is_ok() {
            break;
        }
        eprintln!("  {}", flow.error().unwrap_or("invalid input"));
    }

    // Location via forward geocoding
    loop {
        let query: String = Input::new()
            .with_prompt("Location (city or address)")
            .interact_text()
            .map_err(prompt_err)?;

        let matches = match weather.search(&query).await {
            Ok(matches) => matches,
            Err(e) => {
                eprintln!("  lookup failed: {e}");
                continue;
            }
        };
        if matches.is_empty() {
            eprintln!("  no places matched '{query}'");
            continue;
        }

        let names: Vec<&str> = matches.iter().map(|m| m.display_name.as_str()).collect();
        let idx = Select::new()
            .with_prompt("Pick the right place")
            .items(&names)
            .default(0)
            .interact()
            .map_err(prompt_err)?;

        let m = &matches[idx];
        flow.submit_location(GeoLocation {
            display_name: m.display_name.clone(),
            lat: m.lat.clone(),
            lon: m.lon.clone(),
        })?;
        break;
    }

    // Species; the backend creates the record on success
    loop {
        let species: String = Input::new()
            .with_prompt("Species")
            .interact_text()
            .map_err(prompt_err)?;

        match flow.submit_species(&species, &rest).await {
            Ok(()) => break,
            Err(leaflink_core::CoreError::ValidationFailed { .. }) => {
                eprintln!("  {}", flow.error().unwrap_or("invalid input"));
            }
            Err(e) => return Err(e.into()),
        }
    }

    let credential = flow
        .credential()
        .cloned()
        .ok_or_else(|| CliError::ApiError {
            message: "no device credential after creation".into(),
        })?;

    println!("Device token: {}", credential.token);
    println!("Device uuid:  {}", credential.uuid);
    eprintln!("\nEnter the token in the device's setup portal to bring it online.");

    if args.skip_wait {
        flow.skip_wait();
    } else {
        wait_for_device(&cfg, &mut flow, &credential.uuid).await?;
    }

    eprintln!("✓ Paired '{}'", flow.nickname());
    Ok(())
}

/// Watch the new device's status topic until it signals, the user gives
/// up, or the session drops.
async fn wait_for_device(
    cfg: &leaflink_config::Config,
    flow: &mut PairingFlow,
    uuid: &str,
) -> Result<(), CliError> {
    let sessions = Arc::new(SessionManager::new(util::coordinator_config(cfg)?));
    let device = DeviceId::new(uuid);
    let session = sessions.open(&device, SessionKind::Status)?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_message("Waiting for the device to come online (Ctrl-C to skip)…");
    spinner.enable_steady_tick(Duration::from_millis(120));

    let mut online = session.online();
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            flow.skip_wait();
        }
        signalled = online.wait_for(|on| *on) => {
            if signalled.is_ok() {
                flow.device_online();
            } else {
                flow.skip_wait();
            }
        }
    }

    spinner.finish_and_clear();
    sessions.close(&device).await;
    Ok(())
}

// ── Join (share branch, non-interactive) ────────────────────────────

pub async fn join(args: &JoinArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = util::load_config(global);
    let rest = util::rest_client_authed(&cfg)?;

    let mut flow = PairingFlow::new();
    flow.choose_share();
    flow.submit_share_code(&args.code, &rest).await?;

    if !global.quiet {
        eprintln!("✓ Joined the shared plant");
    }
    Ok(())
}
