//! Plant list command handler.

use serde::Serialize;
use tabled::Tabled;

use leaflink_core::Plant;

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled, Serialize)]
struct PlantRow {
    #[tabled(rename = "UUID")]
    uuid: String,
    #[tabled(rename = "Nickname")]
    nickname: String,
    #[tabled(rename = "Species")]
    species: String,
    #[tabled(rename = "Age (days)")]
    age_days: String,
    #[tabled(rename = "Location")]
    location: String,
}

impl From<&Plant> for PlantRow {
    fn from(p: &Plant) -> Self {
        Self {
            uuid: p.id.to_string(),
            nickname: p.nickname.clone(),
            species: p.species.clone().unwrap_or_else(|| "-".into()),
            age_days: p.age_days().map(|d| d.to_string()).unwrap_or_else(|| "-".into()),
            location: p
                .location
                .as_ref()
                .map(|l| l.display_name.clone())
                .unwrap_or_else(|| "-".into()),
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = util::load_config(global);
    let rest = util::rest_client_authed(&cfg)?;

    let plants: Vec<Plant> = rest
        .get_plants()
        .await?
        .into_iter()
        .map(Plant::from)
        .collect();

    let rows: Vec<PlantRow> = plants.iter().map(PlantRow::from).collect();
    println!("{}", output::render_list(global.output, &rows)?);
    Ok(())
}
