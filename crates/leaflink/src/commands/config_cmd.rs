//! Config subcommand handlers.

use dialoguer::Input;

use leaflink_config::{BrokerSettings, Config};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, OutputFormat};
use crate::error::{CliError, prompt_err};
use crate::output;

pub fn handle(args: &ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Path ────────────────────────────────────────────────────
        ConfigCommand::Path => {
            println!("{}", leaflink_config::config_path().display());
            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let mut cfg = leaflink_config::load_config_or_default();
            // Never print a stored plaintext token.
            cfg.token = cfg.token.map(|_| "(stored)".into());

            match global.output {
                OutputFormat::Json => println!("{}", output::render_json(&cfg)?),
                OutputFormat::Table => {
                    let text =
                        toml::to_string_pretty(&cfg).map_err(leaflink_config::ConfigError::from)?;
                    print!("{text}");
                }
            }
            Ok(())
        }

        // ── Init: interactive wizard ────────────────────────────────
        ConfigCommand::Init => {
            let config_path = leaflink_config::config_path();
            eprintln!("✨ Leaflink — configuration wizard");
            eprintln!("   Config path: {}\n", config_path.display());

            let defaults = Config::default();

            let server: String = Input::new()
                .with_prompt("Backend server URL")
                .default(defaults.server.clone())
                .interact_text()
                .map_err(prompt_err)?;

            let namespace: String = Input::new()
                .with_prompt("Device topic namespace")
                .default(defaults.namespace.clone())
                .interact_text()
                .map_err(prompt_err)?;

            let broker_url: String = Input::new()
                .with_prompt("Broker URL")
                .default(defaults.broker.url.clone())
                .interact_text()
                .map_err(prompt_err)?;

            let broker_username: String = Input::new()
                .with_prompt("Broker username (empty for none)")
                .allow_empty(true)
                .interact_text()
                .map_err(prompt_err)?;

            let broker_password: String = if broker_username.is_empty() {
                String::new()
            } else {
                Input::new()
                    .with_prompt("Broker password")
                    .allow_empty(true)
                    .interact_text()
                    .map_err(prompt_err)?
            };

            let cfg = Config {
                server,
                namespace,
                token: None,
                defaults: defaults.defaults,
                broker: BrokerSettings {
                    url: broker_url,
                    username: broker_username,
                    password: broker_password,
                },
            };

            leaflink_config::save_config(&cfg)?;

            eprintln!("\n✓ Configuration written to {}", config_path.display());
            eprintln!("  Next: leaflink login");
            Ok(())
        }
    }
}
