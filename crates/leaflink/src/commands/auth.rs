//! Account command handlers: login, logout, whoami.

use dialoguer::{Input, Password};
use secrecy::ExposeSecret;

use crate::cli::{GlobalOpts, LoginArgs, OutputFormat};
use crate::error::{CliError, prompt_err};
use crate::output;

use super::util;

pub async fn login(args: LoginArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = util::load_config(global);
    let rest = util::rest_client(&cfg)?;

    let email = match args.email {
        Some(email) => email,
        None => Input::new()
            .with_prompt("Email")
            .interact_text()
            .map_err(prompt_err)?,
    };
    let password = match args.password {
        Some(password) => password,
        None => Password::new()
            .with_prompt("Password")
            .interact()
            .map_err(prompt_err)?,
    };

    let token = rest.login(&email, &password).await?;
    leaflink_config::store_token(token.expose_secret())?;

    if !global.quiet {
        eprintln!("✓ Signed in as {email}");
    }
    Ok(())
}

pub fn logout(global: &GlobalOpts) -> Result<(), CliError> {
    leaflink_config::clear_token()?;
    if !global.quiet {
        eprintln!("✓ Signed out");
    }
    Ok(())
}

pub async fn whoami(global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = util::load_config(global);
    let rest = util::rest_client_authed(&cfg)?;

    // Bootstrap check: a dead or unverifiable token degrades to the
    // signed-out state without clearing what's stored.
    if !rest.check_token().await? {
        return Err(CliError::NotAuthenticated);
    }

    let profile = rest.get_user().await?;
    match global.output {
        OutputFormat::Json => println!("{}", output::render_json(&profile)?),
        OutputFormat::Table => {
            println!(
                "{} <{}>",
                profile.nickname.as_deref().unwrap_or("(no nickname)"),
                profile.email.as_deref().unwrap_or("unknown"),
            );
        }
    }
    Ok(())
}
