//! Print one dashboard view as JSON, without starting the server.
//!
//! Usage: `cargo run --bin report -- <view> [expand-key ...]`
//!
//! `<view>` is one of overview, financial, lessons, students, teachers,
//! packages, instruments. Expansion keys apply to the view's top level; for
//! `packages`, keys containing `/` expand a student under a package name.
//!
//! Reads `CONTENT_API_URL` plus either `CONTENT_API_TOKEN` or
//! `CONTENT_API_EMAIL` / `CONTENT_API_PASSWORD` (reads .env).

use aegir_dashboard::config::AppConfig;
use aegir_dashboard::gateway::{ContentClient, Credential};
use aegir_dashboard::models::RoleMatcher;
use aegir_dashboard::services::expansion::ExpansionState;
use aegir_dashboard::services::packages::PackageExpansion;
use aegir_dashboard::services::{
    financial, instruments, lessons, overview, packages, students, teachers,
};
use anyhow::{bail, Context};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let mut args = std::env::args().skip(1);
    let Some(view) = args.next() else {
        bail!("usage: report <overview|financial|lessons|students|teachers|packages|instruments> [expand-key ...]");
    };
    let keys: Vec<String> = args.collect();

    let config = AppConfig::from_env().context("CONTENT_API_URL must be set")?;
    let client = ContentClient::new(&config)?;
    let credential = acquire(&client, &config).await?;
    let roles = RoleMatcher::from_config(&config);
    let expanded = ExpansionState::from_keys(keys.iter().cloned());

    let rendered = match view.as_str() {
        "overview" => serde_json::to_string_pretty(
            &overview::load(&client, &credential, &roles, config.recent_lesson_window_days).await?,
        )?,
        "financial" => {
            serde_json::to_string_pretty(&financial::load(&client, &credential, &expanded).await?)?
        }
        "lessons" => {
            serde_json::to_string_pretty(&lessons::load(&client, &credential, &expanded).await?)?
        }
        "students" => {
            serde_json::to_string_pretty(&students::load(&client, &credential, &expanded).await?)?
        }
        "teachers" => serde_json::to_string_pretty(
            &teachers::load(&client, &credential, &roles, &expanded).await?,
        )?,
        "packages" => {
            let (student_keys, name_keys): (Vec<String>, Vec<String>) =
                keys.into_iter().partition(|k| k.contains('/'));
            let expansion = PackageExpansion {
                names: ExpansionState::from_keys(name_keys),
                students: ExpansionState::from_keys(student_keys),
            };
            serde_json::to_string_pretty(&packages::load(&client, &credential, &expansion).await?)?
        }
        "instruments" => {
            serde_json::to_string_pretty(&instruments::load(&client, &credential).await?)?
        }
        other => bail!("unknown view: {other}"),
    };

    println!("{rendered}");
    Ok(())
}

async fn acquire(client: &ContentClient, config: &AppConfig) -> anyhow::Result<Credential> {
    if let Some(token) = &config.content_api_token {
        return Ok(Credential::static_token(token.clone()));
    }
    match (&config.content_api_email, &config.content_api_password) {
        (Some(email), Some(password)) => Ok(client.login(email, password).await?),
        _ => bail!("set CONTENT_API_TOKEN or CONTENT_API_EMAIL and CONTENT_API_PASSWORD"),
    }
}
