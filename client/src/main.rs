use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use bath_tracker::{
    Authenticator, ClientConfig, HttpApiGateway, HttpAuthGateway, PetStore, ScheduleSnapshot, SessionStore,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const ENV_CONFIG_PATH: &str = "BATH_TRACKER_CONFIG";
const ENV_TOKEN: &str = "BATH_TRACKER_TOKEN";
const ENV_EMAIL: &str = "BATH_TRACKER_EMAIL";
const ENV_PASSWORD: &str = "BATH_TRACKER_PASSWORD";
const DEFAULT_CONFIG_PATH: &str = "bath-tracker.yaml";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config_path = std::env::var(ENV_CONFIG_PATH)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));
    let config = ClientConfig::load(Some(&config_path))?;
    info!("🚀 Using pets API at {}", config.api_base_url);

    let gateway = Arc::new(HttpApiGateway::new(&config).context("Failed to build HTTP client")?);
    let auth_gateway = Arc::new(HttpAuthGateway::new(&config).context("Failed to build HTTP client")?);
    let session = SessionStore::new();
    sign_in_from_env(&Authenticator::new(auth_gateway, session.clone())).await?;

    let store = PetStore::new(config, gateway, session.clone());
    store.initialize().await.context("Failed to select an initial pet")?;

    let snapshot = store.snapshot();
    match snapshot.selected() {
        Some(selected) => {
            println!("{}", selected.pet.pet.name);
            println!("  image: {}", selected.pet.image_url);
            println!("  editable: {}", selected.pet.is_editable_by_current_user);
            print_schedule(&selected.schedule);
        }
        None => println!("No pet selected"),
    }

    if session.is_authenticated() {
        println!("Linked pets:");
        for pet in &snapshot.linked_pets {
            println!("  {} ({})", pet.pet.name, pet.id());
        }
    } else {
        match store.fetch_public_pets().await {
            Ok(pets) => {
                println!("Public pets:");
                for pet in pets {
                    println!("  {} ({})", pet.pet.name, pet.id());
                }
            }
            Err(e) => warn!("Failed to fetch public pets: {}", e),
        }
    }

    Ok(())
}

/// Restore a session from `BATH_TRACKER_TOKEN`, or log in with
/// `BATH_TRACKER_EMAIL` and `BATH_TRACKER_PASSWORD`. Without either the
/// client runs anonymously.
async fn sign_in_from_env(auth: &Authenticator) -> Result<()> {
    if let Ok(token) = std::env::var(ENV_TOKEN) {
        match auth.restore(&token).await {
            Ok(user) => info!("Restored session for {}", user.username),
            Err(e) if e.is_rejection() => warn!("Stored token refused, continuing anonymously: {}", e),
            Err(e) => return Err(e).context("Failed to renew the session token"),
        }
        return Ok(());
    }

    if let (Ok(email), Ok(password)) = (std::env::var(ENV_EMAIL), std::env::var(ENV_PASSWORD)) {
        let user = auth.login(&email, &password).await.context("Login failed")?;
        info!("Logged in as {}", user.username);
    }
    Ok(())
}

fn print_schedule(schedule: &ScheduleSnapshot) {
    match (&schedule.last_bath_date, schedule.days_passed) {
        (Some(last), Some(days)) => println!("  last bath: {} ({} days ago)", last.format("%Y-%m-%d"), days),
        _ => println!("  last bath: never"),
    }
    println!(
        "  next bath: {} (in {} days{})",
        schedule.next_bath_date.format("%Y-%m-%d"),
        schedule.days_until_next,
        if schedule.is_overdue() { ", overdue" } else { "" }
    );
}
