//! Profile CLI commands
//!
//! Handles: cappella show/update

use anyhow::{bail, Context};
use cappella_core::profile::{format_dob, parse_dob};
use cappella_core::{ClientConfig, Gender, Profile, ProfileSyncController, ProfileUpdate, SyncState};
use clap::{Args, ValueEnum};
use std::path::PathBuf;
use tracing::debug;

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum GenderArg {
    Male,
    Female,
}

impl From<GenderArg> for Gender {
    fn from(arg: GenderArg) -> Self {
        match arg {
            GenderArg::Male => Gender::Male,
            GenderArg::Female => Gender::Female,
        }
    }
}

/// Arguments for `cappella update`
#[derive(Args)]
pub struct UpdateArgs {
    /// New display name
    #[arg(long)]
    pub name: Option<String>,

    /// New date of birth (YYYY-M-D or YYYY-MM-DD)
    #[arg(long)]
    pub dob: Option<String>,

    /// New gender; required while the profile has none
    #[arg(long, value_enum)]
    pub gender: Option<GenderArg>,

    /// Picture to upload, sent as-is
    #[arg(long, value_name = "PATH")]
    pub picture: Option<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl UpdateArgs {
    fn is_empty(&self) -> bool {
        self.name.is_none() && self.dob.is_none() && self.gender.is_none() && self.picture.is_none()
    }
}

/// Print a settled state, failing on `Error`
fn print_state(state: &SyncState, json: bool) -> anyhow::Result<()> {
    match state {
        SyncState::Success(profile) => print_profile(profile, json),
        SyncState::Error(message) => bail!("{message}"),
        SyncState::Loading => bail!("Profile is still loading"),
    }
}

fn print_profile(profile: &Profile, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(profile)?);
        return Ok(());
    }

    println!("Profile {}", profile.id);
    println!("  Name:          {}", display_or_unset(&profile.name));
    println!("  Date of birth: {}", display_or_unset(&profile.date_of_birth));
    let gender = profile.gender.map_or("(not set)", Gender::as_str);
    println!("  Gender:        {gender}");
    println!("  Picture:       {}", display_or_unset(&profile.profile_picture_url));
    Ok(())
}

fn display_or_unset(value: &str) -> &str {
    if value.is_empty() {
        "(not set)"
    } else {
        value
    }
}

pub async fn show(config: &ClientConfig, json: bool) -> anyhow::Result<()> {
    let controller = ProfileSyncController::connect(config)?;
    let state = controller.settled().await;
    print_state(&state, json)
}

pub async fn update(config: &ClientConfig, args: UpdateArgs) -> anyhow::Result<()> {
    if args.is_empty() {
        bail!("Nothing to update: pass --name, --dob, --gender or --picture");
    }

    // Validate local input before touching the network
    let dob = args
        .dob
        .as_deref()
        .map(|value| parse_dob(value).map(|date| format_dob(date, config.dob_format)))
        .transpose()
        .map_err(anyhow::Error::msg)?;

    let image = match &args.picture {
        Some(path) => Some(
            tokio::fs::read(path)
                .await
                .with_context(|| format!("Failed to read picture {}", path.display()))?,
        ),
        None => None,
    };

    let controller = ProfileSyncController::connect(config)?;
    let current = match controller.settled().await {
        SyncState::Success(profile) => profile,
        other => return print_state(&other, args.json),
    };
    debug!(id = %current.id, "Loaded profile for update");

    let mut update = match (ProfileUpdate::from_profile(&current), args.gender) {
        (Some(update), None) => update,
        (Some(update), Some(gender)) => ProfileUpdate {
            gender: gender.into(),
            ..update
        },
        (None, Some(gender)) => ProfileUpdate::new(
            current.name.clone(),
            current.date_of_birth.clone(),
            gender.into(),
        ),
        (None, None) => bail!("Profile {} has no gender yet: pass --gender", current.id),
    };
    if let Some(name) = args.name {
        update.name = name;
    }
    if let Some(dob) = dob {
        update.date_of_birth = dob;
    }
    update.image = image;

    match controller.request_update(update).await? {
        SyncState::Success(profile) => {
            if !args.json {
                println!("Updated profile {}", profile.id);
            }
            print_profile(&profile, args.json)
        }
        other => print_state(&other, args.json),
    }
}
