use crate::config::LocalConfig;
use crate::modules::auth;
use anyhow::{bail, Result};
use clap::Args;
use console::style;
use dialoguer::Select;

#[derive(Debug, Args)]
pub struct SetContestArgs {}

pub async fn run(_args: SetContestArgs) -> Result<()> {
    let session = auth::ready_session().await?;

    let contests = session.fetch_contests().await?;
    if contests.is_empty() {
        bail!("no contests found");
    }

    let items: Vec<String> = contests
        .iter()
        .map(|contest| format!("{}  {} ({})", contest.id, contest.name, contest.status))
        .collect();
    let index = Select::new()
        .with_prompt("Select contest")
        .items(&items)
        .default(0)
        .interact()?;

    let selected = &contests[index];
    session.change_contest(&selected.id).await?;
    auth::save_cookies(&session)?;

    // make sure a local config exists so the project remembers defaults
    if LocalConfig::load().is_none() {
        LocalConfig::default().save()?;
    }

    println!(
        "{}",
        style(format!("Switched to contest: {}", selected.name)).green()
    );
    Ok(())
}
