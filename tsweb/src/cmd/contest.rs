use crate::config::LocalConfig;
use crate::modules::{auth, render};
use anyhow::Result;
use clap::Args;
use console::style;

#[derive(Debug, Args)]
pub struct ContestArgs {}

pub async fn run(_args: ContestArgs) -> Result<()> {
    let session = auth::ready_session().await?;

    let info = session.fetch_user_info().await?;
    if let Some(name) = &info.name {
        println!("{} {}", style("User:").cyan().bold(), name);
    }
    if let Some(contest) = &info.contest {
        println!("{} {}", style("Contest:").cyan().bold(), contest);
    }
    if let Some(deadline) = info.deadline {
        println!(
            "{} {}",
            style("Ends at:").cyan().bold(),
            deadline.format("%d.%m.%Y %H:%M:%S")
        );
    }

    let problems = session.fetch_problems().await?;
    let compilers = session.fetch_compilers().await?;
    let default_lang = LocalConfig::load().unwrap_or_default().default_lang;

    if problems.is_empty() {
        println!("{}", style("No problems found in this contest.").yellow());
    } else {
        println!("\n{}", style("Problems").cyan().bold());
        render::problems_table(&problems);
    }

    if compilers.is_empty() {
        println!("{}", style("No compilers found in this contest.").yellow());
    } else {
        println!("\n{}", style("Compilers").cyan().bold());
        render::compilers_table(&compilers, default_lang);
    }

    Ok(())
}
