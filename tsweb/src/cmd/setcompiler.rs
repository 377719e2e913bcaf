use crate::config::LocalConfig;
use crate::modules::auth;
use anyhow::{bail, Result};
use clap::Args;
use console::style;
use dialoguer::Select;

#[derive(Debug, Args)]
pub struct SetCompilerArgs {}

pub async fn run(_args: SetCompilerArgs) -> Result<()> {
    let session = auth::ready_session().await?;

    let compilers = session.fetch_compilers().await?;
    if compilers.is_empty() {
        bail!("no compilers found in this contest");
    }

    let mut config = LocalConfig::load().unwrap_or_default();

    let items: Vec<String> = compilers
        .iter()
        .map(|compiler| format!("{}: {}", compiler.compiler_lang, compiler.compiler_name))
        .collect();
    let index = Select::new()
        .with_prompt("Select default compiler")
        .items(&items)
        .default(config.default_lang.min(compilers.len() - 1))
        .interact()?;

    config.default_lang = index;
    config.save()?;

    println!(
        "{}",
        style(format!(
            "Default compiler set to: {}",
            compilers[index].compiler_name
        ))
        .green()
    );
    Ok(())
}
