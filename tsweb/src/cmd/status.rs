use crate::modules::{auth, render};
use anyhow::Result;
use clap::Args;
use console::style;

#[derive(Debug, Args)]
pub struct StatusArgs {
    /// Maximum number of submissions to show
    #[arg(short, long)]
    limit: Option<usize>,
    /// Print raw JSON instead of a table
    #[arg(long)]
    json: bool,
}

pub async fn run(args: StatusArgs) -> Result<()> {
    let session = auth::ready_session().await?;

    let mut submissions = session.fetch_submissions().await?;
    if let Some(limit) = args.limit {
        submissions.truncate(limit);
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&submissions)?);
        return Ok(());
    }

    if submissions.is_empty() {
        println!("{}", style("No submissions yet.").yellow());
        return Ok(());
    }
    render::submissions_table(&submissions);
    Ok(())
}
