use crate::modules::{auth, render};
use anyhow::Result;
use clap::Args;
use console::style;

#[derive(Debug, Args)]
pub struct FeedbackArgs {
    /// Submission id to show per-test feedback for
    id: String,
    /// Print raw JSON instead of a table
    #[arg(long)]
    json: bool,
}

pub async fn run(args: FeedbackArgs) -> Result<()> {
    let session = auth::ready_session().await?;

    let tests = session.fetch_feedback(&args.id).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&tests)?);
        return Ok(());
    }

    if tests.is_empty() {
        println!(
            "{}",
            style(format!("No feedback available for submission {}.", args.id)).yellow()
        );
        return Ok(());
    }
    render::tests_table(&tests);
    Ok(())
}
