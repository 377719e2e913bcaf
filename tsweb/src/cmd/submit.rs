use crate::config::LocalConfig;
use crate::modules::{auth, render};
use anyhow::{bail, Context, Result};
use clap::Args;
use console::style;
use std::path::PathBuf;
use tsweb_libs::session::TestSysSession;
use tsweb_libs::watch::{self, WatchParams, WatchState};

#[derive(Debug, Args)]
pub struct SubmitArgs {
    /// Solution file to submit
    file: PathBuf,
    /// Problem id; defaults to the file stem ("12A.cpp" submits "12A")
    #[arg(short, long)]
    problem: Option<String>,
    /// Compiler index; defaults to the saved default
    #[arg(short, long)]
    lang: Option<usize>,
    /// Submit without waiting for the verdict
    #[arg(long)]
    no_watch: bool,
}

pub async fn run(args: SubmitArgs) -> Result<()> {
    let session = auth::ready_session().await?;

    let problem = match args.problem {
        Some(problem) => problem,
        None => args
            .file
            .file_stem()
            .and_then(|stem| stem.to_str())
            .map(str::to_string)
            .context("could not derive a problem id from the file name")?,
    };

    let compilers = session.fetch_compilers().await?;
    if compilers.is_empty() {
        bail!("no compilers found in this contest");
    }
    let lang = args
        .lang
        .unwrap_or_else(|| LocalConfig::load().unwrap_or_default().default_lang);
    let compiler = compilers.get(lang).with_context(|| {
        format!(
            "invalid compiler index {} (available: 0-{})",
            lang,
            compilers.len() - 1
        )
    })?;

    let content = tokio::fs::read(&args.file)
        .await
        .with_context(|| format!("failed to read {}", args.file.display()))?;
    let file_name = args
        .file
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("solution")
        .to_string();

    session
        .submit_solution(&problem, &compiler.compiler_id, &file_name, content)
        .await?;
    println!(
        "{}",
        style(format!(
            "Submitted {} (problem {}, compiler {})",
            file_name, problem, compiler.compiler_name
        ))
        .cyan()
    );

    if args.no_watch {
        return Ok(());
    }
    watch_verdict(&session).await
}

/// Tracks the freshly created submission until its verdict is final,
/// then shows the per-test feedback.
async fn watch_verdict(session: &TestSysSession) -> Result<()> {
    println!("{}", style("Waiting for the verdict...").cyan());

    let outcome = watch::watch_latest(session, &WatchParams::default()).await?;
    if outcome.state == WatchState::StaleAssumedFinal {
        println!(
            "{}",
            style("The verdict stopped changing; treating it as final.").yellow()
        );
    }
    println!(
        "{} {}: {}",
        outcome.submission.id,
        outcome.submission.problem,
        render::verdict_cell(&outcome.submission.result)
    );

    let tests = session.fetch_feedback(&outcome.submission.id).await?;
    if tests.is_empty() {
        println!("No per-test feedback available.");
    } else {
        render::tests_table(&tests);
    }
    Ok(())
}
