mod cmd;
mod config;
mod modules;

use crate::cmd::{
    contest::{self, ContestArgs},
    feedback::{self, FeedbackArgs},
    login::{self, LoginArgs},
    setcompiler::{self, SetCompilerArgs},
    setcontest::{self, SetContestArgs},
    status::{self, StatusArgs},
    submit::{self, SubmitArgs},
};
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use std::{env, str::FromStr};
use tokio::runtime::Builder;
use tracing_subscriber::filter::{EnvFilter, LevelFilter};

#[derive(Debug, Parser)]
#[command(name = "tsweb")]
#[command(about = "CLI client for the TestSys online judge", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Log in and save the credentials
    Login(LoginArgs),
    /// Show the current contest, its problems and compilers
    Contest(ContestArgs),
    /// Pick the assigned contest
    SetContest(SetContestArgs),
    /// Pick the default compiler for submissions
    SetCompiler(SetCompilerArgs),
    /// Submit a solution file and watch the verdict
    Submit(SubmitArgs),
    /// List recent submissions
    Status(StatusArgs),
    /// Show per-test feedback for a submission
    Feedback(FeedbackArgs),
}

fn main() {
    dotenv().ok();

    let log_level = env::var("RUST_LOG").unwrap_or(String::from("warn"));
    let filter = EnvFilter::builder()
        .with_default_directive(
            LevelFilter::from_str(&log_level)
                .expect("couldn't parse specified log level")
                .into(),
        )
        .from_env_lossy();
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("failed to set tracing subscriber");

    let runtime = Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("failed to build the async runtime");

    let result = match Cli::parse().command {
        Commands::Login(args) => runtime.block_on(login::run(args)),
        Commands::Contest(args) => runtime.block_on(contest::run(args)),
        Commands::SetContest(args) => runtime.block_on(setcontest::run(args)),
        Commands::SetCompiler(args) => runtime.block_on(setcompiler::run(args)),
        Commands::Submit(args) => runtime.block_on(submit::run(args)),
        Commands::Status(args) => runtime.block_on(status::run(args)),
        Commands::Feedback(args) => runtime.block_on(feedback::run(args)),
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", console::style("error:").red().bold(), e);
        std::process::exit(1);
    }
}
