use crate::modules::auth;
use anyhow::Result;
use clap::Args;

#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Team name; prompted for when omitted
    #[arg(long)]
    user: Option<String>,
}

pub async fn run(args: LoginArgs) -> Result<()> {
    auth::login_with_prompt(args.user).await?;
    Ok(())
}
