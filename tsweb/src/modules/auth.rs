//! Assembly of a ready-to-use judge session: restore saved cookies,
//! validate them with one main-page fetch, fall back to a re-login with
//! saved credentials, and finally to an interactive prompt.

use crate::config::{CookieFile, GlobalConfig};
use anyhow::{Context, Result};
use console::style;
use dialoguer::{Input, Password};
use tsweb_libs::session::{SessionError, TestSysSession, DEFAULT_BASE_URL};

fn base_url() -> String {
    std::env::var("TSWEB_BASE_URL").unwrap_or_else(|_| String::from(DEFAULT_BASE_URL))
}

fn new_session() -> Result<TestSysSession> {
    TestSysSession::new(&base_url()).context("failed to initialize the judge session")
}

pub fn save_cookies(session: &TestSysSession) -> Result<()> {
    CookieFile {
        cookies: session.saved_cookies(),
    }
    .save()
}

/// Logs in on a fresh session (a fresh cookie jar, so stale cookies can
/// never shadow the new login) and persists credentials and cookies.
pub async fn login_with_prompt(user: Option<String>) -> Result<TestSysSession> {
    let session = new_session()?;

    let user = match user {
        Some(user) => user,
        None => Input::<String>::new()
            .with_prompt("Username (team)")
            .interact_text()?,
    };
    let password = Password::new().with_prompt("Password").interact()?;

    session.login(&user, &password).await?;

    let mut config = GlobalConfig::load_or_default();
    config.user = user.clone();
    config.password = password;
    config.save()?;
    save_cookies(&session)?;

    println!("{}", style(format!("Logged in as {}", user)).green());
    Ok(session)
}

/// Returns a session that is logged in, reusing the saved session when
/// it is still alive.
pub async fn ready_session() -> Result<TestSysSession> {
    let session = new_session()?;
    session.restore_cookies(&CookieFile::load_or_default().cookies);

    let config = GlobalConfig::load_or_default();
    if config.has_credentials() {
        // a transport hiccup here just means we try a fresh login below
        if session.is_logged_in().await.unwrap_or(false) {
            tracing::debug!("using saved session for {}", config.user);
            return Ok(session);
        }

        let fresh = new_session()?;
        match fresh.login(&config.user, &config.password).await {
            Ok(()) => {
                save_cookies(&fresh)?;
                println!("{}", style(format!("Logged in as {}", config.user)).green());
                return Ok(fresh);
            }
            Err(SessionError::LoginRejected) => {
                println!(
                    "{}",
                    style("Saved credentials were rejected, please log in again.").yellow()
                );
            }
            Err(e) => return Err(e.into()),
        }
    }

    login_with_prompt(None).await
}
