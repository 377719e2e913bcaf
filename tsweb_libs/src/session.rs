//! HTTP session for the TestSys judge.
//!
//! The judge serves legacy KOI8-R pages; every body is decoded here so
//! the extractors only ever see decoded text. Authentication is the
//! site's own scheme: a login GET with the credentials as query
//! parameters, validated by re-fetching the main page.

use crate::model::{Compiler, Contest, Problem, Submission, Test, UserInfo};
use crate::scraper::{
    ContestListScraper, FeedbackScraper, MainPageScraper, SubmissionListScraper, SubmitFormScraper,
};
use crate::watch::SubmissionFeed;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use reqwest::cookie::Jar;
use reqwest::header::SET_COOKIE;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;
use url::Url;

type Result<T> = std::result::Result<T, SessionError>;

pub const DEFAULT_BASE_URL: &str = "https://tsweb.ru/";

const PAGE_ENCODING: &str = "koi8-r";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// The judge's generic error page, served with a 200 status.
const ERROR_PAGE_MARKER: &str = "<TITLE>Error</TITLE>";
const NOT_LOGGED_IN_MARKER: &str = "You are currently not logged in";

static CONTEST_LIST: Lazy<ContestListScraper> = Lazy::new(ContestListScraper::new);
static SUBMIT_FORM: Lazy<SubmitFormScraper> = Lazy::new(SubmitFormScraper::new);
static SUBMISSION_LIST: Lazy<SubmissionListScraper> = Lazy::new(SubmissionListScraper::new);
static FEEDBACK: Lazy<FeedbackScraper> = Lazy::new(FeedbackScraper::new);
static MAIN_PAGE: Lazy<MainPageScraper> = Lazy::new(MainPageScraper::new);

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to request the judge")]
    Request(#[from] reqwest::Error),
    #[error("invalid judge url given")]
    InvalidUrl(#[from] url::ParseError),
    #[error("the judge rejected the login credentials")]
    LoginRejected,
    #[error("the judge responded with an error page to the submitted solution")]
    SubmissionRejected,
}

pub struct TestSysSession {
    base_url: Url,
    main_url: Url,
    login_url: Url,
    contests_url: Url,
    submit_url: Url,
    submissions_url: Url,
    feedback_url: Url,
    switch_url: Url,
    client: Client,
    jar: Arc<Jar>,
    captured_cookies: Mutex<BTreeMap<String, String>>,
}

impl TestSysSession {
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)?;
        let main_url = base_url.join("t/")?;
        let login_url = base_url.join("t/index.html")?;
        let contests_url = base_url.join("t/contests")?;
        let submit_url = base_url.join("t/submit")?;
        let submissions_url = base_url.join("t/allsubmits")?;
        let feedback_url = base_url.join("t/feedback")?;
        let switch_url = base_url.join("t/index")?;

        let jar = Arc::new(Jar::default());
        let client = Client::builder()
            .gzip(true)
            .timeout(REQUEST_TIMEOUT)
            .cookie_provider(Arc::clone(&jar))
            .build()?;

        Ok(TestSysSession {
            base_url,
            main_url,
            login_url,
            contests_url,
            submit_url,
            submissions_url,
            feedback_url,
            switch_url,
            client,
            jar,
            captured_cookies: Mutex::new(BTreeMap::new()),
        })
    }

    /// Re-seeds the cookie jar with cookies saved by a previous run.
    pub fn restore_cookies(&self, cookies: &[String]) {
        let mut captured = self.captured_cookies.lock().unwrap();
        for cookie in cookies {
            if let Some((name, _)) = split_cookie_pair(cookie) {
                self.jar.add_cookie_str(cookie, &self.base_url);
                captured.insert(name, cookie.clone());
            }
        }
    }

    /// Cookies observed on this session so far, one `name=value` string
    /// per cookie, suitable for persisting between runs.
    pub fn saved_cookies(&self) -> Vec<String> {
        let captured = self.captured_cookies.lock().unwrap();
        captured.values().cloned().collect()
    }

    fn record_cookies(&self, res: &Response) {
        let mut captured = self.captured_cookies.lock().unwrap();
        for header in res.headers().get_all(SET_COOKIE) {
            let Ok(value) = header.to_str() else { continue };
            let pair = value.split(';').next().unwrap_or(value).trim();
            if let Some((name, _)) = split_cookie_pair(pair) {
                captured.insert(name, pair.to_string());
            }
        }
    }

    async fn get_page(&self, url: &Url, query: &[(&str, &str)]) -> Result<String> {
        let mut request = self.client.get(url.clone());
        if !query.is_empty() {
            request = request.query(query);
        }
        let res = request.send().await?;

        if let Err(e) = res.error_for_status_ref() {
            tracing::error!("error response returned from {}: {:?}", url, e);
            return Err(SessionError::Request(e));
        }
        self.record_cookies(&res);

        Ok(res.text_with_charset(PAGE_ENCODING).await?)
    }

    /// Authenticates against the judge. The credentials travel as query
    /// parameters, which is the site's own legacy scheme; success is
    /// verified by re-fetching the main page.
    pub async fn login(&self, team: &str, password: &str) -> Result<()> {
        tracing::debug!("logging in as {}", team);
        self.get_page(
            &self.login_url,
            &[
                ("team", team),
                ("password", password),
                ("op", "login"),
                ("contestid", ""),
            ],
        )
        .await?;

        let main = self.get_page(&self.main_url, &[]).await?;
        if main.contains(ERROR_PAGE_MARKER) || main.contains(NOT_LOGGED_IN_MARKER) {
            return Err(SessionError::LoginRejected);
        }

        Ok(())
    }

    /// Whether the current cookies still carry a live login.
    pub async fn is_logged_in(&self) -> Result<bool> {
        let main = self.get_page(&self.main_url, &[]).await?;
        Ok(!main.contains(NOT_LOGGED_IN_MARKER))
    }

    pub async fn fetch_user_info(&self) -> Result<UserInfo> {
        let html = self.get_page(&self.main_url, &[]).await?;
        Ok(MAIN_PAGE.extract_user_info(&html))
    }

    pub async fn fetch_contests(&self) -> Result<Vec<Contest>> {
        let html = self.get_page(&self.contests_url, &[("mask", "1")]).await?;
        Ok(CONTEST_LIST.extract_contests(&html))
    }

    pub async fn change_contest(&self, contest_id: &str) -> Result<()> {
        tracing::debug!("switching to contest {}", contest_id);
        self.get_page(
            &self.switch_url,
            &[("op", "changecontest"), ("newcontestid", contest_id)],
        )
        .await?;
        Ok(())
    }

    pub async fn fetch_problems(&self) -> Result<Vec<Problem>> {
        let html = self.get_page(&self.submit_url, &[]).await?;
        Ok(SUBMIT_FORM.extract_problems(&html))
    }

    pub async fn fetch_compilers(&self) -> Result<Vec<Compiler>> {
        let html = self.get_page(&self.submit_url, &[]).await?;
        Ok(SUBMIT_FORM.extract_compilers(&html))
    }

    /// Uploads one solution file as a multipart form with the problem and
    /// compiler identifiers.
    pub async fn submit_solution(
        &self,
        problem_id: &str,
        compiler_id: &str,
        file_name: &str,
        content: Vec<u8>,
    ) -> Result<()> {
        tracing::debug!("submitting {} for problem {}", file_name, problem_id);

        let file = Part::bytes(content)
            .file_name(file_name.to_string())
            .mime_str("application/octet-stream")?;
        let form = Form::new()
            .text("prob", problem_id.to_string())
            .text("lang", compiler_id.to_string())
            .part("file", file);

        let res = self
            .client
            .post(self.submit_url.clone())
            .multipart(form)
            .send()
            .await?;
        if let Err(e) = res.error_for_status_ref() {
            tracing::error!("error response returned from the submit endpoint: {:?}", e);
            return Err(SessionError::Request(e));
        }
        self.record_cookies(&res);

        let html = res.text_with_charset(PAGE_ENCODING).await?;
        if html.contains(ERROR_PAGE_MARKER) {
            return Err(SessionError::SubmissionRejected);
        }

        Ok(())
    }

    pub async fn fetch_submissions(&self) -> Result<Vec<Submission>> {
        let html = self.get_page(&self.submissions_url, &[]).await?;
        Ok(SUBMISSION_LIST.extract_submissions(&html))
    }

    pub async fn fetch_feedback(&self, submission_id: &str) -> Result<Vec<Test>> {
        let html = self
            .get_page(&self.feedback_url, &[("id", submission_id)])
            .await?;
        Ok(FEEDBACK.extract_tests(&html))
    }
}

#[async_trait]
impl SubmissionFeed for TestSysSession {
    async fn submissions(&self) -> Result<Vec<Submission>> {
        self.fetch_submissions().await
    }
}

fn split_cookie_pair(pair: &str) -> Option<(String, String)> {
    let (name, value) = pair.split_once('=')?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    Some((name.to_string(), value.trim().to_string()))
}
