//! Verdict polling for a tracked submission.
//!
//! The judge keeps the verdict column on a pending sentinel while a
//! submission is being tested, but some contest configurations never move
//! it off "NO" even after judging completes. The watcher therefore
//! combines two termination rules: a verdict outside the pending set is
//! final, and a verdict stuck on "NO" for enough consecutive polls is
//! assumed final.

use crate::model::Submission;
use crate::session::SessionError;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Delay between two consecutive polls of the submissions list.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Number of consecutive identical "NO" observations after which the
/// verdict is assumed final (~10 s at the default interval). Empirically
/// tuned against one judge deployment; other deployments may need a
/// different value.
pub const DEFAULT_STALE_THRESHOLD: u32 = 20;

/// Verdict tokens (case-normalized) the judge reports while a submission
/// has not been fully judged yet.
pub const PENDING_VERDICTS: [&str; 4] = ["NO", "JUDGING", "PENDING", ""];

/// The sentinel some deployments never update; only this verdict is
/// eligible for the staleness rule.
pub const STUCK_VERDICT: &str = "NO";

#[derive(Debug, Error)]
pub enum WatchError {
    #[error("failed to poll the submissions list")]
    Session(#[from] SessionError),
    #[error("no submissions found to watch")]
    NoSubmissions,
    #[error("submission {0} disappeared from the submissions list")]
    SubmissionVanished(String),
}

/// Tunable knobs of the watcher. All defaults are deployment heuristics
/// rather than hard guarantees.
#[derive(Debug, Clone)]
pub struct WatchParams {
    pub interval: Duration,
    pub stale_threshold: u32,
    pub pending_verdicts: Vec<String>,
}

impl Default for WatchParams {
    fn default() -> Self {
        WatchParams {
            interval: DEFAULT_POLL_INTERVAL,
            stale_threshold: DEFAULT_STALE_THRESHOLD,
            pending_verdicts: PENDING_VERDICTS.iter().map(|v| v.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchState {
    /// The submission is still being judged.
    Pending,
    /// The verdict left the pending set.
    Final,
    /// The verdict stayed on the stuck sentinel long enough to be
    /// considered final.
    StaleAssumedFinal,
    /// The tracked submission is no longer in the list.
    NotFound,
}

/// Explicit state carried between polls: the tracked identifier, the last
/// observed verdict, and how many consecutive polls returned that exact
/// verdict. Kept separate from the transport so the transition logic is
/// testable on scripted verdict sequences.
#[derive(Debug, Clone)]
pub struct WatchProgress {
    tracked_id: String,
    last_verdict: Option<String>,
    unchanged_polls: u32,
}

impl WatchProgress {
    pub fn new(tracked_id: impl Into<String>) -> Self {
        WatchProgress {
            tracked_id: tracked_id.into(),
            last_verdict: None,
            unchanged_polls: 0,
        }
    }

    pub fn tracked_id(&self) -> &str {
        &self.tracked_id
    }

    /// Feeds one poll result into the state machine and returns the
    /// resulting state. `submission` is the list entry matching the
    /// tracked identifier, if any.
    pub fn observe(&mut self, submission: Option<&Submission>, params: &WatchParams) -> WatchState {
        let submission = match submission {
            Some(submission) => submission,
            None => return WatchState::NotFound,
        };

        if self.last_verdict.as_deref() == Some(submission.result.as_str()) {
            self.unchanged_polls += 1;
        } else {
            self.last_verdict = Some(submission.result.clone());
            self.unchanged_polls = 1;
        }

        let verdict = submission.result.to_uppercase();
        if !params.pending_verdicts.iter().any(|p| p == &verdict) {
            return WatchState::Final;
        }
        if verdict == STUCK_VERDICT && self.unchanged_polls >= params.stale_threshold {
            tracing::warn!(
                "verdict stayed \"{}\" for {} polls, assuming it is final",
                submission.result,
                self.unchanged_polls
            );
            return WatchState::StaleAssumedFinal;
        }

        WatchState::Pending
    }
}

/// Source of the submissions list, most recent entry first. The live
/// session implements this; tests substitute scripted lists.
#[async_trait]
pub trait SubmissionFeed {
    async fn submissions(&self) -> Result<Vec<Submission>, SessionError>;
}

/// The watcher's terminal report: the last observed record and whether
/// the verdict was read as final or assumed final.
#[derive(Debug, Clone)]
pub struct WatchOutcome {
    pub submission: Submission,
    pub state: WatchState,
}

/// Watches the most recent submission: one fetch establishes the tracked
/// identifier, then the list is re-polled until a terminal state.
pub async fn watch_latest<F>(feed: &F, params: &WatchParams) -> Result<WatchOutcome, WatchError>
where
    F: SubmissionFeed + Sync,
{
    let submissions = feed.submissions().await?;
    let latest = match submissions.into_iter().next() {
        Some(latest) => latest,
        None => return Err(WatchError::NoSubmissions),
    };

    tracing::debug!("watching submission {}", latest.id);
    watch_submission(feed, latest.id, params).await
}

/// Polls the submissions list until the tracked submission reaches a
/// terminal state. A vanished submission is an error, never a silent
/// empty result.
pub async fn watch_submission<F>(
    feed: &F,
    tracked_id: String,
    params: &WatchParams,
) -> Result<WatchOutcome, WatchError>
where
    F: SubmissionFeed + Sync,
{
    let mut progress = WatchProgress::new(tracked_id);

    loop {
        let submissions = feed.submissions().await?;
        let current = submissions
            .iter()
            .find(|submission| submission.id == progress.tracked_id());

        let state = progress.observe(current, params);
        match state {
            WatchState::Pending => tokio::time::sleep(params.interval).await,
            WatchState::Final | WatchState::StaleAssumedFinal => match current {
                Some(submission) => {
                    return Ok(WatchOutcome {
                        submission: submission.clone(),
                        state,
                    })
                }
                None => {
                    return Err(WatchError::SubmissionVanished(
                        progress.tracked_id().to_string(),
                    ))
                }
            },
            WatchState::NotFound => {
                return Err(WatchError::SubmissionVanished(
                    progress.tracked_id().to_string(),
                ))
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    fn entry(id: &str, result: &str) -> Submission {
        Submission {
            id: String::from(id),
            problem: String::from("A"),
            compiler: String::from("cpp: GNU C++ 13"),
            result: String::from(result),
            time: String::from("00:10:00"),
        }
    }

    fn observe_sequence(verdicts: &[&str]) -> Vec<WatchState> {
        let params = WatchParams::default();
        let mut progress = WatchProgress::new("1000");
        verdicts
            .iter()
            .map(|verdict| progress.observe(Some(&entry("1000", verdict)), &params))
            .collect()
    }

    #[test]
    fn test_final_on_non_pending_verdict() {
        let states = observe_sequence(&["JUDGING", "OK"]);
        assert_eq!(states, vec![WatchState::Pending, WatchState::Final]);
    }

    #[test]
    fn test_stale_exactly_at_threshold() {
        let mut verdicts = vec!["JUDGING", "JUDGING"];
        verdicts.extend(std::iter::repeat("NO").take(20));

        let states = observe_sequence(&verdicts);
        // everything before the 20th consecutive "NO" is still pending
        assert!(states[..21]
            .iter()
            .all(|state| *state == WatchState::Pending));
        assert_eq!(states[21], WatchState::StaleAssumedFinal);
    }

    #[test]
    fn test_changed_verdict_restarts_the_counter() {
        let mut verdicts = vec!["NO"; 10];
        verdicts.push("JUDGING");
        verdicts.extend(vec!["NO"; 19]);

        let states = observe_sequence(&verdicts);
        assert!(states.iter().all(|state| *state == WatchState::Pending));
    }

    #[test]
    fn test_stale_rule_only_applies_to_the_stuck_sentinel() {
        let states = observe_sequence(&vec!["JUDGING"; 40]);
        assert!(states.iter().all(|state| *state == WatchState::Pending));
    }

    #[test]
    fn test_lowercase_verdicts_are_normalized() {
        let states = observe_sequence(&["judging", "ok"]);
        assert_eq!(states, vec![WatchState::Pending, WatchState::Final]);
    }

    #[test]
    fn test_missing_submission_is_not_found() {
        let params = WatchParams::default();
        let mut progress = WatchProgress::new("1000");
        for _ in 0..5 {
            progress.observe(Some(&entry("1000", "NO")), &params);
        }
        assert_eq!(progress.observe(None, &params), WatchState::NotFound);
    }

    struct ScriptedFeed {
        lists: Mutex<VecDeque<Vec<Submission>>>,
    }

    impl ScriptedFeed {
        fn new(lists: Vec<Vec<Submission>>) -> Self {
            ScriptedFeed {
                lists: Mutex::new(lists.into()),
            }
        }
    }

    #[async_trait]
    impl SubmissionFeed for ScriptedFeed {
        async fn submissions(&self) -> Result<Vec<Submission>, SessionError> {
            let mut lists = self.lists.lock().unwrap();
            Ok(lists.pop_front().unwrap_or_default())
        }
    }

    fn fast_params() -> WatchParams {
        WatchParams {
            interval: Duration::from_millis(0),
            ..WatchParams::default()
        }
    }

    #[tokio::test]
    async fn test_watch_latest_returns_final_verdict() {
        let feed = ScriptedFeed::new(vec![
            vec![entry("1002", "JUDGING"), entry("1000", "OK")],
            vec![entry("1002", "JUDGING"), entry("1000", "OK")],
            vec![entry("1002", "OK"), entry("1000", "OK")],
        ]);

        let outcome = watch_latest(&feed, &fast_params()).await.unwrap();
        assert_eq!(outcome.state, WatchState::Final);
        assert_eq!(outcome.submission.id, "1002");
        assert_eq!(outcome.submission.result, "OK");
    }

    #[tokio::test]
    async fn test_watch_latest_with_empty_list() {
        let feed = ScriptedFeed::new(vec![Vec::new()]);
        let result = watch_latest(&feed, &fast_params()).await;
        assert!(matches!(result, Err(WatchError::NoSubmissions)));
    }

    #[tokio::test]
    async fn test_watch_reports_vanished_submission() {
        let feed = ScriptedFeed::new(vec![
            vec![entry("1002", "JUDGING")],
            vec![entry("1002", "JUDGING")],
            vec![entry("9999", "OK")],
        ]);

        let result = watch_latest(&feed, &fast_params()).await;
        match result {
            Err(WatchError::SubmissionVanished(id)) => assert_eq!(id, "1002"),
            other => panic!("expected a vanished submission error, got {:?}", other),
        }
    }
}
