pub mod model;
pub mod scraper;
pub mod session;
pub mod watch;

pub use model::{Compiler, Contest, Problem, Submission, Test, UserInfo};
pub use session::{SessionError, TestSysSession, DEFAULT_BASE_URL};
pub use watch::{WatchError, WatchOutcome, WatchParams, WatchState};
