//! Page extractors for the TestSys HTML pages.
//!
//! Every extractor is a pure function from one decoded HTML document to a
//! sequence of entities. The judge's markup is inconsistent across
//! contests, so a missing table or control is an expected condition: the
//! extractors log it and return an empty vector instead of failing.

use crate::model::{Compiler, Contest, Problem, Submission, Test, UserInfo};
use chrono::{Duration, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

/// Marker text of the first cell of the submissions table header row.
const SUBMISSION_HEADER_MARKER: &str = "ID";

/// Timestamp format used by the "Contest starts at ..." line.
const CONTEST_START_FORMAT: &str = "%d.%m.%Y %H:%M:%S";

static CONTEST_TIMING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"Contest starts at (\d{2}\.\d{2}\.\d{4} \d{2}:\d{2}:\d{2}) and lasts (\d+) minutes",
    )
    .unwrap()
});

/// Concatenated, trimmed text content of an element.
fn cell_text(element: &ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

pub struct ContestListScraper {
    table: Selector,
    tr: Selector,
    td: Selector,
}

impl ContestListScraper {
    pub fn new() -> Self {
        let table = Selector::parse(r#"table[border="1"]"#).unwrap();
        let tr = Selector::parse("tr").unwrap();
        let td = Selector::parse("td").unwrap();

        Self { table, tr, td }
    }

    /// Extracts the contest listing from the first bordered table. The
    /// first row is a header; rows with fewer than three cells are
    /// skipped silently.
    pub fn extract_contests(&self, html: &str) -> Vec<Contest> {
        let html = Html::parse_document(html);

        let table = match html.select(&self.table).next() {
            Some(table) => table,
            None => {
                tracing::warn!("no bordered table found in the contests page");
                return Vec::new();
            }
        };

        let mut contests = Vec::new();
        for tr in table.select(&self.tr).skip(1) {
            let td: Vec<ElementRef<'_>> = tr.select(&self.td).collect();
            if td.len() < 3 {
                continue;
            }

            contests.push(Contest {
                id: cell_text(&td[0]),
                name: cell_text(&td[1]),
                status: cell_text(&td[2]),
            });
        }

        contests
    }
}

pub struct SubmitFormScraper {
    prob_select: Selector,
    lang_select: Selector,
    option: Selector,
}

impl SubmitFormScraper {
    pub fn new() -> Self {
        let prob_select = Selector::parse(r#"select[name="prob"]"#).unwrap();
        let lang_select = Selector::parse(r#"select[name="lang"]"#).unwrap();
        let option = Selector::parse("option").unwrap();

        Self {
            prob_select,
            lang_select,
            option,
        }
    }

    /// Extracts the problems offered by the `prob` selection control.
    pub fn extract_problems(&self, html: &str) -> Vec<Problem> {
        let html = Html::parse_document(html);

        let select = match html.select(&self.prob_select).next() {
            Some(select) => select,
            None => {
                tracing::warn!("no problem selection control found in the submit page");
                return Vec::new();
            }
        };

        let mut problems = Vec::new();
        for option in select.select(&self.option) {
            let value = option.value().attr("value").unwrap_or_default();
            if value.is_empty() || option.value().attr("disabled").is_some() {
                continue;
            }

            problems.push(Problem {
                problem_id: value.to_string(),
                problem_name: cell_text(&option),
            });
        }

        problems
    }

    /// Extracts the compilers offered by the `lang` selection control.
    pub fn extract_compilers(&self, html: &str) -> Vec<Compiler> {
        let html = Html::parse_document(html);

        let select = match html.select(&self.lang_select).next() {
            Some(select) => select,
            None => {
                tracing::warn!("no compiler selection control found in the submit page");
                return Vec::new();
            }
        };

        let mut compilers = Vec::new();
        for option in select.select(&self.option) {
            let value = option.value().attr("value").unwrap_or_default();
            if value.is_empty() || option.value().attr("disabled").is_some() {
                continue;
            }

            compilers.push(Compiler::from_option(value, cell_text(&option)));
        }

        compilers
    }
}

pub struct SubmissionListScraper {
    table: Selector,
    tr: Selector,
    td: Selector,
}

impl SubmissionListScraper {
    pub fn new() -> Self {
        let table = Selector::parse(r#"table[border="1"]"#).unwrap();
        let tr = Selector::parse("tr").unwrap();
        let td = Selector::parse("td").unwrap();

        Self { table, tr, td }
    }

    /// Extracts submissions from the first bordered table, in server
    /// order. Everything up to and including the row whose first cell
    /// reads "ID" is the header region; data rows need at least six
    /// cells, with fixed column positions
    /// (id, problem, -, time, compiler, result).
    pub fn extract_submissions(&self, html: &str) -> Vec<Submission> {
        let html = Html::parse_document(html);

        let table = match html.select(&self.table).next() {
            Some(table) => table,
            None => {
                tracing::warn!("no bordered table found in the submissions page");
                return Vec::new();
            }
        };

        let mut submissions = Vec::new();
        let mut header_seen = false;
        for tr in table.select(&self.tr) {
            let td: Vec<ElementRef<'_>> = tr.select(&self.td).collect();

            if !header_seen {
                header_seen = td
                    .first()
                    .map(|cell| cell_text(cell) == SUBMISSION_HEADER_MARKER)
                    .unwrap_or(false);
                continue;
            }
            if td.len() < 6 {
                continue;
            }

            submissions.push(Submission {
                id: cell_text(&td[0]),
                problem: cell_text(&td[1]),
                time: cell_text(&td[3]),
                compiler: cell_text(&td[4]),
                result: cell_text(&td[5]),
            });
        }

        if !header_seen {
            tracing::warn!("no header row found in the submissions table");
        }
        submissions
    }
}

pub struct FeedbackScraper {
    table: Selector,
    tr: Selector,
    td: Selector,
}

impl FeedbackScraper {
    pub fn new() -> Self {
        let table = Selector::parse("table").unwrap();
        let tr = Selector::parse("tr").unwrap();
        let td = Selector::parse("td").unwrap();

        Self { table, tr, td }
    }

    /// Extracts per-test results from the first table of the feedback
    /// page. A header-only table yields no tests; columns beyond what a
    /// row provides default to empty strings.
    pub fn extract_tests(&self, html: &str) -> Vec<Test> {
        let html = Html::parse_document(html);

        let table = match html.select(&self.table).next() {
            Some(table) => table,
            None => {
                tracing::warn!("no table found in the feedback page");
                return Vec::new();
            }
        };

        let rows: Vec<ElementRef<'_>> = table.select(&self.tr).collect();
        if rows.len() <= 1 {
            return Vec::new();
        }

        let mut tests = Vec::new();
        for tr in &rows[1..] {
            let td: Vec<ElementRef<'_>> = tr.select(&self.td).collect();
            if td.len() < 2 {
                continue;
            }

            let column = |index: usize| td.get(index).map(cell_text).unwrap_or_default();
            tests.push(Test {
                test_id: column(0),
                result: column(1),
                time: column(2),
                memory: column(3),
                comment: column(4),
            });
        }

        tests
    }
}

pub struct MainPageScraper;

impl MainPageScraper {
    pub fn new() -> Self {
        Self
    }

    /// Extracts user name, assigned contest and (when the timing line is
    /// parsable) the contest deadline from the main page text.
    pub fn extract_user_info(&self, html: &str) -> UserInfo {
        let html = Html::parse_document(html);
        let text = html.root_element().text().collect::<String>();

        let mut info = UserInfo::default();
        for line in text.lines() {
            let line = line.trim();

            if let Some(name) = line.strip_prefix("You are ") {
                if !line.starts_with("You are currently") {
                    info.name = Some(name.to_string());
                }
            }
            if let Some(contest) = line.strip_prefix("Assigned contest:") {
                info.contest = Some(contest.trim().to_string());
            }
            if info.deadline.is_none() {
                info.deadline = parse_deadline(line);
            }
        }

        info
    }
}

/// Parses the "Contest starts at <timestamp> and lasts <N> minutes" line
/// into the contest deadline. Any mismatch yields `None`.
fn parse_deadline(line: &str) -> Option<NaiveDateTime> {
    let captures = CONTEST_TIMING.captures(line)?;
    let start = NaiveDateTime::parse_from_str(&captures[1], CONTEST_START_FORMAT).ok()?;
    let minutes: i64 = captures[2].parse().ok()?;
    Some(start + Duration::minutes(minutes))
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_extract_contests() {
        let html = r#"
            <html><body>
            <table border="1">
            <tr><td>ID</td><td>Name</td><td>Status</td></tr>
            <tr><td> 41 </td><td>Winter School</td><td>RUNNING</td></tr>
            <tr><td>42</td></tr>
            <tr><td>43</td><td>Spring Round</td><td>FINISHED</td></tr>
            </table>
            </body></html>
        "#;

        let contests = ContestListScraper::new().extract_contests(html);
        assert_eq!(
            contests,
            vec![
                Contest {
                    id: String::from("41"),
                    name: String::from("Winter School"),
                    status: String::from("RUNNING"),
                },
                Contest {
                    id: String::from("43"),
                    name: String::from("Spring Round"),
                    status: String::from("FINISHED"),
                },
            ]
        );
    }

    #[test]
    fn test_extract_contests_without_table() {
        let contests =
            ContestListScraper::new().extract_contests("<html><body>nothing</body></html>");
        assert!(contests.is_empty());
    }

    #[test]
    fn test_extract_contests_ignores_unbordered_tables() {
        let html = r#"
            <table><tr><td>menu</td><td>bar</td><td>baz</td></tr></table>
        "#;
        let contests = ContestListScraper::new().extract_contests(html);
        assert!(contests.is_empty());
    }

    #[test]
    fn test_extract_problems_skips_placeholder_and_disabled() {
        let html = r#"
            <form>
            <select name="prob">
            <option value="">-- choose --</option>
            <option value="A">A. Sorting</option>
            <option value="B" disabled>B. Closed</option>
            <option value="C">C. Graphs</option>
            </select>
            </form>
        "#;

        let problems = SubmitFormScraper::new().extract_problems(html);
        assert_eq!(
            problems,
            vec![
                Problem {
                    problem_id: String::from("A"),
                    problem_name: String::from("A. Sorting"),
                },
                Problem {
                    problem_id: String::from("C"),
                    problem_name: String::from("C. Graphs"),
                },
            ]
        );
    }

    #[test]
    fn test_extract_compilers_derives_language() {
        let html = r#"
            <select name="lang">
            <option value="1">cpp: GNU C++ 13</option>
            <option value="2">py: CPython 3.11</option>
            <option value="3">Plain Pascal</option>
            </select>
        "#;

        let compilers = SubmitFormScraper::new().extract_compilers(html);
        let langs: Vec<&str> = compilers
            .iter()
            .map(|compiler| compiler.compiler_lang.as_str())
            .collect();
        assert_eq!(langs, vec!["cpp", "py", "Unknown"]);
    }

    #[test]
    fn test_extract_compilers_without_control() {
        let compilers = SubmitFormScraper::new().extract_compilers("<select name=\"prob\"></select>");
        assert!(compilers.is_empty());
    }

    #[test]
    fn test_extract_submissions_after_header_marker() {
        let html = r#"
            <table border="1">
            <tr><td colspan="6">All submissions</td></tr>
            <tr><td>ID</td><td>Problem</td><td>Team</td><td>Time</td><td>Compiler</td><td>Result</td></tr>
            <tr><td>1002</td><td>B</td><td>team7</td><td>01:25:03</td><td>cpp: GNU C++ 13</td><td>OK</td></tr>
            <tr><td>1001</td><td>broken row</td></tr>
            <tr><td>1000</td><td>A</td><td>team7</td><td>00:12:44</td><td>py: CPython 3.11</td><td>WA</td></tr>
            </table>
        "#;

        let submissions = SubmissionListScraper::new().extract_submissions(html);
        assert_eq!(submissions.len(), 2);
        assert_eq!(submissions[0].id, "1002");
        assert_eq!(submissions[0].problem, "B");
        assert_eq!(submissions[0].time, "01:25:03");
        assert_eq!(submissions[0].compiler, "cpp: GNU C++ 13");
        assert_eq!(submissions[0].result, "OK");
        assert_eq!(submissions[1].id, "1000");
        assert_eq!(submissions[1].result, "WA");
    }

    #[test]
    fn test_extract_submissions_without_header_marker() {
        let html = r#"
            <table border="1">
            <tr><td>1000</td><td>A</td><td>t</td><td>00:01</td><td>cpp</td><td>OK</td></tr>
            </table>
        "#;

        let submissions = SubmissionListScraper::new().extract_submissions(html);
        assert!(submissions.is_empty());
    }

    #[test]
    fn test_extract_tests_header_only_table() {
        let html = "<table><tr><td>Test</td><td>Result</td></tr></table>";
        let tests = FeedbackScraper::new().extract_tests(html);
        assert!(tests.is_empty());
    }

    #[test]
    fn test_extract_tests_pads_missing_columns() {
        let html = r#"
            <table>
            <tr><td>Test</td><td>Result</td><td>Time</td><td>Memory</td><td>Comment</td></tr>
            <tr><td>1</td><td>OK</td><td>0.01</td><td>1200</td><td>ok</td></tr>
            <tr><td>2</td><td>WA</td></tr>
            <tr><td>narrow</td></tr>
            </table>
        "#;

        let tests = FeedbackScraper::new().extract_tests(html);
        assert_eq!(tests.len(), 2);
        assert_eq!(tests[0].comment, "ok");
        assert_eq!(tests[1].test_id, "2");
        assert_eq!(tests[1].result, "WA");
        assert_eq!(tests[1].time, "");
        assert_eq!(tests[1].memory, "");
        assert_eq!(tests[1].comment, "");
    }

    #[test]
    fn test_extract_user_info() {
        let html = "<html><body><pre>\nYou are currently not in a room\nYou are team7, Good Luck\nAssigned contest: Winter School 2026\n</pre></body></html>";

        let info = MainPageScraper::new().extract_user_info(html);
        assert_eq!(info.name.as_deref(), Some("team7, Good Luck"));
        assert_eq!(info.contest.as_deref(), Some("Winter School 2026"));
        assert!(info.deadline.is_none());
    }

    #[test]
    fn test_parse_deadline_adds_duration_to_start() {
        let deadline =
            parse_deadline("Contest starts at 16.02.2026 00:00:00 and lasts 7199 minutes").unwrap();
        let expected = NaiveDate::from_ymd_opt(2026, 2, 20)
            .unwrap()
            .and_hms_opt(23, 59, 0)
            .unwrap();
        assert_eq!(deadline, expected);
    }

    #[test]
    fn test_parse_deadline_rejects_malformed_line() {
        assert!(parse_deadline("Contest starts at noon and lasts a while").is_none());
        assert!(parse_deadline("Contest starts at 99.99.9999 00:00:00 and lasts 10 minutes").is_none());
    }
}
