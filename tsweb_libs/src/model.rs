use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A contest as listed on the contests page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contest {
    pub id: String,
    pub name: String,
    pub status: String,
}

/// A problem offered by the submit form of the current contest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Problem {
    pub problem_id: String,
    pub problem_name: String,
}

/// A compiler/language option offered by the submit form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Compiler {
    pub compiler_id: String,
    pub compiler_name: String,
    pub compiler_lang: String,
}

impl Compiler {
    /// Builds a compiler from a submit form option. The language is the
    /// part of the display name before the first `:`, or "Unknown" when
    /// the name carries no such prefix.
    pub fn from_option(compiler_id: impl Into<String>, compiler_name: impl Into<String>) -> Self {
        let compiler_name = compiler_name.into();
        let compiler_lang = match compiler_name.split_once(':') {
            Some((prefix, _)) => prefix.trim().to_string(),
            None => String::from("Unknown"),
        };
        Compiler {
            compiler_id: compiler_id.into(),
            compiler_name,
            compiler_lang,
        }
    }
}

/// One row of the all-submissions table.
///
/// `result` holds the verdict token; while the submission is still being
/// judged the server reports it as empty, "NO", "JUDGING" or "PENDING".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub id: String,
    pub problem: String,
    pub compiler: String,
    pub result: String,
    pub time: String,
}

/// One row of the per-test feedback table, in server order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Test {
    pub test_id: String,
    pub result: String,
    pub time: String,
    pub memory: String,
    pub comment: String,
}

/// Free-text information scraped from the main page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub name: Option<String>,
    pub contest: Option<String>,
    /// End of the contest, computed from the "starts at ... and lasts N
    /// minutes" line when that line is present and parsable.
    pub deadline: Option<NaiveDateTime>,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_compiler_lang_from_prefix() {
        let compiler = Compiler::from_option("7", "cpp: GNU C++ 13");
        assert_eq!(compiler.compiler_lang, "cpp");
        assert_eq!(compiler.compiler_name, "cpp: GNU C++ 13");
    }

    #[test]
    fn test_compiler_lang_without_prefix() {
        let compiler = Compiler::from_option("3", "Free Pascal 3.2");
        assert_eq!(compiler.compiler_lang, "Unknown");
    }

    #[test]
    fn test_compiler_lang_prefix_is_trimmed() {
        let compiler = Compiler::from_option("1", "  py : CPython 3.11");
        assert_eq!(compiler.compiler_lang, "py");
    }

    #[test]
    fn test_submission_serializes_to_json() {
        let submission = Submission {
            id: String::from("1000"),
            problem: String::from("A"),
            compiler: String::from("cpp: GNU C++ 13"),
            result: String::from("OK"),
            time: String::from("00:12:44"),
        };

        let json = serde_json::to_string(&submission).unwrap();
        let back: Submission = serde_json::from_str(&json).unwrap();
        assert_eq!(back, submission);
    }
}
