//! Plain-text table rendering and verdict coloring.

use console::{measure_text_width, pad_str, style, Alignment};
use tsweb_libs::model::{Compiler, Problem, Submission, Test};

/// Colors a verdict token the way contestants expect: accepted green,
/// wrong red, resource limits magenta, pending yellow.
pub fn verdict_cell(verdict: &str) -> String {
    let styled = match verdict.to_uppercase().as_str() {
        "OK" | "AC" => style(verdict).green(),
        "WA" | "RT" | "RE" => style(verdict).red(),
        "TL" | "ML" | "TLE" | "MLE" => style(verdict).magenta(),
        "NO" | "JUDGING" | "PENDING" => style(verdict).yellow(),
        _ => style(verdict),
    };
    styled.to_string()
}

/// Prints an aligned table. Cell widths are measured ignoring ANSI
/// styling so colored cells line up.
pub fn print_table(headers: &[&str], rows: &[Vec<String>]) {
    let mut widths: Vec<usize> = headers.iter().map(|header| header.len()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if i < widths.len() {
                widths[i] = widths[i].max(measure_text_width(cell));
            }
        }
    }

    let header_line: Vec<String> = headers
        .iter()
        .zip(&widths)
        .map(|(header, width)| {
            style(pad_str(header, *width, Alignment::Left, None))
                .bold()
                .to_string()
        })
        .collect();
    println!("  {}", header_line.join("  "));

    for row in rows {
        let line: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, width)| pad_str(cell, *width, Alignment::Left, None).into_owned())
            .collect();
        println!("  {}", line.join("  "));
    }
}

pub fn problems_table(problems: &[Problem]) {
    let rows: Vec<Vec<String>> = problems
        .iter()
        .map(|problem| vec![problem.problem_id.clone(), problem.problem_name.clone()])
        .collect();
    print_table(&["ID", "Name"], &rows);
}

/// Lists compilers by index, marking the default one with `*`.
pub fn compilers_table(compilers: &[Compiler], default_lang: usize) {
    let rows: Vec<Vec<String>> = compilers
        .iter()
        .enumerate()
        .map(|(index, compiler)| {
            let marker = if index == default_lang { "*" } else { "" };
            vec![
                format!("{}{}", index, marker),
                compiler.compiler_lang.clone(),
                compiler.compiler_name.clone(),
            ]
        })
        .collect();
    print_table(&["#", "Language", "Name"], &rows);
}

pub fn submissions_table(submissions: &[Submission]) {
    let rows: Vec<Vec<String>> = submissions
        .iter()
        .map(|submission| {
            vec![
                submission.id.clone(),
                submission.problem.clone(),
                submission.time.clone(),
                submission.compiler.clone(),
                verdict_cell(&submission.result),
            ]
        })
        .collect();
    print_table(&["ID", "Problem", "Time", "Compiler", "Result"], &rows);
}

pub fn tests_table(tests: &[Test]) {
    let rows: Vec<Vec<String>> = tests
        .iter()
        .map(|test| {
            vec![
                test.test_id.clone(),
                verdict_cell(&test.result),
                test.time.clone(),
                test.memory.clone(),
                test.comment.clone(),
            ]
        })
        .collect();
    print_table(&["Test", "Result", "Time", "Memory", "Comment"], &rows);
}
