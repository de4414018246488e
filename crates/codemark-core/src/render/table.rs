//! Human-readable table.

use crate::types::{count_by_level, Issue, Level};
use owo_colors::OwoColorize;
use std::io::{self, Write};

/// Code prefix of issues from the advisory producer.
const ADVISORY_PREFIX: &str = "AI";

const HEADERS: [&str; 3] = ["Location", "Message", "Level"];

/// Writes the issues as a table with a level summary.
///
/// An empty sequence is rendered as a single confirmation line.
///
/// # Errors
///
/// Returns an error if writing to `out` fails.
pub fn render_table(issues: &[Issue], out: &mut dyn Write, color: bool) -> io::Result<()> {
    if issues.is_empty() {
        let confirmation = "✅ No issues found!";
        if color {
            writeln!(out, "{}", confirmation.green().bold())?;
        } else {
            writeln!(out, "{confirmation}")?;
        }
        return Ok(());
    }

    let rows: Vec<[String; 3]> = issues
        .iter()
        .map(|issue| [issue.location(), single_line(&issue.message), level_label(issue)])
        .collect();

    let mut widths = HEADERS.map(|h| h.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let header = format!(
        "{} | {} | {}",
        pad(HEADERS[0], widths[0]),
        pad(HEADERS[1], widths[1]),
        HEADERS[2]
    );
    let rule = widths.map(|w| "-".repeat(w)).join("-+-");
    if color {
        writeln!(out, "{}", header.cyan().bold())?;
    } else {
        writeln!(out, "{header}")?;
    }
    writeln!(out, "{rule}")?;

    for (issue, [location, message, level]) in issues.iter().zip(&rows) {
        let location = pad(location, widths[0]);
        let message = pad(message, widths[1]);
        if color {
            writeln!(
                out,
                "{} | {} | {}",
                location.bold(),
                message,
                paint_level(issue, level)
            )?;
        } else {
            writeln!(out, "{location} | {message} | {level}")?;
        }
    }

    let (errors, warnings, infos) = count_by_level(issues);
    let summary = format!("Found {errors} error(s), {warnings} warning(s), {infos} info(s)");
    writeln!(out)?;
    if !color {
        writeln!(out, "{summary}")
    } else if errors > 0 {
        writeln!(out, "{}", summary.red())
    } else if warnings > 0 {
        writeln!(out, "{}", summary.yellow())
    } else {
        writeln!(out, "{}", summary.green())
    }
}

fn level_label(issue: &Issue) -> String {
    let level = issue.level.as_str().to_uppercase();
    match issue.auto_fixed {
        Some(true) => format!("{level} (fixed)"),
        Some(false) => format!("{level} (fix failed)"),
        None => level,
    }
}

fn paint_level(issue: &Issue, label: &str) -> String {
    if issue.code.starts_with(ADVISORY_PREFIX) {
        return label.magenta().bold().to_string();
    }
    match issue.level {
        Level::Error => label.red().bold().to_string(),
        Level::Warning => label.yellow().to_string(),
        Level::Info => label.cyan().to_string(),
    }
}

/// Joins the lines of a message so each row stays on one line.
fn single_line(message: &str) -> String {
    message
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn pad(text: &str, width: usize) -> String {
    let fill = width.saturating_sub(text.chars().count());
    format!("{text}{}", " ".repeat(fill))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(issues: &[Issue], color: bool) -> String {
        let mut out = Vec::new();
        render_table(issues, &mut out, color).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_multiline_message_stays_in_its_row() {
        let issues = vec![Issue::new(
            "a.py",
            0,
            "AIReview",
            "Split main().\n\n  Rename x.\n",
            Level::Error,
        )];
        insta::assert_snapshot!(render(&issues, false).trim_end(), @r"
        Location          | Message                 | Level
        ------------------+-------------------------+------
        a.py:0 – AIReview | Split main(). Rename x. | ERROR

        Found 1 error(s), 0 warning(s), 0 info(s)
        ");
    }

    #[test]
    fn test_empty_is_confirmation() {
        assert_eq!(render(&[], false), "✅ No issues found!\n");
    }

    #[test]
    fn test_rows_and_summary() {
        let issues = vec![
            Issue::new("a.py", 3, "BareTry", "Try block without exception handlers.", Level::Warning),
            Issue::new("b.py", 0, "SyntaxError", "expected ':'", Level::Error),
        ];
        insta::assert_snapshot!(render(&issues, false).trim_end(), @r"
        Location             | Message                               | Level
        ---------------------+---------------------------------------+--------
        a.py:3 – BareTry     | Try block without exception handlers. | WARNING
        b.py:0 – SyntaxError | expected ':'                          | ERROR

        Found 1 error(s), 1 warning(s), 0 info(s)
        ");
    }

    #[test]
    fn test_fix_outcome_is_shown() {
        let issues = vec![
            Issue::new("a.py", 1, "LineLength", "Line too long (90 > 88)", Level::Warning)
                .with_auto_fixed(true),
        ];
        assert!(render(&issues, false).contains("| WARNING (fixed)"));
    }

    #[test]
    fn test_advisory_codes_are_highlighted() {
        let advisory = Issue::new("a.py", 0, "AIReview", "Looks fine", Level::Error);
        let error = Issue::new("a.py", 0, "SyntaxError", "bad", Level::Error);
        assert_eq!(paint_level(&advisory, "ERROR"), "ERROR".magenta().bold().to_string());
        assert_eq!(paint_level(&error, "ERROR"), "ERROR".red().bold().to_string());
        assert_ne!(paint_level(&advisory, "ERROR"), paint_level(&error, "ERROR"));
    }

    #[test]
    fn test_no_escape_codes_without_color() {
        let issues = vec![Issue::new("a.py", 0, "AIReview", "Looks fine", Level::Error)];
        assert!(!render(&issues, false).contains('\u{1b}'));
        assert!(render(&issues, true).contains('\u{1b}'));
    }
}
