//! Remediation hints for built-in issue codes.

/// Returns the hint for a built-in code, `None` for anything else.
#[must_use]
pub fn suggestion_for(code: &str) -> Option<&'static str> {
    let hint = match code {
        crate::missing_docstring::CODE => {
            "Add a concise docstring describing purpose, arguments and return value."
        }
        crate::bare_try::CODE => {
            "Handle specific exceptions with except clauses instead of relying on finally alone."
        }
        crate::line_length::CODE => "Break the line up or run the formatter with --fix.",
        codemark_core::SYNTAX_ERROR_CODE => "Fix the syntax error so the file can be analyzed.",
        _ => return None,
    };
    Some(hint)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_codes_have_hints() {
        for code in ["MissingDocstring", "BareTry", "LineLength", "SyntaxError"] {
            assert!(suggestion_for(code).is_some(), "{code}");
        }
    }

    #[test]
    fn test_external_codes_have_none() {
        assert!(suggestion_for("LongFile").is_none());
        assert!(suggestion_for("AIReview").is_none());
        assert!(suggestion_for("missingdocstring").is_none());
    }
}
