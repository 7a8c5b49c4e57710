//! Human-readable rendering of a validation report.
//!
//! Warnings go to `out`, errors to `err`, mirroring stdout/stderr for CI logs.
use std::io::{self, Write};

use docs_common::model::{ValidationIssue, ValidationReport};

pub fn write_text(
    report: &ValidationReport,
    out: &mut impl Write,
    err: &mut impl Write,
) -> io::Result<()> {
    if !report.warnings.is_empty() {
        writeln!(out, "Warnings:")?;
        for warning in &report.warnings {
            writeln!(out, "  ⚠️  {}", describe(warning))?;
        }
        writeln!(out)?;
    }

    if !report.errors.is_empty() {
        writeln!(err, "Errors:")?;
        for error in &report.errors {
            writeln!(err, "  ❌ {}", describe(error))?;
        }
        writeln!(err)?;
        return Ok(());
    }

    if report.is_clean() {
        writeln!(out, "✅ All content validation passed!")
    } else {
        writeln!(
            out,
            "✅ Validation complete. {} warning(s), {} error(s)",
            report.warnings.len(),
            report.errors.len()
        )
    }
}

/// `file[:line]: message`, with the line shown 1-based.
fn describe(issue: &ValidationIssue) -> String {
    match issue.line {
        Some(line) => format!("{}:{}: {}", issue.file.display(), line + 1, issue.message),
        None => format!("{}: {}", issue.file.display(), issue.message),
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    fn render(report: &ValidationReport) -> (String, String) {
        let mut out = Vec::new();
        let mut err = Vec::new();
        write_text(report, &mut out, &mut err).expect("write to buffer");
        (
            String::from_utf8(out).expect("utf8"),
            String::from_utf8(err).expect("utf8"),
        )
    }

    #[test]
    fn clean_report() {
        let (out, err) = render(&ValidationReport::new());
        assert_eq!(out, "✅ All content validation passed!\n");
        assert!(err.is_empty());
    }

    #[test]
    fn warnings_only_summarised() {
        let mut report = ValidationReport::new();
        report.push(ValidationIssue::warning(Path::new("a/b.yaml"), "Using v1beta1 instead of v1."));
        let (out, err) = render(&report);
        assert_eq!(
            out,
            "Warnings:\n  ⚠️  a/b.yaml: Using v1beta1 instead of v1.\n\n\
             ✅ Validation complete. 1 warning(s), 0 error(s)\n"
        );
        assert!(err.is_empty());
    }

    #[test]
    fn errors_go_to_err_with_lines() {
        let mut report = ValidationReport::new();
        report.push(ValidationIssue::error(Path::new("a/b.yaml"), "Invalid YAML syntax: bad").at_line(Some(4)));
        report.push(ValidationIssue::error(Path::new("a/c.yaml"), "Missing required field: kind"));
        let (out, err) = render(&report);
        assert!(out.is_empty());
        assert_eq!(
            err,
            "Errors:\n  ❌ a/b.yaml:5: Invalid YAML syntax: bad\n  ❌ a/c.yaml: Missing required field: kind\n\n"
        );
    }
}
