mod cli;
mod report;

use std::io::Write;
use std::process::ExitCode;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use cli::{Cli, OutputFormat};
use docs_common::validate::validate_tree;

fn main() -> anyhow::Result<ExitCode> {
    // Logs go to stderr; stdout carries the report.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let cli = Cli::parse();
    let mut stdout = std::io::stdout().lock();
    let mut stderr = std::io::stderr().lock();
    run(&cli, &mut stdout, &mut stderr)
}

/// Validate `cli.examples_dir` and write the report. Fails the run only when
/// the report has errors; a missing directory is reported but passes.
fn run(cli: &Cli, out: &mut impl Write, err: &mut impl Write) -> anyhow::Result<ExitCode> {
    if cli.format == OutputFormat::Text {
        writeln!(out, "Validating content...\n")?;
    }
    if !cli.examples_dir.is_dir() {
        writeln!(err, "Examples directory not found: {}", cli.examples_dir.display())?;
    }

    let report = validate_tree(&cli.examples_dir);
    info!(
        examples_dir = %cli.examples_dir.display(),
        errors = report.errors.len(),
        warnings = report.warnings.len(),
        "validation finished"
    );

    match cli.format {
        OutputFormat::Text => report::write_text(&report, out, err)?,
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, &report)?;
            writeln!(out)?;
        }
    }

    Ok(if report.is_valid() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    const BETA_GATEWAY: &str = "apiVersion: gateway.networking.k8s.io/v1beta1\nkind: Gateway\nmetadata:\n  name: gw\nspec:\n  gatewayClassName: eg\n";

    fn cli(dir: &Path, format: OutputFormat) -> Cli {
        Cli {
            examples_dir: dir.to_path_buf(),
            format,
        }
    }

    fn run_to_strings(cli: &Cli) -> (ExitCode, String, String) {
        let mut out = Vec::new();
        let mut err = Vec::new();
        let code = run(cli, &mut out, &mut err).expect("run");
        (
            code,
            String::from_utf8(out).expect("utf8"),
            String::from_utf8(err).expect("utf8"),
        )
    }

    fn write_example(root: &Path, name: &str, content: &str) {
        let category = root.join("01-basic-setup");
        std::fs::create_dir_all(&category).expect("mkdir");
        std::fs::write(category.join(name), content).expect("write");
    }

    #[test]
    fn errors_fail_the_run() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_example(dir.path(), "gateway.yaml", "kind: Gateway\n");

        let (code, out, err) = run_to_strings(&cli(dir.path(), OutputFormat::Text));

        assert_eq!(code, ExitCode::FAILURE);
        assert!(out.starts_with("Validating content..."));
        assert!(err.contains("Errors:"));
        assert!(err.contains("Missing required field: apiVersion"));
        assert!(!out.contains("✅"));
    }

    #[test]
    fn warnings_alone_pass() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_example(dir.path(), "gateway.yaml", BETA_GATEWAY);

        let (code, out, err) = run_to_strings(&cli(dir.path(), OutputFormat::Text));

        assert_eq!(code, ExitCode::SUCCESS);
        assert!(out.contains("Using v1beta1 instead of v1."));
        assert!(out.contains("✅ Validation complete. 1 warning(s), 0 error(s)"));
        assert!(err.is_empty());
    }

    #[test]
    fn missing_directory_is_reported_and_passes() {
        let dir = tempfile::tempdir().expect("tempdir");
        let missing = dir.path().join("examples");

        let (code, out, err) = run_to_strings(&cli(&missing, OutputFormat::Text));

        assert_eq!(code, ExitCode::SUCCESS);
        assert!(err.starts_with("Examples directory not found:"));
        assert!(out.contains("✅ All content validation passed!"));
    }

    #[test]
    fn json_format_emits_report_only() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_example(dir.path(), "gateway.yaml", BETA_GATEWAY);

        let (code, out, _) = run_to_strings(&cli(dir.path(), OutputFormat::Json));

        assert_eq!(code, ExitCode::SUCCESS);
        let value: serde_json::Value = serde_json::from_str(&out).expect("json report");
        assert_eq!(value["errors"].as_array().map(Vec::len), Some(0));
        assert_eq!(value["warnings"][0]["type"], "warning");
    }
}
