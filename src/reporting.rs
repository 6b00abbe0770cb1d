use crate::verifier::{RunStats, VerificationError};

/// Formats an error message with timestamp and module prefix.
fn format_error<'a>(
    timestamp: &chrono::format::DelayedFormat<chrono::format::StrftimeItems<'a>>,
    message: &str,
) -> String {
    format!("{} [ERROR] (twoslash_verify): {}", timestamp, message)
}

/// Reports the outcome of a verification run to stderr.
///
/// Every accumulated error is printed with `file:line` attribution and its
/// raw payload, followed by a summary of failing locations; a clean run
/// prints a single success line. Reporting never terminates the process;
/// exit-status mapping is the caller's job, so multi-file runs always
/// produce a complete report.
pub fn report_run(errors: &[VerificationError], stats: &RunStats) {
    use chrono::Local;

    let now = Local::now();
    let timestamp = now.format("%Y-%m-%d %H:%M:%S");

    if errors.is_empty() {
        eprintln!(
            "{} [INFO] (twoslash_verify): Verified {} code block(s) in {} file(s)",
            timestamp, stats.blocks_checked, stats.files_scanned
        );
        return;
    }

    for error in errors {
        eprintln!("{}", format_error(&timestamp, "Verification failed"));
        eprintln!(
            "{}",
            format_error(
                &timestamp,
                &format!("File: {}:{}", error.file.display(), error.line)
            )
        );
        eprintln!("{}", format_error(&timestamp, ""));

        for line in error.error.lines() {
            eprintln!("{}", format_error(&timestamp, line));
        }

        eprintln!("{}", format_error(&timestamp, ""));
    }

    eprintln!(
        "{}",
        format_error(&timestamp, "Errors in the following locations:")
    );
    for error in errors {
        eprintln!(
            "{}",
            format_error(
                &timestamp,
                &format!("  {}:{}", error.file.display(), error.line)
            )
        );
    }
    eprintln!(
        "{}",
        format_error(
            &timestamp,
            &format!("Twoslash verification failed with {} error(s)", errors.len())
        )
    );
}
