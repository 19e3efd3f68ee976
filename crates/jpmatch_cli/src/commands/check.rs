//! Matcher check command.

use anyhow::{bail, Context, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use jpmatch_core::{
    be_empty, be_equivalent_to, be_null, contain_element, equal, have_len, not, AbsencePolicy,
    Config, Eventually, HaveJsonPath, MatchError, Matcher,
};
use std::time::Duration;

use super::{parse_literal, read_document};
use crate::CheckArgs;

/// Check a document against a path matcher.
///
/// Returns `false` when the matcher fails (or times out with `--watch`).
pub fn run(args: &CheckArgs, config: &Config) -> Result<bool> {
    let mut matcher = HaveJsonPath::try_new(args.expression.as_str(), build_inner(args))
        .with_context(|| format!("Invalid path expression {}", args.expression))?
        .with_config(&config.matcher);
    if args.tolerate_absence {
        matcher = matcher.with_absence(AbsencePolicy::EmptySequence);
    }

    if args.watch {
        return watch(args, config, &matcher);
    }

    let document = read_document(args.file.as_deref())?;
    let verdict = matcher.match_value(&document)?;

    if verdict.success {
        println!(
            "{} {}",
            style("✓").green(),
            style(matcher.describe()).bold()
        );
    } else {
        println!(
            "{} {}",
            style("×").red(),
            style(matcher.describe()).bold()
        );
        println!();
        println!("{}", verdict.message);
    }
    Ok(verdict.success)
}

fn watch(args: &CheckArgs, config: &Config, matcher: &dyn Matcher) -> Result<bool> {
    let Some(path) = args.file.as_deref() else {
        bail!("--watch needs a FILE to re-read");
    };
    if path == std::path::Path::new("-") {
        bail!("--watch cannot re-read stdin");
    }

    let mut eventually = config.eventually.clone();
    if let Some(secs) = args.timeout {
        eventually.timeout_ms = secs.saturating_mul(1000);
    }
    if let Some(ms) = args.interval {
        if ms == 0 {
            bail!("--interval must be greater than zero");
        }
        eventually.polling_interval_ms = ms;
    }

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.set_message(format!("Waiting for {}...", args.expression));
    pb.enable_steady_tick(Duration::from_millis(100));

    let outcome = Eventually::new(|| read_document(Some(path)))
        .with_config(&eventually)
        .should(matcher);

    pb.finish_and_clear();

    match outcome {
        Ok(report) => {
            println!(
                "{} {} {}",
                style("✓").green(),
                style(matcher.describe()).bold(),
                style(format!(
                    "({} attempts, {}ms)",
                    report.attempts,
                    report.elapsed.as_millis()
                ))
                .dim()
            );
            Ok(true)
        }
        Err(MatchError::Timeout {
            attempts,
            elapsed_ms,
            last_failure,
        }) => {
            println!(
                "{} {} {}",
                style("×").red(),
                style(matcher.describe()).bold(),
                style(format!("(timed out after {} attempts, {}ms)", attempts, elapsed_ms)).dim()
            );
            println!();
            println!("{}", last_failure);
            Ok(false)
        }
        Err(e) => Err(e.into()),
    }
}

/// Builds the inner matcher selected by the command-line flags.
fn build_inner(args: &CheckArgs) -> Box<dyn Matcher> {
    let inner: Box<dyn Matcher> = if let Some(raw) = &args.equals {
        Box::new(equal(parse_literal(raw)))
    } else if let Some(raw) = &args.equivalent {
        Box::new(be_equivalent_to(parse_literal(raw)))
    } else if let Some(raw) = &args.contains {
        Box::new(contain_element(parse_literal(raw)))
    } else if let Some(len) = args.len {
        Box::new(have_len(len))
    } else if args.null {
        Box::new(be_null())
    } else {
        Box::new(be_empty())
    };

    if args.not {
        Box::new(not(inner))
    } else {
        inner
    }
}
