//! Check command handler.

use anyhow::{Context, Result, bail};

use crate::backend::{LocalBackend, StoreReport};

pub fn handle_check(backend: &LocalBackend) -> Result<()> {
    let report = backend.check().context("failed to check store")?;
    print!("{}", render_report(&report));

    if !report.is_clean() {
        bail!("check failed");
    }
    Ok(())
}

fn problem_count(report: &StoreReport) -> usize {
    report.missing.len()
        + report.corrupt.len()
        + report.invalid.len()
        + report.orphans.len()
        + report.stray.len()
}

pub(crate) fn render_report(report: &StoreReport) -> String {
    if report.is_clean() {
        return format!("Checked {} note(s). All notes OK.\n", report.checked);
    }

    let mut out = String::new();
    for note in &report.missing {
        out.push_str(&format!("missing: {} [{}]\n", note.name(), note.id()));
    }
    for note in &report.corrupt {
        out.push_str(&format!("corrupt: {} [{}]\n", note.name(), note.id()));
    }
    for note in &report.invalid {
        out.push_str(&format!("invalid name: {:?} [{}]\n", note.name(), note.id()));
    }
    for path in &report.orphans {
        out.push_str(&format!("orphan: {}\n", path.display()));
    }
    for path in &report.stray {
        out.push_str(&format!("stray: {}\n", path.display()));
    }
    out.push_str(&format!(
        "\nChecked {} note(s), found {} issue(s)\n",
        report.checked,
        problem_count(report)
    ));
    out
}
