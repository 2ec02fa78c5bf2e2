//! Handler for the `reconcile` command: the scheduled status pass.

use anyhow::Result;
use colored::Colorize;
use rentdesk::engine::audit::AuditSink;
use rentdesk::engine::db::Db;
use rentdesk::engine::reconcile::{batch_evaluate, BatchOutcome};
use rentdesk::engine::repo::{AuditRepo, RentalRepo};
use serde::Serialize;

/// Evaluates every rental against one instant and persists the changes
/// (unless `--dry-run`).
///
/// # Errors
/// Returns error if the store cannot be read or written.
pub fn handle(auto_activate: bool, dry_run: bool, json: bool) -> Result<()> {
    let conn = Db::connect()?;
    let repo = RentalRepo::new(&conn);
    let rentals = repo.get_all()?;

    let clock = super::business_clock()?;
    let now = clock.now();
    let outcome = batch_evaluate(&rentals, now, auto_activate);

    for warning in &outcome.warnings {
        eprintln!(
            "{} [{}] {} — status left unchanged",
            "⚠".yellow(),
            warning.reference.yellow(),
            warning.detail
        );
    }

    if !dry_run {
        let audit = AuditRepo::new(&conn);
        for change in &outcome.changes {
            repo.apply(&change.rental)?;
            audit.record(&change.audit(auto_activate))?;
        }
    }

    if json {
        return print_json(&outcome, dry_run);
    }
    print_human(&outcome, dry_run);
    Ok(())
}

#[derive(Serialize)]
struct ReconcileReport {
    dry_run: bool,
    changed: usize,
    warnings: usize,
    changes: Vec<ChangeView>,
}

#[derive(Serialize)]
struct ChangeView {
    id: i64,
    reference: String,
    old_status: String,
    new_status: String,
}

fn print_json(outcome: &BatchOutcome, dry_run: bool) -> Result<()> {
    let report = ReconcileReport {
        dry_run,
        changed: outcome.changes.len(),
        warnings: outcome.warnings.len(),
        changes: outcome
            .changes
            .iter()
            .map(|c| ChangeView {
                id: c.rental.id,
                reference: c.rental.reference.clone(),
                old_status: c.old_status.to_string(),
                new_status: c.new_status.to_string(),
            })
            .collect(),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn print_human(outcome: &BatchOutcome, dry_run: bool) {
    if outcome.changes.is_empty() {
        println!("{} All rentals are up to date.", "✓".green());
        return;
    }

    let verb = if dry_run { "would change" } else { "changed" };
    println!(
        "{} {} rental(s) {}:",
        "⟳".cyan(),
        outcome.changes.len(),
        verb
    );
    for change in &outcome.changes {
        println!(
            "   [{}] {} → {}",
            change.rental.reference.yellow(),
            change.old_status.to_string().dimmed(),
            change.new_status.to_string().green()
        );
    }
}
