use colored::Colorize;
use kongseed_core::{RunMode, RunReport, SeedError};
use kongseed_storage::{ErrorCategory, StorageError};
use tabled::builder::Builder;
use tabled::settings::Style;

pub fn print_success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Storage category of a failed run, if a store error caused it.
pub fn error_category(err: &anyhow::Error) -> Option<ErrorCategory> {
    if let Some(SeedError::Storage(storage)) = err.downcast_ref::<SeedError>() {
        return Some(storage.category());
    }
    err.downcast_ref::<StorageError>().map(StorageError::category)
}

pub fn report_table(report: &RunReport) -> String {
    let acted = match report.mode {
        RunMode::Create => "Created",
        RunMode::Delete => "Deleted",
    };
    let mut builder = Builder::default();
    builder.push_record(["Table", "Desired", acted, "Orphans"]);
    for kind in &report.kinds {
        builder.push_record([
            kind.table.to_string(),
            kind.desired.to_string(),
            kind.acted.to_string(),
            kind.orphans.to_string(),
        ]);
    }
    builder.build().with(Style::rounded()).to_string()
}

pub fn summary(report: &RunReport) -> String {
    let verb = match report.mode {
        RunMode::Create => "created",
        RunMode::Delete => "deleted",
    };
    let mut line = format!("{} rows {verb} across {} tables", report.total_acted(), report.kinds.len());
    let orphans = report.total_orphans();
    if orphans > 0 {
        line.push_str(&format!(", {orphans} no longer desired (run with --delete to remove)"));
    }
    line
}

pub fn print_report(report: &RunReport) {
    println!("{}", report_table(report));
    print_success(&summary(report));
}
