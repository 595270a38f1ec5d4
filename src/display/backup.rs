//! Backup display formatting
//!
//! Formats backup records for terminal output in table and detail views.

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::models::BackupRecord;

#[derive(Tabled)]
struct BackupRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Type")]
    backup_type: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Records")]
    records: usize,
    #[tabled(rename = "Size")]
    size: String,
    #[tabled(rename = "Created")]
    created: String,
}

#[derive(Tabled)]
struct VerboseBackupRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "File")]
    filename: String,
    #[tabled(rename = "Type")]
    backup_type: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Records")]
    records: usize,
    #[tabled(rename = "Size")]
    size: String,
    #[tabled(rename = "Created")]
    created: String,
    #[tabled(rename = "By")]
    created_by: String,
    #[tabled(rename = "Contents")]
    contents: String,
}

/// Format a list of backups as a table
pub fn format_backup_list(backups: &[BackupRecord], verbose: bool) -> String {
    if backups.is_empty() {
        return "No backups found.".to_string();
    }

    let mut table = if verbose {
        Table::new(backups.iter().map(|b| VerboseBackupRow {
            id: b.id.short(),
            filename: b.filename.clone(),
            backup_type: b.backup_type.to_string(),
            status: b.status.to_string(),
            records: b.record_count,
            size: format_size(b.file_size),
            created: b.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            created_by: b.created_by.clone(),
            contents: format_contents(b),
        }))
    } else {
        Table::new(backups.iter().map(|b| BackupRow {
            id: b.id.short(),
            backup_type: b.backup_type.to_string(),
            status: b.status.to_string(),
            records: b.record_count,
            size: format_size(b.file_size),
            created: b.created_at.format("%Y-%m-%d %H:%M").to_string(),
        }))
    };

    table.with(Style::sharp());
    format!("{}\nTotal: {} backup(s)", table, backups.len())
}

/// Format one backup's full details
pub fn format_backup_details(backup: &BackupRecord) -> String {
    let mut output = String::new();

    output.push_str(&format!("Backup:    {}\n", backup.id));
    output.push_str(&format!("File:      {}\n", backup.filename));
    output.push_str(&format!("Type:      {}\n", backup.backup_type));
    output.push_str(&format!("Status:    {}\n", backup.status));
    output.push_str(&format!("Records:   {}\n", backup.record_count));
    output.push_str(&format!("Size:      {}\n", format_size(backup.file_size)));
    output.push_str(&format!("Contents:  {}\n", format_contents(backup)));
    output.push_str(&format!("Created:   {}\n", backup.created_at.format("%Y-%m-%d %H:%M:%S UTC")));
    output.push_str(&format!("Created by: {}\n", backup.created_by));

    if let Some(completed_at) = backup.completed_at {
        output.push_str(&format!("Finished:  {}\n", completed_at.format("%Y-%m-%d %H:%M:%S UTC")));
    }
    if let Some(url) = &backup.file_url {
        output.push_str(&format!("Location:  {}\n", url));
    }
    if let Some(checksum) = &backup.checksum {
        output.push_str(&format!("SHA-256:   {}\n", checksum));
    }
    if let Some(error) = &backup.error_message {
        output.push_str(&format!("Error:     {}\n", error));
    }

    output
}

fn format_contents(backup: &BackupRecord) -> String {
    let flags = &backup.inclusion;
    let mut parts = Vec::new();
    if flags.include_products {
        parts.push("products");
    }
    if flags.include_customers {
        parts.push("customers");
    }
    if flags.include_settings {
        parts.push("settings");
    }
    if flags.include_orders {
        parts.push("orders");
    }

    if parts.is_empty() {
        "-".to_string()
    } else {
        parts.join(", ")
    }
}

/// Format a file size in human-readable form
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
