use chrono::NaiveDateTime;
use vidjob_core::{
    AppViewModel, JobRowView, JobStats, JobView, Presentation, SessionPhase, Severity,
};

const BAR_WIDTH: usize = 20;

/// Renders the whole screen as text lines.
pub fn render(view: &AppViewModel) -> Vec<String> {
    let mut lines = Vec::new();

    let session = match (view.phase, view.username.as_deref()) {
        (SessionPhase::Authenticated, Some(username)) => format!("Logged in as {username}"),
        (SessionPhase::Authenticated, None) => "Logged in".to_string(),
        (SessionPhase::PendingVerification, _) => "Verifying stored session...".to_string(),
        (SessionPhase::Anonymous, _) if view.auth_in_flight => "Signing in...".to_string(),
        (SessionPhase::Anonymous, _) => "Not logged in".to_string(),
    };
    lines.push(format!("== {session} =="));

    if let Some(notice) = &view.notice {
        let tag = match notice.severity {
            Severity::Info => "info",
            Severity::Error => "error",
        };
        lines.push(format!("[{tag}] {}", notice.text));
    }

    if let Some(upload) = &view.upload {
        lines.push(format!(
            "Selected: {} ({}, {})",
            upload.file_name,
            upload.media_type,
            format_size(upload.size_bytes)
        ));
    }
    if view.uploading {
        lines.push("Uploading...".to_string());
    }

    match view.view {
        JobView::Closed => {}
        JobView::Dashboard => {
            if let Some(stats) = &view.stats {
                lines.push(render_stats(stats));
            }
            lines.push(list_heading("Recent jobs", view));
            push_rows(&mut lines, view);
        }
        JobView::Jobs => {
            lines.push(list_heading(
                &format!("Jobs, page {} of {}", view.page, view.total_pages.max(1)),
                view,
            ));
            push_rows(&mut lines, view);
        }
    }

    lines
}

fn list_heading(title: &str, view: &AppViewModel) -> String {
    if view.loading {
        format!("-- {title} (loading) --")
    } else {
        format!("-- {title} --")
    }
}

fn push_rows(lines: &mut Vec<String>, view: &AppViewModel) {
    if view.jobs.is_empty() && !view.loading {
        lines.push("  No jobs yet.".to_string());
    }
    lines.extend(view.jobs.iter().map(render_row));
}

fn render_stats(stats: &JobStats) -> String {
    format!(
        "Total {} | Completed {} | Processing {} | Failed {} | Success rate {:.1}%",
        stats.total_jobs,
        stats.completed_jobs,
        stats.processing_jobs,
        stats.failed_jobs,
        stats.success_rate
    )
}

pub fn render_row(row: &JobRowView) -> String {
    let label = row.presentation.label();
    let status = match &row.presentation {
        Presentation::Waiting => label.to_string(),
        Presentation::Running { progress } => {
            format!("{label} {} {progress}%", progress_bar(*progress))
        }
        Presentation::Succeeded => format!("{label}, {} frames", row.frame_count),
        Presentation::Failed { message } => format!("{label}: {message}"),
    };

    let mut line = format!("  #{:<5} {:<32} {}", row.job_id, row.original_filename, status);
    if let Some(created) = row.created_at.as_deref() {
        line.push_str(&format!("  ({})", format_timestamp(created)));
    }
    if let Some(download) = &row.download {
        if row.downloading {
            line.push_str("  [downloading]");
        } else {
            line.push_str(&format!("  [download {}: {}]", download.job_id, download.file_name));
        }
    }
    line
}

fn progress_bar(progress: u8) -> String {
    let filled = usize::from(progress.min(100)) * BAR_WIDTH / 100;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(BAR_WIDTH - filled))
}

/// Server timestamps are naive ISO 8601; anything else is shown verbatim.
fn format_timestamp(raw: &str) -> String {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|stamp| stamp.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|_| raw.to_string())
}

fn format_size(bytes: u64) -> String {
    const MB: f64 = 1024.0 * 1024.0;
    if bytes as f64 >= MB {
        format!("{:.1} MB", bytes as f64 / MB)
    } else {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    }
}
