use owo_colors::OwoColorize;

use interview_core::Identity;
use interview_core::model::{Evaluation, FeedbackReport, Question, ReportState, ScoreBand, SessionStatus};
use services::SessionListItem;

pub fn score_text(score: f32) -> String {
    format!("{score:.1}/10")
}

fn band_label(band: ScoreBand) -> &'static str {
    match band {
        ScoreBand::Strong => "strong",
        ScoreBand::Fair => "fair",
        ScoreBand::Weak => "weak",
    }
}

fn colored_score(score: f32) -> String {
    let text = score_text(score);
    match ScoreBand::from_score(score) {
        ScoreBand::Strong => text.green().bold().to_string(),
        ScoreBand::Fair => text.yellow().bold().to_string(),
        ScoreBand::Weak => text.red().bold().to_string(),
    }
}

pub fn identity(identity: &Identity) {
    match identity {
        Identity::Guest => println!(
            "{} {}",
            "Signed in as:".dimmed(),
            Identity::GUEST_NAME.yellow()
        ),
        Identity::Authenticated { user_id, email, .. } => {
            println!("{} {}", "Signed in as:".dimmed(), identity.display_name().cyan());
            println!("  {} {email}", "Email:".dimmed());
            println!("  {} {user_id}", "User ID:".dimmed());
        }
    }
}

pub fn question(question: &Question) {
    println!();
    println!(
        "{} {}",
        format!("Question {}", question.order_index()).bold(),
        format!("[{}]", question.kind()).dimmed()
    );
    println!("{}", question.text());
}

pub fn evaluation(evaluation: &Evaluation) {
    println!();
    println!(
        "{} {} ({}, {})",
        "Score:".dimmed(),
        colored_score(evaluation.score()),
        band_label(evaluation.band()),
        evaluation.correctness()
    );
    println!("{} {}", "Feedback:".dimmed(), evaluation.feedback());
    if !evaluation.missing_points().is_empty() {
        println!("{}", "Missing points:".dimmed());
        for point in evaluation.missing_points() {
            println!("  - {point}");
        }
    }
    if !evaluation.improvement_tips().is_empty() {
        println!("{}", "Tips:".dimmed());
        for tip in evaluation.improvement_tips() {
            println!("  - {tip}");
        }
    }
    println!("{} {}", "Ideal answer:".dimmed(), evaluation.ideal_answer());
}

pub fn report_state(state: &ReportState) {
    match state {
        ReportState::Ready(report) => feedback_report(report),
        ReportState::Pending => println!(
            "{}",
            "No report yet: the session is completed but has no feedback report.".yellow()
        ),
        ReportState::InProgress => println!(
            "{}",
            "No report yet: the session is still in progress.".yellow()
        ),
    }
}

fn feedback_report(report: &FeedbackReport) {
    println!();
    println!("{}", "Feedback report".bold().underline());
    print!("{} {}", "Overall:".dimmed(), colored_score(report.overall_score()));
    match report.total_questions() {
        Some(total) => println!(" across {total} questions"),
        None => println!(),
    }
    println!("{}", report.summary());
    if !report.strengths().is_empty() {
        println!("{}", "Strengths:".green());
        for strength in report.strengths() {
            println!("  + {strength}");
        }
    }
    if !report.weak_areas().is_empty() {
        println!("{}", "Weak areas:".red());
        for area in report.weak_areas() {
            println!("  - {area}");
        }
    }
}

pub fn session_list(items: &[SessionListItem]) {
    if items.is_empty() {
        println!("{}", "No interviews yet.".dimmed());
        return;
    }
    for item in items {
        let status = match item.status {
            SessionStatus::Completed => item.status.as_str().green().to_string(),
            SessionStatus::InProgress => item.status.as_str().yellow().to_string(),
        };
        let score = item
            .overall_score
            .map_or_else(|| "-".dimmed().to_string(), colored_score);
        println!(
            "{}  {}  {} ({})  {}  {}",
            item.id.cyan(),
            item.started_at.format("%Y-%m-%d %H:%M"),
            item.role,
            item.difficulty,
            status,
            score
        );
    }
}
