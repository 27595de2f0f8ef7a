use anyhow::Result;
use owo_colors::OwoColorize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};

use services::{ControllerError, InterviewController, InterviewPhase, RoundOutcome};

use crate::render;

/// Drive the controller from stdin until the interview ends or input closes.
pub async fn run(controller: &InterviewController, first: RoundOutcome) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let result = drive(controller, first, &mut lines).await;
    controller.teardown();
    result
}

async fn drive<R>(
    controller: &InterviewController,
    first: RoundOutcome,
    lines: &mut Lines<R>,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    if !show_outcome(first) {
        return Ok(());
    }

    loop {
        let view = controller.view();
        let can = view.affordances;
        if view.phase == InterviewPhase::Completed {
            return Ok(());
        }

        if can.can_submit {
            println!();
            println!("{}", "Your answer (finish with an empty line):".dimmed());
            let Some(answer) = read_answer(lines).await? else {
                return Ok(());
            };
            match controller.submit(&answer).await {
                Ok(evaluation) => render::evaluation(&evaluation),
                Err(err) => show_error(&err),
            }
            continue;
        }

        if !(can.can_next || can.can_end) {
            return Ok(());
        }
        println!();
        println!("{}", choices(can.can_next, can.can_end).dimmed());
        let Some(line) = lines.next_line().await? else {
            return Ok(());
        };
        match line.trim().to_ascii_lowercase().as_str() {
            "n" | "next" if can.can_next => match controller.next().await {
                Ok(outcome) => {
                    show_outcome(outcome);
                }
                Err(err) => show_error(&err),
            },
            "e" | "end" if can.can_end => {
                match controller.end().await {
                    Ok(report) => render::report_state(&report),
                    Err(err) => {
                        show_error(&err);
                        if controller.phase() == InterviewPhase::Completed {
                            println!(
                                "{}",
                                "The interview is completed; open its report later with `report <id>`."
                                    .dimmed()
                            );
                        }
                    }
                }
            }
            "q" | "quit" => return Ok(()),
            _ => println!("{}", "Unrecognized choice.".yellow()),
        }
    }
}

fn choices(can_next: bool, can_end: bool) -> &'static str {
    match (can_next, can_end) {
        (true, true) => "[n]ext question, [e]nd interview or [q]uit",
        (true, false) => "[n]ext question or [q]uit",
        (false, true) => "[e]nd interview or [q]uit",
        (false, false) => "[q]uit",
    }
}

/// Render an outcome; `false` once there is nothing left to answer.
fn show_outcome(outcome: RoundOutcome) -> bool {
    match outcome {
        RoundOutcome::Question(question) => {
            render::question(&question);
            true
        }
        RoundOutcome::ReadyToEnd => {
            println!();
            println!("{}", "No more questions for this interview.".cyan());
            true
        }
        RoundOutcome::AlreadyCompleted(report) => {
            println!("{}", "This interview is already completed.".cyan());
            render::report_state(&report);
            false
        }
    }
}

fn show_error(err: &ControllerError) {
    eprintln!("{} {err}", "Error:".red());
    if err.is_timeout() {
        eprintln!("{}", "The interview service did not answer in time.".dimmed());
    }
    if err.is_retryable() {
        eprintln!("{}", "Nothing was lost; you can try again.".dimmed());
    }
}

/// Read lines up to the first empty one. `None` if input closed first.
async fn read_answer<R>(lines: &mut Lines<R>) -> Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    let mut answer = Vec::new();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            if answer.is_empty() {
                continue;
            }
            return Ok(Some(answer.join("\n")));
        }
        answer.push(line);
    }
    Ok((!answer.is_empty()).then(|| answer.join("\n")))
}
