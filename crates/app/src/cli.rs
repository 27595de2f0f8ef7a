use std::path::PathBuf;

use clap::{Parser, Subcommand};

use interview_core::model::{Difficulty, SessionId};

#[derive(Debug, Parser)]
#[command(
    name = "interview-rehearsal",
    about = "Rehearse technical interviews against an AI interviewer",
    version
)]
pub struct Cli {
    /// Configuration file (defaults to the user config directory)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
    /// Interview service base URL, e.g. http://localhost:8000
    #[arg(long, global = true, value_name = "URL")]
    pub base_url: Option<String>,
    /// Bearer token; without one you continue as a guest
    #[arg(long, global = true)]
    pub token: Option<String>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start a new interview
    Start {
        /// Job role to interview for, e.g. "Backend Developer"
        #[arg(short, long)]
        role: String,
        /// easy, medium or hard
        #[arg(short, long, default_value = "medium")]
        difficulty: Difficulty,
    },
    /// Continue an interview that is still in progress
    Resume {
        /// Session ID
        id: SessionId,
    },
    /// List past interviews, newest first
    List,
    /// Show the feedback report of an interview
    Report {
        /// Session ID
        id: SessionId,
    },
    /// Show who the interview service thinks you are
    Whoami,
}
