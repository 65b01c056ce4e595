//! Command Scheduler
//!
//! Chooses the next command the workload issues. The scheduler is a two-state
//! machine over a single optional "known id":
//!
//! ```text
//!              Add                      GetAll / Add / GetById / SetById
//!  NoKnownId ───────▶ HasKnownId ◀─┐
//!      ▲                   │       └──────────────────┘
//!      └───── DeleteById ──┘
//! ```
//!
//! `GetById`, `SetById` and `DeleteById` are never eligible from `NoKnownId`.
//! Candidates are filtered before the draw, so every draw yields a legal command.

use rand::Rng;
use rand::seq::SliceRandom;
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    GetAll,
    Add,
    GetById,
    SetById,
    DeleteById,
}

impl Command {
    pub const ALL: [Command; 5] = [
        Command::GetAll,
        Command::Add,
        Command::GetById,
        Command::SetById,
        Command::DeleteById,
    ];

    /// Whether the command targets a single record and therefore needs a known id.
    pub fn requires_known_id(self) -> bool {
        matches!(
            self,
            Command::GetById | Command::SetById | Command::DeleteById
        )
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Command::GetAll => "GetAll",
            Command::Add => "Add",
            Command::GetById => "GetById",
            Command::SetById => "SetById",
            Command::DeleteById => "DeleteById",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    NoKnownId,
    HasKnownId,
}

/// A drawn command together with the id it targets, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledCommand {
    pub command: Command,
    pub known_id: Option<String>,
}

#[derive(Debug, Default)]
pub struct CommandScheduler {
    known_id: Option<String>,
}

impl CommandScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SchedulerState {
        if self.known_id.is_some() {
            SchedulerState::HasKnownId
        } else {
            SchedulerState::NoKnownId
        }
    }

    pub fn known_id(&self) -> Option<&str> {
        self.known_id.as_deref()
    }

    pub fn is_eligible(&self, command: Command) -> bool {
        !command.requires_known_id() || self.known_id.is_some()
    }

    /// Commands that may be drawn in the current state.
    pub fn eligible(&self) -> Vec<Command> {
        Command::ALL
            .into_iter()
            .filter(|command| self.is_eligible(*command))
            .collect()
    }

    /// Draws the next command uniformly among the eligible ones and applies
    /// its state transition.
    pub fn next_command<R: Rng + ?Sized>(&mut self, rng: &mut R) -> ScheduledCommand {
        // GetAll and Add are always eligible, so the candidate set is never empty.
        let command = self
            .eligible()
            .choose(rng)
            .copied()
            .unwrap_or(Command::GetAll);
        self.apply(command)
    }

    /// Applies the transition for `command`.
    ///
    /// An ineligible command is passed through without a target; the request
    /// builder turns it into a diagnostic request.
    pub fn apply(&mut self, command: Command) -> ScheduledCommand {
        let known_id = match command {
            Command::GetAll => None,
            Command::Add => {
                // Advisory only: the server assigns the real record id.
                self.known_id = Some(Uuid::new_v4().to_string());
                None
            }
            Command::GetById | Command::SetById => self.known_id.clone(),
            Command::DeleteById => self.known_id.take(),
        };

        ScheduledCommand { command, known_id }
    }
}
