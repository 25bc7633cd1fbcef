// Cup draw: ten teams split into two groups of five.
//
// The teams are shuffled once with Fisher-Yates, then revealed one per step.
// Even positions of the permutation go to group A, odd positions to group B,
// so every completed draw is a 5/5 split.

use std::collections::HashSet;
use std::fmt;
use std::ops::ControlFlow;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

pub const DRAW_SIZE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Group {
    A,
    B,
}

impl Group {
    /// Group receiving the team at `index` of the permutation.
    pub fn for_index(index: usize) -> Group {
        if index % 2 == 0 {
            Group::A
        } else {
            Group::B
        }
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Group::A => f.write_str("A"),
            Group::B => f.write_str("B"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawPhase {
    Idle,
    Drawing,
    Complete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawStep {
    pub index: usize,
    pub team: String,
    pub group: Group,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DrawError {
    #[error("the cup draw needs exactly 10 teams, got {found}")]
    WrongTeamCount { found: usize },

    #[error("team '{0}' appears more than once")]
    DuplicateTeam(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawOutcome {
    pub drawn_at: DateTime<Utc>,
    pub group_a: Vec<String>,
    pub group_b: Vec<String>,
}

/// Draw progress. `teams` holds the shuffled permutation once started.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawState {
    pub teams: Vec<String>,
    pub group_a: Vec<String>,
    pub group_b: Vec<String>,
    pub current_index: usize,
    pub is_drawing: bool,
}

impl DrawState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> DrawPhase {
        if self.teams.is_empty() {
            DrawPhase::Idle
        } else if self.current_index >= self.teams.len() {
            DrawPhase::Complete
        } else {
            DrawPhase::Drawing
        }
    }

    /// Validate `teams`, shuffle them and enter the drawing phase. On error
    /// the state is left as it was.
    pub fn start<R: Rng + ?Sized>(&mut self, teams: Vec<String>, rng: &mut R) -> Result<(), DrawError> {
        validate(&teams)?;

        let mut permutation = teams;
        shuffle(&mut permutation, rng);
        debug!("cup draw permutation: {:?}", permutation);

        *self = DrawState {
            teams: permutation,
            group_a: Vec::with_capacity(DRAW_SIZE / 2),
            group_b: Vec::with_capacity(DRAW_SIZE / 2),
            current_index: 0,
            is_drawing: true,
        };
        Ok(())
    }

    /// The step that `advance` would perform, if any.
    pub fn next_step(&self) -> Option<DrawStep> {
        match self.phase() {
            DrawPhase::Drawing => step_at(&self.teams, self.current_index),
            DrawPhase::Idle | DrawPhase::Complete => None,
        }
    }

    /// Reveal the next team.
    pub fn advance(&mut self) -> Option<DrawStep> {
        let step = self.next_step()?;
        match step.group {
            Group::A => self.group_a.push(step.team.clone()),
            Group::B => self.group_b.push(step.team.clone()),
        }
        self.current_index += 1;
        if self.phase() == DrawPhase::Complete {
            self.is_drawing = false;
            info!("cup draw complete: A={:?} B={:?}", self.group_a, self.group_b);
        }
        Some(step)
    }

    pub fn reset(&mut self) {
        *self = DrawState::default();
    }

    /// Final groups, once every team has been revealed.
    pub fn outcome(&self) -> Option<DrawOutcome> {
        (self.phase() == DrawPhase::Complete).then(|| DrawOutcome {
            drawn_at: Utc::now(),
            group_a: self.group_a.clone(),
            group_b: self.group_b.clone(),
        })
    }
}

fn validate(teams: &[String]) -> Result<(), DrawError> {
    if teams.len() != DRAW_SIZE {
        return Err(DrawError::WrongTeamCount { found: teams.len() });
    }
    let mut seen = HashSet::with_capacity(teams.len());
    for team in teams {
        if !seen.insert(team.as_str()) {
            return Err(DrawError::DuplicateTeam(team.clone()));
        }
    }
    Ok(())
}

/// Unbiased in-place Fisher-Yates shuffle.
pub fn shuffle<T, R: Rng + ?Sized>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = rng.gen_range(0..=i);
        items.swap(i, j);
    }
}

/// The team revealed at `index` of `permutation` and its group.
pub fn step_at(permutation: &[String], index: usize) -> Option<DrawStep> {
    permutation.get(index).map(|team| DrawStep {
        index,
        team: team.clone(),
        group: Group::for_index(index),
    })
}

/// Run a whole draw without pacing.
pub fn run_draw<R: Rng + ?Sized>(teams: Vec<String>, rng: &mut R) -> Result<DrawState, DrawError> {
    let mut state = DrawState::new();
    state.start(teams, rng)?;
    while state.advance().is_some() {}
    Ok(state)
}

/// Reveal the remaining steps, waiting `delay` before each one. Returning
/// `Break` from `on_step` resets the draw and stops. Returns the number of
/// steps revealed.
pub async fn reveal_all<F>(state: &mut DrawState, delay: Duration, mut on_step: F) -> usize
where
    F: FnMut(&DrawStep) -> ControlFlow<()>,
{
    let mut revealed = 0;
    while state.next_step().is_some() {
        tokio::time::sleep(delay).await;
        let Some(step) = state.advance() else {
            break;
        };
        revealed += 1;
        if on_step(&step).is_break() {
            info!("cup draw cancelled after {revealed} steps");
            state.reset();
            break;
        }
    }
    revealed
}
