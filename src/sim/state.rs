//! Round bookkeeping and the events/requests a level hands outward
//!
//! A round is frozen once it has an outcome: later catches, clock ticks or
//! strikes no longer change it.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::insect::InsectKind;
use crate::consts::{CLOCK_PERIOD_MS, TIME_BONUS_PER_SECOND};
use crate::persistence::LevelId;

/// Why a round ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndCause {
    TargetReached,
    AllTreesCleared,
    TimeUp,
    Caught,
}

impl EndCause {
    pub fn is_win(self) -> bool {
        matches!(self, EndCause::TargetReached | EndCause::AllTreesCleared)
    }
}

/// Final result of a round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundOutcome {
    pub won: bool,
    pub cause: EndCause,
    pub caught: u32,
    /// Seconds left (0 for untimed levels)
    pub time_remaining: u32,
    /// Points from insects
    pub score: u32,
    pub time_bonus: u32,
    pub total_score: u32,
    /// Beat the stored best
    pub new_best: bool,
}

/// `(time_bonus, total)`; only a win earns the time bonus
pub fn round_totals(won: bool, time_remaining: u32, score: u32) -> (u32, u32) {
    let bonus = if won {
        time_remaining.saturating_mul(TIME_BONUS_PER_SECOND)
    } else {
        0
    };
    (bonus, score.saturating_add(bonus))
}

/// Live state of one round
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundState {
    /// Seconds left, for levels with a clock
    pub time_remaining: Option<u32>,
    pub caught: u32,
    pub score: u32,
    pub win_target: u32,
    pub paused: bool,
    outcome: Option<RoundOutcome>,
    /// Time toward the next clock tick
    clock_ms: f32,
}

impl RoundState {
    pub fn new(win_target: u32, time_limit_s: Option<u32>) -> Self {
        Self {
            time_remaining: time_limit_s,
            caught: 0,
            score: 0,
            win_target,
            paused: false,
            outcome: None,
            clock_ms: 0.0,
        }
    }

    #[inline]
    pub fn is_over(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn outcome(&self) -> Option<&RoundOutcome> {
        self.outcome.as_ref()
    }

    pub fn target_reached(&self) -> bool {
        self.caught >= self.win_target
    }

    /// Credit a caught insect
    pub fn credit(&mut self, points: u32) {
        if self.is_over() {
            return;
        }
        self.caught += 1;
        self.score += points;
    }

    /// Run the round clock. Returns the new remaining seconds for every
    /// whole period that elapsed.
    pub fn advance_clock(&mut self, dt_ms: f32) -> Vec<u32> {
        let mut ticks = Vec::new();
        if self.is_over() || self.paused {
            return ticks;
        }
        let Some(remaining) = self.time_remaining.as_mut() else {
            return ticks;
        };
        self.clock_ms += dt_ms;
        while self.clock_ms >= CLOCK_PERIOD_MS && *remaining > 0 {
            self.clock_ms -= CLOCK_PERIOD_MS;
            *remaining -= 1;
            ticks.push(*remaining);
        }
        ticks
    }

    pub fn time_up(&self) -> bool {
        self.time_remaining == Some(0)
    }

    /// Totals the round would end with
    pub fn totals(&self, won: bool) -> (u32, u32) {
        round_totals(won, self.time_remaining.unwrap_or(0), self.score)
    }

    /// Freeze the round. The first outcome sticks; later calls return false.
    pub fn conclude(&mut self, cause: EndCause, new_best: bool) -> bool {
        if self.is_over() {
            return false;
        }
        let won = cause.is_win();
        let (time_bonus, total_score) = self.totals(won);
        self.outcome = Some(RoundOutcome {
            won,
            cause,
            caught: self.caught,
            time_remaining: self.time_remaining.unwrap_or(0),
            score: self.score,
            time_bonus,
            total_score,
            new_best,
        });
        true
    }
}

/// Transient things that happened during a tick, for the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LevelEvent {
    /// "+N" popup at the catch
    InsectCaught { kind: InsectKind, points: u32, pos: Vec2 },
    AttackStarted { at: Vec2 },
    AttackLanded { at: Vec2, radius: f32, hit: bool },
    TimerTick { remaining: u32 },
    /// `tree` is 0-based
    TreeCleared { tree: usize, remaining: usize },
    RoundOver(RoundOutcome),
}

/// Scene change the outer layer should perform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Navigation {
    /// Back to the map, placed beside the island just left
    WorldMap { from_level: Option<LevelId> },
    RestartLevel(LevelId),
    EnterLevel(LevelId),
}

/// `m:ss`
pub fn format_clock(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}
