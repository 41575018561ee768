//! Tree climbing progression for the jungle level
//!
//! The lizard walks the jungle floor to the next trunk, climbs (a short
//! frozen transition), clears the canopy's quota, then climbs back down to
//! the next tree.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClimbDirection {
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ClimbPhase {
    /// Free roam on the floor among the trunks
    Ground,
    /// Transition between floor and canopy; the simulation is frozen
    Climbing { direction: ClimbDirection, elapsed_ms: f32 },
    /// Catching insects in the current tree
    Canopy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClimbState {
    pub phase: ClimbPhase,
    /// Current tree (0-based); equals the tree count once all are cleared
    pub tree: usize,
    /// Catches in the current canopy
    pub tree_caught: u32,
    /// The climb prompt shows again only after the lizard leaves the trunk
    prompt_armed: bool,
}

impl Default for ClimbState {
    fn default() -> Self {
        Self::new()
    }
}

impl ClimbState {
    pub fn new() -> Self {
        Self {
            phase: ClimbPhase::Ground,
            tree: 0,
            tree_caught: 0,
            prompt_armed: true,
        }
    }

    #[inline]
    pub fn in_canopy(&self) -> bool {
        self.phase == ClimbPhase::Canopy
    }

    #[inline]
    pub fn is_climbing(&self) -> bool {
        matches!(self.phase, ClimbPhase::Climbing { .. })
    }

    pub fn start_climb(&mut self, direction: ClimbDirection) {
        self.phase = ClimbPhase::Climbing {
            direction,
            elapsed_ms: 0.0,
        };
    }

    /// Run the climb transition; returns the direction once it completes
    pub fn advance_climb(&mut self, dt_ms: f32, duration_ms: f32) -> Option<ClimbDirection> {
        let ClimbPhase::Climbing {
            direction,
            elapsed_ms,
        } = &mut self.phase
        else {
            return None;
        };
        *elapsed_ms += dt_ms;
        if *elapsed_ms >= duration_ms {
            Some(*direction)
        } else {
            None
        }
    }

    /// Arrived in the canopy of the current tree
    pub fn enter_canopy(&mut self) {
        self.phase = ClimbPhase::Canopy;
        self.tree_caught = 0;
    }

    /// Back on the floor after a tree; true once every tree is done
    pub fn finish_tree(&mut self, tree_count: usize) -> bool {
        self.tree += 1;
        self.tree_caught = 0;
        self.phase = ClimbPhase::Ground;
        self.prompt_armed = true;
        self.tree >= tree_count
    }

    /// Whether to offer the climb prompt at this distance from the trunk.
    /// Offering disarms it until the lizard walks out of reach.
    pub fn should_prompt(&mut self, distance: f32, reach: f32) -> bool {
        if distance >= reach {
            self.prompt_armed = true;
            return false;
        }
        if self.prompt_armed {
            self.prompt_armed = false;
            return true;
        }
        false
    }
}
