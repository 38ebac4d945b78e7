//! Player action state machine.
//!
//! Picks one of four actions per frame from the player's intent, drives the
//! weapon animation clip, and turns a fired round into a bullet.

pub mod state_machine;
pub mod table;

pub use state_machine::{ActionOutcome, PlayerActionStateMachine};
pub use table::{ActionSpec, ActionTable, PlayerState};
