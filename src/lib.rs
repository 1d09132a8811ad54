//! Loadout Calculator
//!
//! Crafting resource calculator for raid loadouts: totals the materials a
//! loadout needs, expands intermediate recipes on request, and checks how
//! many loadouts an inventory can cover.

pub mod afford;
pub mod aggregate;
pub mod calculator;
pub mod catalog;
pub mod config;
pub mod consolidate;
pub mod error;
pub mod loadout;
pub mod models;
pub mod sample;
pub mod tree;
