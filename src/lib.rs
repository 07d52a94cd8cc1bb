//! Hexmarch - authoritative rules core for hex-grid tactical combat
//!
//! The server-side rules engine: damage resolution, deployment validation,
//! and the round phase machine. Transport, persistence, rendering and AI
//! live elsewhere and talk to this crate through `Game`'s command entry
//! points.

pub mod board;
pub mod core;
pub mod damage;
pub mod deployment;
pub mod game;
pub mod phase;
pub mod report;
pub mod unit;
