//! Core game engine for the Stop! word game.
//!
//! Pure calculation lives in [`rules`] and [`scoring`]; everything else is
//! database-coupled logic operating on the shared relational state. Clients
//! poll the HTTP surface in `crate::api`, which dispatches into these
//! functions; coordination between players happens entirely through the
//! shared rows, never through in-process state.

pub mod answers;
pub mod players;
pub mod progression;
pub mod rooms;
pub mod rounds;
pub mod rules;
pub mod scoring;
pub mod voting;
