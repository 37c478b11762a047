//! # Relint — Relational Pattern-Detection Task Engine
//!
//! Administers a 3×3 grid pattern-detection task and scores responses with
//! signal-detection statistics. Grids of 3-symbol strings embed (or don't) a
//! controllable spatial relation; the responder's job is to press when the
//! relation is present.
//!
//! ## Architecture
//!
//! | Concern | Module |
//! |---------|--------|
//! | Alphabets and random grids | [`alphabet`] |
//! | Pattern catalogs, insertion, interference, detection | [`relation`] |
//! | Trial and phase-batch construction | [`trial_gen`] |
//! | Trial-to-trial carryover (proactive interference) | [`carryover`] |
//! | Hit/miss/false-alarm/correct-rejection scoring | [`scoring`] |
//! | Staircase, n-back, progressive-week adaptation | [`adaptive`] |
//! | Experiment protocol tables and phase scheduling | [`scheduler`] |
//! | The event-driven session engine | [`session`] |
//! | Result export | [`export`] |
//! | Cross-session progress and badges | [`progress`] |
//! | Progress persistence | [`storage`] |
//! | Batch simulation with a synthetic responder | [`simulation`] |
//! | HTTP surface for a browser front-end | [`server`] |
//!
//! ## Event model
//!
//! The engine is single-threaded and clock-free. The presentation layer owns
//! all timing and drives the engine with exactly two events: *trial window
//! opened* ([`session::Session::request_next_trial`]) and *trial window
//! closed* ([`session::Session::report_response`]). Phase boundaries and
//! completion surface as [`session::Step`] variants, so the caller can
//! interleave instruction screens or confidence ratings wherever it wants.

pub mod adaptive;
pub mod alphabet;
pub mod carryover;
pub mod constants;
pub mod env_config;
pub mod error;
pub mod export;
pub mod progress;
pub mod relation;
pub mod scheduler;
pub mod scoring;
pub mod server;
pub mod session;
pub mod simulation;
pub mod storage;
pub mod trial_gen;
pub mod types;
