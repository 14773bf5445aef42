//! Property Agents
//!
//! Three agent services (validation, valuation, recommendation) that compile
//! JSON requests into facts and queries of a symbolic rule language, hand
//! them to an external rule-evaluation engine, and decode the engine's
//! nested result back into typed JSON. A gateway forwards browser-facing
//! requests to the right agent and normalizes failures into one contract.
//!
//! # Design Principles
//! - Injection-free: values reach the rule language only through the typed
//!   builder in [`facts`]; no ad-hoc string interpolation.
//! - Isolated: every request evaluates in a fresh engine context; no fact
//!   or engine state is shared across requests.
//! - Total decoding: engine results decode to a typed outcome or a
//!   [`decode::DecodeError`], never a panic.

pub mod agents;
pub mod config;
pub mod decode;
pub mod engine;
pub mod error;
pub mod facts;
pub mod gateway;
