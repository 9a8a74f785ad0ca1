// src/dag/mod.rs

//! Dependency graph resolution.
//!
//! - [`graph`] turns a target task and a registry into a cycle-free
//!   execution order.

pub mod graph;

pub use graph::resolve_execution_order;
