//! Transit route planner server.
//!
//! Answers "how do I get from this stop to that one?" over a directed
//! network of route segments, preferring fewer transfers by charging a
//! penalty whenever the route changes.

pub mod cache;
pub mod config;
pub mod domain;
pub mod network;
pub mod planner;
pub mod web;
