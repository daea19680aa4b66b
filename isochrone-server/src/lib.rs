//! Isochrone reachability server.
//!
//! Answers: "starting here, where can I get to within N minutes by walking
//! and riding transit?" Runs stream one snapshot per threshold as the search
//! expands, so a map can draw bands while later ones are still computing.

pub mod cache;
pub mod controller;
pub mod data;
pub mod domain;
pub mod geodesy;
pub mod render;
pub mod search;
pub mod spatial;
pub mod web;

#[cfg(test)]
mod fixtures;
