//! Integration tests for Sumi-Robots
//!
//! These tests exercise whole robots.txt documents through the public API.

mod policy_tests;
mod refresh_tests;
