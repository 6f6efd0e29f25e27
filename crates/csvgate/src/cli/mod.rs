//! CLI module for csvgate
//!
//! Every command works on local input only: a file to classify, an event to
//! answer, or the effective configuration.

pub mod error;
pub mod output;

pub mod classify;
pub mod config;
pub mod invoke;
pub mod signatures;
