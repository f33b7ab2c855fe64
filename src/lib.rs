//! bmson-timing — canonical timing structures from bmson tempo and stop events.

pub mod chart;
pub mod config;
pub mod timing;
