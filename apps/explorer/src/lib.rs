//! Terminal front end for the TCP/IP model explainer.

pub mod config;
pub mod console;
pub mod views;
