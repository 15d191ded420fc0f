//! sgRNA candidate design for SpCas9-style nucleases.
//!
//! A [`data_handling::SequenceWindow`] is scanned on both strands for PAM
//! sites, candidates are scored for on-target efficiency and off-target
//! burden, then ranked and exported.

pub mod analysis;
pub mod config;
pub mod data_handling;
pub mod error;
pub mod export;
pub mod helper_functions;
pub mod models;
pub mod motif_scanner;
pub mod pipeline;
pub mod prediction_tools;
pub mod validation;
