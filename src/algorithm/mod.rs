//! Algorithm implementations for infection surveillance
//!
//! This module contains the episode clustering pipeline and the dataset
//! profile analysis.

pub mod cluster;
pub mod profile;
