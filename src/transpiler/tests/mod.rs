//! Rendering scenarios.

mod features;
