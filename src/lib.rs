//! Weighted grade averages and their progression over time.
//!
//! The engine modules (`average`, `history`) are pure and never fail;
//! `import` and `report` sit at the edge and deal with files and text.

pub mod average;
pub mod history;
pub mod import;
pub mod models;
pub mod periods;
pub mod report;
