//! CLI command implementations.

pub mod css;
pub mod render;
pub mod toc;
