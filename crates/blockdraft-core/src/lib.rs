//! Blockdraft Core Types and Definitions
//!
//! This crate provides the foundational types shared by every Blockdraft
//! crate. It includes:
//!
//! - **Colors**: Color handling with CSS color support ([`color::Color`])
//! - **Geometry**: Basic geometric types ([`geometry`] module)
//! - **Draw**: Stroke definitions and layered SVG output ([`draw`] module)
//! - **Model**: The canonical diagram entity graph ([`model`] module)

pub mod color;
pub mod draw;
pub mod geometry;
pub mod model;
