//! Common utilities shared between the library and the evaluation tool.

pub mod scene;
