//! Core types and helpers for apkx-mcp.
//!
//! Wraps the external decompilers, the extracted-tree search engine, and the
//! single-slot session state behind [`control::ApkxControlPlane`].

pub mod control;
pub mod engine;
pub mod manifest;
pub mod search;
pub mod session;
