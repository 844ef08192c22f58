//! Unit tests for assistgraph-cli, organized by module.
//!
//! Each submodule documents the behaviour under test.
