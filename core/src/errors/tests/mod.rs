//! Unit tests for error types
