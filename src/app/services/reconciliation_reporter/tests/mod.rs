//! Tests for audit reporting
