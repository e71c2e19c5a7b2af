//! Integration tests for the sync controller over the in-memory backend.

mod support;
