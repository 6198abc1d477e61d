//! Cross-crate property tests for the consistency engine live in `tests/`.
