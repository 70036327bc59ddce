//! End-to-end tests for the Tributa Stack optimizer live in `tests/`.
//! This library target is intentionally empty.
