//! End-to-end tests live under `tests/`; each test starts its own review server.
