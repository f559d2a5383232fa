

/// Id lookup helpers shared by both collections
pub mod record_tests;
