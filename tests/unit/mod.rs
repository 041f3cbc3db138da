/// Unit tests for the public value types and helpers
mod basic_tests;
