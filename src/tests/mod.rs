//! Cross-module tests for the scanner generation pipeline.

mod integration_tests;
mod property_tests;
