mod common;
mod version_tests;
