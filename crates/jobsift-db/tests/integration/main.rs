mod catalog_tests;
mod common;
mod run_history_tests;
