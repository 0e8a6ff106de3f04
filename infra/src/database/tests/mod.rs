mod connection_tests;
mod schema_tests;
