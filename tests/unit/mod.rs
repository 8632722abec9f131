//! Unit test harness for stepper-tracer.
//!
//! Configuration tests run against the public API only.

mod config_parsing;
mod config_validation;
