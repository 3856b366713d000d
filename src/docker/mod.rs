pub mod client;
pub mod config;
pub mod runtime;

#[cfg(test)]
pub mod fake;
