pub mod error;
pub mod event_scheduler;
pub mod execution;
pub mod resource;
pub mod types;

#[cfg(test)]
mod tests;
