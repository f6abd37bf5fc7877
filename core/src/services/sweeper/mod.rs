//! Background expiry sweeps for windows, attempts and session state

mod service;

pub use service::{SweepResult, Sweeper, SweeperConfig, SweeperHandle};
