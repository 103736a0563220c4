pub mod coordinator;

pub use coordinator::{Contact, FusionCoordinator, Merge};
