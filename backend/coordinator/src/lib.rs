pub mod cycle;
mod illumination;
pub mod publisher;
pub mod scheduler;
pub mod store;

pub use cycle::Coordinator;
pub use publisher::{MeterInfo, StatePublisher};
pub use scheduler::PollScheduler;
pub use store::{PersistedState, StateStore};
