pub mod events;
pub mod policy;
pub mod role;
pub mod rules;

pub use events::AvailabilityEffect;
pub use policy::{Caller, Denied};
pub use role::{ContractStatus, PostStatus, Role};
pub use rules::DomainError;
