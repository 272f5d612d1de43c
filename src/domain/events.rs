//! Cross-entity side effects expressed as values. Contract transitions emit
//! an `AvailabilityEffect` that is applied inside the same transaction by a
//! single site (`RentalPost::apply_availability`), keeping the invariant
//! "`is_available` mirrors the absence of an active contract" in one place.

use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AvailabilityEffect {
    /// A contract became active against this post.
    Reserve(Uuid),
    /// The post's contract was terminated or deleted.
    Release(Uuid),
}

impl AvailabilityEffect {
    pub fn post_id(&self) -> Uuid {
        match self {
            AvailabilityEffect::Reserve(id) | AvailabilityEffect::Release(id) => *id,
        }
    }

    pub fn available(&self) -> bool {
        matches!(self, AvailabilityEffect::Release(_))
    }
}
