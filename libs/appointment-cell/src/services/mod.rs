pub mod booking;
pub mod conflict;
pub mod draft;
pub mod lifecycle;
pub mod store;

pub use booking::BookingService;
pub use conflict::ConflictDetectionService;
pub use draft::BookingDraft;
pub use lifecycle::BookingLifecycleService;
pub use store::BookingStore;
