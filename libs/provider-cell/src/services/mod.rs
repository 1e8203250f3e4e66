pub mod availability;
pub mod directory;

pub use availability::AvailabilityResolver;
pub use directory::ProviderDirectory;
