// libs/provider-cell/src/services/directory.rs
use tracing::{debug, info};
use uuid::Uuid;

use shared_utils::text::{contains_normalized, normalize};

use crate::models::{Provider, ProviderError, ProviderKind};

/// Reference data for every doctor and study room the clinic can book.
#[derive(Debug, Clone, Default)]
pub struct ProviderDirectory {
    providers: Vec<Provider>,
}

impl ProviderDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_providers(providers: Vec<Provider>) -> Result<Self, ProviderError> {
        let mut directory = Self::new();
        for provider in providers {
            directory.register(provider)?;
        }
        info!("Provider directory loaded with {} providers", directory.len());
        Ok(directory)
    }

    pub fn register(&mut self, provider: Provider) -> Result<(), ProviderError> {
        provider.validate()?;

        if self.providers.iter().any(|p| p.id == provider.id) {
            return Err(ProviderError::Duplicate(provider.id));
        }

        debug!("Registering {}", provider.schedule_summary());
        self.providers.push(provider);
        Ok(())
    }

    pub fn get(&self, provider_id: Uuid) -> Result<&Provider, ProviderError> {
        self.providers
            .iter()
            .find(|p| p.id == provider_id)
            .ok_or(ProviderError::NotFound(provider_id))
    }

    pub fn all(&self) -> &[Provider] {
        &self.providers
    }

    pub fn by_kind(&self, kind: ProviderKind) -> Vec<&Provider> {
        self.providers.iter().filter(|p| p.kind == kind).collect()
    }

    pub fn doctors(&self) -> Vec<&Provider> {
        self.by_kind(ProviderKind::Doctor)
    }

    pub fn study_rooms(&self) -> Vec<&Provider> {
        self.by_kind(ProviderKind::StudyRoom)
    }

    /// Case- and accent-insensitive substring search on the
    /// specialty/equipment tag, ordered by name. An empty query matches
    /// everything of that kind.
    pub fn search_by_specialty(&self, kind: Option<ProviderKind>, query: &str) -> Vec<&Provider> {
        let needle = normalize(query);
        debug!("Searching providers with specialty '{}' (kind {:?})", needle, kind);

        let mut matches: Vec<&Provider> = self
            .providers
            .iter()
            .filter(|p| kind.map_or(true, |k| p.kind == k))
            .filter(|p| needle.is_empty() || contains_normalized(&p.specialty, &needle))
            .collect();

        matches.sort_by(|a, b| a.name.cmp(&b.name));
        matches
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}
