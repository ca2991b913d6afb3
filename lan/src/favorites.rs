//! Bounded favorites roster.

use shared::backend::FavoriteResult;
use shared::MAX_FAVORITE_SERVERS;

#[derive(Debug, Clone)]
pub struct Favorite {
    pub name: String,
    pub address: String,
}

#[derive(Debug, Default)]
pub struct FavoriteList {
    entries: Vec<Favorite>,
}

impl FavoriteList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[Favorite] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, address: &str) -> bool {
        self.entries.iter().any(|f| f.address == address)
    }

    pub fn add(&mut self, name: &str, address: &str) -> FavoriteResult {
        if self.contains(address) {
            return FavoriteResult::AlreadyPresent;
        }
        if self.entries.len() >= MAX_FAVORITE_SERVERS {
            return FavoriteResult::ListFull;
        }
        self.entries.push(Favorite {
            name: name.to_string(),
            address: address.to_string(),
        });
        FavoriteResult::Added
    }

    pub fn remove(&mut self, address: &str) {
        self.entries.retain(|f| f.address != address);
    }
}
