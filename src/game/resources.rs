use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::Resource;

/// Counts per resource kind, indexed by `Resource::index`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceBundle {
    counts: [u32; 5],
}

impl ResourceBundle {
    pub const fn from_counts(counts: [u32; 5]) -> Self {
        Self { counts }
    }

    pub const fn zero() -> Self {
        Self { counts: [0; 5] }
    }

    pub fn single(resource: Resource, amount: u32) -> Self {
        let mut bundle = Self::zero();
        bundle.add(resource, amount);
        bundle
    }

    pub fn total(&self) -> u32 {
        self.counts.iter().sum()
    }

    pub fn get(&self, resource: Resource) -> u32 {
        self.counts[resource.index()]
    }

    pub fn set(&mut self, resource: Resource, amount: u32) {
        self.counts[resource.index()] = amount;
    }

    pub fn add(&mut self, resource: Resource, amount: u32) {
        let slot = &mut self.counts[resource.index()];
        *slot = slot.saturating_add(amount);
    }

    pub fn add_bundle(&mut self, other: &ResourceBundle) {
        for resource in Resource::ALL {
            self.add(resource, other.get(resource));
        }
    }

    pub fn subtract(&mut self, resource: Resource, amount: u32) -> Result<(), ResourceError> {
        let available = self.get(resource);
        if available < amount {
            return Err(ResourceError::InsufficientResource {
                resource,
                available,
                requested: amount,
            });
        }
        self.counts[resource.index()] -= amount;
        Ok(())
    }

    /// All-or-nothing: the bundle is untouched when any kind falls short.
    pub fn subtract_bundle(&mut self, other: &ResourceBundle) -> Result<(), ResourceError> {
        if let Some((resource, requested)) = other
            .iter()
            .find(|(resource, requested)| self.get(*resource) < *requested)
        {
            return Err(ResourceError::InsufficientResource {
                resource,
                available: self.get(resource),
                requested,
            });
        }
        for (idx, value) in other.counts.iter().enumerate() {
            self.counts[idx] -= *value;
        }
        Ok(())
    }

    pub fn can_afford(&self, cost: &ResourceBundle) -> bool {
        self.counts
            .iter()
            .zip(cost.counts.iter())
            .all(|(have, need)| have >= need)
    }

    pub fn is_empty(&self) -> bool {
        self.counts.iter().all(|&value| value == 0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Resource, u32)> + '_ {
        Resource::ALL.into_iter().zip(self.counts.iter().copied())
    }

    pub fn counts(&self) -> [u32; 5] {
        self.counts
    }

    /// Picks the card at position `index` of the hand laid out in
    /// `Resource::ALL` order, so a uniform index is a count-weighted draw.
    pub fn nth_card(&self, mut index: u32) -> Option<Resource> {
        for (resource, count) in self.iter() {
            if index < count {
                return Some(resource);
            }
            index -= count;
        }
        None
    }
}

impl fmt::Display for ResourceBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .iter()
            .filter(|(_, amount)| *amount > 0)
            .map(|(resource, amount)| format!("{amount}x{resource}"))
            .collect();
        write!(f, "{}", parts.join(", "))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResourceError {
    #[error("insufficient {resource}: have {available}, need {requested}")]
    InsufficientResource {
        resource: Resource,
        available: u32,
        requested: u32,
    },
}

pub const COST_ROAD: ResourceBundle = ResourceBundle::from_counts([1, 1, 0, 0, 0]);
pub const COST_SETTLEMENT: ResourceBundle = ResourceBundle::from_counts([1, 1, 1, 1, 0]);
pub const COST_CITY: ResourceBundle = ResourceBundle::from_counts([0, 0, 0, 2, 3]);
pub const COST_DEVELOPMENT: ResourceBundle = ResourceBundle::from_counts([0, 0, 1, 1, 1]);
