//! Certificate and revocation data merged across a record's time-stamps.

use crate::token::{CertificateToken, RevocationBinary};
use serde::Serialize;
use std::collections::HashSet;

/// Anything that can be de-duplicated by a stable identifier.
pub trait Identified {
    fn id(&self) -> &str;
}

impl Identified for CertificateToken {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Identified for RevocationBinary {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Ordered collection that keeps the first occurrence of each id.
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct MergedSource<T> {
    items: Vec<T>,
    #[serde(skip)]
    seen: HashSet<String>,
}

impl<T: Identified + Clone> MergedSource<T> {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            seen: HashSet::new(),
        }
    }

    /// Add `item` unless an item with the same id is already present.
    ///
    /// Returns whether it was added.
    pub fn add(&mut self, item: &T) -> bool {
        if !self.seen.insert(item.id().to_string()) {
            return false;
        }
        self.items.push(item.clone());
        true
    }

    pub fn extend<'a>(&mut self, items: impl IntoIterator<Item = &'a T>)
    where
        T: 'a,
    {
        for item in items {
            self.add(item);
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.seen.contains(id)
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn into_vec(self) -> Vec<T> {
        self.items
    }
}

impl<T: Identified + Clone> Default for MergedSource<T> {
    fn default() -> Self {
        Self::new()
    }
}
