//! # Register Store
//!
//! [`ModelData`] holds the raw register words read from one device, keyed by
//! absolute register address, together with a small metadata table used to
//! remember sticky decoding decisions for that device.
//!
//! The word values are refreshed in place on every poll cycle while the
//! metadata survives across polls. The metadata table sits behind a `RefCell`,
//! so a `ModelData` can be moved to another thread but not shared between
//! threads: at most one decode pass runs against a store at a time.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};

use log::{debug, trace, warn};
use serde::{Deserialize, Serialize};

use crate::error::SunSpecError;

/// A value stored in the per-device metadata table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Flag(bool),
}

/// Returns true when `len` words starting at `start` all have a `u32` address.
pub(crate) fn fits_address_space(start: u32, len: usize) -> bool {
    u64::try_from(len).is_ok_and(|len| len <= u64::from(u32::MAX - start) + 1)
}

/// Raw register snapshot and sticky metadata for one device.
#[derive(Debug, Default)]
pub struct ModelData {
    words: BTreeMap<u32, u16>,
    metadata: RefCell<HashMap<String, MetadataValue>>,
}

impl ModelData {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store populated with `words` starting at address `start`.
    pub fn with_words(start: u32, words: &[u16]) -> Self {
        let mut data = Self::new();
        data.update_words(start, words);
        data
    }

    /// Overwrites the words starting at address `start`.
    ///
    /// Addresses outside the given range keep their previous values and the
    /// metadata table is left untouched. Words that would land past `u32::MAX`
    /// are dropped.
    pub fn update_words(&mut self, start: u32, words: &[u16]) {
        debug!("Updating {} register(s) at address {}", words.len(), start);
        if !fits_address_space(start, words.len()) {
            warn!(
                "{} register(s) at address {} run past the end of the address space",
                words.len(),
                start
            );
        }
        for (address, word) in (start..=u32::MAX).zip(words) {
            self.words.insert(address, *word);
        }
    }

    /// Number of populated registers.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Returns the word at `address`.
    pub fn word(&self, address: u32) -> Result<u16, SunSpecError> {
        self.words
            .get(&address)
            .copied()
            .ok_or(SunSpecError::OutOfRange { address, count: 1 })
    }

    /// Returns `count` consecutive words starting at `address`.
    ///
    /// Fails with [`SunSpecError::OutOfRange`] if any of them was never populated.
    pub fn words(&self, address: u32, count: u16) -> Result<Vec<u16>, SunSpecError> {
        let words = (0..u32::from(count))
            .map(|i| address.checked_add(i).and_then(|a| self.words.get(&a).copied()))
            .collect::<Option<Vec<u16>>>()
            .ok_or(SunSpecError::OutOfRange { address, count })?;
        trace!("Read {count} word(s) at {address}: {words:04X?}");
        Ok(words)
    }

    /// Returns a copy of the metadata value stored under `key`.
    pub fn metadata(&self, key: &str) -> Option<MetadataValue> {
        self.metadata.borrow().get(key).cloned()
    }

    /// Returns true if `key` holds `MetadataValue::Flag(true)`.
    pub fn metadata_flag(&self, key: &str) -> bool {
        matches!(
            self.metadata.borrow().get(key),
            Some(MetadataValue::Flag(true))
        )
    }

    /// Stores `value` under `key`, replacing any previous value.
    pub fn set_metadata(&self, key: &str, value: MetadataValue) {
        debug!("Setting metadata {key} = {value:?}");
        self.metadata.borrow_mut().insert(key.to_string(), value);
    }

    /// Returns a copy of the whole metadata table.
    pub fn metadata_snapshot(&self) -> HashMap<String, MetadataValue> {
        self.metadata.borrow().clone()
    }
}
