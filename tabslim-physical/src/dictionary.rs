//! This module defines the dictionary used for categorical encoding,
//! a bijection between distinct strings and consecutive integer ids.

use hashbrown::HashMap;

use crate::management::bytesized::{size_strings_deep, ByteSized};

/// Result of adding new values to a dictionary.
/// It indicates what happened and provides the id for the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddResult {
    /// Element was new and has been freshly assigned the given id.
    Fresh(usize),
    /// Element was already known and has the given id.
    Known(usize),
}

impl AddResult {
    /// Returns the id from the result, no matter whether it was a new id or not.
    pub fn value(&self) -> usize {
        match self {
            AddResult::Fresh(value) => *value,
            AddResult::Known(value) => *value,
        }
    }
}

/// Dictionary assigning ids to strings in the order they are first seen.
#[derive(Debug, Default, Clone)]
pub struct CategoryDictionary {
    values: Vec<String>,
    ids: HashMap<String, usize>,
}

impl CategoryDictionary {
    /// Construct a new and empty dictionary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Construct a dictionary from a list of distinct values;
    /// ids follow the order of the list. Repeated values keep their first id.
    pub fn from_values<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut dictionary = Self::new();
        for value in values {
            dictionary.add_str(value.as_ref());
        }
        dictionary
    }

    /// Look up the given string, adding it if it is not known yet.
    pub fn add_str(&mut self, string: &str) -> AddResult {
        if let Some(id) = self.ids.get(string) {
            return AddResult::Known(*id);
        }

        let id = self.values.len();
        self.values.push(string.to_string());
        self.ids.insert(string.to_string(), id);
        AddResult::Fresh(id)
    }

    /// Return the string with the given id, if any.
    pub fn get(&self, id: usize) -> Option<&str> {
        self.values.get(id).map(String::as_str)
    }

    /// Number of distinct strings.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the dictionary has no entries.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The stored strings in id order.
    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// Drop the lookup index and return the strings in id order.
    pub fn into_values(self) -> Vec<String> {
        self.values
    }
}

impl ByteSized for CategoryDictionary {
    fn size_bytes(&self) -> u64 {
        size_strings_deep(&self.values)
    }
}
