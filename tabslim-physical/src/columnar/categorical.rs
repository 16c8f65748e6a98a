//! This module defines dictionary-encoded string columns.

use crate::{
    dictionary::CategoryDictionary,
    management::bytesized::{size_inner_vec_flat, size_strings_deep, ByteSized},
};

/// Per-row category codes, stored at the narrowest width
/// that can address all categories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryCodes {
    /// Up to 2^8 categories
    U8(Vec<u8>),
    /// Up to 2^16 categories
    U16(Vec<u16>),
    /// Up to 2^32 categories
    U32(Vec<u32>),
}

impl CategoryCodes {
    /// Store the given codes at the narrowest width able to address `category_count` categories.
    #[allow(clippy::cast_possible_truncation)]
    pub fn narrow(codes: Vec<u32>, category_count: usize) -> Self {
        if category_count <= usize::from(u8::MAX) + 1 {
            CategoryCodes::U8(codes.into_iter().map(|code| code as u8).collect())
        } else if category_count <= usize::from(u16::MAX) + 1 {
            CategoryCodes::U16(codes.into_iter().map(|code| code as u16).collect())
        } else {
            CategoryCodes::U32(codes)
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        match self {
            CategoryCodes::U8(codes) => codes.len(),
            CategoryCodes::U16(codes) => codes.len(),
            CategoryCodes::U32(codes) => codes.len(),
        }
    }

    /// Whether there are no rows.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Code of the given row.
    pub fn get(&self, index: usize) -> usize {
        match self {
            CategoryCodes::U8(codes) => usize::from(codes[index]),
            CategoryCodes::U16(codes) => usize::from(codes[index]),
            CategoryCodes::U32(codes) => codes[index] as usize,
        }
    }

    /// Number of bits used per code.
    pub fn bit_width(&self) -> usize {
        match self {
            CategoryCodes::U8(_) => 8,
            CategoryCodes::U16(_) => 16,
            CategoryCodes::U32(_) => 32,
        }
    }

    /// Iterate over the codes of all rows.
    pub fn iter(&self) -> Box<dyn Iterator<Item = usize> + '_> {
        match self {
            CategoryCodes::U8(codes) => Box::new(codes.iter().map(|&code| usize::from(code))),
            CategoryCodes::U16(codes) => Box::new(codes.iter().map(|&code| usize::from(code))),
            CategoryCodes::U32(codes) => Box::new(codes.iter().map(|&code| code as usize)),
        }
    }
}

impl ByteSized for CategoryCodes {
    fn size_bytes(&self) -> u64 {
        match self {
            CategoryCodes::U8(codes) => size_inner_vec_flat(codes),
            CategoryCodes::U16(codes) => size_inner_vec_flat(codes),
            CategoryCodes::U32(codes) => size_inner_vec_flat(codes),
        }
    }
}

/// A column of strings represented as a list of distinct categories
/// and a code per row pointing into that list.
///
/// Rows without a value carry the placeholder code 0;
/// the validity bitmap of the surrounding column tells them apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoricalData {
    categories: Vec<String>,
    codes: CategoryCodes,
}

impl CategoricalData {
    /// Encode a sequence of optional strings.
    /// Categories are numbered in the order they first appear.
    pub fn encode<'a, I>(values: I) -> Self
    where
        I: IntoIterator<Item = Option<&'a str>>,
    {
        let mut dictionary = CategoryDictionary::new();
        let codes = values
            .into_iter()
            .map(|value| match value {
                Some(value) => Self::code_of(dictionary.add_str(value).value()),
                None => 0,
            })
            .collect::<Vec<u32>>();

        Self::from_dictionary(dictionary, codes)
    }

    /// Create categorical data from a dictionary and codes referring to it.
    pub fn from_dictionary(dictionary: CategoryDictionary, codes: Vec<u32>) -> Self {
        let category_count = dictionary.len();
        Self {
            categories: dictionary.into_values(),
            codes: CategoryCodes::narrow(codes, category_count),
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    pub(crate) fn code_of(id: usize) -> u32 {
        debug_assert!(id <= u32::MAX as usize);
        id as u32
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    /// Whether there are no rows.
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// The distinct values in code order.
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// The per-row codes.
    pub fn codes(&self) -> &CategoryCodes {
        &self.codes
    }

    /// The category of the given row,
    /// or `None` if the row holds a placeholder code of an empty dictionary.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.categories
            .get(self.codes.get(index))
            .map(String::as_str)
    }
}

impl ByteSized for CategoricalData {
    fn size_bytes(&self) -> u64 {
        self.codes.size_bytes() + size_strings_deep(&self.categories)
    }
}

#[cfg(test)]
mod test {
    use super::{CategoricalData, CategoryCodes};
    use crate::management::bytesized::ByteSized;
    use test_log::test;

    #[test]
    fn encode_assigns_codes_in_order() {
        let data = CategoricalData::encode([Some("b"), Some("a"), None, Some("b")]);

        assert_eq!(data.categories(), &["b".to_string(), "a".to_string()]);
        assert_eq!(data.codes(), &CategoryCodes::U8(vec![0, 1, 0, 0]));
        assert_eq!(data.get(1), Some("a"));
        assert_eq!(data.get(3), Some("b"));
    }

    #[test]
    fn codes_are_narrowed_by_category_count() {
        assert_eq!(CategoryCodes::narrow(vec![0; 4], 256).bit_width(), 8);
        assert_eq!(CategoryCodes::narrow(vec![0; 4], 257).bit_width(), 16);
        assert_eq!(CategoryCodes::narrow(vec![0; 4], 70_000).bit_width(), 32);
    }

    #[test]
    fn size_counts_codes_and_categories() {
        let data = CategoricalData::encode([Some("ab"), Some("ab"), Some("c")]);
        let expected = 3 + 2 * std::mem::size_of::<String>() as u64 + 3;

        assert_eq!(data.size_bytes(), expected);
    }

    #[test]
    fn empty_dictionary_has_no_values() {
        let data = CategoricalData::encode([None, None]);

        assert!(data.categories().is_empty());
        assert_eq!(data.get(0), None);
    }
}
