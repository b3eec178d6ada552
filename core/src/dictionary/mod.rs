//! This module contains the concept of a DICOM data dictionary, used to
//! resolve a tag or a keyword into a data element dictionary entry.
//!
//! The standard data dictionary itself is not part of this crate:
//! see the `dicom-dictionary-std` crate for a ready-to-use
//! implementation, or provide your own by implementing [`DataDictionary`].

pub mod data_element;
pub mod stub;
pub mod uid;

pub use self::data_element::{
    DataDictionary, DataDictionaryEntry, DataDictionaryEntryBuf, DataDictionaryEntryRef,
    ParseSelectorError, TagByName, TagRange, TagRangeParseError, VirtualVr,
};
pub use self::uid::{UidDictionary, UidDictionaryEntry, UidDictionaryEntryRef, UidType};
