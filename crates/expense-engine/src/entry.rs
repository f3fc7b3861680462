//! Parsing of free-text expense entries (`"50.000, Makanan, Makan siang"`).

use serde::Serialize;
use thiserror::Error;

/// Payload POSTed to the backend. Field names are the backend's.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewEntry {
    /// Digits only
    pub nominal: String,
    pub kategori: String,
    pub keterangan: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EntryError {
    #[error("entry must be `nominal, kategori, keterangan`")]
    WrongShape,
    #[error("entry amount has no digits")]
    NotANumber,
}

/// Split on `", "` into exactly three parts and keep only the digits of the amount.
pub fn parse_entry_message(text: &str) -> Result<NewEntry, EntryError> {
    let parts: Vec<&str> = text.split(", ").collect();
    let [nominal, kategori, keterangan] = parts.as_slice() else {
        return Err(EntryError::WrongShape);
    };

    let digits: String = nominal.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return Err(EntryError::NotANumber);
    }

    Ok(NewEntry {
        nominal: digits,
        kategori: kategori.to_string(),
        keterangan: keterangan.to_string(),
    })
}
