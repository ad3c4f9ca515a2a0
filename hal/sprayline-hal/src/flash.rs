//! Flash storage abstractions
//!
//! Wear-leveled key-value storage. Each key holds one opaque blob; the
//! caller owns the encoding.

/// What a stored blob holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum StorageKey {
    /// Operator settings (postcard)
    Settings = 0,
}

impl StorageKey {
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(StorageKey::Settings),
            _ => None,
        }
    }
}

/// Errors from flash storage operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FlashError {
    /// Erase, program or map bookkeeping failed
    Storage,
    NotFound,
    /// Buffer too small for the stored item
    BufferTooSmall,
}

/// Persistent key-value store
pub trait FlashStorage {
    /// Read the blob stored under `key`, returning its length
    fn read(
        &mut self,
        key: StorageKey,
        buffer: &mut [u8],
    ) -> impl core::future::Future<Output = Result<usize, FlashError>>;

    /// Replace the blob stored under `key`
    fn write(
        &mut self,
        key: StorageKey,
        data: &[u8],
    ) -> impl core::future::Future<Output = Result<(), FlashError>>;
}

#[cfg(feature = "sequential-storage")]
impl sequential_storage::map::Key for StorageKey {
    fn serialize_into(
        &self,
        buffer: &mut [u8],
    ) -> Result<usize, sequential_storage::map::SerializationError> {
        match buffer.first_mut() {
            Some(slot) => {
                *slot = self.as_u8();
                Ok(1)
            }
            None => Err(sequential_storage::map::SerializationError::BufferTooSmall),
        }
    }

    fn deserialize_from(
        buffer: &[u8],
    ) -> Result<(Self, usize), sequential_storage::map::SerializationError> {
        let byte = buffer
            .first()
            .ok_or(sequential_storage::map::SerializationError::BufferTooSmall)?;
        StorageKey::from_u8(*byte)
            .map(|key| (key, 1))
            .ok_or(sequential_storage::map::SerializationError::InvalidFormat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_byte_mapping() {
        assert_eq!(StorageKey::Settings.as_u8(), 0);
        assert_eq!(StorageKey::from_u8(0), Some(StorageKey::Settings));
        assert_eq!(StorageKey::from_u8(1), None);
        assert_eq!(StorageKey::from_u8(0xFF), None);
    }
}
