//! Persistent storage region in the nRF52840's internal flash.
//!
//! Backed by `sequential-storage` (key-value map), which handles wear
//! levelling and GC. The region holds a layout version under
//! [`KEY_LAYOUT_VERSION`]. A region written with another version or
//! another record format, one that is corrupted, or one that is full is
//! reported to [`crate::boot::init_storage`] so it can be erased.

use core::ops::Range;

use embedded_storage_async::nor_flash::NorFlash;
use sequential_storage::cache::NoCache;
use sequential_storage::map;

use crate::boot::PersistentStore;
use crate::config::{STORAGE_FLASH_PAGE_COUNT, STORAGE_FLASH_PAGE_START, STORAGE_LAYOUT_VERSION};
use crate::error::StoreError;

/// Flash page size for nRF52840 (4 KB).
const FLASH_PAGE_SIZE: u32 = 4096;

/// Start address of our storage region.
const STORAGE_START: u32 = STORAGE_FLASH_PAGE_START * FLASH_PAGE_SIZE;

/// End address (exclusive) of our storage region.
const STORAGE_END: u32 = (STORAGE_FLASH_PAGE_START + STORAGE_FLASH_PAGE_COUNT) * FLASH_PAGE_SIZE;

/// Key for the layout version byte.
pub const KEY_LAYOUT_VERSION: u8 = 0x00;

/// Scratch buffer for one map item.
const ITEM_BUF_SIZE: usize = 32;

/// The storage region on a NOR flash device.
pub struct FlashStore<F> {
    flash: F,
    range: Range<u32>,
}

impl<F: NorFlash> FlashStore<F> {
    /// Store over the configured flash pages.
    pub fn new(flash: F) -> Self {
        Self::with_range(flash, STORAGE_START..STORAGE_END)
    }

    pub fn with_range(flash: F, range: Range<u32>) -> Self {
        Self { flash, range }
    }
}

fn map_err<E: core::fmt::Debug>(e: sequential_storage::Error<E>) -> StoreError {
    match e {
        sequential_storage::Error::FullStorage => StoreError::NoFreePages,
        // Items this layout cannot read back: left by another firmware
        // or an older record format.
        sequential_storage::Error::Corrupted { .. }
        | sequential_storage::Error::BufferTooSmall(_)
        | sequential_storage::Error::SerializationError(_)
        | sequential_storage::Error::ItemTooBig => StoreError::NewVersionFound,
        other => {
            #[cfg(feature = "defmt")]
            ::defmt::error!("flash error: {:?}", defmt::Debug2Format(&other));
            #[cfg(not(feature = "defmt"))]
            let _ = other;
            StoreError::Io
        }
    }
}

impl<F: NorFlash> PersistentStore for FlashStore<F>
where
    F::Error: core::fmt::Debug,
{
    async fn init(&mut self) -> Result<(), StoreError> {
        let mut buf = [0u8; ITEM_BUF_SIZE];

        let stored = map::fetch_item::<u8, u8, _>(
            &mut self.flash,
            self.range.clone(),
            &mut NoCache::new(),
            &mut buf,
            &KEY_LAYOUT_VERSION,
        )
        .await
        .map_err(map_err)?;

        match stored {
            Some(version) if version == STORAGE_LAYOUT_VERSION => {
                debug!("storage layout v{}", version);
                Ok(())
            }
            Some(version) => {
                info!(
                    "storage layout v{} found, expected v{}",
                    version, STORAGE_LAYOUT_VERSION
                );
                Err(StoreError::NewVersionFound)
            }
            None => {
                info!("empty storage region, writing layout v{}", STORAGE_LAYOUT_VERSION);
                map::store_item::<u8, u8, _>(
                    &mut self.flash,
                    self.range.clone(),
                    &mut NoCache::new(),
                    &mut buf,
                    &KEY_LAYOUT_VERSION,
                    &STORAGE_LAYOUT_VERSION,
                )
                .await
                .map_err(map_err)
            }
        }
    }

    async fn erase(&mut self) -> Result<(), StoreError> {
        sequential_storage::erase_all(&mut self.flash, self.range.clone())
            .await
            .map_err(map_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boot::init_storage;
    use embassy_futures::block_on;
    use sequential_storage::mock_flash::{MockFlashBase, WriteCountCheck};

    /// Four 1 KiB pages.
    type MockFlash = MockFlashBase<4, 4, 256>;
    const RANGE: Range<u32> = 0..4096;

    fn mock_store() -> FlashStore<MockFlash> {
        FlashStore::with_range(MockFlash::new(WriteCountCheck::Twice, None, false), RANGE)
    }

    fn fetch_version(store: &mut FlashStore<MockFlash>) -> Option<u8> {
        let mut buf = [0u8; ITEM_BUF_SIZE];
        block_on(map::fetch_item::<u8, u8, _>(
            &mut store.flash,
            RANGE,
            &mut NoCache::new(),
            &mut buf,
            &KEY_LAYOUT_VERSION,
        ))
        .unwrap()
    }

    #[test]
    fn empty_region_gets_layout_version() {
        let mut store = mock_store();
        assert_eq!(block_on(store.init()), Ok(()));
        assert_eq!(fetch_version(&mut store), Some(STORAGE_LAYOUT_VERSION));
        // Second boot finds the version it wrote.
        assert_eq!(block_on(store.init()), Ok(()));
    }

    #[test]
    fn other_layout_version_is_incompatible() {
        let mut store = mock_store();
        let mut buf = [0u8; ITEM_BUF_SIZE];
        block_on(map::store_item::<u8, u8, _>(
            &mut store.flash,
            RANGE,
            &mut NoCache::new(),
            &mut buf,
            &KEY_LAYOUT_VERSION,
            &(STORAGE_LAYOUT_VERSION + 1),
        ))
        .unwrap();

        assert_eq!(block_on(store.init()), Err(StoreError::NewVersionFound));
        assert_eq!(block_on(init_storage(&mut store)), Ok(()));
        assert_eq!(fetch_version(&mut store), Some(STORAGE_LAYOUT_VERSION));
    }

    #[test]
    fn large_foreign_record_is_erased_not_fatal() {
        // A bigger record under another key, as written by an earlier
        // firmware into the same pages.
        let mut store = mock_store();
        let record = [0xA5u8; 160];
        let mut buf = [0u8; 256];
        block_on(map::store_item::<u8, &[u8], _>(
            &mut store.flash,
            RANGE,
            &mut NoCache::new(),
            &mut buf,
            &0x01,
            &&record[..],
        ))
        .unwrap();

        assert_eq!(block_on(store.init()), Err(StoreError::NewVersionFound));
        assert_eq!(block_on(init_storage(&mut store)), Ok(()));
        assert_eq!(fetch_version(&mut store), Some(STORAGE_LAYOUT_VERSION));
    }

    #[test]
    fn unreadable_items_map_to_incompatible_format() {
        type E = sequential_storage::Error<()>;
        assert_eq!(map_err(E::BufferTooSmall(164)), StoreError::NewVersionFound);
        assert_eq!(map_err(E::ItemTooBig), StoreError::NewVersionFound);
        assert_eq!(map_err(E::FullStorage), StoreError::NoFreePages);
    }
}
