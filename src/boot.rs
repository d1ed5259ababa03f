//! Startup sequencing.
//!
//! Storage comes up before the Bluetooth stack. A region that is full or
//! written in an incompatible format is erased and initialised once more;
//! whatever fails after that is fatal.

use crate::error::{Error, InitStage, StoreError};
use crate::host::StackMode;

/// Persistent key-value storage used by the stack.
#[allow(async_fn_in_trait)]
pub trait PersistentStore {
    async fn init(&mut self) -> Result<(), StoreError>;
    async fn erase(&mut self) -> Result<(), StoreError>;
}

/// Bring storage up, erasing it once if its contents are unusable.
pub async fn init_storage<S: PersistentStore>(store: &mut S) -> Result<(), Error> {
    match store.init().await {
        Ok(()) => return Ok(()),
        Err(e @ (StoreError::NoFreePages | StoreError::NewVersionFound)) => {
            warn!("storage unusable ({}), erasing", e);
        }
        Err(e) => {
            error!("storage init failed: {}", e);
            return Err(InitStage::Storage.into());
        }
    }

    store.erase().await.map_err(|e| {
        error!("storage erase failed: {}", e);
        Error::from(InitStage::Storage)
    })?;
    store.init().await.map_err(|e| {
        error!("storage init after erase failed: {}", e);
        Error::from(InitStage::Storage)
    })?;
    info!("storage reinitialised");
    Ok(())
}

/// Resolve the requested radio mode against what the controller offers.
pub fn select_stack_mode(requested: StackMode, available: StackMode) -> Result<StackMode, Error> {
    let mode = requested.effective(available).ok_or_else(|| {
        error!("stack mode {} not available (radio offers {})", requested, available);
        Error::from(InitStage::Stack)
    })?;
    if mode != requested {
        warn!("requested {} stack, running {}", requested, mode);
    }
    Ok(mode)
}
