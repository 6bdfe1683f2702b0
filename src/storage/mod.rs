//! Whole-file JSON persistence.
//!
//! Every document (history, tracker state, settings) is small and is read
//! and written wholesale: reads take a shared file lock, writes go to a
//! sibling temp file under an exclusive lock and are renamed into place, so
//! the previous snapshot survives a failed write.

pub mod history;
pub mod settings;

use std::{io::ErrorKind, path::Path};

use anyhow::Result;
use fs4::tokio::AsyncFileExt;
use serde::{de::DeserializeOwned, Serialize};
use tokio::{
    fs::File,
    io::{AsyncReadExt, AsyncWriteExt},
};
use tracing::debug;

pub(crate) async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    debug!("Reading {path:?}");
    let mut file = match File::open(path).await {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    file.lock_shared()?;
    let mut contents = String::new();
    let read = file.read_to_string(&mut contents).await;
    file.unlock_async().await?;
    read?;

    Ok(Some(serde_json::from_str(&contents)?))
}

pub(crate) async fn overwrite_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    debug!("Overwriting {path:?}");
    let tmp = path.with_extension("tmp");
    match write_snapshot(&tmp, path, value).await {
        Ok(()) => Ok(()),
        Err(e) => {
            // A failed write must not leave a partial snapshot next to the
            // data.
            let _ = tokio::fs::remove_file(&tmp).await;
            Err(e)
        }
    }
}

async fn write_snapshot<T: Serialize + ?Sized>(tmp: &Path, path: &Path, value: &T) -> Result<()> {
    let mut file = File::create(tmp).await?;

    file.lock_exclusive()?;
    let write: Result<()> = async {
        file.write_all(&serde_json::to_vec_pretty(value)?).await?;
        file.flush().await?;
        Ok(())
    }
    .await;
    file.unlock_async().await?;
    write?;

    tokio::fs::rename(tmp, path).await?;
    Ok(())
}
