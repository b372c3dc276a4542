use anyhow::anyhow;
use monthplan_core::store::KeyValueStore;
use web_sys::Storage;

/// [`KeyValueStore`] over the window's
/// `localStorage`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStorageBackend;

fn local_storage() -> Option<Storage> {
  web_sys::window().and_then(|window| {
    window
      .local_storage()
      .ok()
      .flatten()
  })
}

impl KeyValueStore for LocalStorageBackend {
  fn get(
    &self,
    key: &str
  ) -> anyhow::Result<Option<String>> {
    let Some(storage) = local_storage()
    else {
      tracing::warn!(
        "localStorage unavailable; \
         starting without saved tasks"
      );
      return Ok(None);
    };

    storage.get_item(key).map_err(|err| {
      anyhow!(
        "failed reading localStorage \
         key {key:?}: {err:?}"
      )
    })
  }

  /// Write failures are logged and
  /// otherwise ignored.
  fn set(
    &mut self,
    key: &str,
    value: &str
  ) -> anyhow::Result<()> {
    match local_storage() {
      | Some(storage) => {
        if let Err(err) =
          storage.set_item(key, value)
        {
          tracing::error!(
            key,
            error = ?err,
            "failed writing localStorage"
          );
        }
      }
      | None => {
        tracing::error!(
          key,
          "localStorage unavailable; \
           change not saved"
        );
      }
    }
    Ok(())
  }
}
