//! Android system-overlay adapter.

pub mod host;
pub mod overlay;

#[cfg(target_os = "android")]
mod jni_exports;
#[cfg(target_os = "android")]
mod jni_host;

pub use host::{ViewSpec, WindowHost};
pub use overlay::AndroidOverlay;

#[cfg(target_os = "android")]
pub use jni_host::JniWindowHost;

use once_cell::sync::OnceCell;

/// Run `init` until it succeeds once.
///
/// A failed attempt leaves `cell` empty, so the next `nativeInit` retries.
pub fn init_once<E>(cell: &OnceCell<()>, init: impl FnOnce() -> Result<(), E>) -> Result<(), E> {
    cell.get_or_try_init(init).map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_init_can_be_retried() {
        let cell = OnceCell::new();
        assert_eq!(init_once(&cell, || Err("GetJavaVM failed")), Err("GetJavaVM failed"));
        assert!(cell.get().is_none());

        assert_eq!(init_once::<&str>(&cell, || Ok(())), Ok(()));
        let mut ran = false;
        assert_eq!(
            init_once::<&str>(&cell, || {
                ran = true;
                Ok(())
            }),
            Ok(())
        );
        assert!(!ran);
    }
}
