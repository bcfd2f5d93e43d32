use std::thread::JoinHandle;

use tokio::sync::broadcast::{self, error::RecvError};

use crate::overlay::OverlayEvent;

/// Forward overlay events to a platform callback on a dedicated thread
///
/// The thread owns a current-thread runtime and runs until the channel
/// closes. Lagged receivers skip the missed events and keep going.
///
/// Returns `None` when the runtime or thread cannot be created.
pub fn spawn_event_forwarder<F>(
    mut events: broadcast::Receiver<OverlayEvent>,
    callback: F,
) -> Option<JoinHandle<()>>
where
    F: Fn(OverlayEvent) + Send + 'static,
{
    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(err) => {
            tracing::error!("[Events] failed to create runtime for event forwarding: {}", err);
            return None;
        }
    };

    let spawned = std::thread::Builder::new()
        .name("overlay-events".to_string())
        .spawn(move || {
            rt.block_on(async move {
                loop {
                    match events.recv().await {
                        Ok(event) => callback(event),
                        Err(RecvError::Lagged(skipped)) => {
                            tracing::warn!(skipped, "[Events] forwarder lagged");
                        }
                        Err(RecvError::Closed) => break,
                    }
                }
            });
            tracing::debug!("[Events] forwarder finished");
        });

    match spawned {
        Ok(handle) => Some(handle),
        Err(err) => {
            tracing::error!("[Events] failed to spawn forwarder thread: {}", err);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn test_forwarder_delivers_until_closed() {
        let (tx, rx) = broadcast::channel(4);
        let (seen_tx, seen_rx) = mpsc::channel();

        let handle = spawn_event_forwarder(rx, move |event| {
            let _ = seen_tx.send(event);
        })
        .unwrap();

        tx.send(OverlayEvent::Close).unwrap();
        drop(tx);
        handle.join().unwrap();

        assert_eq!(seen_rx.try_iter().collect::<Vec<_>>(), vec![OverlayEvent::Close]);
    }
}
