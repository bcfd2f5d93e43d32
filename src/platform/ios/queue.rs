//! Deferred delivery of host events.

use std::time::Duration;

use crate::overlay::HostEvent;

/// Schedules a [`HostEvent`] to be fed back into the router later.
///
/// The delay is what lets the PiP window materialize before the label is
/// injected.
pub trait EventScheduler: Send {
    fn schedule(&self, delay: Duration, event: HostEvent);
}

/// Feed a controller callback back into the router on a later turn.
///
/// AVKit may invoke the delegate from inside `startPictureInPicture` or
/// `stopPictureInPicture`, while the issuing command still holds the router
/// lock; delivering inline would lock it twice on the same thread.
pub fn post_host_event<S: EventScheduler + ?Sized>(scheduler: &S, event: HostEvent) {
    scheduler.schedule(Duration::ZERO, event);
}

/// Main-queue scheduler: `dispatch_after` on the main queue, then back
/// through the process-wide router.
#[cfg(target_os = "ios")]
pub struct MainQueueScheduler;

#[cfg(target_os = "ios")]
impl EventScheduler for MainQueueScheduler {
    fn schedule(&self, delay: Duration, event: HostEvent) {
        let deliver = move || {
            crate::api::handle_host_event(event);
        };
        if delay.is_zero() {
            dispatch::Queue::main().exec_async(deliver);
        } else {
            dispatch::Queue::main().exec_after(delay, deliver);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ManualScheduler;

    #[test]
    fn test_post_defers_without_delay() {
        let scheduler = ManualScheduler::new();
        post_host_event(&scheduler, HostEvent::PipDidStop);
        assert_eq!(
            scheduler.take(),
            vec![(Duration::ZERO, HostEvent::PipDidStop)]
        );
    }
}
