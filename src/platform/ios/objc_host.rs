//! Objective-C implementation of [`PipHost`] on AVKit and UIKit.
//!
//! UIKit objects are only touched on the main thread; every entry point
//! checks for a [`MainThreadMarker`] and the C ABI redispatches calls that
//! arrive elsewhere.

use std::ffi::c_void;
use std::path::Path;

use objc2::encode::{Encode, Encoding};
use objc2::rc::{Allocated, Retained};
use objc2::runtime::{AnyClass, AnyObject};
use objc2::{class, define_class, msg_send, sel, MainThreadMarker, MainThreadOnly};
use objc2_foundation::{NSObject, NSString};
use once_cell::sync::OnceCell;

use crate::error::HostError;
use crate::overlay::style::Argb;
use crate::overlay::HostEvent;

use super::host::{LabelSpec, PipHost};
use super::queue::{post_host_event, MainQueueScheduler};

/// `AVAudioSessionCategoryOptionMixWithOthers`
const MIX_WITH_OTHERS: usize = 0x1;
/// `AVPlayerActionAtItemEndNone`
const ACTION_AT_ITEM_END_NONE: isize = 2;
/// `NSTextAlignmentCenter` on iOS
const TEXT_ALIGNMENT_CENTER: isize = 1;
/// `UIViewAutoresizingFlexibleWidth | UIViewAutoresizingFlexibleHeight`
const FLEXIBLE_SIZE: usize = (1 << 1) | (1 << 4);
/// `UIFontWeightMedium`
const FONT_WEIGHT_MEDIUM: f64 = 0.23;

#[repr(C)]
#[derive(Debug, Clone, Copy)]
struct CGPoint {
    x: f64,
    y: f64,
}

unsafe impl Encode for CGPoint {
    const ENCODING: Encoding = Encoding::Struct("CGPoint", &[f64::ENCODING, f64::ENCODING]);
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
struct CGSize {
    width: f64,
    height: f64,
}

unsafe impl Encode for CGSize {
    const ENCODING: Encoding = Encoding::Struct("CGSize", &[f64::ENCODING, f64::ENCODING]);
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
struct CGRect {
    origin: CGPoint,
    size: CGSize,
}

unsafe impl Encode for CGRect {
    const ENCODING: Encoding = Encoding::Struct("CGRect", &[CGPoint::ENCODING, CGSize::ENCODING]);
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
struct CMTime {
    value: i64,
    timescale: i32,
    flags: u32,
    epoch: i64,
}

unsafe impl Encode for CMTime {
    const ENCODING: Encoding = Encoding::Struct(
        "?",
        &[i64::ENCODING, i32::ENCODING, u32::ENCODING, i64::ENCODING],
    );
}

/// `kCMTimeZero`
const CM_TIME_ZERO: CMTime = CMTime {
    value: 0,
    timescale: 1,
    flags: 1,
    epoch: 0,
};

struct RootView(Retained<AnyObject>);

// SAFETY: the view is only messaged on the main thread.
unsafe impl Send for RootView {}
unsafe impl Sync for RootView {}

static ROOT_VIEW: OnceCell<RootView> = OnceCell::new();

/// Remember the Flutter root view the player layer is added to.
///
/// # Safety
/// `view` must be a valid `UIView *`.
pub(crate) unsafe fn set_root_view(view: *mut c_void) -> bool {
    match Retained::retain(view.cast::<AnyObject>()) {
        Some(view) => ROOT_VIEW.set(RootView(view)).is_ok(),
        None => false,
    }
}

fn main_thread() -> Result<MainThreadMarker, HostError> {
    MainThreadMarker::new().ok_or(HostError::Unavailable {
        what: "main thread",
    })
}

define_class!(
    // SAFETY: NSObject has no subclassing requirements; the methods below
    // are AVPictureInPictureControllerDelegate callbacks and a notification
    // target.
    #[unsafe(super(NSObject))]
    #[thread_kind = MainThreadOnly]
    #[name = "FloatingLyricPipDelegate"]
    struct PipDelegate;

    impl PipDelegate {
        #[unsafe(method(pictureInPictureControllerWillStartPictureInPicture:))]
        fn will_start(&self, _controller: &AnyObject) {
            post_host_event(&MainQueueScheduler, HostEvent::PipWillStart);
        }

        #[unsafe(method(pictureInPictureControllerDidStopPictureInPicture:))]
        fn did_stop(&self, _controller: &AnyObject) {
            post_host_event(&MainQueueScheduler, HostEvent::PipDidStop);
        }

        #[unsafe(method(pictureInPictureController:failedToStartPictureInPictureWithError:))]
        fn failed_to_start(&self, _controller: &AnyObject, error: &AnyObject) {
            let description: Retained<NSString> = unsafe { msg_send![error, localizedDescription] };
            post_host_event(
                &MainQueueScheduler,
                HostEvent::PipFailedToStart {
                    reason: description.to_string(),
                },
            );
        }

        #[unsafe(method(playerItemDidReachEnd:))]
        fn did_reach_end(&self, notification: &AnyObject) {
            let item: Option<Retained<AnyObject>> = unsafe { msg_send![notification, object] };
            if let Some(item) = item {
                unsafe {
                    let _: () = msg_send![&item, seekToTime: CM_TIME_ZERO];
                }
            }
        }
    }
);

impl PipDelegate {
    fn new(mtm: MainThreadMarker) -> Retained<Self> {
        let this = Self::alloc(mtm).set_ivars(());
        // SAFETY: NSObject's designated initializer
        unsafe { msg_send![super(this), init] }
    }
}

fn ns_string(value: &str) -> Retained<NSString> {
    NSString::from_str(value)
}

fn ui_color(color: Argb) -> Retained<AnyObject> {
    let [red, green, blue, alpha] = color.to_unit_rgba();
    unsafe {
        msg_send![
            class!(UIColor),
            colorWithRed: red,
            green: green,
            blue: blue,
            alpha: alpha
        ]
    }
}

fn medium_font(size: f32) -> Retained<AnyObject> {
    unsafe {
        msg_send![
            class!(UIFont),
            systemFontOfSize: size as f64,
            weight: FONT_WEIGHT_MEDIUM
        ]
    }
}

/// AVPlayer + AVPictureInPictureController + injected UILabel.
pub struct ObjcPipHost {
    root_view: Retained<AnyObject>,
    delegate: Retained<PipDelegate>,
    player: Option<Retained<AnyObject>>,
    player_layer: Option<Retained<AnyObject>>,
    pip: Option<Retained<AnyObject>>,
    label: Option<Retained<AnyObject>>,
}

// SAFETY: every method requires the main thread before messaging UIKit.
unsafe impl Send for ObjcPipHost {}

impl ObjcPipHost {
    /// Build a host around the view passed to `floating_lyric_init`.
    pub fn from_root_view() -> Result<Self, HostError> {
        let mtm = main_thread()?;
        let root_view = ROOT_VIEW
            .get()
            .map(|view| view.0.clone())
            .ok_or(HostError::Unavailable { what: "root view" })?;

        Ok(Self {
            root_view,
            delegate: PipDelegate::new(mtm),
            player: None,
            player_layer: None,
            pip: None,
            label: None,
        })
    }

    fn player(&self) -> Result<&Retained<AnyObject>, HostError> {
        self.player
            .as_ref()
            .ok_or(HostError::Unavailable { what: "AVPlayer" })
    }

    fn pip(&self) -> Result<&Retained<AnyObject>, HostError> {
        self.pip.as_ref().ok_or(HostError::Unavailable {
            what: "AVPictureInPictureController",
        })
    }

    fn label(&self) -> Result<&Retained<AnyObject>, HostError> {
        main_thread()?;
        self.label
            .as_ref()
            .ok_or(HostError::Unavailable { what: "PiP label" })
    }

    fn configure_audio_session() {
        unsafe {
            let session: Retained<AnyObject> = msg_send![class!(AVAudioSession), sharedInstance];
            let category = ns_string("AVAudioSessionCategoryPlayback");
            let categorized: bool = msg_send![
                &session,
                setCategory: &*category,
                withOptions: MIX_WITH_OTHERS,
                error: std::ptr::null_mut::<*mut AnyObject>()
            ];
            let activated: bool = msg_send![
                &session,
                setActive: true,
                error: std::ptr::null_mut::<*mut AnyObject>()
            ];
            if !categorized || !activated {
                tracing::warn!(categorized, activated, "[ObjcPipHost] audio session setup failed");
            }
        }
    }

    fn build_label(label: &LabelSpec) -> Retained<AnyObject> {
        unsafe {
            let view: Retained<AnyObject> = msg_send![class!(UILabel), new];
            let text = ns_string(&label.text);
            let _: () = msg_send![&view, setText: &*text];
            let _: () = msg_send![&view, setFont: &*medium_font(label.font_size)];
            let _: () = msg_send![&view, setTextColor: &*ui_color(label.text_color)];
            let _: () = msg_send![&view, setBackgroundColor: &*ui_color(label.background_color)];
            let _: () = msg_send![&view, setTextAlignment: TEXT_ALIGNMENT_CENTER];
            let _: () = msg_send![&view, setNumberOfLines: label.max_lines as isize];
            let _: () = msg_send![&view, setLineBreakMode: 4isize]; // NSLineBreakByTruncatingTail
            let _: () = msg_send![&view, setClipsToBounds: true];
            let layer: Retained<AnyObject> = msg_send![&view, layer];
            let _: () = msg_send![&layer, setCornerRadius: label.corner_radius as f64];
            view
        }
    }
}

impl PipHost for ObjcPipHost {
    fn is_pip_supported(&self) -> bool {
        let Some(cls) = AnyClass::get(c"AVPictureInPictureController") else {
            return false;
        };
        unsafe { msg_send![cls, isPictureInPictureSupported] }
    }

    fn prepare_player(&mut self, video: &Path) -> Result<(), HostError> {
        main_thread()?;
        Self::configure_audio_session();

        let path = ns_string(&video.to_string_lossy());
        unsafe {
            let url: Retained<AnyObject> = msg_send![class!(NSURL), fileURLWithPath: &*path];
            let item: Retained<AnyObject> = msg_send![class!(AVPlayerItem), playerItemWithURL: &*url];
            let player: Retained<AnyObject> =
                msg_send![class!(AVPlayer), playerWithPlayerItem: &*item];
            let _: () = msg_send![&player, setMuted: true];
            let _: () = msg_send![&player, setAllowsExternalPlayback: true];
            let _: () = msg_send![&player, setAutomaticallyWaitsToMinimizeStalling: false];
            let _: () = msg_send![&player, setActionAtItemEnd: ACTION_AT_ITEM_END_NONE];

            let center: Retained<AnyObject> = msg_send![class!(NSNotificationCenter), defaultCenter];
            let name = ns_string("AVPlayerItemDidPlayToEndTimeNotification");
            let _: () = msg_send![
                &center,
                addObserver: &*self.delegate,
                selector: sel!(playerItemDidReachEnd:),
                name: &*name,
                object: &*item
            ];

            let layer: Retained<AnyObject> =
                msg_send![class!(AVPlayerLayer), playerLayerWithPlayer: &*player];
            let frame = CGRect {
                origin: CGPoint { x: 0.0, y: 0.0 },
                size: CGSize {
                    width: 1.0,
                    height: 1.0,
                },
            };
            let _: () = msg_send![&layer, setFrame: frame];
            let _: () = msg_send![&layer, setOpacity: 0.01f32];
            let root_layer: Retained<AnyObject> = msg_send![&self.root_view, layer];
            let _: () = msg_send![&root_layer, addSublayer: &*layer];

            if self.is_pip_supported() {
                let alloc: Allocated<AnyObject> = msg_send![class!(AVPictureInPictureController), alloc];
                let pip: Option<Retained<AnyObject>> = msg_send![alloc, initWithPlayerLayer: &*layer];
                let pip = pip.ok_or(HostError::call(
                    "initWithPlayerLayer",
                    "AVPictureInPictureController init returned nil",
                ))?;
                let _: () = msg_send![&pip, setDelegate: &*self.delegate];
                let one: Retained<AnyObject> = msg_send![class!(NSNumber), numberWithInteger: 1isize];
                let key = ns_string("controlsStyle");
                let _: () = msg_send![&pip, setValue: &*one, forKey: &*key];
                self.pip = Some(pip);
            }

            self.player = Some(player);
            self.player_layer = Some(layer);
        }
        Ok(())
    }

    fn play(&mut self) -> Result<(), HostError> {
        main_thread()?;
        let player = self.player()?;
        unsafe {
            let _: () = msg_send![player, play];
        }
        Ok(())
    }

    fn pause(&mut self) -> Result<(), HostError> {
        main_thread()?;
        let player = self.player()?;
        unsafe {
            let _: () = msg_send![player, pause];
        }
        Ok(())
    }

    fn is_pip_possible(&self) -> bool {
        match &self.pip {
            Some(pip) => unsafe { msg_send![pip, isPictureInPicturePossible] },
            None => false,
        }
    }

    fn start_pip(&mut self) -> Result<(), HostError> {
        main_thread()?;
        let pip = self.pip()?;
        unsafe {
            let _: () = msg_send![pip, startPictureInPicture];
        }
        Ok(())
    }

    fn stop_pip(&mut self) -> Result<(), HostError> {
        main_thread()?;
        let pip = self.pip()?;
        unsafe {
            let _: () = msg_send![pip, stopPictureInPicture];
        }
        Ok(())
    }

    fn is_pip_active(&self) -> bool {
        match &self.pip {
            Some(pip) => unsafe { msg_send![pip, isPictureInPictureActive] },
            None => false,
        }
    }

    fn inject_label(&mut self, label: &LabelSpec) -> Result<bool, HostError> {
        main_thread()?;
        unsafe {
            let app: Retained<AnyObject> = msg_send![class!(UIApplication), sharedApplication];
            let windows: Retained<AnyObject> = msg_send![&app, windows];
            let window: Option<Retained<AnyObject>> = msg_send![&windows, firstObject];
            let Some(window) = window else {
                return Ok(false);
            };

            let view = Self::build_label(label);
            let bounds: CGRect = msg_send![&window, bounds];
            let _: () = msg_send![&view, setFrame: bounds];
            let _: () = msg_send![&view, setAutoresizingMask: FLEXIBLE_SIZE];
            let _: () = msg_send![&window, addSubview: &*view];
            let _: () = msg_send![&window, bringSubviewToFront: &*view];
            self.label = Some(view);
        }
        Ok(true)
    }

    fn remove_label(&mut self) -> Result<(), HostError> {
        main_thread()?;
        if let Some(view) = self.label.take() {
            unsafe {
                let _: () = msg_send![&view, removeFromSuperview];
            }
        }
        Ok(())
    }

    fn set_label_text(&mut self, text: &str) -> Result<(), HostError> {
        let view = self.label()?;
        let text = ns_string(text);
        unsafe {
            let _: () = msg_send![view, setText: &*text];
            let _: () = msg_send![view, setNeedsLayout];
        }
        Ok(())
    }

    fn set_label_font_size(&mut self, size: f32) -> Result<(), HostError> {
        let view = self.label()?;
        unsafe {
            let _: () = msg_send![view, setFont: &*medium_font(size)];
        }
        Ok(())
    }

    fn set_label_text_color(&mut self, color: Argb) -> Result<(), HostError> {
        let view = self.label()?;
        unsafe {
            let _: () = msg_send![view, setTextColor: &*ui_color(color)];
        }
        Ok(())
    }

    fn set_label_background(&mut self, color: Argb, corner_radius: f32) -> Result<(), HostError> {
        let view = self.label()?;
        unsafe {
            let _: () = msg_send![view, setBackgroundColor: &*ui_color(color)];
            let layer: Retained<AnyObject> = msg_send![view, layer];
            let _: () = msg_send![&layer, setCornerRadius: corner_radius as f64];
        }
        Ok(())
    }
}
