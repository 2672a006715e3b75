// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// iOS platform bridge via objc2.
//
// Requires compilation with the iOS SDK (Xcode). UIKit work (image picker,
// alerts) is queued onto the main dispatch queue; the calling worker thread
// then blocks on a channel until the delegate fires.
//
// Permission prompts, APNs registration, `NWPathMonitor` updates and
// notification delivery belong to the Swift app delegate. It reports them
// through the `eximshell_ios_*` C entry points at the bottom of this file,
// which feed the shared host inbox:
//
//   eximshell_ios_permission_result(capability: UInt8, granted: Bool)
//   eximshell_ios_push_token(token: UnsafePointer<CChar>)
//   eximshell_ios_notification_received(id, title, body, dataJson: UnsafePointer<CChar>?)
//   eximshell_ios_notification_response(id, action: UnsafePointer<CChar>)
//   eximshell_ios_connectivity_changed(connected: Bool)
//
// The app delegate builds the `WKWebView` itself and reads the content view
// settings back with `eximshell_ios_content_settings(out:)` once the shell
// has mounted.
//
// Capability codes: 0 = notifications, 1 = gallery.

#![cfg(target_os = "ios")]

use std::cell::RefCell;
use std::ffi::{CStr, c_char, c_void};
use std::sync::mpsc;

use objc2::rc::Retained;
use objc2::runtime::{AnyObject, NSObject};
use objc2::{MainThreadMarker, class, define_class, msg_send};
use objc2_foundation::{NSData, NSDictionary, NSString};
use objc2_ui_kit::{
    UIApplication, UIImagePickerController, UIImagePickerControllerDelegate,
    UIImagePickerControllerSourceType, UINavigationControllerDelegate, UIViewController,
};

use eximshell_core::alerts::UserAlert;
use eximshell_core::config::WebViewSettings;
use eximshell_core::error::{Result, ShellError};
use eximshell_core::types::{
    Capability, DEFAULT_ACTION, NotificationResponse, PermissionStatus, PickedImage,
    PickerOptions, PushNotification, PushToken,
};

use crate::host::inbox;
use crate::subscription::{BackHandler, Listener, Subscription};
use crate::traits::*;

// ---------------------------------------------------------------------------
// UIKit C functions & constants
// ---------------------------------------------------------------------------

unsafe extern "C" {
    /// Cropped image, present when `allowsEditing` is on.
    static UIImagePickerControllerEditedImage: &'static NSString;
    /// Image as chosen, before editing.
    static UIImagePickerControllerOriginalImage: &'static NSString;

    /// ```c
    /// NSData * _Nullable UIImageJPEGRepresentation(UIImage *image,
    ///                                              CGFloat compressionQuality);
    /// ```
    fn UIImageJPEGRepresentation(image: *const AnyObject, compression_quality: f64)
    -> *mut AnyObject;
}

/// Opaque `struct dispatch_queue_s`.
#[repr(C)]
struct DispatchQueue {
    _private: [u8; 0],
}

unsafe extern "C" {
    /// The main queue; `dispatch_get_main_queue()` is a macro over this.
    static _dispatch_main_q: DispatchQueue;

    fn dispatch_async_f(
        queue: *const DispatchQueue,
        context: *mut c_void,
        work: extern "C" fn(*mut c_void),
    );
}

/// `UIAlertControllerStyleAlert`.
const ALERT_STYLE_ALERT: isize = 1;
/// `UIAlertActionStyleDefault`.
const ALERT_ACTION_DEFAULT: isize = 0;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Obtain the root `UIViewController` from the key window.
fn root_view_controller(mtm: MainThreadMarker) -> Result<Retained<UIViewController>> {
    let app = UIApplication::sharedApplication(mtm);

    // SAFETY: keyWindow / rootViewController are well-known UIApplication and
    // UIWindow selectors; `mtm` proves we are on the main thread.
    let root: Option<Retained<UIViewController>> = unsafe {
        let window: Option<Retained<AnyObject>> = msg_send![&app, keyWindow];
        window.and_then(|w| msg_send![&w, rootViewController])
    };

    root.ok_or_else(|| ShellError::Bridge("no root view controller available".into()))
}

/// Run `f` on the main thread, asynchronously.
fn on_main<F>(f: F)
where
    F: FnOnce(MainThreadMarker) + Send + 'static,
{
    extern "C" fn trampoline<F: FnOnce(MainThreadMarker)>(context: *mut c_void) {
        // SAFETY: `context` is the Box leaked below, handed over exactly once.
        let f = unsafe { Box::from_raw(context.cast::<F>()) };
        // SAFETY: libdispatch runs main-queue work on the main thread.
        let mtm = unsafe { MainThreadMarker::new_unchecked() };
        f(mtm);
    }

    let context = Box::into_raw(Box::new(f)).cast::<c_void>();
    // SAFETY: the main queue lives for the whole process; the trampoline
    // reclaims `context`.
    unsafe {
        dispatch_async_f(&raw const _dispatch_main_q, context, trampoline::<F>);
    }
}

/// Refuse to block the main thread waiting on a main-thread delegate.
fn require_worker_thread(operation: &str) -> Result<()> {
    if MainThreadMarker::new().is_some() {
        return Err(ShellError::Bridge(format!(
            "{operation} blocks until the user answers and must not run on the main thread"
        )));
    }
    Ok(())
}

/// Write the picked image to the temp directory and return its `file://` URI.
fn store_jpeg(bytes: &[u8]) -> Option<String> {
    let path = std::env::temp_dir().join(format!("eximshell-{}.jpg", uuid::Uuid::new_v4()));
    match std::fs::write(&path, bytes) {
        Ok(()) => Some(format!("file://{}", path.display())),
        Err(e) => {
            tracing::error!(error = %e, "iOS: failed to store picked image");
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Image picker delegate (UIImagePickerControllerDelegate)
// ---------------------------------------------------------------------------

/// What the delegate (or a failed presentation) reports back.
type PickResult = Result<Option<PickedImage>>;

struct PickerDelegateIvars {
    /// JPEG quality handed to `UIImageJPEGRepresentation`.
    quality: f64,
    /// Taken on first callback to prevent double-sends.
    sender: RefCell<Option<mpsc::Sender<PickResult>>>,
}

thread_local! {
    /// UIImagePickerController holds its delegate weakly; keep ours alive on
    /// the main thread until a callback fires.
    static ACTIVE_DELEGATE: RefCell<Option<Retained<PickerDelegate>>> = const { RefCell::new(None) };
}

// SAFETY: PickerDelegate is an NSObject subclass; MainThreadOnly matches
// UIKit's guarantee that picker delegate callbacks fire on the main thread.
define_class! {
    #[unsafe(super(NSObject))]
    #[thread_kind = MainThreadOnly]
    #[name = "EximshellPickerDelegate"]
    #[ivars = PickerDelegateIvars]
    struct PickerDelegate;

    unsafe impl UIImagePickerControllerDelegate for PickerDelegate {
        #[unsafe(method(imagePickerController:didFinishPickingMediaWithInfo:))]
        fn did_finish(
            &self,
            picker: &UIImagePickerController,
            info: &NSDictionary<NSString, AnyObject>,
        ) {
            // SAFETY: objectForKey with UIKit's info-key statics; nil when the
            // key is absent.
            let image = unsafe {
                info.objectForKey(UIImagePickerControllerEditedImage)
                    .or_else(|| info.objectForKey(UIImagePickerControllerOriginalImage))
            };

            let picked = image.and_then(|ui_image: Retained<AnyObject>| {
                // SAFETY: UIKit C function; returns autoreleased NSData or nil.
                let raw = unsafe {
                    UIImageJPEGRepresentation(&*ui_image as *const AnyObject, self.ivars().quality)
                };
                if raw.is_null() {
                    return None;
                }
                // SAFETY: non-null result is an NSData*; bytes are copied out
                // before the autorelease pool drains.
                let data: &NSData = unsafe { &*(raw as *const NSData) };
                store_jpeg(&data.to_vec())
            })
            .map(|uri| PickedImage { uri });

            self.finish(picker, picked);
        }

        #[unsafe(method(imagePickerControllerDidCancel:))]
        fn did_cancel(&self, picker: &UIImagePickerController) {
            self.finish(picker, None);
        }
    }

    // UIImagePickerController requires its delegate to also conform to
    // UINavigationControllerDelegate.
    unsafe impl UINavigationControllerDelegate for PickerDelegate {}
}

impl PickerDelegate {
    fn new(
        mtm: MainThreadMarker,
        quality: f64,
        tx: mpsc::Sender<PickResult>,
    ) -> Retained<Self> {
        let this = mtm.alloc::<Self>();
        let this = this.set_ivars(PickerDelegateIvars {
            quality,
            sender: RefCell::new(Some(tx)),
        });
        // SAFETY: standard NSObject init via super.
        unsafe { msg_send![super(this), init] }
    }

    fn finish(&self, picker: &UIImagePickerController, picked: Option<PickedImage>) {
        // SAFETY: dismissViewControllerAnimated:completion: on the main thread.
        unsafe {
            let _: () = msg_send![
                picker,
                dismissViewControllerAnimated: true,
                completion: std::ptr::null::<c_void>()
            ];
        }
        if let Some(tx) = self.ivars().sender.borrow_mut().take() {
            let _ = tx.send(Ok(picked));
        }
        ACTIVE_DELEGATE.with(|slot| slot.borrow_mut().take());
    }
}

/// Build and present the picker. Runs on the main thread.
fn present_picker(
    mtm: MainThreadMarker,
    options: &PickerOptions,
    tx: mpsc::Sender<PickResult>,
) -> Result<()> {
    let source = UIImagePickerControllerSourceType::PhotoLibrary;
    if !UIImagePickerController::isSourceTypeAvailable(source, mtm) {
        return Err(ShellError::Bridge("photo library source is unavailable".into()));
    }

    let picker = UIImagePickerController::new(mtm);
    let delegate = PickerDelegate::new(mtm, f64::from(options.quality.clamp(0.0, 1.0)), tx);

    // SAFETY: property setters on a freshly created picker; PickerDelegate
    // conforms to both delegate protocols and is an NSObject subclass, so the
    // AnyObject cast keeps the same pointer representation.
    unsafe {
        picker.setSourceType(source);
        picker.setAllowsEditing(options.allows_editing);
        let delegate_obj: &AnyObject = &*((&*delegate) as *const PickerDelegate as *const AnyObject);
        picker.setDelegate(Some(delegate_obj));
    }
    ACTIVE_DELEGATE.with(|slot| *slot.borrow_mut() = Some(delegate));

    let root_vc = root_view_controller(mtm)?;
    // SAFETY: presentViewController on the main thread.
    unsafe {
        root_vc.presentViewController_animated_completion(&picker, true, None);
    }
    Ok(())
}

/// Present a `UIAlertController` with one OK button. Runs on the main thread.
fn present_alert(mtm: MainThreadMarker, alert: &UserAlert) -> Result<()> {
    let title = NSString::from_str(&alert.title);
    let message = NSString::from_str(&alert.message);
    let ok = NSString::from_str("OK");
    let root_vc = root_view_controller(mtm)?;

    // SAFETY: documented UIAlertController / UIAlertAction class constructors
    // and instance methods, all invoked on the main thread. A nil handler
    // block is permitted.
    unsafe {
        let controller: Retained<AnyObject> = msg_send![
            class!(UIAlertController),
            alertControllerWithTitle: &*title,
            message: &*message,
            preferredStyle: ALERT_STYLE_ALERT
        ];
        let action: Retained<AnyObject> = msg_send![
            class!(UIAlertAction),
            actionWithTitle: &*ok,
            style: ALERT_ACTION_DEFAULT,
            handler: std::ptr::null::<c_void>()
        ];
        let _: () = msg_send![&controller, addAction: &*action];
        let _: () = msg_send![
            &root_vc,
            presentViewController: &*controller,
            animated: true,
            completion: std::ptr::null::<c_void>()
        ];
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// IosBridge
// ---------------------------------------------------------------------------

/// Concrete iOS platform bridge.
pub struct IosBridge;

impl IosBridge {
    /// Create a new iOS bridge instance.
    pub fn new() -> Self {
        Self
    }
}

impl Default for IosBridge {
    fn default() -> Self {
        Self::new()
    }
}

impl PlatformBridge for IosBridge {
    fn platform_name(&self) -> &str {
        "iOS"
    }
}

impl NativeConnectivity for IosBridge {
    /// Updates come from the app delegate's `NWPathMonitor`; until the first
    /// one arrives the shell keeps its fail-open "connected" default.
    fn watch_connectivity(&self, listener: Listener<bool>) -> Result<Subscription> {
        Ok(inbox().connectivity.register(listener))
    }
}

impl NativeNotifications for IosBridge {
    fn notification_permission(&self) -> Result<PermissionStatus> {
        Ok(inbox().permission(Capability::Notifications))
    }

    /// The app delegate calls `requestAuthorization` at launch; this waits
    /// for its answer if it has not arrived yet.
    fn request_notification_permission(&self) -> Result<PermissionStatus> {
        match inbox().permission(Capability::Notifications) {
            PermissionStatus::Undetermined => {
                let marker = inbox().permission_marker(Capability::Notifications);
                Ok(inbox().wait_permission_after(Capability::Notifications, marker))
            }
            status => Ok(status),
        }
    }

    fn push_token(&self) -> Result<PushToken> {
        Ok(inbox().wait_push_token())
    }

    fn on_foreground_notification(&self, listener: Listener<PushNotification>) -> Subscription {
        inbox().notifications.register(listener)
    }

    fn on_notification_response(
        &self,
        listener: Listener<NotificationResponse>,
    ) -> Subscription {
        inbox().responses.register(listener)
    }
}

impl NativeMediaPicker for IosBridge {
    /// `UIImagePickerController` runs out of process since iOS 11 and needs
    /// no photo-library authorisation; only an explicit denial reported by
    /// the host blocks it.
    fn request_gallery_permission(&self) -> Result<PermissionStatus> {
        match inbox().permission(Capability::Gallery) {
            PermissionStatus::Denied => Ok(PermissionStatus::Denied),
            _ => Ok(PermissionStatus::Granted),
        }
    }

    fn pick_image(&self, options: &PickerOptions) -> Result<Option<PickedImage>> {
        require_worker_thread("pick_image")?;
        tracing::info!(
            allows_editing = options.allows_editing,
            "iOS: presenting UIImagePickerController"
        );

        let (tx, rx) = mpsc::channel();
        let options = options.clone();
        on_main(move |mtm| {
            if let Err(e) = present_picker(mtm, &options, tx.clone()) {
                let _ = tx.send(Err(e));
            }
        });

        rx.recv()
            .map_err(|e| ShellError::Bridge(format!("picker delegate channel error: {e}")))?
    }
}

impl NativeAlert for IosBridge {
    fn show_alert(&self, alert: &UserAlert) -> Result<()> {
        if let Some(mtm) = MainThreadMarker::new() {
            return present_alert(mtm, alert);
        }
        let alert = alert.clone();
        on_main(move |mtm| {
            if let Err(e) = present_alert(mtm, &alert) {
                tracing::error!(error = %e, "iOS: alert presentation failed");
            }
        });
        Ok(())
    }
}

impl NativeBackButton for IosBridge {
    /// iOS has no hardware back button; the handler is held but never fires.
    fn on_back_pressed(&self, handler: BackHandler) -> Subscription {
        inbox().back.register(handler)
    }
}

impl NativeContentSettings for IosBridge {
    fn apply_content_settings(&self, settings: &WebViewSettings) -> Result<()> {
        inbox().set_content_settings(settings.clone());
        tracing::debug!("iOS: content settings staged for the app delegate");
        Ok(())
    }
}

/// C view of [`WebViewSettings`] for the app delegate.
///
/// `mixed_content` uses the Android constants (0 always, 1 never,
/// 2 compatibility). `WKWebView` has no such switch; App Transport Security
/// decides instead.
#[repr(C)]
pub struct EximshellContentSettings {
    pub javascript_enabled: bool,
    pub dom_storage_enabled: bool,
    pub allows_file_access: bool,
    pub allow_file_access_from_file_urls: bool,
    pub allow_universal_access_from_file_urls: bool,
    pub mixed_content: i32,
}

impl From<&WebViewSettings> for EximshellContentSettings {
    fn from(settings: &WebViewSettings) -> Self {
        Self {
            javascript_enabled: settings.javascript_enabled,
            dom_storage_enabled: settings.dom_storage_enabled,
            allows_file_access: settings.allows_file_access,
            allow_file_access_from_file_urls: settings.allow_file_access_from_file_urls,
            allow_universal_access_from_file_urls: settings.allow_universal_access_from_file_urls,
            mixed_content: settings.mixed_content.android_constant(),
        }
    }
}

// ---------------------------------------------------------------------------
// Entry points called by the Swift app delegate
// ---------------------------------------------------------------------------

/// Copy a nullable C string.
///
/// # Safety
///
/// `ptr` must be null or point to a NUL-terminated string valid for the call.
unsafe fn read_c_str(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    // SAFETY: upheld by the caller.
    Some(unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned())
}

#[unsafe(no_mangle)]
pub extern "C" fn eximshell_ios_permission_result(capability: u8, granted: bool) {
    let capability = match capability {
        0 => Capability::Notifications,
        1 => Capability::Gallery,
        other => {
            tracing::warn!(code = other, "iOS: permission result for unknown capability");
            return;
        }
    };
    inbox().report_permission(capability, granted);
}

/// # Safety
///
/// `token` must be a valid NUL-terminated string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn eximshell_ios_push_token(token: *const c_char) {
    // SAFETY: forwarded from the caller's contract.
    if let Some(token) = unsafe { read_c_str(token) } {
        inbox().report_push_token(PushToken(token));
    }
}

/// # Safety
///
/// Every pointer must be null or a valid NUL-terminated string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn eximshell_ios_notification_received(
    id: *const c_char,
    title: *const c_char,
    body: *const c_char,
    data_json: *const c_char,
) {
    // SAFETY: forwarded from the caller's contract.
    let (id, title, body, data) = unsafe {
        (read_c_str(id), read_c_str(title), read_c_str(body), read_c_str(data_json))
    };
    let data = data
        .map(|raw| serde_json::from_str(&raw).unwrap_or(serde_json::Value::String(raw)))
        .unwrap_or(serde_json::Value::Null);

    let mut notification = PushNotification::new(title, body, data);
    if let Some(id) = id {
        notification.id = id;
    }
    inbox().notifications.emit(notification);
}

/// # Safety
///
/// Both pointers must be null or valid NUL-terminated strings.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn eximshell_ios_notification_response(
    id: *const c_char,
    action: *const c_char,
) {
    // SAFETY: forwarded from the caller's contract.
    let (id, action) = unsafe { (read_c_str(id), read_c_str(action)) };
    inbox().responses.emit(NotificationResponse::new(
        id.unwrap_or_default(),
        action.unwrap_or_else(|| DEFAULT_ACTION.into()),
    ));
}

#[unsafe(no_mangle)]
pub extern "C" fn eximshell_ios_connectivity_changed(connected: bool) {
    inbox().connectivity.emit(connected);
}

/// Copy the staged content settings into `out`. Returns `false`, leaving
/// `out` untouched, before the shell has mounted.
///
/// # Safety
///
/// `out` must be null or point to writable memory for one
/// `EximshellContentSettings`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn eximshell_ios_content_settings(out: *mut EximshellContentSettings) -> bool {
    if out.is_null() {
        return false;
    }
    let Some(settings) = inbox().content_settings() else {
        return false;
    };
    // SAFETY: non-null and writable per the caller's contract.
    unsafe { out.write(EximshellContentSettings::from(&settings)) };
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Verify that the bridge reports the correct platform name.
    #[test]
    fn platform_name() {
        let bridge = IosBridge::new();
        assert_eq!(bridge.platform_name(), "iOS");
    }

    #[test]
    fn content_settings_cross_the_c_boundary() {
        let settings = WebViewSettings {
            dom_storage_enabled: false,
            ..Default::default()
        };
        IosBridge::new().apply_content_settings(&settings).unwrap();

        let mut out = std::mem::MaybeUninit::<EximshellContentSettings>::uninit();
        assert!(unsafe { eximshell_ios_content_settings(out.as_mut_ptr()) });
        let out = unsafe { out.assume_init() };
        assert!(out.javascript_enabled);
        assert!(!out.dom_storage_enabled);
        assert_eq!(out.mixed_content, 0);
    }

    // UI-presenting methods need a running app with a key window; they are
    // exercised in the Xcode test target rather than via `cargo test`.
}
