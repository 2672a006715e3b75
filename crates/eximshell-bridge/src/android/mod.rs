// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Android platform bridge via JNI.
//
// Requires the Android NDK and targets `aarch64-linux-android` or
// `armv7-linux-androideabi`.
//
// ## Architecture notes
//
// Synchronous queries (permission checks, active network, SDK level) go
// straight through JNI.
//
// Anything that needs an Activity result or a registered Java callback
// (permission prompts, the photo picker, FCM registration, the network
// callback, `OnBackPressedDispatcher`) is delegated to the host class
// `my.eximbd.shell.NativeHost`. The host calls back into the `Java_…`
// entry points at the bottom of this file, which feed the shared
// [`HostInbox`](crate::host::HostInbox).
//
// Host contract (Kotlin, all `@JvmStatic` on `NativeHost`):
//
//   fun requestPermission(activity: Activity, capability: String)
//   fun fetchPushToken(activity: Activity)
//   fun pickImage(activity: Activity, allowsEditing: Boolean, quality: Float)
//   fun showAlert(activity: Activity, title: String, message: String)
//   fun watchConnectivity(activity: Activity, enabled: Boolean)
//   fun configureWebView(activity: Activity, javaScript: Boolean, domStorage: Boolean,
//                        fileAccess: Boolean, fileUrlAccess: Boolean,
//                        universalAccess: Boolean, mixedContentMode: Int)
//
//   external fun onPermissionResult(capability: String, granted: Boolean)
//   external fun onPushToken(token: String)
//   external fun onNotificationReceived(id: String, title: String?, body: String?, dataJson: String?)
//   external fun onNotificationResponse(id: String, action: String)
//   external fun onImagePicked(uri: String?)
//   external fun onConnectivityChanged(connected: Boolean)
//   external fun onBackPressed(): Boolean

#![cfg(target_os = "android")]

use jni::objects::{JClass, JObject, JString, JValue};
use jni::sys::{JNI_FALSE, JNI_TRUE, jboolean};
use jni::JNIEnv;

use eximshell_core::alerts::UserAlert;
use eximshell_core::config::WebViewSettings;
use eximshell_core::error::{Result, ShellError};
use eximshell_core::types::{
    Capability, DEFAULT_ACTION, NotificationResponse, PermissionStatus, PickedImage, PickerOptions,
    PushNotification, PushToken,
};

use crate::host::inbox;
use crate::subscription::{BackHandler, Listener, Subscription};
use crate::traits::*;

// ---------------------------------------------------------------------------
// JNI bootstrap helpers
// ---------------------------------------------------------------------------

/// Binary name of the host glue class, loaded through the app class loader.
const HOST_CLASS: &str = "my.eximbd.shell.NativeHost";

/// `PackageManager.PERMISSION_GRANTED`.
const PERMISSION_GRANTED: i32 = 0;

/// `NetworkCapabilities.NET_CAPABILITY_INTERNET`.
const NET_CAPABILITY_INTERNET: i32 = 12;

/// Android 13 (Tiramisu) introduced runtime notification and media permissions.
const SDK_TIRAMISU: i32 = 33;

/// Convenience: map any `jni::errors::Error` into `ShellError::Bridge`.
fn jni_err(context: &str, e: jni::errors::Error) -> ShellError {
    ShellError::Bridge(format!("{context}: {e}"))
}

/// Run `f` with an attached [`JNIEnv`] and the hosting `Activity`.
///
/// The `JavaVM*` and activity `jobject` come from `ndk_context`, set by the
/// NDK glue when the native activity starts.
fn with_activity<R>(f: impl FnOnce(&mut JNIEnv<'_>, &JObject<'_>) -> Result<R>) -> Result<R> {
    let ctx = ndk_context::android_context();
    // SAFETY: `ctx.vm()` is the `JavaVM*` installed by the NDK glue and stays
    // valid for the lifetime of the process.
    let vm = unsafe { jni::JavaVM::from_raw(ctx.vm().cast()) }
        .map_err(|e| jni_err("JavaVM::from_raw", e))?;
    let mut env = vm
        .attach_current_thread()
        .map_err(|e| jni_err("attach_current_thread", e))?;

    let ptr = ctx.context();
    if ptr.is_null() {
        return Err(ShellError::Bridge(
            "Android context is null; native activity not initialised".into(),
        ));
    }
    // SAFETY: the NDK guarantees this is a valid global ref to the Activity.
    let activity = unsafe { JObject::from_raw(ptr.cast()) };
    f(&mut env, &activity)
}

/// Load the host glue class via the Activity's class loader. `FindClass`
/// from a natively attached thread only sees the system loader.
fn host_class<'a>(env: &mut JNIEnv<'a>, activity: &JObject<'_>) -> Result<JClass<'a>> {
    let loader = env
        .call_method(activity, "getClassLoader", "()Ljava/lang/ClassLoader;", &[])
        .map_err(|e| jni_err("getClassLoader", e))?
        .l()
        .map_err(|e| jni_err("getClassLoader->l", e))?;
    let name = env
        .new_string(HOST_CLASS)
        .map_err(|e| jni_err("new_string(host class)", e))?;
    let class = env
        .call_method(
            &loader,
            "loadClass",
            "(Ljava/lang/String;)Ljava/lang/Class;",
            &[JValue::Object(&name)],
        )
        .map_err(|e| jni_err("loadClass(NativeHost)", e))?
        .l()
        .map_err(|e| jni_err("loadClass->l", e))?;
    Ok(JClass::from(class))
}

/// `Build.VERSION.SDK_INT`.
fn sdk_int(env: &mut JNIEnv<'_>) -> Result<i32> {
    env.get_static_field("android/os/Build$VERSION", "SDK_INT", "I")
        .map_err(|e| jni_err("Build.VERSION.SDK_INT", e))?
        .i()
        .map_err(|e| jni_err("SDK_INT->i", e))
}

fn has_permission(env: &mut JNIEnv<'_>, activity: &JObject<'_>, permission: &str) -> Result<bool> {
    let j_perm = env
        .new_string(permission)
        .map_err(|e| jni_err("new_string(permission)", e))?;
    let result = env
        .call_method(
            activity,
            "checkSelfPermission",
            "(Ljava/lang/String;)I",
            &[JValue::Object(&j_perm)],
        )
        .map_err(|e| jni_err("checkSelfPermission", e))?
        .i()
        .map_err(|e| jni_err("checkSelfPermission->i", e))?;
    Ok(result == PERMISSION_GRANTED)
}

/// Runtime permission backing `capability`, or `None` when this SDK level
/// grants it implicitly.
fn permission_name(capability: Capability, sdk: i32) -> Option<&'static str> {
    match capability {
        Capability::Notifications if sdk >= SDK_TIRAMISU => {
            Some("android.permission.POST_NOTIFICATIONS")
        }
        Capability::Notifications => None,
        Capability::Gallery if sdk >= SDK_TIRAMISU => Some("android.permission.READ_MEDIA_IMAGES"),
        Capability::Gallery => Some("android.permission.READ_EXTERNAL_STORAGE"),
    }
}

fn capability_tag(capability: Capability) -> &'static str {
    match capability {
        Capability::Notifications => "notifications",
        Capability::Gallery => "gallery",
    }
}

fn current_permission(capability: Capability) -> Result<PermissionStatus> {
    with_activity(|env, activity| {
        let sdk = sdk_int(env)?;
        let Some(permission) = permission_name(capability, sdk) else {
            return Ok(PermissionStatus::Granted);
        };
        if has_permission(env, activity, permission)? {
            Ok(PermissionStatus::Granted)
        } else {
            // Android cannot distinguish "never asked" from "denied" without
            // a prompt; report what the host last told us.
            Ok(match inbox().permission(capability) {
                PermissionStatus::Denied => PermissionStatus::Denied,
                _ => PermissionStatus::Undetermined,
            })
        }
    })
}

/// Prompt through the host and block until it reports back.
fn prompt_permission(capability: Capability) -> Result<PermissionStatus> {
    let status = current_permission(capability)?;
    if status.is_granted() {
        return Ok(status);
    }

    let marker = inbox().permission_marker(capability);
    with_activity(|env, activity| {
        let class = host_class(env, activity)?;
        let tag = env
            .new_string(capability_tag(capability))
            .map_err(|e| jni_err("new_string(capability)", e))?;
        env.call_static_method(
            &class,
            "requestPermission",
            "(Landroid/app/Activity;Ljava/lang/String;)V",
            &[JValue::Object(activity), JValue::Object(&tag)],
        )
        .map_err(|e| jni_err("NativeHost.requestPermission", e))?;
        Ok(())
    })?;

    tracing::info!(%capability, "Android: permission prompt dispatched");
    Ok(inbox().wait_permission_after(capability, marker))
}

/// Active network with internet capability.
fn is_connected() -> Result<bool> {
    with_activity(|env, activity| {
        let service = env
            .new_string("connectivity")
            .map_err(|e| jni_err("new_string(connectivity)", e))?;
        let manager = env
            .call_method(
                activity,
                "getSystemService",
                "(Ljava/lang/String;)Ljava/lang/Object;",
                &[JValue::Object(&service)],
            )
            .map_err(|e| jni_err("getSystemService(connectivity)", e))?
            .l()
            .map_err(|e| jni_err("getSystemService->l", e))?;

        let network = env
            .call_method(&manager, "getActiveNetwork", "()Landroid/net/Network;", &[])
            .map_err(|e| jni_err("getActiveNetwork", e))?
            .l()
            .map_err(|e| jni_err("getActiveNetwork->l", e))?;
        if network.is_null() {
            return Ok(false);
        }

        let caps = env
            .call_method(
                &manager,
                "getNetworkCapabilities",
                "(Landroid/net/Network;)Landroid/net/NetworkCapabilities;",
                &[JValue::Object(&network)],
            )
            .map_err(|e| jni_err("getNetworkCapabilities", e))?
            .l()
            .map_err(|e| jni_err("getNetworkCapabilities->l", e))?;
        if caps.is_null() {
            return Ok(false);
        }

        env.call_method(&caps, "hasCapability", "(I)Z", &[JValue::Int(NET_CAPABILITY_INTERNET)])
            .map_err(|e| jni_err("hasCapability", e))?
            .z()
            .map_err(|e| jni_err("hasCapability->z", e))
    })
}

fn set_connectivity_callback(enabled: bool) -> Result<()> {
    with_activity(|env, activity| {
        let class = host_class(env, activity)?;
        env.call_static_method(
            &class,
            "watchConnectivity",
            "(Landroid/app/Activity;Z)V",
            &[JValue::Object(activity), JValue::Bool(enabled.into())],
        )
        .map_err(|e| jni_err("NativeHost.watchConnectivity", e))?;
        Ok(())
    })
}

// ---------------------------------------------------------------------------
// Bridge struct
// ---------------------------------------------------------------------------

/// Android implementation of the Eximshell platform bridge.
///
/// Zero-sized; JNI state lives on the Java side and async results in the
/// host inbox.
pub struct AndroidBridge;

impl AndroidBridge {
    /// Create a new Android bridge.
    ///
    /// This does **not** touch JNI; the first JNI call happens lazily when
    /// a trait method is invoked.
    pub fn new() -> Self {
        Self
    }
}

impl Default for AndroidBridge {
    fn default() -> Self {
        Self::new()
    }
}

impl PlatformBridge for AndroidBridge {
    fn platform_name(&self) -> &str {
        "Android"
    }
}

// ---------------------------------------------------------------------------
// NativeConnectivity: ConnectivityManager + host NetworkCallback
// ---------------------------------------------------------------------------

impl NativeConnectivity for AndroidBridge {
    fn watch_connectivity(&self, listener: Listener<bool>) -> Result<Subscription> {
        let registration = inbox().connectivity.register(listener);
        set_connectivity_callback(true)?;

        match is_connected() {
            Ok(online) => {
                inbox().connectivity.emit(online);
            }
            Err(e) => tracing::warn!(error = %e, "Android: initial reachability unknown"),
        }

        Ok(Subscription::new("connectivity", move || {
            if let Err(e) = set_connectivity_callback(false) {
                tracing::warn!(error = %e, "Android: failed to stop network callback");
            }
            registration.release();
        }))
    }
}

// ---------------------------------------------------------------------------
// NativeNotifications: POST_NOTIFICATIONS + FCM through the host
// ---------------------------------------------------------------------------

impl NativeNotifications for AndroidBridge {
    fn notification_permission(&self) -> Result<PermissionStatus> {
        current_permission(Capability::Notifications)
    }

    fn request_notification_permission(&self) -> Result<PermissionStatus> {
        prompt_permission(Capability::Notifications)
    }

    fn push_token(&self) -> Result<PushToken> {
        with_activity(|env, activity| {
            let class = host_class(env, activity)?;
            env.call_static_method(
                &class,
                "fetchPushToken",
                "(Landroid/app/Activity;)V",
                &[JValue::Object(activity)],
            )
            .map_err(|e| jni_err("NativeHost.fetchPushToken", e))?;
            Ok(())
        })?;
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

// ---------------------------------------------------------------------------
// NativeMediaPicker: Photo Picker / ACTION_PICK through the host
// ---------------------------------------------------------------------------

impl NativeMediaPicker for AndroidBridge {
    fn request_gallery_permission(&self) -> Result<PermissionStatus> {
        prompt_permission(Capability::Gallery)
    }

    fn pick_image(&self, options: &PickerOptions) -> Result<Option<PickedImage>> {
        let rx = inbox().begin_pick();
        with_activity(|env, activity| {
            let class = host_class(env, activity)?;
            env.call_static_method(
                &class,
                "pickImage",
                "(Landroid/app/Activity;ZF)V",
                &[
                    JValue::Object(activity),
                    JValue::Bool(options.allows_editing.into()),
                    JValue::Float(options.quality),
                ],
            )
            .map_err(|e| jni_err("NativeHost.pickImage", e))?;
            Ok(())
        })?;

        tracing::info!("Android: picker launched, awaiting onImagePicked");

        rx.recv()
            .map_err(|e| ShellError::Bridge(format!("picker result channel closed: {e}")))
    }
}

// ---------------------------------------------------------------------------
// NativeAlert: AlertDialog through the host
// ---------------------------------------------------------------------------

impl NativeAlert for AndroidBridge {
    fn show_alert(&self, alert: &UserAlert) -> Result<()> {
        with_activity(|env, activity| {
            let class = host_class(env, activity)?;
            let title = env
                .new_string(&alert.title)
                .map_err(|e| jni_err("new_string(title)", e))?;
            let message = env
                .new_string(&alert.message)
                .map_err(|e| jni_err("new_string(message)", e))?;
            env.call_static_method(
                &class,
                "showAlert",
                "(Landroid/app/Activity;Ljava/lang/String;Ljava/lang/String;)V",
                &[
                    JValue::Object(activity),
                    JValue::Object(&title),
                    JValue::Object(&message),
                ],
            )
            .map_err(|e| jni_err("NativeHost.showAlert", e))?;
            Ok(())
        })
    }
}

impl NativeBackButton for AndroidBridge {
    fn on_back_pressed(&self, handler: BackHandler) -> Subscription {
        inbox().back.register(handler)
    }
}

// ---------------------------------------------------------------------------
// NativeContentSettings: WebSettings through the host
// ---------------------------------------------------------------------------

impl NativeContentSettings for AndroidBridge {
    fn apply_content_settings(&self, settings: &WebViewSettings) -> Result<()> {
        with_activity(|env, activity| {
            let class = host_class(env, activity)?;
            env.call_static_method(
                &class,
                "configureWebView",
                "(Landroid/app/Activity;ZZZZZI)V",
                &[
                    JValue::Object(activity),
                    JValue::Bool(settings.javascript_enabled.into()),
                    JValue::Bool(settings.dom_storage_enabled.into()),
                    JValue::Bool(settings.allows_file_access.into()),
                    JValue::Bool(settings.allow_file_access_from_file_urls.into()),
                    JValue::Bool(settings.allow_universal_access_from_file_urls.into()),
                    JValue::Int(settings.mixed_content.android_constant()),
                ],
            )
            .map_err(|e| jni_err("NativeHost.configureWebView", e))?;
            Ok(())
        })?;
        tracing::info!(mixed_content = ?settings.mixed_content, "Android: web view configured");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Entry points called by NativeHost
// ---------------------------------------------------------------------------

fn read_string(env: &mut JNIEnv<'_>, value: &JString<'_>) -> Option<String> {
    if value.is_null() {
        return None;
    }
    match env.get_string(value) {
        Ok(s) => Some(s.into()),
        Err(e) => {
            tracing::warn!(error = %e, "Android: unreadable string from host");
            None
        }
    }
}

fn parse_capability(tag: &str) -> Option<Capability> {
    match tag {
        "notifications" => Some(Capability::Notifications),
        "gallery" => Some(Capability::Gallery),
        _ => None,
    }
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_my_eximbd_shell_NativeHost_onPermissionResult<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    capability: JString<'local>,
    granted: jboolean,
) {
    let tag = read_string(&mut env, &capability).unwrap_or_default();
    match parse_capability(&tag) {
        Some(capability) => inbox().report_permission(capability, granted == JNI_TRUE),
        None => tracing::warn!(%tag, "Android: permission result for unknown capability"),
    }
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_my_eximbd_shell_NativeHost_onPushToken<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    token: JString<'local>,
) {
    if let Some(token) = read_string(&mut env, &token) {
        inbox().report_push_token(PushToken(token));
    }
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_my_eximbd_shell_NativeHost_onNotificationReceived<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    id: JString<'local>,
    title: JString<'local>,
    body: JString<'local>,
    data_json: JString<'local>,
) {
    let data = read_string(&mut env, &data_json)
        .map(|raw| {
            serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Android: notification data is not JSON, forwarding as text");
                serde_json::Value::String(raw)
            })
        })
        .unwrap_or(serde_json::Value::Null);

    let mut notification = PushNotification::new(
        read_string(&mut env, &title),
        read_string(&mut env, &body),
        data,
    );
    if let Some(id) = read_string(&mut env, &id) {
        notification.id = id;
    }
    inbox().notifications.emit(notification);
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_my_eximbd_shell_NativeHost_onNotificationResponse<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    id: JString<'local>,
    action: JString<'local>,
) {
    let response = NotificationResponse::new(
        read_string(&mut env, &id).unwrap_or_default(),
        read_string(&mut env, &action).unwrap_or_else(|| DEFAULT_ACTION.into()),
    );
    inbox().responses.emit(response);
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_my_eximbd_shell_NativeHost_onImagePicked<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    uri: JString<'local>,
) {
    let uri = read_string(&mut env, &uri);
    inbox().report_pick(uri);
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_my_eximbd_shell_NativeHost_onConnectivityChanged<'local>(
    _env: JNIEnv<'local>,
    _class: JClass<'local>,
    connected: jboolean,
) {
    inbox().connectivity.emit(connected == JNI_TRUE);
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_my_eximbd_shell_NativeHost_onBackPressed<'local>(
    _env: JNIEnv<'local>,
    _class: JClass<'local>,
) -> jboolean {
    if inbox().back.dispatch() {
        JNI_TRUE
    } else {
        JNI_FALSE
    }
}
