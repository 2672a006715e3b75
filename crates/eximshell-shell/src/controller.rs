// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Shell controller: the single event loop between the platform bridge and the
// content view.
//
// Native callbacks, page messages and UI gestures all become `ShellEvent`s on
// one channel and are handled strictly one at a time. The permission prompts
// and the picker block until the user answers, so they run on blocking
// workers and post their outcome back as another event; the loop keeps
// serving everything else meanwhile.
//
// The back button is the exception: the OS needs a synchronous answer, so the
// registered handler asks the content view directly via `BackNavigator`.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};

use eximshell_bridge::{PlatformBridge, Subscription};
use eximshell_core::config::ShellConfig;
use eximshell_core::types::{NotificationResponse, PushNotification};
use eximshell_core::BridgeMessage;

use crate::content::ContentView;
use crate::event::{PickerOutcome, RegistrationOutcome, ShellEvent};
use crate::state::ShellState;
use crate::{connectivity, media, notifications};

/// Answers hardware back presses.
#[derive(Clone)]
pub struct BackNavigator {
    content: Arc<dyn ContentView>,
    state: watch::Receiver<ShellState>,
}

impl BackNavigator {
    /// `true` when the content view navigated back. `false` leaves the press
    /// to the OS; the offline placeholder has no history.
    pub fn handle(&self) -> bool {
        if !self.state.borrow().is_online() {
            return false;
        }
        let navigated = self.content.go_back();
        tracing::debug!(navigated, "back pressed");
        navigated
    }
}

/// Cheap, cloneable access to a running controller for the UI layer.
#[derive(Clone)]
pub struct ShellHandle {
    events: mpsc::UnboundedSender<ShellEvent>,
    state: watch::Receiver<ShellState>,
    back: BackNavigator,
}

impl ShellHandle {
    /// Latest published state.
    pub fn state(&self) -> ShellState {
        *self.state.borrow()
    }

    /// A receiver that wakes on every state change.
    pub fn watch(&self) -> watch::Receiver<ShellState> {
        self.state.clone()
    }

    pub fn request_refresh(&self) {
        self.send(ShellEvent::RefreshRequested);
    }

    /// The content view finished loading a document.
    pub fn content_loaded(&self) {
        self.send(ShellEvent::ContentLoaded);
    }

    /// Text the page posted through its message channel.
    pub fn content_message(&self, raw: impl Into<String>) {
        self.send(ShellEvent::ContentMessage(raw.into()));
    }

    /// Route a back gesture that did not come from the platform bridge.
    pub fn back_pressed(&self) -> bool {
        self.back.handle()
    }

    /// Ask the controller to release its listeners and stop.
    pub fn shutdown(&self) {
        self.send(ShellEvent::Teardown);
    }

    fn send(&self, event: ShellEvent) {
        let name = event.name();
        if self.events.send(event).is_err() {
            tracing::debug!(event = name, "controller gone, event dropped");
        }
    }
}

pub struct ShellController {
    bridge: Arc<dyn PlatformBridge>,
    content: Arc<dyn ContentView>,
    config: ShellConfig,
    state: watch::Sender<ShellState>,
    events_tx: mpsc::UnboundedSender<ShellEvent>,
    events_rx: mpsc::UnboundedReceiver<ShellEvent>,
    subscriptions: Vec<Subscription>,
    navigator: BackNavigator,
    picker_pending: bool,
    mounted: bool,
    stopped: bool,
}

impl ShellController {
    pub fn new(
        bridge: Arc<dyn PlatformBridge>,
        content: Arc<dyn ContentView>,
        config: ShellConfig,
    ) -> Self {
        let (state, state_rx) = watch::channel(ShellState::new());
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let navigator = BackNavigator {
            content: Arc::clone(&content),
            state: state_rx,
        };
        Self {
            bridge,
            content,
            config,
            state,
            events_tx,
            events_rx,
            subscriptions: Vec::new(),
            navigator,
            picker_pending: false,
            mounted: false,
            stopped: false,
        }
    }

    pub fn handle(&self) -> ShellHandle {
        ShellHandle {
            events: self.events_tx.clone(),
            state: self.state.subscribe(),
            back: self.navigator.clone(),
        }
    }

    pub fn state(&self) -> ShellState {
        *self.state.borrow()
    }

    /// Install every native listener and start push registration.
    ///
    /// Must run inside a tokio runtime. Mounting twice is a no-op.
    pub fn mount(&mut self) {
        if self.mounted {
            return;
        }
        tracing::info!(platform = self.bridge.platform_name(), "mounting shell");

        if let Err(e) = self.bridge.apply_content_settings(&self.config.webview) {
            tracing::warn!(error = %e, "content view settings not applied");
        }

        let tx = self.events_tx.clone();
        self.subscriptions.push(self.bridge.on_foreground_notification(Box::new(
            move |notification: PushNotification| {
                let _ = tx.send(ShellEvent::NotificationReceived(notification));
            },
        )));

        let tx = self.events_tx.clone();
        self.subscriptions.push(self.bridge.on_notification_response(Box::new(
            move |response: NotificationResponse| {
                let _ = tx.send(ShellEvent::NotificationInteraction(response));
            },
        )));

        let navigator = self.navigator.clone();
        self.subscriptions
            .push(self.bridge.on_back_pressed(Box::new(move || navigator.handle())));

        if let Some(watch) = connectivity::watch(self.bridge.as_ref(), self.events_tx.clone()) {
            self.subscriptions.push(watch);
        }

        if self.config.notifications_enabled {
            let bridge = Arc::clone(&self.bridge);
            let tx = self.events_tx.clone();
            tokio::task::spawn_blocking(move || {
                let outcome = notifications::register(bridge.as_ref());
                let _ = tx.send(ShellEvent::PushRegistration(outcome));
            });
        } else {
            tracing::info!("push notifications disabled by configuration");
        }

        self.mounted = true;
    }

    /// Wait for the next event and handle it. Returns the event name, or
    /// `None` once the controller has been torn down.
    pub async fn step(&mut self) -> Option<&'static str> {
        if self.stopped {
            return None;
        }
        // The controller holds a sender itself, so the channel never closes.
        let event = self.events_rx.recv().await?;
        let name = event.name();
        self.dispatch(event);
        Some(name)
    }

    /// Mount, then process events until teardown.
    pub async fn run(mut self) {
        self.mount();
        while self.step().await.is_some() {}
    }

    pub fn dispatch(&mut self, event: ShellEvent) {
        tracing::trace!(event = event.name(), "dispatch");
        match event {
            ShellEvent::ConnectivityChanged(online) => self.on_connectivity(online),
            ShellEvent::NotificationReceived(notification) => {
                tracing::debug!(id = %notification.id, "forwarding foreground notification");
                self.post(&notifications::forward(notification));
            }
            ShellEvent::NotificationInteraction(response) => {
                tracing::info!(
                    id = %response.notification_id,
                    action = %response.action,
                    "notification interaction"
                );
            }
            ShellEvent::ContentMessage(raw) => self.on_content_message(&raw),
            ShellEvent::ContentLoaded => {
                self.state.send_if_modified(ShellState::finish_refresh);
            }
            ShellEvent::RefreshRequested => self.on_refresh(),
            ShellEvent::PickerFinished(outcome) => self.on_picker_finished(outcome),
            ShellEvent::PushRegistration(outcome) => match outcome {
                RegistrationOutcome::Registered(token) => {
                    tracing::info!(%token, "push token obtained");
                }
                RegistrationOutcome::Denied => {
                    tracing::info!("notification permission denied for this session");
                }
                RegistrationOutcome::Unavailable(reason) => {
                    tracing::warn!(%reason, "push token unavailable");
                }
            },
            ShellEvent::Teardown => self.teardown(),
        }
    }

    /// Release every listener. The loop stops after this.
    pub fn teardown(&mut self) {
        let released = self.subscriptions.len();
        for subscription in self.subscriptions.drain(..) {
            subscription.release();
        }
        self.mounted = false;
        self.stopped = true;
        tracing::info!(released, "shell torn down");
    }

    fn on_connectivity(&mut self, online: bool) {
        if self.state.send_if_modified(|state| state.apply_connectivity(online)) {
            let state = self.state();
            tracing::info!(online, mount = state.mount_epoch(), "connectivity changed");
        }
    }

    fn on_refresh(&mut self) {
        if !self.state.send_if_modified(ShellState::begin_refresh) {
            tracing::debug!("refresh ignored");
            return;
        }
        if let Err(e) = self.content.reload() {
            tracing::warn!(error = %e, "reload failed");
            self.state.send_if_modified(ShellState::finish_refresh);
        }
    }

    fn on_content_message(&mut self, raw: &str) {
        match BridgeMessage::decode(raw) {
            Ok(BridgeMessage::RequestImageUpload) => self.start_pick(),
            Ok(BridgeMessage::Unknown(kind)) => {
                tracing::debug!(%kind, "ignoring unknown bridge message");
            }
            Ok(other) => {
                tracing::debug!(kind = other.kind(), "ignoring native-bound message type from page");
            }
            Err(e) => tracing::warn!(error = %e, "dropping malformed bridge message"),
        }
    }

    fn start_pick(&mut self) {
        if self.picker_pending {
            tracing::warn!("image pick already in progress, request ignored");
            return;
        }
        self.picker_pending = true;

        let bridge = Arc::clone(&self.bridge);
        let options = self.config.picker.clone();
        let tx = self.events_tx.clone();
        tokio::task::spawn_blocking(move || {
            let outcome = media::run(bridge.as_ref(), &options);
            let _ = tx.send(ShellEvent::PickerFinished(outcome));
        });
    }

    fn on_picker_finished(&mut self, outcome: PickerOutcome) {
        self.picker_pending = false;
        match outcome {
            PickerOutcome::Selected(image) => {
                tracing::info!(uri = %image.uri, "image selected");
                self.post(&BridgeMessage::image_upload(image.uri));
            }
            PickerOutcome::Cancelled => tracing::debug!("image selection cancelled"),
            PickerOutcome::Denied => tracing::info!("gallery permission denied"),
            PickerOutcome::Failed(reason) => tracing::warn!(%reason, "image picker failed"),
        }
    }

    fn post(&self, message: &BridgeMessage) {
        let result = message.encode().and_then(|json| self.content.post_message(&json));
        if let Err(e) = result {
            tracing::warn!(kind = message.kind(), error = %e, "could not post to content view");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use eximshell_bridge::traits::*;
    use eximshell_bridge::{BackHandler, Listener, ListenerSlot};
    use eximshell_core::alerts::UserAlert;
    use eximshell_core::config::WebViewSettings;
    use eximshell_core::error::{Result, ShellError};
    use eximshell_core::types::{PermissionStatus, PickedImage, PickerOptions, PushToken};
    use serde_json::{Value, json};

    use crate::content::NavHistory;

    struct FakeBridge {
        connectivity: ListenerSlot<dyn Fn(bool) + Send + Sync>,
        notifications: ListenerSlot<dyn Fn(PushNotification) + Send + Sync>,
        responses: ListenerSlot<dyn Fn(NotificationResponse) + Send + Sync>,
        back: ListenerSlot<dyn Fn() -> bool + Send + Sync>,
        notification_status: PermissionStatus,
        notification_answer: PermissionStatus,
        gallery_answer: PermissionStatus,
        content_settings: Mutex<Option<WebViewSettings>>,
        pick: Mutex<Option<PickedImage>>,
        permission_prompts: AtomicUsize,
        alerts: Mutex<Vec<UserAlert>>,
    }

    impl FakeBridge {
        fn new() -> Self {
            Self {
                connectivity: ListenerSlot::new("connectivity"),
                notifications: ListenerSlot::new("foreground-notification"),
                responses: ListenerSlot::new("notification-response"),
                back: ListenerSlot::new("back-button"),
                notification_status: PermissionStatus::Undetermined,
                notification_answer: PermissionStatus::Granted,
                gallery_answer: PermissionStatus::Granted,
                content_settings: Mutex::new(None),
                pick: Mutex::new(None),
                permission_prompts: AtomicUsize::new(0),
                alerts: Mutex::new(Vec::new()),
            }
        }

        fn picking(self, uri: &str) -> Self {
            *self.pick.lock().unwrap() = Some(PickedImage { uri: uri.into() });
            self
        }

        fn alerts(&self) -> Vec<UserAlert> {
            self.alerts.lock().unwrap().clone()
        }
    }

    impl PlatformBridge for FakeBridge {
        fn platform_name(&self) -> &str {
            "Fake"
        }
    }

    impl NativeConnectivity for FakeBridge {
        fn watch_connectivity(&self, listener: Listener<bool>) -> Result<Subscription> {
            Ok(self.connectivity.register(listener))
        }
    }

    impl NativeNotifications for FakeBridge {
        fn notification_permission(&self) -> Result<PermissionStatus> {
            Ok(self.notification_status)
        }

        fn request_notification_permission(&self) -> Result<PermissionStatus> {
            self.permission_prompts.fetch_add(1, Ordering::SeqCst);
            Ok(self.notification_answer)
        }

        fn push_token(&self) -> Result<PushToken> {
            Ok(PushToken("fake-token".into()))
        }

        fn on_foreground_notification(
            &self,
            listener: Listener<PushNotification>,
        ) -> Subscription {
            self.notifications.register(listener)
        }

        fn on_notification_response(
            &self,
            listener: Listener<NotificationResponse>,
        ) -> Subscription {
            self.responses.register(listener)
        }
    }

    impl NativeMediaPicker for FakeBridge {
        fn request_gallery_permission(&self) -> Result<PermissionStatus> {
            Ok(self.gallery_answer)
        }

        fn pick_image(&self, _options: &PickerOptions) -> Result<Option<PickedImage>> {
            Ok(self.pick.lock().unwrap().clone())
        }
    }

    impl NativeAlert for FakeBridge {
        fn show_alert(&self, alert: &UserAlert) -> Result<()> {
            self.alerts.lock().unwrap().push(alert.clone());
            Ok(())
        }
    }

    impl NativeBackButton for FakeBridge {
        fn on_back_pressed(&self, handler: BackHandler) -> Subscription {
            self.back.register(handler)
        }
    }

    impl NativeContentSettings for FakeBridge {
        fn apply_content_settings(&self, settings: &WebViewSettings) -> Result<()> {
            *self.content_settings.lock().unwrap() = Some(settings.clone());
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingView {
        posted: Mutex<Vec<String>>,
        history: Mutex<NavHistory>,
        reloads: AtomicUsize,
    }

    impl RecordingView {
        fn posted(&self) -> Vec<String> {
            self.posted.lock().unwrap().clone()
        }

        fn load(&self) {
            self.history.lock().unwrap().on_load();
        }
    }

    impl ContentView for RecordingView {
        fn post_message(&self, json: &str) -> Result<()> {
            self.posted.lock().unwrap().push(json.to_string());
            Ok(())
        }

        fn go_back(&self) -> bool {
            self.history.lock().unwrap().go_back()
        }

        fn reload(&self) -> Result<()> {
            self.reloads.fetch_add(1, Ordering::SeqCst);
            self.history.lock().unwrap().begin_reload();
            Ok(())
        }
    }

    fn mounted(bridge: FakeBridge) -> (Arc<FakeBridge>, Arc<RecordingView>, ShellController) {
        mounted_with(bridge, ShellConfig::default())
    }

    fn mounted_with(
        bridge: FakeBridge,
        config: ShellConfig,
    ) -> (Arc<FakeBridge>, Arc<RecordingView>, ShellController) {
        let bridge = Arc::new(bridge);
        let view = Arc::new(RecordingView::default());
        let mut controller = ShellController::new(bridge.clone(), view.clone(), config);
        controller.mount();
        (bridge, view, controller)
    }

    /// Drive the loop until an event called `name` has been handled.
    async fn step_until(controller: &mut ShellController, name: &str) {
        tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                match controller.step().await {
                    Some(handled) if handled == name => break,
                    Some(_) => {}
                    None => panic!("controller stopped before `{name}`"),
                }
            }
        })
        .await
        .unwrap_or_else(|_| panic!("`{name}` never arrived"));
    }

    #[tokio::test]
    async fn offline_placeholder_follows_latest_report() {
        let (bridge, _view, mut controller) = mounted(FakeBridge::new());
        let handle = controller.handle();

        bridge.connectivity.emit(false);
        step_until(&mut controller, "connectivity-changed").await;
        assert_eq!(handle.state().screen(), crate::Screen::Offline);

        bridge.connectivity.emit(true);
        step_until(&mut controller, "connectivity-changed").await;
        assert_eq!(handle.state().screen(), crate::Screen::Online { mount: 1 });
    }

    #[tokio::test]
    async fn foreground_notification_posts_exactly_once() {
        let (bridge, view, mut controller) = mounted(FakeBridge::new());
        let content = json!({ "orderId": 7, "status": "ready" });

        bridge
            .notifications
            .emit(PushNotification::new(Some("Order".into()), None, content.clone()));
        step_until(&mut controller, "notification-received").await;

        let posted = view.posted();
        assert_eq!(posted.len(), 1);
        let message: Value = serde_json::from_str(&posted[0]).unwrap();
        assert_eq!(message["type"], "pushNotification");
        assert_eq!(message["payload"], content);
    }

    #[tokio::test]
    async fn image_request_replies_with_selected_uri() {
        let (_bridge, view, mut controller) =
            mounted(FakeBridge::new().picking("file:///tmp/cat.jpg"));

        controller.handle().content_message(r#"{"type":"requestImageUpload"}"#);
        step_until(&mut controller, "picker-finished").await;

        assert_eq!(
            view.posted(),
            vec![r#"{"type":"imageUpload","payload":{"uri":"file:///tmp/cat.jpg"}}"#.to_string()]
        );
    }

    #[tokio::test]
    async fn cancelled_pick_posts_nothing() {
        let (bridge, view, mut controller) = mounted(FakeBridge::new());

        controller.handle().content_message(r#"{"type":"requestImageUpload"}"#);
        step_until(&mut controller, "picker-finished").await;

        assert!(view.posted().is_empty());
        assert!(bridge.alerts().is_empty());
    }

    #[tokio::test]
    async fn gallery_denial_alerts_once_and_aborts() {
        let mut fake = FakeBridge::new().picking("file:///tmp/never.jpg");
        fake.gallery_answer = PermissionStatus::Denied;
        let (bridge, view, mut controller) = mounted(fake);

        controller.handle().content_message(r#"{"type":"requestImageUpload"}"#);
        step_until(&mut controller, "picker-finished").await;

        let alerts = bridge.alerts();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].title, "Permission required");
        assert!(view.posted().is_empty());
    }

    #[tokio::test]
    async fn notification_denial_alerts_once() {
        let mut fake = FakeBridge::new();
        fake.notification_answer = PermissionStatus::Denied;
        let (bridge, _view, mut controller) = mounted(fake);

        step_until(&mut controller, "push-registration").await;

        let alerts = bridge.alerts();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].title, "Permission Denied");
        assert_eq!(bridge.permission_prompts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn granted_notifications_register_without_prompting() {
        let mut fake = FakeBridge::new();
        fake.notification_status = PermissionStatus::Granted;
        let (bridge, _view, mut controller) = mounted(fake);
        step_until(&mut controller, "push-registration").await;

        assert_eq!(
            notifications::register(bridge.as_ref()),
            RegistrationOutcome::Registered(PushToken("fake-token".into()))
        );
        assert_eq!(bridge.permission_prompts.load(Ordering::SeqCst), 0);
        assert!(bridge.alerts().is_empty());
    }

    #[tokio::test]
    async fn undetermined_permission_prompts_then_registers() {
        let (bridge, _view, mut controller) = mounted(FakeBridge::new());
        step_until(&mut controller, "push-registration").await;
        assert_eq!(bridge.permission_prompts.load(Ordering::SeqCst), 1);

        assert_eq!(
            notifications::register(bridge.as_ref()),
            RegistrationOutcome::Registered(PushToken("fake-token".into()))
        );
        assert_eq!(bridge.permission_prompts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn mount_hands_the_configured_view_settings_to_the_platform() {
        let mut config = ShellConfig::default();
        config.webview.dom_storage_enabled = false;
        let (bridge, _view, _controller) = mounted_with(FakeBridge::new(), config.clone());

        assert_eq!(
            bridge.content_settings.lock().unwrap().as_ref(),
            Some(&config.webview)
        );
    }

    #[tokio::test]
    async fn disabled_notifications_never_prompt() {
        let config = ShellConfig {
            notifications_enabled: false,
            ..ShellConfig::default()
        };
        let (bridge, _view, mut controller) = mounted_with(FakeBridge::new(), config);

        controller.handle().content_message(r#"{"type":"share"}"#);
        step_until(&mut controller, "content-message").await;
        assert_eq!(bridge.permission_prompts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unknown_and_malformed_messages_are_ignored() {
        let (bridge, view, mut controller) = mounted(FakeBridge::new());
        let handle = controller.handle();

        handle.content_message(r#"{"type":"share","payload":{"url":"x"}}"#);
        handle.content_message("not json at all");
        handle.content_message(r#"{"payload":{}}"#);
        for _ in 0..3 {
            step_until(&mut controller, "content-message").await;
        }

        assert!(view.posted().is_empty());
        assert!(bridge.alerts().is_empty());
    }

    #[tokio::test]
    async fn back_press_follows_content_history() {
        let (bridge, view, mut controller) = mounted(FakeBridge::new());

        view.load();
        assert!(!bridge.back.dispatch(), "empty history leaves the press to the OS");

        view.load();
        assert!(bridge.back.dispatch());
        assert!(!controller.handle().back_pressed());

        view.load();
        view.load();
        bridge.connectivity.emit(false);
        step_until(&mut controller, "connectivity-changed").await;
        assert!(!bridge.back.dispatch(), "offline placeholder has no history");
    }

    #[tokio::test]
    async fn refresh_indicator_waits_for_load() {
        let (_bridge, view, mut controller) = mounted(FakeBridge::new());
        let handle = controller.handle();

        handle.request_refresh();
        step_until(&mut controller, "refresh-requested").await;
        assert!(handle.state().is_refreshing());
        assert_eq!(view.reloads.load(Ordering::SeqCst), 1);

        handle.content_loaded();
        step_until(&mut controller, "content-loaded").await;
        assert!(!handle.state().is_refreshing());
    }

    #[tokio::test]
    async fn teardown_releases_every_listener() {
        let (bridge, _view, mut controller) = mounted(FakeBridge::new());
        assert!(bridge.connectivity.is_registered());
        assert!(bridge.back.is_registered());

        controller.handle().shutdown();
        step_until(&mut controller, "teardown").await;

        assert!(!bridge.connectivity.is_registered());
        assert!(!bridge.notifications.is_registered());
        assert!(!bridge.responses.is_registered());
        assert!(!bridge.back.is_registered());
        assert_eq!(controller.step().await, None);
    }

    #[tokio::test]
    async fn unavailable_connectivity_fails_open() {
        struct Blind(FakeBridge);
        // Only the connectivity method differs; delegate the rest.
        impl PlatformBridge for Blind {
            fn platform_name(&self) -> &str {
                "Blind"
            }
        }
        impl NativeConnectivity for Blind {
            fn watch_connectivity(&self, _listener: Listener<bool>) -> Result<Subscription> {
                Err(ShellError::PlatformUnavailable)
            }
        }
        impl NativeNotifications for Blind {
            fn notification_permission(&self) -> Result<PermissionStatus> {
                self.0.notification_permission()
            }
            fn request_notification_permission(&self) -> Result<PermissionStatus> {
                self.0.request_notification_permission()
            }
            fn push_token(&self) -> Result<PushToken> {
                self.0.push_token()
            }
            fn on_foreground_notification(
                &self,
                listener: Listener<PushNotification>,
            ) -> Subscription {
                self.0.on_foreground_notification(listener)
            }
            fn on_notification_response(
                &self,
                listener: Listener<NotificationResponse>,
            ) -> Subscription {
                self.0.on_notification_response(listener)
            }
        }
        impl NativeMediaPicker for Blind {
            fn request_gallery_permission(&self) -> Result<PermissionStatus> {
                self.0.request_gallery_permission()
            }
            fn pick_image(&self, options: &PickerOptions) -> Result<Option<PickedImage>> {
                self.0.pick_image(options)
            }
        }
        impl NativeAlert for Blind {
            fn show_alert(&self, alert: &UserAlert) -> Result<()> {
                self.0.show_alert(alert)
            }
        }
        impl NativeBackButton for Blind {
            fn on_back_pressed(&self, handler: BackHandler) -> Subscription {
                self.0.on_back_pressed(handler)
            }
        }
        impl NativeContentSettings for Blind {
            fn apply_content_settings(&self, settings: &WebViewSettings) -> Result<()> {
                self.0.apply_content_settings(settings)
            }
        }

        let bridge: Arc<dyn PlatformBridge> = Arc::new(Blind(FakeBridge::new()));
        let view = Arc::new(RecordingView::default());
        let mut controller = ShellController::new(bridge, view, ShellConfig::default());
        controller.mount();
        step_until(&mut controller, "push-registration").await;
        assert!(controller.state().is_online());
    }
}
