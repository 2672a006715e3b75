// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Home page: the hosted site, or the offline placeholder.

use std::rc::Rc;

use dioxus::desktop::tao::event::{Event, WindowEvent};
use dioxus::desktop::{use_wry_event_handler, window};
use dioxus::prelude::*;

use eximshell_shell::Screen;

use crate::pages::offline::Offline;
use crate::services::app_services::AppServices;
use crate::services::page_view;
use crate::services::surface::{ContentSurface, REFRESH_BAR_HEIGHT, TOOLBAR_HEIGHT};
use crate::state::AppState;

#[component]
pub fn Home() -> Element {
    let mut state = use_context::<Signal<AppState>>();
    let svc = use_context::<AppServices>();

    let surface = use_hook({
        let svc = svc.clone();
        move || {
            Rc::new(ContentSurface::new(
                window().window.clone(),
                &state.peek().webview,
                svc.page().events(),
            ))
        }
    });

    // Mirror the controller's state into the UI signal
    let svc_watch = svc.clone();
    let _watcher = use_resource(move || {
        let svc = svc_watch.clone();
        async move {
            let mut rx = svc.shell().watch();
            while rx.changed().await.is_ok() {
                let next = *rx.borrow_and_update();
                if next.mount_epoch() != state.peek().shell.mount_epoch() {
                    svc.page().remounted();
                }
                state.write().shell = next;
            }
        }
    });

    // Pump messages between the content surface and the controller
    let svc_page = svc.clone();
    let driver_surface = surface.clone();
    let _driver = use_resource(move || {
        let svc = svc_page.clone();
        let surface = driver_surface.clone();
        async move {
            match svc.take_page_link() {
                Some(link) => page_view::drive(link, surface, svc.shell().clone()).await,
                None => tracing::debug!("page driver already running"),
            }
        }
    });

    // Mount, remount or remove the surface as the screen changes
    let screen_surface = surface.clone();
    use_effect(move || {
        let shell = state.read().shell;
        let offset = if shell.is_refreshing() {
            TOOLBAR_HEIGHT + REFRESH_BAR_HEIGHT
        } else {
            TOOLBAR_HEIGHT
        };
        match shell.screen() {
            Screen::Online { mount } => {
                if let Err(e) = screen_surface.show(mount) {
                    tracing::error!(error = %e, "content surface could not be created");
                }
            }
            Screen::Offline => screen_surface.hide(),
        }
        screen_surface.set_offset(offset);
    });

    let resize_surface = surface.clone();
    use_wry_event_handler(move |event, _| {
        if let Event::WindowEvent {
            event: WindowEvent::Resized(_) | WindowEvent::ScaleFactorChanged { .. },
            ..
        } = event
        {
            resize_surface.fit();
        }
    });

    let shell = state.read().shell;

    rsx! {
        div { class: "app-container",
            style: "display: flex; flex-direction: column; height: 100vh; font-family: system-ui, -apple-system, sans-serif;",

            // Toolbar with refresh
            div { style: "box-sizing: border-box; height: {TOOLBAR_HEIGHT}px; display: flex; justify-content: space-between; align-items: center; padding: 0 12px; border-bottom: 1px solid #e0e0e0; background: #fafafa;",
                strong { "EximBD" }
                button {
                    style: "padding: 4px 12px; border-radius: 8px; border: 1px solid #ccc; background: white;",
                    disabled: !shell.is_online() || shell.is_refreshing(),
                    onclick: {
                        let svc = svc.clone();
                        move |_| {
                            tracing::info!("refresh requested");
                            svc.shell().request_refresh();
                        }
                    },
                    "Refresh"
                }
            }

            if shell.is_refreshing() {
                div { class: "refresh-bar",
                    style: "box-sizing: border-box; height: {REFRESH_BAR_HEIGHT}px; line-height: {REFRESH_BAR_HEIGHT}px; text-align: center; font-size: 12px; color: #007aff; background: #eef5ff;",
                    "Refreshing..."
                }
            }

            {
                match shell.screen() {
                    // The content surface is laid over this area.
                    Screen::Online { .. } => rsx! {
                        div { class: "content-area", style: "flex: 1;" }
                    },
                    Screen::Offline => rsx! { Offline {} },
                }
            }
        }
    }
}
