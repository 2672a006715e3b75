// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Offline placeholder shown while the connectivity monitor reports no network.

use dioxus::prelude::*;

#[component]
pub fn Offline() -> Element {
    rsx! {
        div { class: "offline",
            style: "flex: 1; display: flex; flex-direction: column; align-items: center; justify-content: center; padding: 24px; text-align: center; color: #333;",
            span { style: "font-size: 64px; color: #888; margin-bottom: 16px;", "\u{1F4F6}" }
            h2 { style: "margin: 0 0 8px;", "No Internet Connection" }
            p { style: "color: #666; font-size: 14px;", "Please check your connection and try again." }
        }
    }
}
