// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Eximshell: native shell around https://eximbd.com.my/
//
// Entry point. Initialises logging, the shell services and app state, and
// launches the Dioxus UI.

mod pages;
mod services;
mod state;

use dioxus::prelude::*;

use eximshell_core::ShellConfig;

use pages::home::Home;
use services::app_services::AppServices;
use services::data_dir;

fn main() {
    // Only the log filter is needed this early; AppServices loads the full
    // config again once logging is up so its warnings are visible.
    let log_filter = ShellConfig::load(&data_dir::data_dir())
        .map(|config| config.log_filter)
        .unwrap_or_else(|| ShellConfig::default().log_filter);

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter)),
        )
        .init();

    tracing::info!("Eximshell starting");

    dioxus::launch(app);
}

/// Top-level route enum.
#[derive(Debug, Clone, Routable, PartialEq)]
enum Route {
    #[route("/")]
    Home {},
}

/// Root component.
fn app() -> Element {
    let svc = use_hook(|| match AppServices::init() {
        Ok(s) => {
            tracing::info!(platform = s.platform(), "shell services initialised");
            s
        }
        Err(e) => {
            tracing::error!(error = %e, "config storage failed, running on defaults");
            AppServices::fallback()
        }
    });

    use_context_provider(|| svc.clone());
    use_context_provider(|| Signal::new(state::AppState::new(&svc)));

    // Mount the controller once; unmounting the root tears it down again.
    let svc_start = svc.clone();
    use_hook(move || svc_start.start_shell());
    let svc_stop = svc.clone();
    use_drop(move || svc_stop.shell().shutdown());

    rsx! {
        Router::<Route> {}
    }
}
