// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Service layer bridging the Dioxus UI to the shell controller.

pub mod app_services;
pub mod data_dir;
pub mod page_view;
pub mod surface;
