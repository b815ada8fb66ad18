//! UI view modules — pure rendering functions.
//!
//! Each submodule renders one part of the page. Views read from [`AppState`]
//! and send [`UiEvent`]s on user interaction. No async, no network, no wallet
//! logic.
//!
//! [`AppState`]: crate::state::AppState
//! [`UiEvent`]: crate::events::UiEvent

pub mod banner;
pub mod gallery;
pub mod header;
pub mod list_form;
