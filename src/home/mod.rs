// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Home screen sections: loading, placeholder windows and ordering.

mod loader;
mod preferences;
mod window;

pub use loader::{SectionLoader, SectionState};
pub use preferences::{DEFAULT_HIDDEN_SECTIONS, DEFAULT_SECTION_ORDER, HomePreferences};
pub use window::{
    CARD_ALPHA, CardWindow, ModuleWindow, PLACEHOLDER_ALPHA, Slot, TapAction, ephemeral_feed,
    tap_action,
};
