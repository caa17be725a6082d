#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Saarthi Net dashboard panels.
//!
//! The [`app::Dashboard`] controller ties the filter store and the fetch
//! layer to three panels:
//!
//! - [`filters_panel`]: district/period selectors and layer switches.
//! - [`map_panel`]: per-dataset `GeoJSON` layers with hover, click, and
//!   viewport fitting.
//! - [`insights_panel`]: one card per dataset with loading/error states
//!   and layer-driven emphasis.
//!
//! [`render`] turns the whole thing into styled terminal text.

pub mod app;
pub mod filters_panel;
pub mod insights_panel;
pub mod legend;
pub mod map_panel;
pub mod render;

pub use app::{Dashboard, UiEvent, UiOutcome};
pub use map_panel::{MapDataError, MapEvent, MapPanel};
