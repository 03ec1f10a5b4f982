//! Seating-chart layout designer: the editing engine behind the venue map.
//!
//! This crate is pure and synchronous. It owns the layout model (sections,
//! rows, seats, tables), the generators that place seats along lines, grids
//! and tables, the edit-mode state machine that turns pointer and keyboard
//! input into layout mutations, selection, hit-testing, the camera, and the
//! retained scene the host paints. Persistence lives in the host: every
//! committed edit comes back as an [`engine::Action::Persist`] carrying one
//! [`mutation::Mutation`].
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Top-level engine and testable [`engine::EngineCore`] |
//! | [`doc`] | Layout, section, row, seat and table types |
//! | [`layout`] | Seat generators, curvature, row recomputation, bulk seat moves |
//! | [`labels`] | Numeric, alphabetic and roman numbering |
//! | [`mutation`] | Partial-update requests and the shared apply logic |
//! | [`input`] | Edit modes, input event types and the gesture state machine |
//! | [`selection`] | Selected seats, rows and active section |
//! | [`hit`] | Hit-testing and box selection |
//! | [`camera`] | Pan/zoom camera and coordinate conversions |
//! | [`render`] | Scene graph with id→handle registry |
//! | [`export`] | JSON and SVG export |
//! | [`consts`] | Shared numeric constants (zoom limits, minimum sizes, etc.) |

pub mod camera;
pub mod consts;
pub mod doc;
pub mod engine;
pub mod error;
pub mod export;
pub mod hit;
pub mod input;
pub mod labels;
pub mod layout;
pub mod mutation;
pub mod render;
pub mod selection;

pub use error::DesignerError;
