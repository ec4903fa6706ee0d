#![forbid(unsafe_code)]

//! Renderer-facing layer for A2UI.
//!
//! `a2ui-render` turns validated responses into widgets through an explicit
//! [`Registry`] owned by each [`Renderer`]. The widget type is generic; the
//! [`text`] module provides a plain-text outline target used by the doctor
//! CLI and by tests.
//!
//! ```
//! use a2ui_core::create_empty_response;
//! use a2ui_render::text::{OutlineGuides, outline, text_renderer};
//!
//! let renderer = text_renderer(OutlineGuides::Ascii);
//! let outcome = renderer.render(&create_empty_response());
//! assert_eq!(outline(&outcome), "container (vertical)  #root");
//! ```

pub mod policy_config;
pub mod registry;
pub mod render;
pub mod surface;
pub mod text;

pub use policy_config::{PolicyConfigError, RenderPolicy};
pub use registry::{BoxedFactory, Registry, WidgetFactory};
pub use render::{DiagnosticKind, RenderDiagnostic, RenderOutcome, Renderer, ResolvedComponent};
pub use surface::{EventDispatch, Surface};
