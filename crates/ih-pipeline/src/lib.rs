//! # ih-pipeline
//!
//! The action-pipeline engine of the image handler.
//!
//! - **[`parse_request`]** -- raw path + query into a [`ParsedRequest`]
//!   (object key and ordered [`ActionDirective`]s).
//! - **[`Action`]** / **[`ImageAction`]** -- typed action contract and its
//!   object-safe form.
//! - **[`ActionRegistry`]** -- frozen name → action map; [`BuiltinAction`]
//!   lists what ships by default.
//! - **[`ImageProcessor`]** -- admission validation and in-order dispatch.
//! - **[`ImageContext`]** -- per-request image state and store handle.
//! - **[`ImageService`]** -- fetch, decode, process, encode, with the
//!   untransformed bypass path.

pub mod action;
pub mod actions;
pub mod context;
pub mod params;
pub mod processor;
pub mod registry;
pub mod request;
pub mod service;

pub use action::{Action, ImageAction};
pub use context::{Features, ImageContext, RETURN_INFO};
pub use processor::{ImageProcessor, NAMESPACE};
pub use registry::{ActionRegistry, BuiltinAction, RegistryBuilder};
pub use request::{parse_chain, parse_request, ActionDirective, ParsedRequest, PROCESS_QUERY_KEY};
pub use service::{ImageInfo, ImageService, InfoValue, Rendered};
