//! Scene-mutation engine for an infinite whiteboard.
//!
//! The crate owns the document side of the board: a scene of geometric
//! elements, an invertible operation log with bounded undo/redo, selection
//! and transform gestures driven by an ordered plugin pipeline, and
//! transform-aware hit testing. Rendering, persistence, and input capture
//! are the host's job; they talk to the engine through [`engine::Engine`],
//! [`snapshot::SceneSnapshot`], and [`input::InputEvent`].
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Top-level engine: board, plugin pipeline, resource loader |
//! | [`board`] | Board aggregate: scene, selection, viewport, history |
//! | [`scene`] | Element store, group structure, draw order |
//! | [`element`] | Element types, property patches, style props |
//! | [`ops`] | Operations and the all-or-nothing apply engine |
//! | [`history`] | Bounded undo/redo with property-patch coalescing |
//! | [`selection`] | Selection state and marquee resolution |
//! | [`hit`] | Element, handle, and marquee hit testing |
//! | [`geometry`] | Points, rects, paths, point-in-path |
//! | [`viewport`] | Pan/zoom and screen/board conversions |
//! | [`input`] | Input event types |
//! | [`plugin`] | Plugin trait and dispatch pipeline |
//! | [`plugins`] | Built-in history, viewport, transform, and selection plugins |
//! | [`resource`] | Async, generation-checked resource loading |
//! | [`snapshot`] | Persistence snapshot and render view |
//! | [`config`] | Environment-driven board configuration |
//! | [`consts`] | Shared numeric defaults |

pub mod board;
pub mod config;
pub mod consts;
pub mod element;
pub mod engine;
pub mod geometry;
pub mod history;
pub mod hit;
pub mod input;
pub mod ops;
pub mod plugin;
pub mod plugins;
pub mod resource;
pub mod scene;
pub mod selection;
pub mod snapshot;
pub mod viewport;
