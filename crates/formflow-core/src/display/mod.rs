//! Markdown formatting of flow state for terminal output.
//!
//! Domain types implement [`std::fmt::Display`] directly (see [`models`]);
//! collections and request outcomes get small wrapper types so the same data
//! can be formatted per context.
//!
//! ```rust
//! use formflow_core::{
//!     display::Redirect,
//!     definition::FlowConfig,
//! };
//!
//! let params = FlowConfig::default().route_parameters("signup", "abc", Some("plan"));
//! let output = Redirect::to_flow(&params).to_string();
//! assert!(output.contains("step=plan"));
//! ```

pub mod collections;
pub mod datetime;
pub mod models;
pub mod results;

pub use collections::StoredInstances;
pub use datetime::LocalDateTime;
pub use results::{DeleteResult, Redirect};
