//! tf-resource – lifecycle contract between the host and managed resources
//!
//! * [`Resource`] is the five-method lifecycle (plus metadata / schema / configure).
//! * Failures travel as [`Diagnostics`], never as Rust errors.

mod diag;
mod resource;
mod schema;
mod state;

pub use diag::{AttrPath, Diagnostic, Diagnostics, Severity};
pub use resource::{
    CreateRequest, DeleteRequest, ImportRequest, ProviderData, ReadRequest, Resource,
    ResourceFactory, ResourceResponse, UpdateRequest,
};
pub use schema::{AttrType, Attribute, PlanAction, PlannedChange, Schema};
pub use state::{State, import_state_passthrough_id};

pub use async_trait::async_trait;
