//! Resource and provider schemas.
//!
//! * Attributes are flat: `string`, `int64` and `bool` cover every resource
//!   shipped so far.
//! * `requires_replace` drives [`Schema::plan`]: a change to such an
//!   attribute plans destroy + create instead of an in-place update.

use crate::{
    diag::{AttrPath, Diagnostics},
    state::State,
};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/*──────── attribute ────────*/

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AttrType {
    String,
    Int64,
    Bool,
}

impl AttrType {
    fn accepts(self, v: &Value) -> bool {
        match self {
            AttrType::String => v.is_string(),
            AttrType::Int64 => v.is_i64(),
            AttrType::Bool => v.is_boolean(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Attribute {
    #[serde(rename = "type")]
    pub ty: AttrType,
    pub required: bool,
    pub optional: bool,
    pub computed: bool,
    pub sensitive: bool,
    pub requires_replace: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Attribute {
    fn new(ty: AttrType) -> Self {
        Self {
            ty,
            required: false,
            optional: false,
            computed: false,
            sensitive: false,
            requires_replace: false,
            description: None,
        }
    }

    pub fn required_string() -> Self {
        Self {
            required: true,
            ..Self::new(AttrType::String)
        }
    }

    pub fn optional_string() -> Self {
        Self {
            optional: true,
            ..Self::new(AttrType::String)
        }
    }

    pub fn optional_bool() -> Self {
        Self {
            optional: true,
            ..Self::new(AttrType::Bool)
        }
    }

    pub fn computed_int64() -> Self {
        Self {
            computed: true,
            ..Self::new(AttrType::Int64)
        }
    }

    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    pub fn requires_replace(mut self) -> Self {
        self.requires_replace = true;
        self
    }

    pub fn with_description(mut self, d: impl Into<String>) -> Self {
        self.description = Some(d.into());
        self
    }

    /// Computed and never settable from configuration.
    pub fn is_read_only(&self) -> bool {
        self.computed && !self.optional && !self.required
    }
}

/*──────── schema ────────*/

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Schema {
    pub version: i64,
    pub description: String,
    pub attributes: BTreeMap<String, Attribute>,
}

/// Outcome of comparing prior state with the proposed one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanAction {
    NoOp,
    Create,
    Update,
    Replace,
    Delete,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PlannedChange {
    pub action: PlanAction,
    pub planned_state: Option<State>,
    pub requires_replace: Vec<AttrPath>,
}

impl Schema {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            version: 0,
            description: description.into(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, attr: Attribute) -> Self {
        self.attributes.insert(name.into(), attr);
        self
    }

    /// Check a state read back from the host or produced by a resource.
    pub fn validate_state(&self, st: &State) -> Diagnostics {
        let mut diags = Diagnostics::new();

        for (name, _) in st.attributes() {
            if !self.attributes.contains_key(name) {
                diags.add_attribute_error(
                    AttrPath::root(name.as_str()),
                    "Unsupported argument",
                    format!("An argument named {name:?} is not expected here."),
                );
            }
        }

        for (name, attr) in &self.attributes {
            match st.attribute(name) {
                None if attr.required => diags.add_attribute_error(
                    AttrPath::root(name.as_str()),
                    "Missing required argument",
                    format!("The argument {name:?} is required, but no definition was found."),
                ),
                Some(v) if !attr.ty.accepts(v) => diags.add_attribute_error(
                    AttrPath::root(name.as_str()),
                    "Incorrect attribute value type",
                    format!("Inappropriate value for attribute {name:?}: {v} is not a {:?}.", attr.ty),
                ),
                _ => {}
            }
        }
        diags
    }

    /// Like [`Schema::validate_state`] but also rejects configured read-only attributes.
    pub fn validate_config(&self, cfg: &State) -> Diagnostics {
        let mut diags = self.validate_state(cfg);
        for (name, attr) in &self.attributes {
            if attr.is_read_only() && cfg.attribute(name).is_some() {
                diags.add_attribute_error(
                    AttrPath::root(name.as_str()),
                    "Invalid Configuration for Read-Only Attribute",
                    format!("Cannot set value for attribute {name:?}, it is computed by the provider."),
                );
            }
        }
        diags
    }

    /// Compare prior and proposed state and decide what the host should do.
    pub fn plan(&self, prior: Option<&State>, proposed: Option<&State>) -> PlannedChange {
        let (prior, proposed) = match (prior, proposed) {
            (None, None) => {
                return PlannedChange {
                    action: PlanAction::NoOp,
                    planned_state: None,
                    requires_replace: Vec::new(),
                };
            }
            (Some(_), None) => {
                return PlannedChange {
                    action: PlanAction::Delete,
                    planned_state: None,
                    requires_replace: Vec::new(),
                };
            }
            (None, Some(p)) => {
                return PlannedChange {
                    action: PlanAction::Create,
                    planned_state: Some(self.fill_computed(p, None)),
                    requires_replace: Vec::new(),
                };
            }
            (Some(a), Some(b)) => (a, b),
        };

        let mut changed = Vec::new();
        let mut replace = Vec::new();
        for (name, attr) in &self.attributes {
            if attr.is_read_only() {
                continue;
            }
            if prior.attribute(name) != proposed.attribute(name) {
                changed.push(name);
                if attr.requires_replace {
                    replace.push(AttrPath::root(name.as_str()));
                }
            }
        }

        if !replace.is_empty() {
            PlannedChange {
                action: PlanAction::Replace,
                planned_state: Some(self.fill_computed(proposed, None)),
                requires_replace: replace,
            }
        } else if !changed.is_empty() {
            PlannedChange {
                action: PlanAction::Update,
                planned_state: Some(self.fill_computed(proposed, Some(prior))),
                requires_replace: replace,
            }
        } else {
            PlannedChange {
                action: PlanAction::NoOp,
                planned_state: Some(prior.clone()),
                requires_replace: replace,
            }
        }
    }

    /// Copy computed attributes missing from `proposed` out of `prior`;
    /// without a prior they stay null (unknown until applied).
    fn fill_computed(&self, proposed: &State, prior: Option<&State>) -> State {
        let mut out = proposed.clone();
        for (name, attr) in &self.attributes {
            if !attr.computed || proposed.attribute(name).is_some() {
                continue;
            }
            let v = prior
                .and_then(|p| p.attribute(name))
                .cloned()
                .unwrap_or(Value::Null);
            // top-level path, cannot fail
            let _ = out.set_attribute(&AttrPath::root(name.as_str()), v);
        }
        out
    }
}
