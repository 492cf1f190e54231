//! Resource state as exchanged with the host: a JSON object keyed by
//! attribute name. Typed models go through serde.

use crate::diag::{AttrPath, Diagnostics};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct State(Map<String, Value>);

impl State {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a JSON value; anything but an object is rejected.
    pub fn from_value(v: Value) -> Result<Self, Diagnostics> {
        match v {
            Value::Object(m) => Ok(Self(m)),
            Value::Null => Ok(Self::new()),
            other => {
                let mut d = Diagnostics::new();
                d.add_error(
                    "Invalid resource state",
                    format!("expected a JSON object, got: {other}"),
                );
                Err(d)
            }
        }
    }

    pub fn from_model<T: Serialize>(model: &T) -> Result<Self, Diagnostics> {
        let v = serde_json::to_value(model).map_err(|e| {
            let mut d = Diagnostics::new();
            d.add_error("Unable to encode resource state", e.to_string());
            d
        })?;
        Self::from_value(v)
    }

    /// Decode the whole state into a typed model.
    pub fn get<T: DeserializeOwned>(&self) -> Result<T, Diagnostics> {
        serde_json::from_value(Value::Object(self.0.clone())).map_err(|e| {
            let mut d = Diagnostics::new();
            d.add_error("Unable to decode resource state", e.to_string());
            d
        })
    }

    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.0.get(name).filter(|v| !v.is_null())
    }

    /// Set a top-level attribute; nested paths are not supported here.
    pub fn set_attribute(&mut self, path: &AttrPath, value: Value) -> Result<(), Diagnostics> {
        match (path.steps().len(), path.root_name()) {
            (1, Some(name)) => {
                self.0.insert(name.to_owned(), value);
                Ok(())
            }
            _ => {
                let mut d = Diagnostics::new();
                d.add_error(
                    "Unsupported attribute path",
                    format!("only top-level attributes can be set, got `{path}`"),
                );
                Err(d)
            }
        }
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

/// Build the initial state of an import: the supplied id lands verbatim in `path`.
pub fn import_state_passthrough_id(path: &AttrPath, id: &str) -> Result<State, Diagnostics> {
    let mut st = State::new();
    st.set_attribute(path, Value::String(id.to_owned()))?;
    Ok(st)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Model {
        name: String,
        #[serde(default)]
        id: Option<i64>,
    }

    #[test]
    fn typed_model_through_state() {
        let st = State::from_model(&Model {
            name: "example.com".into(),
            id: Some(7),
        })
        .unwrap();
        assert_eq!(st.attribute("id"), Some(&json!(7)));
        assert_eq!(
            st.get::<Model>().unwrap(),
            Model {
                name: "example.com".into(),
                id: Some(7)
            }
        );
    }

    #[test]
    fn non_object_rejected() {
        let err = State::from_value(json!([1, 2])).unwrap_err();
        assert!(err.has_error());
    }

    #[test]
    fn passthrough_import() {
        let st = import_state_passthrough_id(&AttrPath::root("name"), "example.bio").unwrap();
        let m: Model = st.get().unwrap();
        assert_eq!(m.name, "example.bio");
        assert_eq!(m.id, None);
    }

    #[test]
    fn nested_path_is_rejected() {
        let mut st = State::new();
        let p: AttrPath = serde_json::from_value(json!(["a", "b"])).unwrap();
        assert!(st.set_attribute(&p, json!(1)).is_err());
    }
}
