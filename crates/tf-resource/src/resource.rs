use crate::{diag::Diagnostics, schema::Schema, state::State};
use async_trait::async_trait;
use std::{any::Any, fmt, sync::Arc};

/*──────── provider data ────────*/

/// Shared, read-only value handed from the provider to every resource at
/// configure time. Resources downcast it to the concrete type they expect.
#[derive(Clone)]
pub struct ProviderData {
    type_name: &'static str,
    inner: Arc<dyn Any + Send + Sync>,
}

impl ProviderData {
    pub fn new<T: Any + Send + Sync>(value: Arc<T>) -> Self {
        Self {
            type_name: std::any::type_name::<T>(),
            inner: value,
        }
    }

    pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.inner.clone().downcast::<T>().ok()
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl fmt::Debug for ProviderData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderData")
            .field("type", &self.type_name)
            .finish()
    }
}

/*──────── requests / response ────────*/

#[derive(Clone, Debug)]
pub struct CreateRequest {
    pub plan: State,
}

#[derive(Clone, Debug)]
pub struct ReadRequest {
    pub state: State,
}

#[derive(Clone, Debug)]
pub struct UpdateRequest {
    pub plan: State,
    pub prior_state: State,
}

#[derive(Clone, Debug)]
pub struct DeleteRequest {
    pub state: State,
}

#[derive(Clone, Debug)]
pub struct ImportRequest {
    pub id: String,
}

/// Result of one lifecycle call. `state: None` means "not tracked".
#[derive(Clone, Debug, Default)]
pub struct ResourceResponse {
    pub state: Option<State>,
    pub diagnostics: Diagnostics,
}

impl ResourceResponse {
    pub fn with_state(state: State) -> Self {
        Self {
            state: Some(state),
            diagnostics: Diagnostics::new(),
        }
    }

    pub fn removed() -> Self {
        Self::default()
    }

    pub fn failed(diagnostics: Diagnostics) -> Self {
        Self {
            state: None,
            diagnostics,
        }
    }

    /// Drop any state once an error has been recorded.
    pub fn finish(mut self) -> Self {
        if self.diagnostics.has_error() {
            self.state = None;
        }
        self
    }
}

/*──────── contract ────────*/

/// Lifecycle contract a managed resource type implements. The host calls
/// one method at a time per tracked entity and waits for it to return.
#[async_trait]
pub trait Resource: Send + Sync {
    /// Full type name, e.g. `dnsimple_domain_secondary_zone`.
    fn metadata(&self, provider_type_name: &str) -> String;

    fn schema(&self) -> Schema;

    /// `None` is legal: the host may call before the provider is configured.
    fn configure(&mut self, data: Option<&ProviderData>) -> Diagnostics;

    async fn create(&self, req: CreateRequest) -> ResourceResponse;

    async fn read(&self, req: ReadRequest) -> ResourceResponse;

    async fn update(&self, req: UpdateRequest) -> ResourceResponse;

    async fn delete(&self, req: DeleteRequest) -> ResourceResponse;

    async fn import_state(&self, req: ImportRequest) -> ResourceResponse;
}

pub type ResourceFactory = fn() -> Box<dyn Resource>;

#[cfg(test)]
mod tests {
    use super::*;

    struct Cfg {
        account: String,
    }

    #[test]
    fn downcast_to_expected_type() {
        let pd = ProviderData::new(Arc::new(Cfg {
            account: "1010".into(),
        }));
        assert_eq!(pd.downcast::<Cfg>().unwrap().account, "1010");
        assert!(pd.downcast::<String>().is_none());
        assert!(pd.type_name().ends_with("Cfg"));
    }

    #[test]
    fn finish_drops_state_on_error() {
        let mut r = ResourceResponse::with_state(State::new());
        r.diagnostics.add_error("boom", "detail");
        assert!(r.finish().state.is_none());
    }
}
