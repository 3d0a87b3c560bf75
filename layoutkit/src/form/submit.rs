use serde_json::Value;
use thiserror::Error;

use crate::{
    form::{CompiledForm, Submission, ValidationErrors},
    registry::{NOT_FOUND, Registry, global},
    route::resolve_dynamic_path,
    transport::{ErrorSet, Transport},
};

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("form has no action to submit to")]
    MissingAction,
    #[error(transparent)]
    Invalid(#[from] ValidationErrors),
    #[error("submission rejected: {0}")]
    Remote(#[from] ErrorSet),
}

/// Result of a successful submission.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitOutcome {
    /// Decoded response body.
    pub response: Value,
    /// Path to navigate to, when the form declares a success redirect.
    pub redirect: Option<String>,
}

impl CompiledForm {
    /// Validate `values`, post them (as a nested object) to the form action and
    /// resolve the success redirect.
    ///
    /// The redirect template is the path registered for
    /// `dispatch.onSuccessRedirectTo.component`, looked up in `registry` or,
    /// when `None`, in the process-wide registry. Placeholders are filled from
    /// the response (optionally from the dot-path `payloadNamePath` inside it).
    ///
    /// # Errors
    ///
    /// Validation failures and server rejections are returned; nothing is retried.
    pub async fn submit<X>(
        &self,
        transport: &X,
        values: &Submission,
        registry: Option<&Registry>,
    ) -> Result<SubmitOutcome, SubmitError>
    where
        X: Transport + ?Sized,
    {
        if self.action.is_empty() {
            return Err(SubmitError::MissingAction);
        }
        self.validate(values)?;

        let response = transport.post(&self.action, &self.to_nested(values)).await?;
        let redirect = self.redirect_for(&response, registry);
        Ok(SubmitOutcome { response, redirect })
    }

    fn redirect_for(&self, response: &Value, registry: Option<&Registry>) -> Option<String> {
        let target = self.dispatch.as_ref()?.on_success_redirect_to.as_ref()?;

        let template = match registry {
            Some(r) => r.path_of(&target.component).to_string(),
            None => global::with(|r| r.path_of(&target.component).to_string()).unwrap_or_else(|e| {
                warn!("cannot resolve redirect for '{}': {e}", target.component);
                NOT_FOUND.to_string()
            }),
        };
        if template == NOT_FOUND {
            warn!("redirect component '{}' has no registered path", target.component);
            return None;
        }

        Some(resolve_dynamic_path(
            &template,
            response,
            target.payload_name_path.as_deref(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{
        model::{ComponentDescriptor, FormSchema, Properties},
        registry::ComponentMap,
        transport::testing::StubTransport,
    };

    fn form() -> CompiledForm {
        let schema: FormSchema = serde_json::from_value(json!({
            "action": "/users",
            "fields": [
                {"name": "name", "label": "Name", "required": true},
                {"name": "address", "inputType": "object", "properties": {"fields": [{"name": "city"}]}}
            ],
            "dispatch": {"onSuccessRedirectTo": {"component": "UserDetail", "payloadNamePath": "data"}}
        }))
        .unwrap();
        CompiledForm::compile(&schema).unwrap()
    }

    fn registry() -> Registry {
        let mut r = Registry::new(ComponentMap::new().with("UserDetail", |_: &Properties| json!(null)));
        r.register(&ComponentDescriptor::new("UserDetail").with_path("/users/:id"))
            .unwrap();
        r
    }

    fn values() -> Submission {
        let mut v = Submission::new();
        v.insert("name", json!("ann"));
        v.insert("address.city", json!("oslo"));
        v
    }

    #[tokio::test]
    async fn test_submit_posts_nested_and_redirects() {
        let t = StubTransport::new().on_post("/users", Ok(json!({"data": {"id": 42}})));
        let out = form().submit(&t, &values(), Some(&registry())).await.unwrap();

        assert_eq!(out.redirect.as_deref(), Some("/users/42"));
        let calls = t.calls();
        assert_eq!(calls[0].2, Some(json!({"name": "ann", "address": {"city": "oslo"}})));
    }

    #[tokio::test]
    async fn test_submit_invalid_is_not_posted() {
        let t = StubTransport::new();
        let err = form().submit(&t, &Submission::new(), Some(&registry())).await.unwrap_err();
        assert!(matches!(err, SubmitError::Invalid(_)));
        assert!(t.calls().is_empty());
    }

    #[tokio::test]
    async fn test_submit_remote_errors_surface() {
        let t = StubTransport::new().on_post("/users", Err(ErrorSet::single("name", "taken")));
        match form().submit(&t, &values(), Some(&registry())).await.unwrap_err() {
            SubmitError::Remote(e) => assert_eq!(e.get("name"), Some("taken")),
            e => panic!("unexpected {e}"),
        }
    }

    #[tokio::test]
    async fn test_unregistered_redirect_is_skipped() {
        let t = StubTransport::new().on_post("/users", Ok(json!({"data": {"id": 1}})));
        let empty = Registry::new(ComponentMap::new());
        let out = form().submit(&t, &values(), Some(&empty)).await.unwrap();
        assert_eq!(out.redirect, None);
    }
}
