//! Probe orchestration.
//!
//! The runner walks the (credential, definition) cross product, roles in
//! credential order on the outside and definitions in catalog order on the
//! inside, issuing one call at a time. Sequential by design: probing the
//! same endpoints concurrently under different tokens can draw rate-limit
//! 429s that would be indistinguishable from genuine authorization denials.
//!
//! Every pair yields exactly one outcome. A failure at any stage of one pair
//! is converted into a failed outcome at the pair boundary and never
//! suppresses measurement of the remaining pairs.

use crate::catalog::RequestDefinition;
use crate::http::executor::Executor;
use crate::http::method::ProbeMethod;
use crate::http::payload;
use crate::template::{self, PlaceholderMap};
use crate::validate;

/// One named identity and its pre-obtained bearer token.
#[derive(Debug, Clone)]
pub struct Credential {
    pub role: String,
    pub token: String,
}

/// Ordered role → token set. Backed by a vector, not a map: insertion order
/// is the report column order and must stay a guaranteed contract.
#[derive(Debug, Clone, Default)]
pub struct CredentialSet {
    credentials: Vec<Credential>,
}

impl CredentialSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, role: impl Into<String>, token: impl Into<String>) {
        self.credentials.push(Credential {
            role: role.into(),
            token: token.into(),
        });
    }

    pub fn iter(&self) -> impl Iterator<Item = &Credential> {
        self.credentials.iter()
    }

    pub fn roles(&self) -> Vec<String> {
        self.credentials
            .iter()
            .map(|credential| credential.role.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.credentials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.credentials.is_empty()
    }
}

/// Error detail carried by a failed outcome: the HTTP status when one was
/// observed, plus a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutcomeError {
    pub status: Option<u16>,
    pub message: String,
}

/// Recorded result of one role attempting one endpoint. Append-only; never
/// mutated after creation.
#[derive(Debug, Clone)]
pub struct Outcome {
    pub method: ProbeMethod,
    pub resolved_path: String,
    pub role: String,
    pub succeeded: bool,
    pub error: Option<OutcomeError>,
}

/// Runs the full cross product against one API surface.
pub struct Runner<'a> {
    executor: &'a Executor,
    base_url: &'a str,
    placeholders: &'a PlaceholderMap,
}

impl<'a> Runner<'a> {
    pub fn new(
        executor: &'a Executor,
        base_url: &'a str,
        placeholders: &'a PlaceholderMap,
    ) -> Self {
        Self {
            executor,
            base_url,
            placeholders,
        }
    }

    /// Produce exactly `credentials.len() × definitions.len()` outcomes, in
    /// pair-iteration order.
    pub async fn run(
        &self,
        credentials: &CredentialSet,
        definitions: &[RequestDefinition],
    ) -> Vec<Outcome> {
        let mut outcomes = Vec::with_capacity(credentials.len() * definitions.len());

        for credential in credentials.iter() {
            for definition in definitions {
                outcomes.push(self.probe(credential, definition).await);
            }
        }

        outcomes
    }

    async fn probe(&self, credential: &Credential, definition: &RequestDefinition) -> Outcome {
        let resolved_path = template::resolve(&definition.path_template, self.placeholders);
        let payload = payload::build(definition);
        let url = format!("{}{}", self.base_url, resolved_path);

        tracing::info!(
            method = %definition.method,
            path = %resolved_path,
            role = %credential.role,
            "probing"
        );

        let result = self
            .executor
            .execute(definition.method, &url, &credential.token, &payload)
            .await;

        let (succeeded, error) = match result {
            Ok(response) => {
                if validate::validate(&response, definition.expected_schema.as_ref()) {
                    (true, None)
                } else {
                    (
                        false,
                        Some(OutcomeError {
                            status: None,
                            message: "response failed schema validation".to_string(),
                        }),
                    )
                }
            }
            Err(err) => (
                false,
                Some(OutcomeError {
                    status: err.status(),
                    message: err.to_string(),
                }),
            ),
        };

        tracing::info!(
            method = %definition.method,
            path = %resolved_path,
            role = %credential.role,
            succeeded,
            "probe finished"
        );

        Outcome {
            method: definition.method,
            resolved_path,
            role: credential.role.clone(),
            succeeded,
            error,
        }
    }
}

/// Matrix row order for a definition list: `(method, resolved path)` per
/// definition, resolved with the same placeholder map the runner uses.
/// Resolution is deterministic, so these match the outcomes' paths.
pub fn resolved_rows(
    definitions: &[RequestDefinition],
    placeholders: &PlaceholderMap,
) -> Vec<(ProbeMethod, String)> {
    definitions
        .iter()
        .map(|definition| {
            (
                definition.method,
                template::resolve(&definition.path_template, placeholders),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::executor::DEFAULT_TIMEOUT;
    use crate::http::transport::{Transport, TransportFailure, WireRequest, WireResponse};
    use crate::validate::TypeTag;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::BTreeMap;
    use std::sync::{Arc, Mutex};

    /// One recorded transport call, for order/shape assertions.
    #[derive(Debug, Clone, PartialEq)]
    struct RecordedCall {
        token: String,
        url: String,
        query: Vec<(String, String)>,
    }

    /// Scripted transport: answers by (token, url) lookup, defaulting to a
    /// plain 200 with an empty object body. Records call order.
    struct ScriptedTransport {
        responses: Vec<((String, String), Result<WireResponse, TransportFailure>)>,
        calls: Arc<Mutex<Vec<RecordedCall>>>,
    }

    impl ScriptedTransport {
        fn new() -> Self {
            Self {
                responses: Vec::new(),
                calls: Arc::new(Mutex::new(Vec::new())),
            }
        }

        fn respond(
            mut self,
            token: &str,
            url: &str,
            result: Result<WireResponse, TransportFailure>,
        ) -> Self {
            self.responses
                .push(((token.to_string(), url.to_string()), result));
            self
        }

        fn call_log(&self) -> Arc<Mutex<Vec<RecordedCall>>> {
            Arc::clone(&self.calls)
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn send(&self, request: &WireRequest) -> Result<WireResponse, TransportFailure> {
            self.calls.lock().unwrap().push(RecordedCall {
                token: request.bearer_token.clone(),
                url: request.url.clone(),
                query: request.query.clone(),
            });
            for ((token, url), result) in &self.responses {
                if token == &request.bearer_token && url == &request.url {
                    return result.clone();
                }
            }
            Ok(WireResponse {
                status: 200,
                body: "{}".to_string(),
            })
        }
    }

    fn ok(body: &str) -> Result<WireResponse, TransportFailure> {
        Ok(WireResponse {
            status: 200,
            body: body.to_string(),
        })
    }

    fn status(code: u16, body: &str) -> Result<WireResponse, TransportFailure> {
        Ok(WireResponse {
            status: code,
            body: body.to_string(),
        })
    }

    fn definition(method: ProbeMethod, path: &str) -> RequestDefinition {
        RequestDefinition {
            method,
            path_template: path.to_string(),
            body_spec: None,
            expected_schema: None,
        }
    }

    fn credentials(pairs: &[(&str, &str)]) -> CredentialSet {
        let mut set = CredentialSet::new();
        for (role, token) in pairs {
            set.push(*role, *token);
        }
        set
    }

    async fn run_with(
        transport: ScriptedTransport,
        creds: &CredentialSet,
        definitions: &[RequestDefinition],
        placeholders: &PlaceholderMap,
    ) -> Vec<Outcome> {
        let executor = Executor::new(Box::new(transport), DEFAULT_TIMEOUT);
        Runner::new(&executor, "https://api.test", placeholders)
            .run(creds, definitions)
            .await
    }

    #[tokio::test]
    async fn produces_one_outcome_per_pair_in_order() {
        let creds = credentials(&[("admin", "tok-a"), ("viewer", "tok-v")]);
        let definitions = vec![
            definition(ProbeMethod::Read, "/v1/files/:file_key"),
            definition(ProbeMethod::Read, "/v1/files/:file_key/versions"),
            definition(ProbeMethod::Write, "/v1/dev_resources"),
        ];
        let mut placeholders = PlaceholderMap::new();
        placeholders.insert("file_key", "KEY");

        let outcomes = run_with(
            ScriptedTransport::new(),
            &creds,
            &definitions,
            &placeholders,
        )
        .await;

        assert_eq!(outcomes.len(), 6);
        // Role-major, definition-minor.
        let order: Vec<(&str, &str)> = outcomes
            .iter()
            .map(|o| (o.role.as_str(), o.resolved_path.as_str()))
            .collect();
        assert_eq!(
            order,
            vec![
                ("admin", "/v1/files/KEY"),
                ("admin", "/v1/files/KEY/versions"),
                ("admin", "/v1/dev_resources"),
                ("viewer", "/v1/files/KEY"),
                ("viewer", "/v1/files/KEY/versions"),
                ("viewer", "/v1/dev_resources"),
            ]
        );
        assert!(outcomes.iter().all(|o| o.succeeded && o.error.is_none()));
    }

    #[tokio::test]
    async fn viewer_403_and_admin_200_are_both_recorded() {
        let creds = credentials(&[("viewer", "tok1"), ("editor", "tok2")]);
        let definitions = vec![definition(ProbeMethod::Read, "/v1/files/:file_key")];
        let mut placeholders = PlaceholderMap::new();
        placeholders.insert("file_key", "ABC123");

        let transport = ScriptedTransport::new()
            .respond("tok1", "https://api.test/v1/files/ABC123", ok("{}"))
            .respond(
                "tok2",
                "https://api.test/v1/files/ABC123",
                status(403, "{\"err\": \"Forbidden\"}"),
            );
        let outcomes = run_with(transport, &creds, &definitions, &placeholders).await;

        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0].resolved_path, "/v1/files/ABC123");
        assert!(outcomes[0].succeeded);
        assert!(!outcomes[1].succeeded);
        assert_eq!(
            outcomes[1].error.as_ref().and_then(|e| e.status),
            Some(403)
        );
    }

    #[tokio::test]
    async fn missing_placeholder_probes_the_sentinel_path() {
        let creds = credentials(&[("viewer", "tok1"), ("editor", "tok2")]);
        let definitions = vec![definition(ProbeMethod::Read, "/v1/files/:file_key")];
        let placeholders = PlaceholderMap::new();

        let outcomes = run_with(
            ScriptedTransport::new(),
            &creds,
            &definitions,
            &placeholders,
        )
        .await;

        assert!(outcomes
            .iter()
            .all(|o| o.resolved_path == "/v1/files/missing-file_key"));
    }

    #[tokio::test]
    async fn one_failure_does_not_suppress_other_pairs() {
        let creds = credentials(&[("admin", "tok-a"), ("viewer", "tok-v")]);
        let definitions = vec![
            definition(ProbeMethod::Read, "/v1/a"),
            definition(ProbeMethod::Read, "/v1/b"),
        ];
        let placeholders = PlaceholderMap::new();

        let transport = ScriptedTransport::new().respond(
            "tok-a",
            "https://api.test/v1/a",
            Err(TransportFailure::Failed("connection reset".to_string())),
        );
        let outcomes = run_with(transport, &creds, &definitions, &placeholders).await;

        assert_eq!(outcomes.len(), 4);
        assert!(!outcomes[0].succeeded);
        assert_eq!(outcomes[0].error.as_ref().and_then(|e| e.status), None);
        assert!(outcomes[1..].iter().all(|o| o.succeeded));
    }

    #[tokio::test]
    async fn schema_mismatch_fails_the_pair_only() {
        let creds = credentials(&[("admin", "tok-a")]);
        let mut with_schema = definition(ProbeMethod::Read, "/v1/files/:file_key");
        with_schema.expected_schema = Some(BTreeMap::from([(
            "name".to_string(),
            TypeTag::String,
        )]));
        let definitions = vec![
            with_schema,
            definition(ProbeMethod::Read, "/v1/files/:file_key/versions"),
        ];
        let mut placeholders = PlaceholderMap::new();
        placeholders.insert("file_key", "KEY");

        // 200 with a body that misses the declared `name` field.
        let transport = ScriptedTransport::new().respond(
            "tok-a",
            "https://api.test/v1/files/KEY",
            ok("{\"title\": \"wrong shape\"}"),
        );
        let outcomes = run_with(transport, &creds, &definitions, &placeholders).await;

        assert_eq!(outcomes.len(), 2);
        assert!(!outcomes[0].succeeded);
        assert_eq!(
            outcomes[0].error.as_ref().map(|e| e.message.as_str()),
            Some("response failed schema validation")
        );
        assert!(outcomes[1].succeeded);
    }

    #[tokio::test]
    async fn no_schema_passes_regardless_of_response_shape() {
        let creds = credentials(&[("admin", "tok-a")]);
        let definitions = vec![definition(ProbeMethod::Read, "/v1/anything")];
        let placeholders = PlaceholderMap::new();

        let transport = ScriptedTransport::new().respond(
            "tok-a",
            "https://api.test/v1/anything",
            ok("[1, 2, 3]"),
        );
        let outcomes = run_with(transport, &creds, &definitions, &placeholders).await;
        assert!(outcomes[0].succeeded);
    }

    #[tokio::test]
    async fn read_body_spec_travels_as_query_params() {
        let creds = credentials(&[("admin", "tok-a")]);
        let definitions = vec![RequestDefinition {
            method: ProbeMethod::Read,
            path_template: "/v1/files/:file_key/images".to_string(),
            body_spec: Some(json!({"ids": "0:1"})),
            expected_schema: None,
        }];
        let mut placeholders = PlaceholderMap::new();
        placeholders.insert("file_key", "KEY");

        let transport = ScriptedTransport::new();
        let call_log = transport.call_log();
        let executor = Executor::new(Box::new(transport), DEFAULT_TIMEOUT);
        let outcomes = Runner::new(&executor, "https://api.test", &placeholders)
            .run(&creds, &definitions)
            .await;

        assert_eq!(outcomes.len(), 1);
        assert!(outcomes[0].succeeded);
        let calls = call_log.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].url, "https://api.test/v1/files/KEY/images");
        assert_eq!(calls[0].query, vec![("ids".to_string(), "0:1".to_string())]);
    }

    #[tokio::test]
    async fn calls_go_out_role_major_with_the_right_tokens() {
        let creds = credentials(&[("a", "tok-1"), ("b", "tok-2")]);
        let definitions = vec![
            definition(ProbeMethod::Read, "/v1/x"),
            definition(ProbeMethod::Read, "/v1/y"),
        ];
        let placeholders = PlaceholderMap::new();

        let transport = ScriptedTransport::new();
        let call_log = transport.call_log();
        let executor = Executor::new(Box::new(transport), DEFAULT_TIMEOUT);
        let outcomes = Runner::new(&executor, "https://api.test", &placeholders)
            .run(&creds, &definitions)
            .await;

        assert_eq!(outcomes.len(), 4);
        let calls = call_log.lock().unwrap();
        let seen: Vec<(&str, &str)> = calls
            .iter()
            .map(|call| (call.token.as_str(), call.url.as_str()))
            .collect();
        assert_eq!(
            seen,
            vec![
                ("tok-1", "https://api.test/v1/x"),
                ("tok-1", "https://api.test/v1/y"),
                ("tok-2", "https://api.test/v1/x"),
                ("tok-2", "https://api.test/v1/y"),
            ]
        );
    }

    #[tokio::test]
    async fn empty_credential_set_yields_no_outcomes() {
        let creds = CredentialSet::new();
        assert!(creds.is_empty());
        let definitions = vec![definition(ProbeMethod::Read, "/v1/x")];
        let placeholders = PlaceholderMap::new();

        let outcomes = run_with(
            ScriptedTransport::new(),
            &creds,
            &definitions,
            &placeholders,
        )
        .await;
        assert!(outcomes.is_empty());
    }

    #[test]
    fn resolved_rows_match_runner_resolution() {
        let definitions = vec![
            definition(ProbeMethod::Read, "/v1/files/:file_key"),
            definition(ProbeMethod::Write, "/v2/webhooks"),
        ];
        let mut placeholders = PlaceholderMap::new();
        placeholders.insert("file_key", "KEY");

        let rows = resolved_rows(&definitions, &placeholders);
        assert_eq!(
            rows,
            vec![
                (ProbeMethod::Read, "/v1/files/KEY".to_string()),
                (ProbeMethod::Write, "/v2/webhooks".to_string()),
            ]
        );
    }
}
