// Edge Function deployment pipeline: read sources, create or update, tally

pub mod api;
pub mod supabase;

pub use api::{ApiResponse, FunctionsApi};
pub use supabase::ManagementClient;

use edge_deploy_core::{EdgeFunction, Error, Outcome, Summary, function_path};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// Progress events emitted while deploying
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress<'a> {
    /// About to upload `name`
    Started(&'a str),
    /// Create returned 409, retrying as an update
    Updating(&'a str),
    /// Final outcome for `name`
    Finished(&'a str, &'a Outcome),
}

/// Read a function's entry file from `<root>/<name>/index.ts`
pub fn load_code(root: &Path, name: &str) -> edge_deploy_core::Result<EdgeFunction> {
    let path = function_path(root, name);
    if !path.is_file() {
        return Err(Error::FunctionNotFound(path));
    }
    let code = fs::read_to_string(&path)?;
    Ok(EdgeFunction {
        name: name.to_string(),
        code,
    })
}

/// Deploy a single function: create, falling back to update on conflict.
///
/// Never returns an error; every failure is folded into `Outcome::Failed`.
pub async fn deploy_function<A, F>(api: &A, function: &EdgeFunction, mut on_progress: F) -> Outcome
where
    A: FunctionsApi + ?Sized,
    F: FnMut(Progress<'_>),
{
    let payload = function.payload();

    let response = match api.create_function(&payload).await {
        Ok(response) => response,
        Err(e) => return transport_failure(&function.name, e),
    };

    if response.is_accepted() {
        return Outcome::Created;
    }

    let response = if response.is_conflict() {
        on_progress(Progress::Updating(&function.name));
        match api.update_function(&function.name, &payload).await {
            Ok(response) if response.is_accepted() => return Outcome::Updated,
            Ok(response) => response,
            Err(e) => return transport_failure(&function.name, e),
        }
    } else {
        response
    };

    warn!(function = %function.name, status = response.status, "deployment rejected");
    Outcome::Failed(format!(
        "Failed ({})\n   Response: {}",
        response.status, response.body
    ))
}

fn transport_failure(name: &str, err: anyhow::Error) -> Outcome {
    warn!(function = name, error = %err, "request failed");
    Outcome::Failed(format!("Error: {:#}", err))
}

/// Deploy every function in `names`, in order, one at a time
pub async fn deploy_all<A, F>(api: &A, root: &Path, names: &[&str], mut on_progress: F) -> Summary
where
    A: FunctionsApi + ?Sized,
    F: FnMut(Progress<'_>),
{
    let mut summary = Summary::default();

    for &name in names {
        on_progress(Progress::Started(name));

        let outcome = match load_code(root, name) {
            Ok(function) => deploy_function(api, &function, &mut on_progress).await,
            Err(e) => {
                warn!(function = name, error = %e, "could not load function source");
                Outcome::Failed(e.to_string())
            }
        };

        info!(function = name, outcome = ?outcome, "function processed");
        on_progress(Progress::Finished(name, &outcome));
        summary.record(name, outcome);
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use edge_deploy_core::{FUNCTIONS, FunctionPayload};
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Call {
        Create(String),
        Update(String),
    }

    /// Scripted management API: pops one reply per call, defaulting to 201
    #[derive(Default)]
    struct FakeApi {
        replies: Mutex<VecDeque<Result<u16, String>>>,
        calls: Mutex<Vec<Call>>,
        bodies: Mutex<Vec<String>>,
    }

    impl FakeApi {
        fn scripted(replies: Vec<Result<u16, String>>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                ..Default::default()
            }
        }

        fn reply(&self) -> anyhow::Result<ApiResponse> {
            match self.replies.lock().unwrap().pop_front().unwrap_or(Ok(201)) {
                Ok(status) => Ok(ApiResponse {
                    status,
                    body: format!("{{\"status\":{}}}", status),
                }),
                Err(msg) => Err(anyhow::anyhow!(msg)),
            }
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl FunctionsApi for FakeApi {
        async fn create_function(&self, payload: &FunctionPayload<'_>) -> anyhow::Result<ApiResponse> {
            self.calls.lock().unwrap().push(Call::Create(payload.slug.to_string()));
            self.bodies.lock().unwrap().push(payload.body.to_string());
            self.reply()
        }

        async fn update_function(
            &self,
            slug: &str,
            _payload: &FunctionPayload<'_>,
        ) -> anyhow::Result<ApiResponse> {
            self.calls.lock().unwrap().push(Call::Update(slug.to_string()));
            self.reply()
        }
    }

    fn functions_dir(names: &[&str]) -> TempDir {
        let dir = TempDir::new().unwrap();
        for name in names {
            let func_dir = dir.path().join(name);
            fs::create_dir_all(&func_dir).unwrap();
            fs::write(func_dir.join("index.ts"), format!("// {}\n", name)).unwrap();
        }
        dir
    }

    fn function(name: &str) -> EdgeFunction {
        EdgeFunction {
            name: name.to_string(),
            code: "Deno.serve(() => new Response('ok'))".to_string(),
        }
    }

    #[test]
    fn test_load_code() {
        let dir = functions_dir(&["sos"]);
        let function = load_code(dir.path(), "sos").unwrap();
        assert_eq!(function.name, "sos");
        assert_eq!(function.code, "// sos\n");
    }

    #[test]
    fn test_load_code_missing() {
        let dir = functions_dir(&[]);
        let err = load_code(dir.path(), "extend").unwrap_err();
        assert!(matches!(err, Error::FunctionNotFound(_)));
        assert!(err.to_string().contains("extend/index.ts"));
    }

    #[tokio::test]
    async fn test_create_accepted() {
        for status in [200, 201] {
            let api = FakeApi::scripted(vec![Ok(status)]);
            let outcome = deploy_function(&api, &function("sos"), |_| {}).await;
            assert_eq!(outcome, Outcome::Created);
            assert_eq!(api.calls(), vec![Call::Create("sos".to_string())]);
        }
    }

    #[tokio::test]
    async fn test_conflict_falls_back_to_update() {
        let api = FakeApi::scripted(vec![Ok(409), Ok(200)]);
        let mut events = Vec::new();
        let outcome = deploy_function(&api, &function("checkin"), |p| {
            if let Progress::Updating(name) = p {
                events.push(name.to_string());
            }
        })
        .await;

        assert_eq!(outcome, Outcome::Updated);
        assert_eq!(events, vec!["checkin".to_string()]);
        assert_eq!(
            api.calls(),
            vec![
                Call::Create("checkin".to_string()),
                Call::Update("checkin".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_conflict_then_rejected_update() {
        let api = FakeApi::scripted(vec![Ok(409), Ok(500)]);
        let outcome = deploy_function(&api, &function("extend"), |_| {}).await;

        match outcome {
            Outcome::Failed(msg) => {
                assert!(msg.contains("500"));
                assert!(msg.contains("{\"status\":500}"));
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_other_status_is_not_retried() {
        let api = FakeApi::scripted(vec![Ok(401)]);
        let outcome = deploy_function(&api, &function("sos"), |_| {}).await;

        assert!(matches!(outcome, Outcome::Failed(ref msg) if msg.contains("401")));
        assert_eq!(api.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_transport_error_is_a_failure() {
        let api = FakeApi::scripted(vec![Err("operation timed out".to_string())]);
        let outcome = deploy_function(&api, &function("sos"), |_| {}).await;
        assert!(matches!(outcome, Outcome::Failed(ref msg) if msg.contains("timed out")));

        let api = FakeApi::scripted(vec![Ok(409), Err("connection reset".to_string())]);
        let outcome = deploy_function(&api, &function("sos"), |_| {}).await;
        assert!(matches!(outcome, Outcome::Failed(ref msg) if msg.contains("connection reset")));
    }

    #[tokio::test]
    async fn test_deploy_all_created() {
        let dir = functions_dir(&FUNCTIONS);
        let api = FakeApi::default();

        let summary = deploy_all(&api, dir.path(), &FUNCTIONS, |_| {}).await;

        assert_eq!(summary.deployed, FUNCTIONS.len());
        assert_eq!(summary.failed, 0);
        assert!(summary.all_deployed());

        let expected: Vec<Call> = FUNCTIONS.iter().map(|n| Call::Create(n.to_string())).collect();
        assert_eq!(api.calls(), expected);
        assert_eq!(api.bodies.lock().unwrap()[0], "// start-trip\n");
    }

    #[tokio::test]
    async fn test_deploy_all_missing_file_continues() {
        let present: Vec<&str> = FUNCTIONS.iter().copied().filter(|n| *n != "test-sms").collect();
        let dir = functions_dir(&present);
        let api = FakeApi::default();

        let summary = deploy_all(&api, dir.path(), &FUNCTIONS, |_| {}).await;

        assert_eq!(summary.deployed, FUNCTIONS.len() - 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(api.calls().len(), FUNCTIONS.len() - 1);

        let (name, outcome) = &summary.results[4];
        assert_eq!(name, "test-sms");
        assert!(matches!(outcome, Outcome::Failed(msg) if msg.contains("not found")));
        // items after the missing one were still attempted
        assert_eq!(summary.results[6].1, Outcome::Created);
    }

    #[tokio::test]
    async fn test_deploy_all_single_rejected_update() {
        let dir = functions_dir(&FUNCTIONS);
        let api = FakeApi::scripted(vec![Ok(201), Ok(409), Ok(403)]);

        let summary = deploy_all(&api, dir.path(), &FUNCTIONS, |_| {}).await;

        assert_eq!(summary.failed, 1);
        assert_eq!(summary.deployed, FUNCTIONS.len() - 1);
        assert!(!summary.results[1].1.is_success());
    }

    #[tokio::test]
    async fn test_redeploy_is_idempotent() {
        let dir = functions_dir(&FUNCTIONS);

        let first = deploy_all(&FakeApi::default(), dir.path(), &FUNCTIONS, |_| {}).await;

        let replies = FUNCTIONS.iter().flat_map(|_| [Ok(409), Ok(200)]).collect();
        let api = FakeApi::scripted(replies);
        let second = deploy_all(&api, dir.path(), &FUNCTIONS, |_| {}).await;

        assert_eq!(first.deployed, second.deployed);
        assert_eq!(first.failed, second.failed);
        assert!(second.results.iter().all(|(_, o)| *o == Outcome::Updated));
    }

    #[tokio::test]
    async fn test_progress_order() {
        let dir = functions_dir(&["sos"]);
        let api = FakeApi::scripted(vec![Ok(409), Ok(201)]);
        let mut events = Vec::new();

        deploy_all(&api, dir.path(), &["sos"], |p| {
            events.push(match p {
                Progress::Started(_) => "started",
                Progress::Updating(_) => "updating",
                Progress::Finished(_, _) => "finished",
            })
        })
        .await;

        assert_eq!(events, vec!["started", "updating", "finished"]);
    }
}
