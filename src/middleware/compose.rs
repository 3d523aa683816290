//! Handler chain compiler.
//!
//! Turns `[m0, m1, …, mk]` plus an endpoint handler `h` into one handler the
//! router can call. Per request the chain is assembled innermost-first:
//!
//! ```text
//! entry = m0.wrap(m1.wrap( … mk.wrap(h) … ))
//! ```
//!
//! and `entry` is then called with the request, so `m0` sees it first.
//! Assembly reads an immutable `Arc<[BoxedMiddleware]>`; nothing built for
//! one request is visible to the next.

use std::sync::Arc;

use crate::handler::{BoxFuture, BoxedHandler, ErasedHandler, Ready};
use crate::request::Request;

use super::{BoxedMiddleware, Middleware, Next, Step};

/// Composes `middlewares` (outermost first) around `terminal`.
///
/// With no middlewares the terminal handler is returned as-is.
pub fn compile(terminal: BoxedHandler, middlewares: Vec<BoxedMiddleware>) -> BoxedHandler {
    if middlewares.is_empty() {
        return terminal;
    }
    Arc::new(Composed { terminal, middlewares: middlewares.into() })
}

struct Composed {
    terminal: BoxedHandler,
    middlewares: Arc<[BoxedMiddleware]>,
}

impl Composed {
    fn assemble(&self) -> BoxedHandler {
        self.middlewares
            .iter()
            .rev()
            .fold(Arc::clone(&self.terminal), |next, mw| match mw.wrap(Next::new(next)) {
                Step::Continue(handler) => handler,
                Step::Respond(res) => Arc::new(Ready(res)),
            })
    }
}

impl ErasedHandler for Composed {
    fn call(&self, req: Request) -> BoxFuture {
        self.assemble().call(req)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use http::StatusCode;
    use proptest::prelude::*;

    use super::*;
    use crate::handler::Handler;
    use crate::method::Method;
    use crate::middleware::from_fn;
    use crate::response::{IntoResponse, Response};

    type Log = Arc<Mutex<Vec<String>>>;

    /// Records its label, then either continues or answers with `status`.
    struct Probe {
        label: String,
        log: Log,
        stop_with: Option<StatusCode>,
    }

    impl Middleware for Probe {
        fn wrap(&self, next: Next) -> Step {
            let label = self.label.clone();
            let log = Arc::clone(&self.log);
            let stop_with = self.stop_with;
            Step::proceed(move |req: Request| {
                let next = next.clone();
                let label = label.clone();
                let log = Arc::clone(&log);
                async move {
                    log.lock().unwrap().push(label.clone());
                    match stop_with {
                        Some(status) => (label, status).into_response(),
                        None => next.run(req).await,
                    }
                }
            })
        }
    }

    fn probe(label: &str, log: &Log, stop_with: Option<StatusCode>) -> BoxedMiddleware {
        Arc::new(Probe { label: label.to_owned(), log: Arc::clone(log), stop_with })
    }

    fn endpoint(log: &Log) -> BoxedHandler {
        let log = Arc::clone(log);
        (move |req: Request| {
            let log = Arc::clone(&log);
            async move {
                log.lock().unwrap().push("h".to_owned());
                format!("{} {}", req.method(), req.path())
            }
        })
        .into_boxed_handler()
    }

    fn get(path: &str) -> Request {
        Request::builder(Method::Get, path)
    }

    #[tokio::test]
    async fn empty_chain_returns_terminal_itself() {
        let log = Log::default();
        let terminal = endpoint(&log);
        let compiled = compile(Arc::clone(&terminal), Vec::new());
        assert!(Arc::ptr_eq(&terminal, &compiled));

        let res = compiled.call(get("/a")).await;
        assert_eq!(res.body(), b"GET /a");
    }

    #[tokio::test]
    async fn runs_outermost_first() {
        let log = Log::default();
        let chain = vec![probe("m0", &log, None), probe("m1", &log, None), probe("m2", &log, None)];
        let compiled = compile(endpoint(&log), chain);

        let res = compiled.call(get("/ok")).await;

        assert_eq!(res.status_code(), StatusCode::OK);
        assert_eq!(*log.lock().unwrap(), ["m0", "m1", "m2", "h"]);
    }

    #[tokio::test]
    async fn short_circuit_skips_inner_links() {
        let log = Log::default();
        let chain = vec![
            probe("m0", &log, None),
            probe("m1", &log, Some(StatusCode::UNAUTHORIZED)),
            probe("m2", &log, None),
        ];
        let compiled = compile(endpoint(&log), chain);

        let res = compiled.call(get("/deny")).await;

        assert_eq!(res.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(res.body(), b"m1");
        assert_eq!(*log.lock().unwrap(), ["m0", "m1"]);
    }

    struct Maintenance;

    impl Middleware for Maintenance {
        fn wrap(&self, _next: Next) -> Step {
            Step::respond(("down for maintenance", StatusCode::SERVICE_UNAVAILABLE))
        }
    }

    #[tokio::test]
    async fn respond_step_still_lets_outer_gates_run() {
        let log = Log::default();
        let chain = vec![probe("m0", &log, None), Arc::new(Maintenance) as BoxedMiddleware];
        let compiled = compile(endpoint(&log), chain);

        let res = compiled.call(get("/")).await;

        assert_eq!(res.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(*log.lock().unwrap(), ["m0"]);
    }

    #[tokio::test]
    async fn respond_step_behind_a_denying_gate_is_never_seen() {
        let log = Log::default();
        let chain = vec![
            probe("m0", &log, Some(StatusCode::FORBIDDEN)),
            Arc::new(Maintenance) as BoxedMiddleware,
        ];
        let res = compile(endpoint(&log), chain).call(get("/")).await;
        assert_eq!(res.status_code(), StatusCode::FORBIDDEN);
    }

    /// Counts how often its `Respond` step is built.
    struct CountedRespond(Arc<Mutex<usize>>);

    impl Middleware for CountedRespond {
        fn wrap(&self, _next: Next) -> Step {
            *self.0.lock().unwrap() += 1;
            Step::respond(StatusCode::SERVICE_UNAVAILABLE)
        }
    }

    #[tokio::test]
    async fn respond_step_is_built_during_assembly() {
        let log = Log::default();
        let built = Arc::new(Mutex::new(0));
        let chain = vec![
            probe("m0", &log, Some(StatusCode::FORBIDDEN)),
            Arc::new(CountedRespond(Arc::clone(&built))) as BoxedMiddleware,
        ];
        let compiled = compile(endpoint(&log), chain);

        let res = compiled.call(get("/")).await;
        assert_eq!(res.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(*built.lock().unwrap(), 1);

        compiled.call(get("/")).await;
        assert_eq!(*built.lock().unwrap(), 2);
    }

    #[tokio::test]
    async fn repeated_calls_do_not_share_state() {
        async fn tag(req: Request, next: Next) -> Response {
            let mut res = next.run(req).await;
            res.headers.push(("x-tag".to_owned(), "1".to_owned()));
            res
        }

        let log = Log::default();
        let compiled = compile(endpoint(&log), vec![Arc::new(from_fn(tag)) as BoxedMiddleware]);

        let first = compiled.call(get("/one")).await;
        let second = compiled.call(Request::builder(Method::Post, "/two")).await;

        assert_eq!(first.body(), b"GET /one");
        assert_eq!(second.body(), b"POST /two");
        assert_eq!(second.headers.iter().filter(|(k, _)| k == "x-tag").count(), 1);
        assert_eq!(*log.lock().unwrap(), ["h", "h"]);
    }

    #[tokio::test]
    async fn concurrent_calls_are_independent() {
        let log = Log::default();
        let compiled = compile(endpoint(&log), vec![probe("m0", &log, None)]);

        let tasks: Vec<_> = (0..16)
            .map(|i| {
                let compiled = Arc::clone(&compiled);
                tokio::spawn(async move { compiled.call(get(&format!("/{i}"))).await })
            })
            .collect();

        for (i, task) in tasks.into_iter().enumerate() {
            let res = task.await.unwrap();
            assert_eq!(res.body(), format!("GET /{i}").as_bytes());
        }
        assert_eq!(log.lock().unwrap().len(), 32);
    }

    proptest! {
        #[test]
        fn order_is_preserved_for_any_chain_length(len in 0usize..12) {
            let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
            let log = Log::default();
            let chain = (0..len).map(|i| probe(&format!("m{i}"), &log, None)).collect();
            let compiled = compile(endpoint(&log), chain);

            let res = rt.block_on(compiled.call(get("/p")));

            let mut expected: Vec<String> = (0..len).map(|i| format!("m{i}")).collect();
            expected.push("h".to_owned());
            prop_assert_eq!(res.status_code(), StatusCode::OK);
            prop_assert_eq!(log.lock().unwrap().clone(), expected);
        }

        #[test]
        fn first_denying_gate_wins(len in 1usize..10, stop in 0usize..10) {
            let stop = stop % len;
            let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
            let log = Log::default();
            let chain = (0..len)
                .map(|i| {
                    let stop_with = (i == stop).then_some(StatusCode::FORBIDDEN);
                    probe(&format!("m{i}"), &log, stop_with)
                })
                .collect();
            let compiled = compile(endpoint(&log), chain);

            let res = rt.block_on(compiled.call(get("/p")));

            let expected: Vec<String> = (0..=stop).map(|i| format!("m{i}")).collect();
            prop_assert_eq!(res.status_code(), StatusCode::FORBIDDEN);
            let expected_body = format!("m{stop}");
            prop_assert_eq!(res.body(), expected_body.as_bytes());
            prop_assert_eq!(log.lock().unwrap().clone(), expected);
        }
    }
}
