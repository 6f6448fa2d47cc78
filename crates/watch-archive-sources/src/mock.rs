//! Scripted in-memory transport for tests. Responses are matched by URL
//! substring in registration order; every requested URL is recorded.

use crate::error::AttemptError;
use crate::http::{HttpResponse, Transport};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

struct Route {
    needle: String,
    // The last response repeats once the queue is down to one
    responses: VecDeque<Result<HttpResponse, AttemptError>>,
}

#[derive(Default)]
pub struct ScriptedTransport {
    routes: Mutex<Vec<Route>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Always answer URLs containing `needle` with the given status and body
    pub fn route(self, needle: &str, status: u16, body: impl Into<String>) -> Self {
        self.route_sequence(
            needle,
            vec![Ok(HttpResponse {
                status,
                body: body.into(),
            })],
        )
    }

    /// Answer successive requests for `needle` with `responses` in order
    pub fn route_sequence(self, needle: &str, responses: Vec<Result<HttpResponse, AttemptError>>) -> Self {
        self.routes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Route {
                needle: needle.to_string(),
                responses: responses.into(),
            });
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn calls_matching(&self, needle: &str) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|url| url.contains(needle))
            .count()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn get(&self, url: &str) -> Result<HttpResponse, AttemptError> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(url.to_string());

        let mut routes = self.routes.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(route) = routes.iter_mut().find(|r| url.contains(&r.needle)) else {
            return Ok(HttpResponse::with_status(404));
        };

        let next = if route.responses.len() > 1 {
            route.responses.pop_front()
        } else {
            route.responses.front().cloned()
        };
        next.unwrap_or_else(|| Ok(HttpResponse::with_status(404)))
    }
}
