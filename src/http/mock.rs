//! In-memory transport for tests.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};

use super::{render_url, HttpResponse, Transport, TransportError};

#[derive(Debug, Clone)]
enum MockReply {
    Response(HttpResponse),
    Error(TransportError),
}

/// Transport that replays canned responses and records every request.
///
/// Replies are queued per rendered URL (including query string). When a
/// queue holds a single reply it is repeated for every later request;
/// requests for unknown URLs receive a 404.
#[derive(Debug, Default)]
pub struct MockTransport {
    replies: Mutex<HashMap<String, VecDeque<MockReply>>>,
    requests: Mutex<Vec<String>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockTransport {
    /// Create an empty mock transport
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response for a URL
    pub fn respond(&self, url: &str, query: &[(&str, &str)], response: HttpResponse) {
        self.push(url, query, MockReply::Response(response));
    }

    /// Queue a JSON body with the given status
    pub fn respond_json(&self, url: &str, query: &[(&str, &str)], status: u16, body: &str) {
        self.respond(url, query, HttpResponse::new(status, body));
    }

    /// Queue a transport failure for a URL
    pub fn fail(&self, url: &str, query: &[(&str, &str)], msg: &str) {
        self.fail_with(url, query, TransportError::new(msg));
    }

    pub fn fail_with(&self, url: &str, query: &[(&str, &str)], error: TransportError) {
        self.push(url, query, MockReply::Error(error));
    }

    fn push(&self, url: &str, query: &[(&str, &str)], reply: MockReply) {
        lock(&self.replies)
            .entry(render_url(url, query))
            .or_default()
            .push_back(reply);
    }

    /// Every URL requested so far, in order
    pub fn requests(&self) -> Vec<String> {
        lock(&self.requests).clone()
    }

    /// Number of requests made so far
    pub fn request_count(&self) -> usize {
        lock(&self.requests).len()
    }

    /// Number of requests whose rendered URL starts with `prefix`
    pub fn count_matching(&self, prefix: &str) -> usize {
        lock(&self.requests)
            .iter()
            .filter(|r| r.starts_with(prefix))
            .count()
    }
}

impl Transport for MockTransport {
    fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<HttpResponse, TransportError> {
        let key = render_url(url, query);
        lock(&self.requests).push(key.clone());

        let mut replies = lock(&self.replies);
        let reply = match replies.get_mut(&key) {
            Some(queue) if queue.len() > 1 => queue.pop_front(),
            Some(queue) => queue.front().cloned(),
            None => None,
        };

        match reply {
            Some(MockReply::Response(response)) => Ok(response),
            Some(MockReply::Error(err)) => Err(err),
            None => Ok(HttpResponse::new(404, "")),
        }
    }
}
