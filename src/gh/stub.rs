use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use super::runner::{ProcessOutput, ProcessRunner};

/// One canned reply, optionally delivered after a delay.
#[derive(Debug, Clone)]
pub struct StubResponse {
    pub output: ProcessOutput,
    pub delay: Duration,
}

impl StubResponse {
    pub fn stdout(stdout: impl Into<String>) -> Self {
        Self {
            output: ProcessOutput::success(stdout),
            delay: Duration::ZERO,
        }
    }

    pub fn fail(stderr: impl Into<String>) -> Self {
        Self {
            output: ProcessOutput::failure(stderr),
            delay: Duration::ZERO,
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

struct StubRule {
    pattern: Vec<String>,
    responses: VecDeque<StubResponse>,
}

/// A process runner that serves scripted replies without spawning anything.
///
/// A rule matches when every pattern token appears among the invocation's
/// arguments; the first matching rule wins. Queued responses are consumed in
/// order and the last one repeats. Unmatched invocations fail.
///
/// Useful for integration tests and demos that must not require a `gh` login.
#[derive(Default)]
pub struct StubRunner {
    rules: Mutex<Vec<StubRule>>,
    calls: Mutex<Vec<Vec<String>>>,
}

impl StubRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `response` for invocations containing all of `pattern`.
    ///
    /// Calling `on` again with the same pattern appends to that rule's queue.
    pub fn on(self, pattern: &[&str], response: StubResponse) -> Self {
        {
            let mut rules = self.rules.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
            let pattern: Vec<String> = pattern.iter().map(|&p| p.to_owned()).collect();
            if let Some(rule) = rules.iter_mut().find(|r| r.pattern == pattern) {
                rule.responses.push_back(response);
            } else {
                rules.push(StubRule {
                    pattern,
                    responses: VecDeque::from([response]),
                });
            }
        }
        self
    }

    /// Every argument list seen so far, in invocation order.
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    /// Number of invocations whose arguments contain all of `pattern`.
    pub fn call_count(&self, pattern: &[&str]) -> usize {
        self.calls()
            .iter()
            .filter(|args| pattern.iter().all(|p| args.iter().any(|a| a == p)))
            .count()
    }

    fn next_response(&self, args: &[String]) -> StubResponse {
        let mut rules = self.rules.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let Some(rule) = rules
            .iter_mut()
            .find(|r| r.pattern.iter().all(|p| args.contains(p)))
        else {
            return StubResponse::fail(format!("stub: no reply for {args:?}"));
        };
        if rule.responses.len() > 1 {
            rule.responses.pop_front().unwrap_or_else(|| StubResponse::fail("stub: empty"))
        } else {
            rule.responses
                .front()
                .cloned()
                .unwrap_or_else(|| StubResponse::fail("stub: empty"))
        }
    }
}

impl ProcessRunner for StubRunner {
    async fn invoke(&self, _binary: &str, args: &[String]) -> ProcessOutput {
        self.calls
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(args.to_vec());
        let response = self.next_response(args);
        if !response.delay.is_zero() {
            tokio::time::sleep(response.delay).await;
        }
        response.output
    }
}
