pub mod errors;
pub mod fetcher;

pub use errors::{ErrorKind, FetchError};
pub use fetcher::{validate_url, HttpConfig, HttpFetcher, JsonFetcher};

#[cfg(test)]
pub mod testing {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use serde_json::Value;

    use super::{FetchError, JsonFetcher};

    #[derive(Clone)]
    struct Scripted {
        delay: Duration,
        responses: Vec<Result<Value, FetchError>>,
    }

    /// In-memory fetcher keyed by URL. Each URL replays its responses in order
    /// and repeats the last one once the script runs out.
    #[derive(Default)]
    pub struct ScriptedFetcher {
        scripts: Mutex<HashMap<String, Scripted>>,
        calls: Mutex<HashMap<String, usize>>,
        total: AtomicUsize,
    }

    impl ScriptedFetcher {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn respond(self, url: &str, responses: Vec<Result<Value, FetchError>>) -> Self {
            self.respond_after(url, Duration::ZERO, responses)
        }

        pub fn respond_after(
            self,
            url: &str,
            delay: Duration,
            responses: Vec<Result<Value, FetchError>>,
        ) -> Self {
            self.scripts
                .lock()
                .unwrap()
                .insert(url.to_string(), Scripted { delay, responses });
            self
        }

        pub fn calls(&self, url: &str) -> usize {
            self.calls.lock().unwrap().get(url).copied().unwrap_or(0)
        }

        pub fn total_calls(&self) -> usize {
            self.total.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl JsonFetcher for ScriptedFetcher {
        async fn fetch_json(&self, url: &str) -> Result<Value, FetchError> {
            self.total.fetch_add(1, Ordering::SeqCst);
            let (delay, response) = {
                let mut calls = self.calls.lock().unwrap();
                let index = calls.entry(url.to_string()).or_insert(0);
                let scripts = self.scripts.lock().unwrap();
                let Some(script) = scripts.get(url) else {
                    return Err(FetchError::Transport(format!("no route to {url}")));
                };
                let pick = (*index).min(script.responses.len().saturating_sub(1));
                *index += 1;
                let response = script
                    .responses
                    .get(pick)
                    .cloned()
                    .unwrap_or_else(|| Err(FetchError::Transport("empty script".into())));
                (script.delay, response)
            };

            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            response
        }
    }
}
