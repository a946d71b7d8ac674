//! Mock implementations for testing.
//!
//! In-memory stand-ins for every external collaborator the pipeline talks to,
//! shared across the integration test files.

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use researcher::browser::{BrowserLauncher, BrowserSession};
use researcher::llm::{CompletionClient, CompletionOptions};
use researcher::scout::{ProfileCloner, Scout};
use researcher::tools::{FetchedPage, PageFetcher, SearchHit, WebSearch};
use researcher::types::{AppError, ResearchFinding, ResearchTask, Result};
use std::collections::HashMap;
use std::collections::VecDeque;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

// ============= Completion =============

/// Mock completion client replaying scripted results.
///
/// Each call pops the next scripted result; once the script is exhausted the
/// last entry repeats.
pub struct MockCompletionClient {
    script: Mutex<VecDeque<std::result::Result<String, String>>>,
    last: Mutex<Option<std::result::Result<String, String>>>,
    calls: AtomicUsize,
    options: Mutex<Vec<CompletionOptions>>,
}

impl MockCompletionClient {
    fn scripted(script: Vec<std::result::Result<String, String>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            last: Mutex::new(None),
            calls: AtomicUsize::new(0),
            options: Mutex::new(Vec::new()),
        }
    }

    /// Always answer with `response`
    pub fn new(response: &str) -> Self {
        Self::scripted(vec![Ok(response.to_string())])
    }

    /// Always fail with a non-quota error
    pub fn failing() -> Self {
        Self::scripted(vec![Err("HTTP 500: INTERNAL mock failure".to_string())])
    }

    /// Always fail with a quota error
    pub fn quota_exhausted() -> Self {
        Self::scripted(vec![Err(
            "HTTP 429: RESOURCE_EXHAUSTED quota exceeded".to_string()
        )])
    }

    /// Fail with quota errors `failures` times, then answer with `response`
    pub fn quota_then(failures: usize, response: &str) -> Self {
        let mut script: Vec<_> = (0..failures)
            .map(|_| Err("429 Too Many Requests".to_string()))
            .collect();
        script.push(Ok(response.to_string()));
        Self::scripted(script)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn options(&self) -> Vec<CompletionOptions> {
        self.options.lock().clone()
    }
}

#[async_trait]
impl CompletionClient for MockCompletionClient {
    async fn complete(&self, _prompt: &str, options: CompletionOptions) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.options.lock().push(options);

        let next = self.script.lock().pop_front();
        let result = match next {
            Some(result) => {
                *self.last.lock() = Some(result.clone());
                result
            }
            None => self
                .last
                .lock()
                .clone()
                .unwrap_or_else(|| Err("empty script".to_string())),
        };
        result.map_err(AppError::LLM)
    }

    fn model_name(&self) -> &str {
        "mock-model"
    }
}

// ============= Search / Fetch =============

/// Search returning canned hits per query; unknown queries return nothing
#[derive(Default)]
pub struct MockSearch {
    hits: HashMap<String, Vec<SearchHit>>,
    failing: Vec<String>,
    pub queries: Mutex<Vec<(String, usize)>>,
}

impl MockSearch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_hits(mut self, query: &str, urls: &[&str]) -> Self {
        let hits = urls
            .iter()
            .enumerate()
            .map(|(i, url)| SearchHit {
                url: url.to_string(),
                title: format!("Result {} for {}", i + 1, query),
                snippet: String::new(),
            })
            .collect();
        self.hits.insert(query.to_string(), hits);
        self
    }

    pub fn failing_on(mut self, query: &str) -> Self {
        self.failing.push(query.to_string());
        self
    }
}

#[async_trait]
impl WebSearch for MockSearch {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>> {
        self.queries.lock().push((query.to_string(), max_results));
        if self.failing.iter().any(|q| q == query) {
            return Err(AppError::Search(format!("mock search failure for {}", query)));
        }
        Ok(self
            .hits
            .get(query)
            .map(|hits| hits.iter().take(max_results).cloned().collect())
            .unwrap_or_default())
    }
}

/// Fetcher serving canned pages; unknown URLs fail like a refused connection
#[derive(Default)]
pub struct MockFetcher {
    pages: HashMap<String, FetchedPage>,
    pub requests: Mutex<Vec<String>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: &str, status: u16, body: &str) -> Self {
        self.pages.insert(
            url.to_string(),
            FetchedPage {
                status,
                body: body.to_string(),
            },
        );
        self
    }
}

#[async_trait]
impl PageFetcher for MockFetcher {
    async fn get(&self, url: &str, _timeout: Duration) -> Result<FetchedPage> {
        self.requests.lock().push(url.to_string());
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| AppError::Fetch(format!("{}: connection refused", url)))
    }
}

pub fn html_page(title: &str, paragraphs: &[&str]) -> String {
    let body: String = paragraphs.iter().map(|p| format!("<p>{}</p>", p)).collect();
    format!(
        "<html><head><title>{}</title></head><body>{}</body></html>",
        title, body
    )
}

// ============= Browser =============

/// Shared counters for sessions launched by [`MockLauncher`]
#[derive(Default)]
pub struct BrowserStats {
    pub launches: AtomicUsize,
    pub closes: AtomicUsize,
    pub active: AtomicUsize,
    pub max_active: AtomicUsize,
    pub profile_dirs: Mutex<Vec<PathBuf>>,
    pub navigations: Mutex<Vec<String>>,
}

/// Launcher whose sessions serve text per URL and record concurrency
pub struct MockLauncher {
    pub stats: Arc<BrowserStats>,
    pages: HashMap<String, (String, String)>,
    fail_launch: bool,
    nav_delay: Duration,
}

impl MockLauncher {
    pub fn new() -> Self {
        Self {
            stats: Arc::new(BrowserStats::default()),
            pages: HashMap::new(),
            fail_launch: false,
            nav_delay: Duration::from_millis(20),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail_launch: true,
            ..Self::new()
        }
    }

    /// Serve `text` with page title `title` at `url`; other URLs fail to load
    pub fn with_page(mut self, url: &str, title: &str, text: &str) -> Self {
        self.pages
            .insert(url.to_string(), (title.to_string(), text.to_string()));
        self
    }
}

#[async_trait]
impl BrowserLauncher for MockLauncher {
    async fn launch(&self, profile_dir: &Path) -> Result<Box<dyn BrowserSession>> {
        if self.fail_launch {
            return Err(AppError::Browser("mock launch failure".to_string()));
        }
        self.stats.launches.fetch_add(1, Ordering::SeqCst);
        self.stats.profile_dirs.lock().push(profile_dir.to_path_buf());
        let active = self.stats.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.stats.max_active.fetch_max(active, Ordering::SeqCst);

        Ok(Box::new(MockSession {
            stats: self.stats.clone(),
            pages: self.pages.clone(),
            nav_delay: self.nav_delay,
            current: Mutex::new(None),
        }))
    }
}

struct MockSession {
    stats: Arc<BrowserStats>,
    pages: HashMap<String, (String, String)>,
    nav_delay: Duration,
    current: Mutex<Option<String>>,
}

#[async_trait]
impl BrowserSession for MockSession {
    async fn navigate(&self, url: &str, _timeout: Duration) -> Result<()> {
        tokio::time::sleep(self.nav_delay).await;
        self.stats.navigations.lock().push(url.to_string());
        if !self.pages.contains_key(url) {
            return Err(AppError::Browser(format!("net::ERR_NAME_NOT_RESOLVED {}", url)));
        }
        *self.current.lock() = Some(url.to_string());
        Ok(())
    }

    async fn title(&self) -> Result<String> {
        let current = self.current.lock().clone().unwrap_or_default();
        Ok(self
            .pages
            .get(&current)
            .map(|(title, _)| title.clone())
            .unwrap_or_default())
    }

    async fn current_url(&self) -> Result<String> {
        Ok(self.current.lock().clone().unwrap_or_default())
    }

    async fn extract_text(&self) -> Result<String> {
        let current = self.current.lock().clone().unwrap_or_default();
        Ok(self
            .pages
            .get(&current)
            .map(|(_, text)| text.clone())
            .unwrap_or_default())
    }

    async fn close(&self) -> Result<()> {
        self.stats.closes.fetch_add(1, Ordering::SeqCst);
        self.stats.active.fetch_sub(1, Ordering::SeqCst);
        Ok(())
    }
}

// ============= Profile copy =============

/// Cloner that counts invocations and takes a while to finish
pub struct CountingCloner {
    pub calls: AtomicUsize,
    delay: Duration,
}

impl CountingCloner {
    pub fn new(delay: Duration) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            delay,
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ProfileCloner for CountingCloner {
    fn clone_profile(&self, _source: &Path, _dest: &Path, _excluded: &[String]) -> io::Result<u64> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        std::thread::sleep(self.delay);
        Ok(0)
    }
}

// ============= Scouts =============

/// Scout returning fixed findings, optionally after a delay or by panicking
pub struct StubScout {
    name: String,
    urls: Vec<String>,
    delay: Duration,
    panics: bool,
    pub gathered: Mutex<Vec<String>>,
    pub cleanups: AtomicUsize,
}

impl StubScout {
    pub fn new(name: &str, urls: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            urls: urls.iter().map(|u| u.to_string()).collect(),
            delay: Duration::ZERO,
            panics: false,
            gathered: Mutex::new(Vec::new()),
            cleanups: AtomicUsize::new(0),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn panicking(name: &str) -> Self {
        Self {
            panics: true,
            ..Self::new(name, &[])
        }
    }
}

#[async_trait]
impl Scout for StubScout {
    fn name(&self) -> &str {
        &self.name
    }

    async fn gather(&self, task: &ResearchTask) -> Vec<ResearchFinding> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.panics {
            panic!("scout {} blew up", self.name);
        }
        self.gathered.lock().push(task.id.clone());
        self.urls
            .iter()
            .map(|url| ResearchFinding::new(url.clone(), "stub content", 0.9, &self.name))
            .collect()
    }

    fn cleanup(&self) {
        self.cleanups.fetch_add(1, Ordering::SeqCst);
    }
}
