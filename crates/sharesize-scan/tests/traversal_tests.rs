use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use sharesize_scan::{
    Entry, FetchError, FolderNode, Page, PageFetcher, Phase, TraversalConfig, TraversalEngine,
    TraversalError, WarningKind,
};
use tokio_util::sync::CancellationToken;

/// How a scripted page behaves.
#[derive(Clone)]
enum Script {
    Ok(Vec<Entry>),
    AlwaysTransient,
    Missing,
    FailTimes(usize, Vec<Entry>),
}

/// In-memory drive with scripted pages per folder.
#[derive(Default)]
struct FakeDrive {
    pages: HashMap<String, Vec<Script>>,
    delays: HashMap<String, Duration>,
    cancel_after: HashMap<String, CancellationToken>,
    calls: Mutex<HashMap<String, usize>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeDrive {
    fn new() -> Self {
        Self::default()
    }

    fn folder(mut self, path: &str, pages: Vec<Script>) -> Self {
        self.pages.insert(path.to_string(), pages);
        self
    }

    fn delay(mut self, path: &str, delay: Duration) -> Self {
        self.delays.insert(path.to_string(), delay);
        self
    }

    /// Cancel `token` once `path` has answered.
    fn cancel_after(mut self, path: &str, token: CancellationToken) -> Self {
        self.cancel_after.insert(path.to_string(), token);
        self
    }

    fn calls(&self, path: &str) -> usize {
        self.calls.lock().unwrap().get(path).copied().unwrap_or(0)
    }
}

impl PageFetcher for FakeDrive {
    async fn list_children(
        &self,
        path: &str,
        page_token: Option<&str>,
    ) -> Result<Page, FetchError> {
        let index: usize = page_token.map(|t| t.parse().unwrap()).unwrap_or(0);
        let call = {
            let mut calls = self.calls.lock().unwrap();
            let count = calls.entry(path.to_string()).or_insert(0);
            *count += 1;
            *count
        };

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);
        if let Some(delay) = self.delays.get(path) {
            tokio::time::sleep(*delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        if let Some(token) = self.cancel_after.get(path) {
            token.cancel();
        }

        let pages = match self.pages.get(path) {
            Some(pages) => pages,
            None => return Ok(Page::last(Vec::new())),
        };
        let next = (index + 1 < pages.len()).then(|| (index + 1).to_string());

        match &pages[index] {
            Script::Ok(entries) => Ok(Page::new(entries.clone(), next)),
            Script::AlwaysTransient => Err(FetchError::transient("connection reset")),
            Script::Missing => Err(FetchError::NotFound { path: path.into() }),
            Script::FailTimes(times, entries) => {
                if call <= *times {
                    Err(FetchError::Throttled {
                        retry_after: Some(Duration::from_millis(5)),
                    })
                } else {
                    Ok(Page::new(entries.clone(), next))
                }
            }
        }
    }
}

fn file(parent: &str, name: &str, size: u64) -> Entry {
    Entry::file(format!("{parent}/{name}"), name, size, None)
}

fn folder(parent: &str, name: &str) -> Entry {
    Entry::folder(format!("{parent}/{name}"), name)
}

fn config(root: &str) -> TraversalConfig {
    TraversalConfig::builder()
        .root(root)
        .concurrency(4usize)
        .max_attempts(3u32)
        .base_delay_ms(10u64)
        .max_delay_ms(50u64)
        .top_n(2usize)
        .build()
        .unwrap()
}

fn names(node: &FolderNode) -> Vec<&str> {
    node.subfolders.iter().map(|s| s.name.as_str()).collect()
}

fn scenario_drive() -> FakeDrive {
    FakeDrive::new()
        .folder(
            "A",
            vec![Script::Ok(vec![
                file("A", "f1", 100),
                file("A", "f2", 300),
                folder("A", "B"),
            ])],
        )
        .folder("A/B", vec![Script::Ok(vec![file("A/B", "f3", 50)])])
}

#[tokio::test(start_paused = true)]
async fn test_scenario_totals_and_top_files() {
    let engine = TraversalEngine::new(scenario_drive(), config("A"));
    let tree = engine.run().await.unwrap();

    assert_eq!(tree.root.name.as_str(), "A");
    assert_eq!(tree.root.total_size, 450);
    assert_eq!(tree.root.file_count, 3);
    assert_eq!(tree.root.folder_count, 1);
    assert!(tree.root.is_consistent());
    assert!(tree.warnings.is_empty());

    let top: Vec<(&str, u64)> = tree
        .top_files
        .iter()
        .map(|r| (r.name.as_str(), r.size))
        .collect();
    assert_eq!(top, vec![("f2", 300), ("f1", 100)]);
}

#[tokio::test(start_paused = true)]
async fn test_empty_folder() {
    let drive = FakeDrive::new().folder("Empty", vec![Script::Ok(Vec::new())]);
    let tree = TraversalEngine::new(drive, config("Empty"))
        .run()
        .await
        .unwrap();

    assert_eq!(tree.root.total_size, 0);
    assert_eq!(tree.root.file_count, 0);
    assert_eq!(tree.root.folder_count, 0);
    assert!(tree.root.files.is_empty());
    assert!(tree.root.subfolders.is_empty());
    assert!(tree.top_files.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_folder_with_only_subfolders() {
    let drive = FakeDrive::new()
        .folder("R", vec![Script::Ok(vec![folder("R", "X"), folder("R", "Y")])])
        .folder("R/X", vec![Script::Ok(vec![file("R/X", "x", 10)])])
        .folder("R/Y", vec![Script::Ok(vec![file("R/Y", "y", 20)])]);

    let tree = TraversalEngine::new(drive, config("R")).run().await.unwrap();

    assert!(tree.root.files.is_empty());
    assert_eq!(tree.root.total_size, 30);
    assert_eq!(tree.root.file_count, 2);
    assert_eq!(tree.root.folder_count, 2);
}

#[tokio::test(start_paused = true)]
async fn test_pagination_preserves_order() {
    let drive = FakeDrive::new().folder(
        "P",
        vec![
            Script::Ok(vec![file("P", "a", 1), folder("P", "S1")]),
            Script::Ok(vec![file("P", "b", 2)]),
            Script::Ok(vec![folder("P", "S2"), file("P", "c", 3)]),
        ],
    );

    let tree = TraversalEngine::new(drive, config("P")).run().await.unwrap();

    let files: Vec<&str> = tree.root.files.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(files, vec!["a", "b", "c"]);
    assert_eq!(names(&tree.root), vec!["S1", "S2"]);
    assert_eq!(tree.root.total_size, 6);
}

#[tokio::test(start_paused = true)]
async fn test_system_entries_excluded() {
    let drive = FakeDrive::new().folder(
        "Docs",
        vec![Script::Ok(vec![
            folder("Docs", "Forms"),
            folder("Docs", "_catalogs"),
            file("Docs", "_hidden.aspx", 999),
            folder("Docs", "Reports"),
            file("Docs", "plan.docx", 10),
        ])],
    );

    let engine = TraversalEngine::new(drive, config("Docs"));
    let tree = engine.run().await.unwrap();

    assert_eq!(names(&tree.root), vec!["Reports"]);
    assert_eq!(tree.root.files.len(), 1);
    assert_eq!(tree.root.total_size, 10);
    assert_eq!(tree.root.folder_count, 1);
    assert!(tree.top_files.iter().all(|r| r.name.as_str() != "_hidden.aspx"));
}

#[tokio::test(start_paused = true)]
async fn test_system_entries_kept_when_disabled() {
    let drive = FakeDrive::new().folder(
        "Docs",
        vec![Script::Ok(vec![folder("Docs", "Forms"), file("Docs", "_x", 1)])],
    );
    let mut cfg = config("Docs");
    cfg.exclude_system = false;

    let tree = TraversalEngine::new(drive, cfg).run().await.unwrap();

    assert_eq!(names(&tree.root), vec!["Forms"]);
    assert_eq!(tree.root.files.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_failing_subfolder_becomes_warning() {
    let drive = FakeDrive::new()
        .folder(
            "A",
            vec![Script::Ok(vec![
                file("A", "f1", 100),
                file("A", "f2", 300),
                folder("A", "B"),
            ])],
        )
        .folder("A/B", vec![Script::AlwaysTransient]);

    let engine = TraversalEngine::new(drive, config("A"));
    let tree = engine.run().await.unwrap();

    assert_eq!(tree.warnings.len(), 1);
    assert_eq!(tree.warnings[0].path.as_str(), "A/B");
    assert_eq!(tree.warnings[0].kind, WarningKind::RemoteUnavailable);

    assert_eq!(tree.root.total_size, 400);
    assert_eq!(tree.root.file_count, 2);
    assert_eq!(tree.root.folder_count, 1);
    assert!(tree.root.is_consistent());
}

#[tokio::test(start_paused = true)]
async fn test_failure_after_first_page_keeps_partial_files() {
    let drive = FakeDrive::new()
        .folder("A", vec![Script::Ok(vec![folder("A", "B"), folder("A", "C")])])
        .folder(
            "A/B",
            vec![
                Script::Ok(vec![file("A/B", "kept", 70), folder("A/B", "Unvisited")]),
                Script::AlwaysTransient,
            ],
        )
        .folder("A/C", vec![Script::Ok(vec![file("A/C", "c", 5)])]);

    let tree = TraversalEngine::new(drive, config("A")).run().await.unwrap();

    let b = tree.root.find("A/B").unwrap();
    assert_eq!(b.files.len(), 1);
    assert_eq!(b.total_size, 70);
    assert_eq!(names(b), vec!["Unvisited"]);
    assert_eq!(b.folder_count, 1);

    assert_eq!(tree.root.total_size, 75);
    assert_eq!(tree.root.file_count, 2);
    assert_eq!(tree.root.folder_count, 3);
    assert!(tree.root.is_consistent());
    assert_eq!(tree.warnings.len(), 1);
    assert_eq!(tree.warnings[0].path.as_str(), "A/B");
}

#[tokio::test(start_paused = true)]
async fn test_subfolders_before_failed_page_are_counted() {
    let drive = FakeDrive::new()
        .folder("A", vec![Script::Ok(vec![folder("A", "B")])])
        .folder(
            "A/B",
            vec![
                Script::Ok(vec![file("A/B", "k", 70), folder("A/B", "Sub")]),
                Script::AlwaysTransient,
            ],
        )
        .folder(
            "A/B/Sub",
            vec![Script::Ok(vec![file("A/B/Sub", "deep", 30)])],
        );
    let drive = std::sync::Arc::new(drive);

    let tree = TraversalEngine::with_shared(drive.clone(), config("A"))
        .run()
        .await
        .unwrap();

    assert_eq!(drive.calls("A/B/Sub"), 1);
    let sub = tree.root.find("A/B/Sub").unwrap();
    assert_eq!(sub.total_size, 30);

    let b = tree.root.find("A/B").unwrap();
    assert_eq!(b.total_size, 100);
    assert_eq!(b.file_count, 2);
    assert_eq!(b.folder_count, 1);

    assert_eq!(tree.root.total_size, 100);
    assert_eq!(tree.root.folder_count, 2);
    assert!(tree.root.is_consistent());
    assert_eq!(tree.warnings.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_rejected_subfolder_not_retried() {
    let drive = FakeDrive::new()
        .folder("A", vec![Script::Ok(vec![folder("A", "Gone")])])
        .folder("A/Gone", vec![Script::Missing]);

    let engine = TraversalEngine::new(drive, config("A"));
    let tree = engine.run().await.unwrap();

    assert_eq!(tree.warnings.len(), 1);
    assert_eq!(tree.warnings[0].kind, WarningKind::Rejected);
}

#[tokio::test(start_paused = true)]
async fn test_transient_failure_recovers() {
    let drive = FakeDrive::new()
        .folder("A", vec![Script::Ok(vec![folder("A", "Flaky")])])
        .folder(
            "A/Flaky",
            vec![Script::FailTimes(2, vec![file("A/Flaky", "f", 9)])],
        );
    let drive = std::sync::Arc::new(drive);

    let engine = TraversalEngine::with_shared(drive.clone(), config("A"));
    let tree = engine.run().await.unwrap();

    assert!(tree.warnings.is_empty());
    assert_eq!(tree.root.total_size, 9);
    assert_eq!(drive.calls("A/Flaky"), 3);
}

#[tokio::test(start_paused = true)]
async fn test_root_failure_is_fatal() {
    let drive = FakeDrive::new().folder("A", vec![Script::AlwaysTransient]);

    let result = TraversalEngine::new(drive, config("A")).run().await;

    match result {
        Err(TraversalError::RootUnreachable { path, source }) => {
            assert_eq!(path.as_str(), "A");
            assert_eq!(source.attempts, 3);
        }
        other => panic!("expected RootUnreachable, got {other:?}"),
    }
}

fn wide_drive(width: usize) -> FakeDrive {
    let children: Vec<Entry> = (0..width).map(|i| folder("W", &format!("S{i:02}"))).collect();
    let mut drive = FakeDrive::new().folder("W", vec![Script::Ok(children)]);
    for i in 0..width {
        let path = format!("W/S{i:02}");
        // Later folders answer faster, so completion order is reversed.
        drive = drive
            .folder(&path, vec![Script::Ok(vec![file(&path, "f", i as u64 + 1)])])
            .delay(&path, Duration::from_millis((width - i) as u64 * 10));
    }
    drive
}

#[tokio::test(start_paused = true)]
async fn test_concurrency_is_bounded_and_order_is_stable() {
    let drive = std::sync::Arc::new(wide_drive(20));
    let mut cfg = config("W");
    cfg.concurrency = 3;

    let engine = TraversalEngine::with_shared(drive.clone(), cfg);
    let tree = engine.run().await.unwrap();

    assert!(drive.max_in_flight.load(Ordering::SeqCst) <= 3);
    assert!(drive.max_in_flight.load(Ordering::SeqCst) >= 2);

    let expected: Vec<String> = (0..20).map(|i| format!("S{i:02}")).collect();
    let actual: Vec<String> = tree.root.subfolders.iter().map(|s| s.name.to_string()).collect();
    assert_eq!(actual, expected);
    assert_eq!(tree.root.total_size, (1..=20).sum::<u64>());
    assert_eq!(tree.root.folder_count, 20);
}

#[tokio::test(start_paused = true)]
async fn test_repeated_runs_are_identical() {
    let first = TraversalEngine::new(wide_drive(8), config("W"))
        .run()
        .await
        .unwrap();
    let second = TraversalEngine::new(wide_drive(8), config("W"))
        .run()
        .await
        .unwrap();

    assert_eq!(first.root, second.root);
}

#[tokio::test(start_paused = true)]
async fn test_cancelled_before_start() {
    let token = CancellationToken::new();
    token.cancel();

    let engine = TraversalEngine::new(scenario_drive(), config("A")).with_cancellation(token);
    let result = engine.run().await;

    assert!(matches!(result, Err(TraversalError::Interrupted)));
}

#[tokio::test(start_paused = true)]
async fn test_cancelled_after_root_listing() {
    let token = CancellationToken::new();
    let drive = std::sync::Arc::new(scenario_drive().cancel_after("A", token.clone()));

    let engine =
        TraversalEngine::with_shared(drive.clone(), config("A")).with_cancellation(token);
    let result = engine.run().await;

    assert!(matches!(result, Err(TraversalError::Interrupted)));
    assert_eq!(drive.calls("A"), 1);
    assert_eq!(drive.calls("A/B"), 0);
}

#[tokio::test(start_paused = true)]
async fn test_progress_events() {
    let engine = TraversalEngine::new(scenario_drive(), config("A"));
    let mut rx = engine.subscribe();

    engine.run().await.unwrap();

    let mut listed = Vec::new();
    let mut terminal = 0;
    while let Ok(event) = rx.try_recv() {
        if event.is_terminal() {
            terminal += 1;
            assert_eq!(event.folders_done, terminal);
        }
        if event.phase == Phase::Listed {
            listed.push(event.path.to_string());
        }
    }
    listed.sort();
    assert_eq!(listed, vec!["A".to_string(), "A/B".to_string()]);
    assert_eq!(terminal, 2);
}

#[tokio::test(start_paused = true)]
async fn test_failed_folder_ends_with_terminal_event() {
    let drive = FakeDrive::new()
        .folder("A", vec![Script::Ok(vec![folder("A", "Gone")])])
        .folder("A/Gone", vec![Script::Missing]);
    let engine = TraversalEngine::new(drive, config("A"));
    let mut rx = engine.subscribe();

    engine.run().await.unwrap();

    let mut phases = Vec::new();
    while let Ok(event) = rx.try_recv() {
        if event.path.as_str() == "A/Gone" {
            phases.push((event.phase, event.is_terminal()));
        }
    }
    assert_eq!(
        phases,
        vec![(Phase::Listing, false), (Phase::Failed, true)]
    );
}
