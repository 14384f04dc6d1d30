//! Popular-terms panel driven through `LeaderboardViewer`.

use std::time::Duration;

use typeahead::leaderboard::{LOAD_ERROR_MESSAGE, LeaderboardView, LeaderboardViewer};
use typeahead::service::{InMemoryService, ServiceError};

mod util;
use util::{GatedService, items};

#[tokio::test]
async fn failure_shows_retry_then_retry_shows_ranking() {
    let svc = GatedService::new();
    svc.script_top(Err(ServiceError::Status {
        status: 503,
        body: "unavailable".into(),
    }));
    svc.script_top(Ok(items(&[("javascript", 2300), ("java", 2200), ("python", 2100)])));
    let mut board = LeaderboardViewer::new(svc.clone(), 10);

    board.load();
    assert_eq!(board.view(), LeaderboardView::Loading);
    assert_eq!(board.process_next().await, Some(true));
    assert_eq!(
        board.view(),
        LeaderboardView::Failed {
            message: LOAD_ERROR_MESSAGE
        }
    );

    board.load();
    assert_eq!(board.process_next().await, Some(true));
    match board.view() {
        LeaderboardView::Ranked { entries } => {
            assert_eq!(entries.len(), 3);
            assert_eq!(entries[0].term, "javascript");
        }
        other => panic!("expected ranking, got {other:?}"),
    }
    assert_eq!(board.state().bar_percent(0), Some(100.0));
    assert_eq!(svc.top_calls(), 2);
}

#[tokio::test]
async fn empty_service_renders_empty_state() {
    let svc = GatedService::new();
    let mut board = LeaderboardViewer::new(svc, 10);
    board.load();
    board.process_next().await;
    assert_eq!(board.view(), LeaderboardView::Empty);
}

#[tokio::test]
async fn overlapping_retries_apply_only_the_latest() {
    let svc = GatedService::new();
    svc.script_top(Ok(items(&[("old", 1)])));
    svc.script_top(Ok(items(&[("new", 2)])));
    let mut board = LeaderboardViewer::new(svc, 10);

    board.load();
    board.load();
    let mut applied = 0;
    for _ in 0..2 {
        if board.process_next().await == Some(true) {
            applied += 1;
        }
    }
    assert_eq!(applied, 1);
    assert!(!board.state().is_loading());
    assert_eq!(board.state().entries().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn seeded_store_ranks_by_frequency() {
    let svc = std::sync::Arc::new(InMemoryService::seeded().with_latency(Duration::from_millis(20)));
    let mut board = LeaderboardViewer::new(svc, 5);
    board.load();
    assert!(board.state().is_loading());
    board.process_next().await;

    let entries = board.state().entries();
    assert_eq!(entries.len(), 5);
    assert!(entries.windows(2).all(|w| w[0].frequency >= w[1].frequency));
}
