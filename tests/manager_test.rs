// Integration tests for the library media manager facade.

mod common;

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::oneshot;

use common::{image_items, video_item, CacheCall, FakeBackend, RecordingCache};
use ma_gallery_engine::engine::backend::OutputFileType;
use ma_gallery_engine::engine::dispatch::MainQueue;
use ma_gallery_engine::engine::progress::ProgressSink;
use ma_gallery_engine::geometry::rect::Rect;
use ma_gallery_engine::library::grid::GridLayout;
use ma_gallery_engine::{EngineConfig, LibraryMediaManager};

fn config(dir: &tempfile::TempDir) -> EngineConfig {
    EngineConfig {
        screen_width: 400.0,
        screen_scale: 1.0,
        output_file_type: OutputFileType::Mov,
        temp_dir: Some(dir.path().to_path_buf()),
        ..EngineConfig::default()
    }
}

fn null_sink() -> Arc<dyn ProgressSink> {
    Arc::new(|_: f32| {})
}

#[tokio::test]
async fn test_fetch_result_lifecycle() {
    let dir = tempfile::tempdir().unwrap();
    let cache = Arc::new(RecordingCache::default());
    let (backend, _sessions) = FakeBackend::new(Duration::from_secs(10));
    let mut manager = LibraryMediaManager::new(config(&dir), cache.clone(), backend, MainQueue::spawn());

    manager.initialize();
    assert!(!manager.has_result_items());
    assert!(manager.asset(0).is_none());

    let layout = GridLayout::fitting_width(400.0, 4, 0.0, 0);
    assert!(manager
        .update_cached_assets(Rect::new(0.0, 0.0, 400.0, 800.0), &layout)
        .is_none());

    let generation = manager.set_fetch_result(image_items(100));
    assert_eq!(generation, 1);
    assert!(manager.has_result_items());
    assert_eq!(manager.asset(99).unwrap().local_id, "img-99");
    assert!(manager.asset(100).is_none());

    let layout = GridLayout::fitting_width(400.0, 4, 0.0, 100);
    let delta = manager
        .update_cached_assets(Rect::new(0.0, 0.0, 400.0, 800.0), &layout)
        .unwrap();
    assert_eq!(delta.to_start.len(), 48);

    let calls = cache.calls.lock();
    assert_eq!(calls[0], CacheCall::Reset);
    assert_eq!(calls[1], CacheCall::Reset);
    assert!(matches!(&calls[2], CacheCall::Start(ids, size, _) if ids.len() == 48 && size.width == 100.0));
}

#[tokio::test]
async fn test_new_generation_resets_window() {
    let dir = tempfile::tempdir().unwrap();
    let cache = Arc::new(RecordingCache::default());
    let (backend, _sessions) = FakeBackend::new(Duration::from_secs(10));
    let mut manager = LibraryMediaManager::new(config(&dir), cache.clone(), backend, MainQueue::spawn());

    manager.set_fetch_result(image_items(100));
    let layout = GridLayout::fitting_width(400.0, 4, 0.0, 100);
    let bounds = Rect::new(0.0, 0.0, 400.0, 800.0);
    assert!(manager.update_cached_assets(bounds, &layout).is_some());
    assert!(manager.update_cached_assets(bounds, &layout).is_none());

    assert_eq!(manager.set_fetch_result(image_items(100)), 2);
    // Same viewport, new generation: warmed again.
    assert!(manager.update_cached_assets(bounds, &layout).is_some());
}

#[tokio::test]
async fn test_crop_export_through_manager() {
    let dir = tempfile::tempdir().unwrap();
    let cache = Arc::new(RecordingCache::default());
    let (backend, mut sessions) = FakeBackend::new(Duration::from_secs(30));
    let manager = LibraryMediaManager::new(config(&dir), cache, backend.clone(), MainQueue::spawn());

    let (tx, rx) = oneshot::channel();
    manager.fetch_video_url_and_crop(
        video_item("vid", 30.0),
        Rect::new(0.0, 0.0, 1080.0, 1080.0),
        null_sink(),
        move |result| {
            let _ = tx.send(result);
        },
    );
    sessions.recv().await.unwrap().complete();

    let url = rx.await.unwrap().unwrap();
    assert_eq!(url.parent(), Some(dir.path()));
    assert_eq!(url.extension().and_then(|e| e.to_str()), Some("mov"));
    assert!(manager.registry().is_empty());
    assert_eq!(
        backend.exports.lock()[0].composition.duration(),
        Duration::from_secs(30)
    );
}

#[tokio::test]
async fn test_force_cancel_exporting() {
    let dir = tempfile::tempdir().unwrap();
    let cache = Arc::new(RecordingCache::default());
    let (backend, mut sessions) = FakeBackend::new(Duration::from_secs(30));
    let manager = LibraryMediaManager::new(config(&dir), cache, backend, MainQueue::spawn());

    assert_eq!(manager.force_cancel_exporting(), 0);

    let outcomes = Arc::new(Mutex::new(Vec::new()));
    let (tx, rx) = oneshot::channel();
    let recorded = outcomes.clone();
    manager.fetch_video_url_and_crop_with_duration(
        video_item("vid", 30.0),
        Rect::new(0.0, 0.0, 720.0, 720.0),
        Some(Duration::from_secs(5)),
        null_sink(),
        move |result| {
            recorded.lock().push(result.is_err());
            let _ = tx.send(());
        },
    );
    let session = sessions.recv().await.unwrap();

    assert_eq!(manager.force_cancel_exporting(), 1);
    rx.await.unwrap();
    assert!(session.cancelled.load(std::sync::atomic::Ordering::SeqCst));
    assert_eq!(*outcomes.lock(), vec![true]);
    assert!(manager.registry().all_sessions().is_empty());
}
