use std::fs;
use std::time::Duration;

use degree_planner::catalog::{CatalogOptions, CatalogSource};
use degree_planner::services::{CatalogReloader, CatalogStore};

const SCHEDULE: &str = r"{\rtf1
Course Code\tab Course Title\tab Credits\par
TH 300\tab Christian Ethics\tab 3\par
}";

#[tokio::test]
async fn store_starts_from_sample_when_dir_is_empty() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = CatalogStore::load(CatalogOptions::new(dir.path())).await.expect("load");
    assert_eq!(store.snapshot().await.source, CatalogSource::Sample);
}

#[tokio::test]
async fn reload_swaps_the_snapshot() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = CatalogStore::load(CatalogOptions::new(dir.path())).await.expect("load");
    let before = store.snapshot().await;

    fs::write(dir.path().join("2025-Fall.rtf"), SCHEDULE).expect("write");
    store.reload().await.expect("reload");

    let after = store.snapshot().await;
    assert_eq!(after.source, CatalogSource::Parsed);
    assert_eq!(after.courses().len(), 1);
    // Readers holding the old snapshot keep seeing it.
    assert_eq!(before.source, CatalogSource::Sample);
}

#[tokio::test]
async fn reloader_picks_up_new_documents() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = CatalogStore::load(CatalogOptions::new(dir.path())).await.expect("load");

    let reloader = CatalogReloader::new(store.clone(), 1);
    let reloader_task = tokio::spawn(async move {
        reloader.start().await;
    });

    fs::write(dir.path().join("2025-Fall.rtf"), SCHEDULE).expect("write");

    let mut picked_up = false;
    for _ in 0..25 {
        tokio::time::sleep(Duration::from_millis(200)).await;
        if store.snapshot().await.source == CatalogSource::Parsed {
            picked_up = true;
            break;
        }
    }

    reloader_task.abort();
    assert!(picked_up, "reloader did not publish the parsed catalog within 5s");
}
