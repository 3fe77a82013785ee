//! End-to-end mutation flows against the in-memory table

mod support;

use assert_matches::assert_matches;
use hearth_core::{RecordId, RemoteOp, SyncError};
use std::sync::Arc;
use std::time::Duration;
use support::{rig, Note, NotePatch};
use tokio::task::yield_now;

#[tokio::test]
async fn create_is_visible_immediately_and_promoted_on_ack() {
    let r = rig();
    r.table.hold(RemoteOp::Insert);

    let worker = tokio::spawn({
        let coordinator = Arc::clone(&r.coordinator);
        let note = Note::new(r.household, "optimistic");
        async move { coordinator.create(note).await }
    });
    while r.table.inserts() == 0 {
        yield_now().await;
    }

    // The insert has not answered, yet the row is already visible.
    let rows = r.coordinator.snapshot();
    assert_eq!(rows.len(), 1);
    assert!(rows[0].id.is_local());
    assert_eq!(rows[0].body, "optimistic");

    r.table.release(RemoteOp::Insert);
    worker.await.unwrap();

    let rows = r.coordinator.snapshot();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, RecordId::remote("r1"));
    assert_eq!(rows[0].body, "optimistic");
}

#[tokio::test]
async fn failed_create_removes_the_placeholder() {
    let r = rig();
    r.table.fail_inserts(true);

    r.coordinator.create(Note::new(r.household, "doomed")).await;

    assert!(r.coordinator.snapshot().is_empty());
    assert!(r.table.is_empty());
    assert_matches!(
        r.faults.current(),
        Some(SyncError::RemoteRejected {
            operation: RemoteOp::Insert,
            ..
        })
    );
}

#[tokio::test(start_paused = true)]
async fn burst_of_text_edits_coalesces_into_one_write() {
    let r = rig();
    let stored = r.table.seed(Note::new(r.household, ""));
    r.coordinator.reload().await;

    for text in ["a", "ab", "abc"] {
        r.coordinator.update(&stored.id, NotePatch::body(text)).await;
    }
    assert_eq!(r.coordinator.snapshot()[0].body, "abc");
    assert_eq!(r.table.updates(), 0);

    tokio::time::sleep(Duration::from_millis(600)).await;

    assert_eq!(r.table.updates(), 1);
    assert_eq!(r.table.rows()[0].body, "abc");
    assert!(r.faults.current().is_none());
}

#[tokio::test]
async fn toggles_write_through_immediately() {
    let r = rig();
    let stored = r.table.seed(Note::new(r.household, "note"));
    r.coordinator.reload().await;

    r.coordinator
        .update(&stored.id, NotePatch::pinned(true))
        .await;

    assert_eq!(r.table.updates(), 1);
    assert!(r.table.rows()[0].pinned);
    assert!(r.coordinator.snapshot()[0].pinned);
}

#[tokio::test]
async fn failed_toggle_reverts_the_field() {
    let r = rig();
    let stored = r.table.seed(Note::new(r.household, "note"));
    r.coordinator.reload().await;
    r.table.fail_updates(true);

    r.coordinator
        .update(&stored.id, NotePatch::pinned(true))
        .await;

    assert!(!r.coordinator.snapshot()[0].pinned);
    assert_matches!(
        r.faults.current(),
        Some(SyncError::RemoteRejected {
            operation: RemoteOp::Update,
            ..
        })
    );
}

#[tokio::test(start_paused = true)]
async fn failed_debounced_write_restores_pre_burst_values() {
    let r = rig();
    let stored = r.table.seed(Note::new(r.household, "original"));
    r.coordinator.reload().await;
    r.table.fail_updates(true);

    r.coordinator.update(&stored.id, NotePatch::body("o")).await;
    r.coordinator.update(&stored.id, NotePatch::body("ox")).await;
    assert_eq!(r.coordinator.snapshot()[0].body, "ox");

    tokio::time::sleep(Duration::from_millis(600)).await;

    // The write that fired was rejected; the whole burst rolls back.
    assert_eq!(r.coordinator.snapshot()[0].body, "original");
    assert_eq!(r.table.rows()[0].body, "original");
    assert_matches!(
        r.faults.current(),
        Some(SyncError::RemoteRejected {
            operation: RemoteOp::Update,
            ..
        })
    );
}

#[tokio::test]
async fn updates_for_unknown_records_are_dropped() {
    let r = rig();

    r.coordinator
        .update(&RecordId::remote("r404"), NotePatch::body("x"))
        .await;

    assert_eq!(r.table.updates(), 0);
    assert!(r.faults.current().is_none());
}

#[tokio::test]
async fn empty_patches_are_dropped() {
    let r = rig();
    let stored = r.table.seed(Note::new(r.household, "note"));
    r.coordinator.reload().await;
    let version = r.coordinator.records().version();

    r.coordinator.update(&stored.id, NotePatch::default()).await;

    assert_eq!(r.coordinator.records().version(), version);
    assert_eq!(r.table.updates(), 0);
}

#[tokio::test]
async fn failed_delete_restores_the_exact_order() {
    let r = rig();
    for body in ["a", "b", "c"] {
        r.table.seed(Note::new(r.household, body));
    }
    r.coordinator.reload().await;
    r.table.fail_deletes(true);

    let middle = r.coordinator.snapshot()[1].id.clone();
    r.coordinator.remove(&middle).await;

    let bodies: Vec<String> = r
        .coordinator
        .snapshot()
        .iter()
        .map(|n| n.body.clone())
        .collect();
    assert_eq!(bodies, ["a", "b", "c"]);
    assert_matches!(
        r.faults.current(),
        Some(SyncError::RemoteRejected {
            operation: RemoteOp::Delete,
            ..
        })
    );
}

#[tokio::test]
async fn remove_many_deletes_in_one_round_trip() {
    let r = rig();
    for body in ["a", "b", "c"] {
        r.table.seed(Note::new(r.household, body));
    }
    r.coordinator.reload().await;

    let snapshot = r.coordinator.snapshot();
    let ids = vec![snapshot[0].id.clone(), snapshot[2].id.clone()];
    r.coordinator.remove_many(&ids).await;

    assert_eq!(r.table.deletes(), 1);
    assert_eq!(r.table.len(), 1);
    let rows = r.coordinator.snapshot();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].body, "b");
}

#[tokio::test]
async fn failed_bulk_remove_restores_every_row() {
    let r = rig();
    for body in ["a", "b", "c"] {
        r.table.seed(Note::new(r.household, body));
    }
    r.coordinator.reload().await;
    r.table.fail_deletes(true);

    let snapshot = r.coordinator.snapshot();
    let ids = vec![snapshot[0].id.clone(), snapshot[2].id.clone()];
    r.coordinator.remove_many(&ids).await;

    let bodies: Vec<String> = r
        .coordinator
        .snapshot()
        .iter()
        .map(|n| n.body.clone())
        .collect();
    assert_eq!(bodies, ["a", "b", "c"]);
    assert_eq!(r.table.len(), 3);
    assert_matches!(
        r.faults.current(),
        Some(SyncError::RemoteRejected {
            operation: RemoteOp::Delete,
            ..
        })
    );
}

#[tokio::test(start_paused = true)]
async fn remove_cancels_pending_debounced_writes() {
    let r = rig();
    let stored = r.table.seed(Note::new(r.household, "note"));
    r.coordinator.reload().await;

    r.coordinator
        .update(&stored.id, NotePatch::body("typing"))
        .await;
    r.coordinator.remove(&stored.id).await;

    tokio::time::sleep(Duration::from_millis(600)).await;

    assert_eq!(r.table.updates(), 0);
    assert_eq!(r.table.deletes(), 1);
    assert!(r.table.is_empty());
}

#[tokio::test]
async fn removing_a_local_record_never_calls_out() {
    let r = rig();
    r.table.hold(RemoteOp::Insert);

    let worker = tokio::spawn({
        let coordinator = Arc::clone(&r.coordinator);
        let note = Note::new(r.household, "ephemeral");
        async move { coordinator.create(note).await }
    });
    while r.table.inserts() == 0 {
        yield_now().await;
    }

    let local_id = r.coordinator.snapshot()[0].id.clone();
    r.coordinator.remove(&local_id).await;

    assert!(r.coordinator.snapshot().is_empty());
    assert_eq!(r.table.deletes(), 0);

    r.table.release(RemoteOp::Insert);
    worker.await.unwrap();

    // The insert still landed remotely; locally the row stays gone until a
    // reload resurrects it.
    assert!(r.coordinator.snapshot().is_empty());
    assert_eq!(r.table.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn promotion_supersedes_typing_against_the_placeholder() {
    let r = rig();
    r.table.hold(RemoteOp::Insert);

    let worker = tokio::spawn({
        let coordinator = Arc::clone(&r.coordinator);
        let note = Note::new(r.household, "draft");
        async move { coordinator.create(note).await }
    });
    while r.table.inserts() == 0 {
        yield_now().await;
    }

    let local_id = r.coordinator.snapshot()[0].id.clone();
    r.coordinator
        .update(&local_id, NotePatch::body("draft, edited"))
        .await;
    assert_eq!(r.coordinator.snapshot()[0].body, "draft, edited");

    r.table.release(RemoteOp::Insert);
    worker.await.unwrap();

    tokio::time::sleep(Duration::from_millis(600)).await;

    // Promotion replaced the placeholder wholesale and dropped its pending
    // write; nothing ever updated the store.
    assert_eq!(r.table.updates(), 0);
    let rows = r.coordinator.snapshot();
    assert_eq!(rows[0].id, RecordId::remote("r1"));
    assert_eq!(rows[0].body, "draft");
}

#[tokio::test]
async fn reload_keeps_records_that_only_exist_locally() {
    let r = rig();
    r.table.seed(Note::new(r.household, "server row"));

    r.table.hold(RemoteOp::Insert);
    let worker = tokio::spawn({
        let coordinator = Arc::clone(&r.coordinator);
        let note = Note::new(r.household, "draft");
        async move { coordinator.create(note).await }
    });
    while r.table.inserts() == 0 {
        yield_now().await;
    }

    r.coordinator.reload().await;

    let rows = r.coordinator.snapshot();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].body, "server row");
    assert!(rows[0].id.is_remote());
    assert_eq!(rows[1].body, "draft");
    assert!(rows[1].id.is_local());

    r.table.release(RemoteOp::Insert);
    worker.await.unwrap();
    assert!(r.coordinator.snapshot().iter().all(|n| n.id.is_remote()));
}

#[tokio::test(start_paused = true)]
async fn stale_reload_is_discarded() {
    let r = rig();
    let stored = r.table.seed(Note::new(r.household, "server value"));
    r.coordinator.reload().await;

    r.table.hold(RemoteOp::Select);
    let reloader = r.coordinator.reloader();
    let reload_task = tokio::spawn(async move { reloader.reload().await });
    while r.table.selects() < 2 {
        yield_now().await;
    }

    // A local write lands while the fetch is in flight.
    r.coordinator
        .update(&stored.id, NotePatch::body("local edit"))
        .await;

    r.table.release(RemoteOp::Select);
    reload_task.await.unwrap();

    // The fetch lost the race and was discarded.
    assert_eq!(r.coordinator.snapshot()[0].body, "local edit");
}

#[tokio::test]
async fn reload_failure_records_fault_and_keeps_state() {
    let r = rig();
    r.table.seed(Note::new(r.household, "loaded"));
    r.coordinator.reload().await;

    r.table.fail_selects(true);
    r.coordinator.reload().await;

    assert_eq!(r.coordinator.snapshot().len(), 1);
    assert_matches!(
        r.faults.current(),
        Some(SyncError::RemoteRejected {
            operation: RemoteOp::Select,
            ..
        })
    );
}

#[tokio::test]
async fn next_success_clears_the_fault() {
    let r = rig();
    r.table.fail_inserts(true);
    r.coordinator.create(Note::new(r.household, "doomed")).await;
    assert!(r.faults.current().is_some());

    r.table.fail_inserts(false);
    r.coordinator.create(Note::new(r.household, "fine")).await;
    assert!(r.faults.current().is_none());
}

#[tokio::test(start_paused = true)]
async fn shutdown_cancels_pending_writes() {
    let r = rig();
    let stored = r.table.seed(Note::new(r.household, "note"));
    r.coordinator.reload().await;

    r.coordinator
        .update(&stored.id, NotePatch::body("typing"))
        .await;
    r.coordinator.shutdown();

    tokio::time::sleep(Duration::from_millis(600)).await;

    assert_eq!(r.table.updates(), 0);
    assert_eq!(r.table.rows()[0].body, "note");
}
