//! End-to-end scenarios against the public service API.

use std::collections::HashSet;
use std::sync::Arc;

use bytes::Bytes;
use chrono::{Duration, TimeZone, Utc};
use sharelink_core::app::ShareServiceBuilder;
use sharelink_core::domain::{AccessOutcome, AccessPayload, CreateOptions, Payload};
use sharelink_core::impls::{FsBlobBackend, InMemoryArtifactStore, InMemoryBlobBackend};
use sharelink_core::ports::{BlobBackend, BlobError, FixedClock};
use sharelink_core::{ShareConfig, ShareService};

fn service_with_clock() -> (Arc<ShareService>, Arc<FixedClock>) {
    let clock = Arc::new(FixedClock::new(
        Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap(),
    ));
    let service = ShareServiceBuilder::new(ShareConfig::default())
        .store(Arc::new(InMemoryArtifactStore::new()))
        .blob_backend(Arc::new(InMemoryBlobBackend::new()))
        .clock(clock.clone())
        .build()
        .unwrap();
    (Arc::new(service), clock)
}

#[tokio::test]
async fn single_use_text_note() {
    let (service, _) = service_with_clock();
    let created = service
        .create_text("Note", "Hello", CreateOptions::default().max_access(1))
        .await
        .unwrap();

    let first = service.access(created.id).await.unwrap();
    assert_eq!(
        first,
        AccessOutcome::Granted {
            payload: AccessPayload::Text {
                title: "Note".to_string(),
                content: "Hello".to_string(),
            },
            access_count: 1,
        }
    );

    let second = service.access(created.id).await.unwrap();
    assert_eq!(second, AccessOutcome::LimitReached);
}

#[tokio::test]
async fn file_expires_after_its_lifetime() {
    let (service, clock) = service_with_clock();
    let created = service
        .create_file(
            Bytes::from_static(b"\x89PNG\r\n"),
            "a.png",
            "image/png",
            CreateOptions::default().expires_in_hours(1),
        )
        .await
        .unwrap();

    assert!(service.access(created.id).await.unwrap().is_granted());

    clock.advance(Duration::hours(2));
    assert_eq!(
        service.access(created.id).await.unwrap(),
        AccessOutcome::Expired
    );
    // still described until removed or swept
    assert!(service.describe(created.id).await.is_ok());
}

#[tokio::test]
async fn unlimited_text_counts_every_access() {
    let (service, clock) = service_with_clock();
    let created = service
        .create_text("T", "C", CreateOptions::default())
        .await
        .unwrap();

    for expected in 1..=100u64 {
        clock.advance(Duration::days(30));
        let outcome = service.access(created.id).await.unwrap();
        assert_eq!(outcome.access_count(), Some(expected));
    }
}

#[tokio::test]
async fn removing_unknown_id_is_not_found() {
    let (service, _) = service_with_clock();
    let id = "01ARZ3NDEKTSV4RRFFQ69G5FAV".parse().unwrap();
    assert!(service.remove(id).await.unwrap_err().is_not_found());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_access_respects_max_access() {
    let (service, _) = service_with_clock();
    let created = service
        .create_text("Race", "last slot", CreateOptions::default().max_access(10))
        .await
        .unwrap();

    let id = created.id;
    let mut joins = Vec::new();
    for _ in 0..50 {
        let service = Arc::clone(&service);
        joins.push(tokio::spawn(async move { service.access(id).await.unwrap() }));
    }

    let mut granted = Vec::new();
    let mut limited = 0;
    for join in joins {
        match join.await.unwrap() {
            AccessOutcome::Granted { access_count, .. } => granted.push(access_count),
            AccessOutcome::LimitReached => limited += 1,
            AccessOutcome::Expired => panic!("nothing here expires"),
        }
    }

    granted.sort_unstable();
    assert_eq!(granted, (1..=10).collect::<Vec<u64>>());
    assert_eq!(limited, 40);
    assert_eq!(service.describe(id).await.unwrap().access_count, 10);
}

#[tokio::test]
async fn expired_wins_regardless_of_count_state() {
    let (service, clock) = service_with_clock();
    let exhausted = service
        .create_text("a", "b", CreateOptions::default().max_access(1).expires_in_hours(1))
        .await
        .unwrap();
    let fresh = service
        .create_text("a", "b", CreateOptions::default().max_access(5).expires_in_hours(1))
        .await
        .unwrap();
    service.access(exhausted.id).await.unwrap();

    clock.advance(Duration::hours(1));
    for id in [exhausted.id, fresh.id] {
        assert_eq!(service.access(id).await.unwrap(), AccessOutcome::Expired);
    }
}

#[tokio::test]
async fn ids_never_repeat() {
    let (service, _) = service_with_clock();
    let mut seen = HashSet::new();
    for n in 0..500 {
        let created = service
            .create_text("n", &n.to_string(), CreateOptions::default())
            .await
            .unwrap();
        assert!(seen.insert(created.id));
    }
}

#[tokio::test]
async fn removed_file_is_gone_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let blobs = Arc::new(FsBlobBackend::open(dir.path()).await.unwrap());
    let service = ShareServiceBuilder::new(ShareConfig::default())
        .store(Arc::new(InMemoryArtifactStore::new()))
        .blob_backend(blobs.clone())
        .build()
        .unwrap();

    let created = service
        .create_file(
            Bytes::from_static(b"payload"),
            "doc.pdf",
            "application/pdf",
            CreateOptions::default(),
        )
        .await
        .unwrap();
    let key = match service.describe(created.id).await.unwrap().payload {
        Payload::File(meta) => meta.blob_key,
        Payload::Text(_) => panic!("expected a file artifact"),
    };

    service.remove(created.id).await.unwrap();
    assert!(service.describe(created.id).await.unwrap_err().is_not_found());
    assert!(service.access(created.id).await.unwrap_err().is_not_found());
    assert!(matches!(
        blobs.retrieve(&key).await,
        Err(BlobError::NotFound(_))
    ));
}
