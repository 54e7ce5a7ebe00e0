//! Integration tests for incremental bucket file sync.

#![allow(clippy::unwrap_used)]

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{uploader, SiteFixture};
use stratus_provider::{
    BucketFilesInputs, BucketFilesProvider, Manifest, MockRemoteApi, ResourceProvider,
    StratusConfig, TransferError,
};

#[tokio::test]
async fn second_sync_of_same_manifest_uploads_nothing() {
    let site = SiteFixture::new();
    let manifest = Manifest::new(site.files(5));
    let api = Arc::new(MockRemoteApi::new());
    let uploader = uploader(&api, 4);

    let first = uploader
        .sync("site", &manifest, &Manifest::empty())
        .await
        .unwrap();
    assert_eq!(first.uploaded, 5);
    assert_eq!(api.requests().len(), 5);

    let second = uploader.sync("site", &manifest, &manifest).await.unwrap();
    assert_eq!(second.uploaded, 0);
    assert_eq!(second.skipped, 5);
    assert_eq!(api.requests().len(), 5);
}

#[tokio::test]
async fn upload_count_matches_changed_entries() {
    let site = SiteFixture::new();
    let previous = Manifest::new(vec![
        site.file("index.html", "v1"),
        site.file("about.html", "v1"),
        site.file("app.js", "v1"),
    ]);

    let mut restyled = site.file("about.html", "v1");
    restyled.cache_control = Some("no-cache".to_owned());
    let desired = Manifest::new(vec![
        site.file("index.html", "v1"),
        restyled,
        site.file("app.js", "v2"),
        site.file("new.css", "v1"),
    ]);

    let api = Arc::new(MockRemoteApi::new());
    let report = uploader(&api, 8)
        .sync("site", &desired, &previous)
        .await
        .unwrap();

    assert_eq!(report.uploaded, 3);
    assert_eq!(report.skipped, 1);
    assert_eq!(
        api.put_paths(),
        vec!["site/about.html", "site/app.js", "site/new.css"]
    );
}

#[tokio::test]
async fn renamed_bucket_uploads_everything() {
    let site = SiteFixture::new();
    let files = Manifest::new(site.files(3));
    let api = Arc::new(MockRemoteApi::new());
    let provider = BucketFilesProvider::from_config(api.clone(), &StratusConfig::default());

    let olds = BucketFilesInputs {
        bucket_name: "site-old".to_owned(),
        files: files.clone(),
    };
    let news = BucketFilesInputs {
        bucket_name: "site-new".to_owned(),
        files,
    };

    provider.update("files", &olds, &news).await.unwrap();

    let paths = api.put_paths();
    assert_eq!(paths.len(), 3);
    assert!(paths.iter().all(|p| p.starts_with("site-new/")));
}

#[tokio::test]
async fn update_in_same_bucket_only_uploads_changes() {
    let site = SiteFixture::new();
    let api = Arc::new(MockRemoteApi::new());
    let provider = BucketFilesProvider::from_config(api.clone(), &StratusConfig::default());

    let olds = BucketFilesInputs {
        bucket_name: "site".to_owned(),
        files: Manifest::new(vec![site.file("a.txt", "1"), site.file("b.txt", "1")]),
    };
    let news = BucketFilesInputs {
        bucket_name: "site".to_owned(),
        files: Manifest::new(vec![site.file("a.txt", "1"), site.file("b.txt", "2")]),
    };

    provider.update("files", &olds, &news).await.unwrap();
    assert_eq!(api.put_paths(), vec!["site/b.txt"]);
}

#[tokio::test]
async fn one_failing_upload_fails_the_sync() {
    let site = SiteFixture::new();
    let manifest = Manifest::new(site.files(10));
    let api = Arc::new(MockRemoteApi::new().fail_path("site/file-7.txt"));

    let err = uploader(&api, 3)
        .sync("site", &manifest, &Manifest::empty())
        .await
        .unwrap_err();

    match err {
        TransferError::Upload { key, .. } => assert_eq!(key, "file-7.txt"),
        other => panic!("expected upload error, got {other:?}"),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn no_upload_starts_after_a_failure() {
    let site = SiteFixture::new();
    let manifest = Manifest::new(site.files(30));

    for _ in 0..200 {
        let api = Arc::new(MockRemoteApi::new().fail_path("site/file-0.txt"));

        let err = uploader(&api, 1)
            .sync("site", &manifest, &Manifest::empty())
            .await
            .unwrap_err();

        assert_eq!(err.key(), Some("file-0.txt"));
        assert_eq!(api.put_paths(), vec!["site/file-0.txt"]);
    }
}

#[tokio::test]
async fn failed_sync_is_recovered_by_next_reconciliation() {
    let site = SiteFixture::new();
    let manifest = Manifest::new(site.files(4));

    let failing = Arc::new(MockRemoteApi::new().fail_path("site/file-2.txt"));
    assert!(uploader(&failing, 1)
        .sync("site", &manifest, &Manifest::empty())
        .await
        .is_err());

    // The framework does not record a failed update, so the retry diffs
    // against the same empty previous state.
    let healthy = Arc::new(MockRemoteApi::new());
    let report = uploader(&healthy, 1)
        .sync("site", &manifest, &Manifest::empty())
        .await
        .unwrap();
    assert_eq!(report.uploaded, 4);
}

#[tokio::test]
async fn uploads_never_exceed_concurrency_limit() {
    let site = SiteFixture::new();
    let manifest = Manifest::new(site.files(20));
    let api = Arc::new(MockRemoteApi::new().with_latency(Duration::from_millis(50)));

    let report = uploader(&api, 4)
        .sync("site", &manifest, &Manifest::empty())
        .await
        .unwrap();

    assert_eq!(report.uploaded, 20);
    assert_eq!(api.requests().len(), 20);
    assert!(api.peak_in_flight() <= 4);
    assert!(api.peak_in_flight() >= 2);
}

#[tokio::test]
async fn empty_manifest_is_a_noop() {
    let api = Arc::new(MockRemoteApi::new());
    let report = uploader(&api, 4)
        .sync("site", &Manifest::empty(), &Manifest::empty())
        .await
        .unwrap();

    assert_eq!(report.uploaded, 0);
    assert!(api.requests().is_empty());
}
