//! Tests for release creation.
//!
//! Tests for:
//! - Explicit and derived tags
//! - No eligible tag at the target
//! - Note sources on create
//! - Failures before any mutation

use super::common::*;
use crate::{
    ReleaseError,
    forge::request::{ForgeTag, UploadResult},
    orchestrator::{
        CreateOutcome, RunOutcome,
        notes::NoteSource,
        request::{ReleaseAction, ReleaseRequest, ReleaseRequestBuilder},
    },
};

fn create_request() -> ReleaseRequestBuilder {
    let mut builder = ReleaseRequest::builder();
    builder
        .action(ReleaseAction::Create)
        .repository(TEST_REPO)
        .target(Some("main".to_string()));
    builder
}

#[tokio::test]
async fn creates_release_with_explicit_tag() {
    let dir = tempfile::tempdir().unwrap();
    let mut mock_forge = mock_forge();
    mock_forge.expect_list_tags().times(0);
    mock_forge
        .expect_create_release()
        .withf(|req| {
            req.tag == "v2.0.0"
                && req.target == "main"
                && req.title.as_deref() == Some("Second")
                && req.notes.as_deref() == Some("inline")
                && req.draft
                && !req.prerelease
        })
        .times(1)
        .returning(|req| Ok(release(5, &req.tag)));

    let (orchestrator, reporter) = create_test_orchestrator(mock_forge, dir.path());

    let request = create_request()
        .tag(Some("v2.0.0".to_string()))
        .title(Some("Second".to_string()))
        .draft(true)
        .note_source(NoteSource::Inline)
        .note_text(Some("inline".to_string()))
        .build()
        .unwrap();

    let outcome = orchestrator.run(&request).await.unwrap();

    let RunOutcome::Created(published) = outcome else {
        panic!("expected a created release");
    };
    assert_eq!(published.release.id, 5);
    assert!(!published.from_edit_fallback);
    assert!(published.uploads.uploaded.is_empty());
    assert!(reporter.events().contains(&"step: Creating v2.0.0".to_string()));
}

#[tokio::test]
async fn derives_tag_pointing_at_target() {
    let dir = tempfile::tempdir().unwrap();
    let mut mock_forge = mock_forge();
    mock_forge
        .expect_get_commit_sha()
        .withf(|reference| reference == "main")
        .returning(|_| Ok("abc123".into()));
    mock_forge.expect_list_tags().times(1).returning(|_| {
        Ok(vec![
            ForgeTag {
                name: "v1.1.0".into(),
                sha: "def456".into(),
            },
            ForgeTag {
                name: "v1.2.0".into(),
                sha: "abc123".into(),
            },
        ])
    });
    mock_forge
        .expect_create_release()
        .withf(|req| req.tag == "v1.2.0" && req.notes.is_none())
        .times(1)
        .returning(|req| Ok(release(8, &req.tag)));

    let (orchestrator, _) = create_test_orchestrator(mock_forge, dir.path());

    let request = create_request().build().unwrap();

    let outcome = orchestrator.create(&request).await.unwrap();

    assert!(matches!(
        outcome,
        CreateOutcome::Published(ref p) if p.release.tag == "v1.2.0"
    ));
}

#[tokio::test]
async fn no_tag_at_target_succeeds_without_mutations() {
    let dir = tempfile::tempdir().unwrap();
    let mut mock_forge = mock_forge();
    mock_forge
        .expect_get_commit_sha()
        .returning(|_| Ok("abc123".into()));
    mock_forge.expect_list_tags().returning(|_| Ok(vec![]));
    mock_forge.expect_create_release().times(0);
    mock_forge.expect_update_release().times(0);
    mock_forge.expect_upload_asset().times(0);
    mock_forge.expect_get_latest_release().times(0);

    let (orchestrator, reporter) = create_test_orchestrator(mock_forge, dir.path());

    let request = create_request()
        .note_source(NoteSource::GenerateOnly)
        .asset_patterns(vec!["*.zip".to_string()])
        .build()
        .unwrap();

    let outcome = orchestrator.run(&request).await.unwrap();

    assert_eq!(
        outcome,
        RunOutcome::NoEligibleTag {
            target: "main".into()
        }
    );
    assert!(outcome.is_warning());
    assert!(outcome.release().is_none());
    assert_eq!(reporter.warnings().len(), 1);
    assert!(reporter.warnings()[0].contains("no tag found for target main"));
}

#[tokio::test]
async fn unreadable_notes_file_fails_before_create() {
    let dir = tempfile::tempdir().unwrap();
    let mut mock_forge = mock_forge();
    mock_forge.expect_create_release().times(0);

    let (orchestrator, _) = create_test_orchestrator(mock_forge, dir.path());

    let request = create_request()
        .tag(Some("v1.0.0".to_string()))
        .note_source(NoteSource::File)
        .note_file(Some(dir.path().join("missing.md")))
        .build()
        .unwrap();

    let err = orchestrator.run(&request).await.unwrap_err();

    assert!(matches!(err, ReleaseError::FileRead { .. }));
}

#[tokio::test]
async fn create_failure_stops_before_uploads() {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "app.zip");

    let mut mock_forge = mock_forge();
    mock_forge
        .expect_create_release()
        .times(1)
        .returning(|_| Err(ReleaseError::forge("validation failed")));
    mock_forge.expect_upload_asset().times(0);

    let (orchestrator, _) = create_test_orchestrator(mock_forge, dir.path());

    let request = create_request()
        .tag(Some("v1.0.0".to_string()))
        .asset_patterns(vec!["*.zip".to_string()])
        .build()
        .unwrap();

    let err = orchestrator.run(&request).await.unwrap_err();

    assert!(err.is_remote());
}

#[tokio::test]
async fn asset_failures_do_not_fail_the_run() {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "a.zip");
    write_file(dir.path(), "b.zip");

    let mut mock_forge = mock_forge();
    mock_forge
        .expect_create_release()
        .returning(|req| Ok(release(3, &req.tag)));
    mock_forge
        .expect_upload_asset()
        .withf(|req| req.name == "a.zip")
        .returning(|_| Err(ReleaseError::NetworkError("reset".into())));
    mock_forge
        .expect_upload_asset()
        .withf(|req| req.name == "b.zip")
        .returning(|req| {
            Ok(UploadResult::Uploaded(asset(1, &req.name)))
        });

    let (orchestrator, reporter) = create_test_orchestrator(mock_forge, dir.path());

    let request = create_request()
        .tag(Some("v1.0.0".to_string()))
        .asset_patterns(vec!["*.zip".to_string()])
        .build()
        .unwrap();

    let outcome = orchestrator.run(&request).await.unwrap();

    let RunOutcome::Created(published) = &outcome else {
        panic!("expected a created release");
    };
    assert_eq!(published.uploads.uploaded, vec!["b.zip".to_string()]);
    assert_eq!(published.uploads.failed_names(), vec!["a.zip".to_string()]);
    assert!(outcome.is_warning());
    assert!(
        reporter
            .warnings()
            .iter()
            .any(|w| w.contains("Failed to upload 1 asset(s): a.zip"))
    );
}

#[cfg(unix)]
#[tokio::test]
async fn symlinked_duplicate_is_uploaded_once() {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "dist/app.zip");
    std::os::unix::fs::symlink(
        dir.path().join("dist/app.zip"),
        dir.path().join("dist/latest.zip"),
    )
    .unwrap();

    let mut mock_forge = mock_forge();
    mock_forge
        .expect_create_release()
        .returning(|req| Ok(release(4, &req.tag)));
    mock_forge
        .expect_upload_asset()
        .withf(|req| req.release_id == 4 && req.name == "app.zip")
        .times(1)
        .returning(|req| Ok(UploadResult::Uploaded(asset(1, &req.name))));

    let (orchestrator, _) = create_test_orchestrator(mock_forge, dir.path());

    let request = create_request()
        .tag(Some("v1.0.0".to_string()))
        .asset_patterns(vec!["dist/*.zip".to_string()])
        .build()
        .unwrap();

    let outcome = orchestrator.run(&request).await.unwrap();

    let RunOutcome::Created(published) = outcome else {
        panic!("expected a created release");
    };
    assert_eq!(published.uploads.uploaded, vec!["app.zip".to_string()]);
    assert!(published.uploads.is_complete());
}
