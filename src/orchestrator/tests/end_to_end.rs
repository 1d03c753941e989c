//! Full runs combining tag derivation, changelog generation, note
//! composition and asset upload.

use std::sync::{Arc, Mutex};

use super::common::*;
use crate::{
    forge::request::{CommitComparison, ForgeCommit, ForgeTag, UploadResult},
    orchestrator::{
        RunOutcome,
        notes::NoteSource,
        request::{ReleaseAction, ReleaseRequest},
    },
};

const HEAD_SHA: &str = "1234567890abcdef1234567890abcdef12345678";
const PREVIOUS_SHA: &str = "0000000000aaaaaa0000000000aaaaaa00000000";

fn commit(sha: &str, message: &str) -> ForgeCommit {
    ForgeCommit {
        sha: sha.into(),
        message: message.into(),
        author_name: "dev".into(),
    }
}

#[tokio::test]
#[test_log::test]
async fn creates_derived_release_with_changelog_and_assets() {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "dist/tool-linux.tar.gz");
    write_file(dir.path(), "dist/tool-macos.tar.gz");
    write_file(dir.path(), "dist/tool-linux.tar.gz.sha256");
    std::fs::write(dir.path().join("NOTES.md"), "Highlights").unwrap();

    let mut mock_forge = mock_forge();
    mock_forge
        .expect_get_commit_sha()
        .returning(|reference| match reference {
            "main" => Ok(HEAD_SHA.into()),
            "v1.1.0" => Ok(PREVIOUS_SHA.into()),
            other => panic!("unexpected reference {other}"),
        });
    mock_forge.expect_list_tags().times(1).returning(|_| {
        Ok(vec![
            ForgeTag {
                name: "v1.2.0".into(),
                sha: HEAD_SHA.into(),
            },
            ForgeTag {
                name: "v1.1.0".into(),
                sha: PREVIOUS_SHA.into(),
            },
        ])
    });
    mock_forge
        .expect_get_latest_release()
        .times(1)
        .returning(|| Ok(Some(release(1, "v1.1.0"))));
    mock_forge
        .expect_compare_commits()
        .withf(|req| {
            req.base == PREVIOUS_SHA && req.head == HEAD_SHA && req.page == 1
        })
        .times(1)
        .returning(|_| {
            Ok(CommitComparison {
                total_commits: 2,
                commits: vec![
                    commit("abcdef1234567890", "fix: handle empty notes"),
                    commit(HEAD_SHA, "feat: add release uploads\n\nLong body"),
                ],
            })
        });
    mock_forge.expect_list_commits().times(0);
    mock_forge
        .expect_create_release()
        .withf(|req| {
            req.tag == "v1.2.0"
                && req.target == "main"
                && req.notes.as_deref()
                    == Some(
                        "Highlights\n\n\
                         * 1234567 feat: add release uploads\n\
                         * abcdef1 fix: handle empty notes",
                    )
        })
        .times(1)
        .returning(|req| Ok(release(42, &req.tag)));

    let uploaded = Arc::new(Mutex::new(vec![]));
    let recorded = Arc::clone(&uploaded);
    mock_forge
        .expect_upload_asset()
        .withf(|req| req.release_id == 42)
        .times(2)
        .returning(move |req| {
            recorded.lock().unwrap().push(req.name.clone());
            Ok(UploadResult::Uploaded(asset(7, &req.name)))
        });

    let (orchestrator, reporter) = create_test_orchestrator(mock_forge, dir.path());

    let request = ReleaseRequest::builder()
        .action(ReleaseAction::Create)
        .repository(TEST_REPO)
        .target(Some("main".to_string()))
        .note_source(NoteSource::FileAndGenerate)
        .note_file(Some(dir.path().join("NOTES.md")))
        .include_changelog(true)
        .asset_patterns(vec![
            "dist/*".to_string(),
            "dist/tool-*.tar.gz".to_string(),
            "!dist/*.sha256".to_string(),
        ])
        .build()
        .unwrap();

    let outcome = orchestrator.run(&request).await.unwrap();

    let RunOutcome::Created(published) = &outcome else {
        panic!("expected a created release");
    };
    assert_eq!(published.release.tag, "v1.2.0");
    assert_eq!(
        published.release.html_url,
        "https://github.com/acme/tool/releases/tag/v1.2.0"
    );
    assert_eq!(
        *uploaded.lock().unwrap(),
        vec!["tool-linux.tar.gz", "tool-macos.tar.gz"]
    );
    assert_eq!(published.uploads.uploaded.len(), 2);
    assert!(!outcome.is_warning());
    assert_eq!(
        reporter.events(),
        vec![
            "started: create acme/tool",
            "step: Creating v1.2.0",
            "asset: tool-linux.tar.gz Uploaded",
            "asset: tool-macos.tar.gz Uploaded",
            "finished: created",
        ]
    );
}

#[tokio::test]
async fn dry_run_create_reads_but_never_mutates() {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "app.zip");

    let mut mock_forge = mock_forge_with_dry_run(true);
    mock_forge
        .expect_get_commit_sha()
        .returning(|_| Ok(HEAD_SHA.into()));
    mock_forge.expect_get_latest_release().returning(|| Ok(None));
    mock_forge
        .expect_list_commits()
        .returning(|_| Ok(vec![commit(HEAD_SHA, "feat: first")]));
    mock_forge.expect_create_release().times(0);
    mock_forge.expect_upload_asset().times(0);
    mock_forge.expect_delete_asset().times(0);

    let (orchestrator, _) = create_test_orchestrator(mock_forge, dir.path());

    let request = ReleaseRequest::builder()
        .action(ReleaseAction::Create)
        .repository(TEST_REPO)
        .tag(Some("v0.1.0".to_string()))
        .target(Some("main".to_string()))
        .note_source(NoteSource::GenerateOnly)
        .asset_patterns(vec!["*.zip".to_string()])
        .build()
        .unwrap();

    let outcome = orchestrator.run(&request).await.unwrap();

    let RunOutcome::Created(published) = outcome else {
        panic!("expected a simulated release");
    };
    assert_eq!(published.release.id, 0);
    assert_eq!(published.uploads.uploaded, vec!["app.zip".to_string()]);
}
