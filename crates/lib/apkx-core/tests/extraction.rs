mod common;

use apkx_core::control::{ExtractError, ReadError};
use apkx_core::engine::EngineKind;
use apkx_core::manifest::{ManifestInfo, ManifestSummary, UNKNOWN_FIELD};

use common::{BARE_MANIFEST, EngineBehavior, FakeEngines, Harness};

#[tokio::test]
async fn extraction_records_session_and_manifest() {
    let harness = Harness::new();
    let engines = FakeEngines::default();
    let control = harness.control(&engines);
    let artifact = harness.artifact("demo.apk");

    let report = control
        .extract(artifact.to_str().expect("utf-8 path"))
        .await
        .expect("extraction should succeed");

    let expected_root = harness.scratch.path().join("demo");
    assert_eq!(report.output_root, expected_root);
    assert_eq!(report.jadx_dir, expected_root.join("jadx_output"));
    assert_eq!(report.apktool_dir, expected_root.join("apktool_output"));
    assert!(report.jadx_succeeded);
    assert_eq!(
        report.manifest,
        ManifestInfo::Parsed(ManifestSummary {
            package: "com.example".to_string(),
            version_name: "1.2".to_string(),
            version_code: "7".to_string(),
        })
    );
    assert_eq!(control.session().output_root().await, Some(expected_root));
}

#[tokio::test]
async fn engines_run_strictly_in_sequence() {
    let harness = Harness::new();
    let engines = FakeEngines::default();
    let control = harness.control(&engines);
    let artifact = harness.artifact("ordered.apk");

    control
        .extract(artifact.to_str().expect("utf-8 path"))
        .await
        .expect("extraction should succeed");

    assert_eq!(
        engines.events(),
        vec!["jadx start", "jadx end", "apktool start", "apktool end"]
    );
}

#[tokio::test]
async fn jadx_failure_is_tolerated() {
    let harness = Harness::new();
    let engines = FakeEngines {
        jadx: EngineBehavior::Exit(1),
        ..FakeEngines::default()
    };
    let control = harness.control(&engines);
    let artifact = harness.artifact("partial.apk");

    let report = control
        .extract(artifact.to_str().expect("utf-8 path"))
        .await
        .expect("jadx failure should not fail extraction");

    assert!(!report.jadx_succeeded);
    assert!(matches!(report.manifest, ManifestInfo::Parsed(_)));
    assert_eq!(
        control.session().output_root().await,
        Some(report.output_root.clone())
    );
}

#[tokio::test]
async fn missing_jadx_binary_is_tolerated() {
    let harness = Harness::new();
    let engines = FakeEngines {
        jadx: EngineBehavior::LaunchFailure,
        ..FakeEngines::default()
    };
    let control = harness.control(&engines);
    let artifact = harness.artifact("nojadx.apk");

    let report = control
        .extract(artifact.to_str().expect("utf-8 path"))
        .await
        .expect("missing jadx should not fail extraction");

    assert!(!report.jadx_succeeded);
    assert_eq!(
        engines.events(),
        vec!["jadx start", "jadx missing", "apktool start", "apktool end"]
    );
}

#[tokio::test]
async fn apktool_failure_is_fatal_and_keeps_previous_session() {
    let harness = Harness::new();
    let good = FakeEngines::default();
    let control = harness.control(&good);
    let first = control
        .extract(harness.artifact("first.apk").to_str().expect("utf-8 path"))
        .await
        .expect("first extraction should succeed");

    let failing = FakeEngines {
        apktool: EngineBehavior::Exit(1),
        ..FakeEngines::default()
    };
    let failing_control = harness
        .control(&failing)
        .with_session(control.session().clone());
    let err = failing_control
        .extract(harness.artifact("second.apk").to_str().expect("utf-8 path"))
        .await
        .expect_err("apktool failure should fail extraction");

    match err {
        ExtractError::EngineFailed {
            engine,
            exit_code,
            diagnostics,
        } => {
            assert_eq!(engine, EngineKind::Apktool);
            assert_eq!(exit_code, Some(1));
            assert_eq!(diagnostics, "apktool exploded");
        }
        other => panic!("unexpected error: {other}"),
    }
    // jadx still ran before apktool failed.
    assert_eq!(failing.events()[..2], ["jadx start", "jadx end"]);
    assert_eq!(
        control.session().output_root().await,
        Some(first.output_root)
    );
}

#[tokio::test]
async fn missing_apktool_binary_is_fatal() {
    let harness = Harness::new();
    let engines = FakeEngines {
        apktool: EngineBehavior::LaunchFailure,
        ..FakeEngines::default()
    };
    let control = harness.control(&engines);

    let err = control
        .extract(harness.artifact("noapktool.apk").to_str().expect("utf-8 path"))
        .await
        .expect_err("missing apktool should fail extraction");

    assert!(matches!(
        err,
        ExtractError::EngineLaunch {
            engine: EngineKind::Apktool,
            ..
        }
    ));
    assert!(control.session().output_root().await.is_none());
}

#[tokio::test]
async fn manifest_problems_degrade_to_warnings() {
    let harness = Harness::new();

    let no_attributes = FakeEngines {
        manifest: Some(BARE_MANIFEST),
        ..FakeEngines::default()
    };
    let report = harness
        .control(&no_attributes)
        .extract(harness.artifact("bare.apk").to_str().expect("utf-8 path"))
        .await
        .expect("bare manifest should not fail extraction");
    match report.manifest {
        ManifestInfo::Parsed(summary) => {
            assert_eq!(summary.package, UNKNOWN_FIELD);
            assert_eq!(summary.version_name, UNKNOWN_FIELD);
            assert_eq!(summary.version_code, UNKNOWN_FIELD);
        }
        ManifestInfo::Unavailable { reason } => panic!("unexpected unavailable manifest: {reason}"),
    }

    let malformed = FakeEngines {
        manifest: Some("<manifest package=\"broken\""),
        ..FakeEngines::default()
    };
    let report = harness
        .control(&malformed)
        .extract(harness.artifact("broken.apk").to_str().expect("utf-8 path"))
        .await
        .expect("malformed manifest should not fail extraction");
    assert!(matches!(report.manifest, ManifestInfo::Unavailable { .. }));

    let missing = FakeEngines {
        manifest: None,
        ..FakeEngines::default()
    };
    let report = harness
        .control(&missing)
        .extract(harness.artifact("nomanifest.apk").to_str().expect("utf-8 path"))
        .await
        .expect("missing manifest should not fail extraction");
    assert!(matches!(report.manifest, ManifestInfo::Unavailable { .. }));
}

#[tokio::test]
async fn rerunning_the_same_artifact_reuses_directories() {
    let harness = Harness::new();
    let engines = FakeEngines::default();
    let control = harness.control(&engines);
    let artifact = harness.artifact("again.apk");
    let path = artifact.to_str().expect("utf-8 path");

    let first = control.extract(path).await.expect("first run");
    let second = control.extract(path).await.expect("second run");

    assert_eq!(first.output_root, second.output_root);
}

#[tokio::test]
async fn missing_artifact_runs_nothing() {
    let harness = Harness::new();
    let engines = FakeEngines::default();
    let control = harness.control(&engines);
    let missing = harness.artifacts.path().join("ghost.apk");

    let err = control
        .extract(missing.to_str().expect("utf-8 path"))
        .await
        .expect_err("missing artifact should fail");

    assert!(matches!(err, ExtractError::ArtifactNotFound(_)));
    assert!(engines.events().is_empty());
    assert!(!harness.scratch.path().join("ghost").exists());

    let err = control.extract("   ").await.expect_err("blank path should fail");
    assert!(matches!(err, ExtractError::InvalidArtifact(_)));
}

#[tokio::test]
async fn read_requires_a_prior_extraction() {
    let harness = Harness::new();
    let control = harness.control(&FakeEngines::default());

    for path in ["AndroidManifest.xml", "does/not/exist.txt", ""] {
        let err = control
            .read_file(path)
            .await
            .expect_err("read before extract should fail");
        assert!(matches!(err, ReadError::NoExtraction), "{path}: {err}");
    }
}

#[tokio::test]
async fn read_resolves_against_the_last_extraction() {
    let harness = Harness::new();
    let control = harness.control(&FakeEngines::default());
    control
        .extract(harness.artifact("reader.apk").to_str().expect("utf-8 path"))
        .await
        .expect("extraction should succeed");

    let content = control
        .read_file("apktool_output/AndroidManifest.xml")
        .await
        .expect("manifest should be readable");
    assert!(content.text.contains("package=\"com.example\""));

    let err = control
        .read_file("apktool_output/missing.xml")
        .await
        .expect_err("missing file should fail");
    assert!(err.to_string().contains("apktool_output/missing.xml"));

    let err = control
        .read_file("../reader.apk")
        .await
        .expect_err("escaping path should fail");
    assert!(matches!(err, ReadError::NotFound(_)));

    let err = control
        .read_file("apktool_output")
        .await
        .expect_err("directories are not files");
    assert!(matches!(err, ReadError::NotFound(_)));
}
