#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use apkx_core::control::ApkxControlPlane;
use apkx_core::engine::{EngineFuture, EngineInvocation, EngineKind, ProcessOutput, RunEngineFn};

pub const WELL_FORMED_MANIFEST: &str = r#"<?xml version="1.0" encoding="utf-8" standalone="no"?>
<manifest xmlns:android="http://schemas.android.com/apk/res/android" android:versionCode="7" android:versionName="1.2" package="com.example">
    <application android:label="@string/app_name"/>
</manifest>
"#;

pub const BARE_MANIFEST: &str = r#"<manifest xmlns:android="http://schemas.android.com/apk/res/android"><application/></manifest>"#;

/// How the scripted engines behave for one control plane.
#[derive(Clone)]
pub struct FakeEngines {
    pub jadx: EngineBehavior,
    pub apktool: EngineBehavior,
    pub manifest: Option<&'static str>,
    pub events: Arc<Mutex<Vec<String>>>,
}

#[derive(Clone, Copy, Debug)]
pub enum EngineBehavior {
    Succeed,
    Exit(i32),
    LaunchFailure,
}

impl Default for FakeEngines {
    fn default() -> Self {
        Self {
            jadx: EngineBehavior::Succeed,
            apktool: EngineBehavior::Succeed,
            manifest: Some(WELL_FORMED_MANIFEST),
            events: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl FakeEngines {
    pub fn events(&self) -> Vec<String> {
        self.events.lock().expect("events lock").clone()
    }

    pub fn runner(&self) -> RunEngineFn {
        let fake = self.clone();
        Arc::new(move |invocation: EngineInvocation| -> EngineFuture {
            let fake = fake.clone();
            Box::pin(async move { fake.run(invocation).await })
        })
    }

    async fn run(&self, invocation: EngineInvocation) -> std::io::Result<ProcessOutput> {
        let name = invocation.kind.name();
        self.record(format!("{name} start"));
        let behavior = match invocation.kind {
            EngineKind::Jadx => self.jadx,
            EngineKind::Apktool => self.apktool,
        };

        // Give a concurrent second engine a chance to interleave if sequencing were broken.
        tokio::time::sleep(Duration::from_millis(10)).await;

        let output = match behavior {
            EngineBehavior::LaunchFailure => {
                self.record(format!("{name} missing"));
                return Err(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("{name}: command not found"),
                ));
            }
            EngineBehavior::Exit(code) => ProcessOutput {
                exit_code: Some(code),
                stdout: String::new(),
                stderr: format!("{name} exploded"),
            },
            EngineBehavior::Succeed => {
                self.write_output(&invocation);
                ProcessOutput {
                    exit_code: Some(0),
                    stdout: format!("{name} done"),
                    stderr: String::new(),
                }
            }
        };
        self.record(format!("{name} end"));
        Ok(output)
    }

    fn write_output(&self, invocation: &EngineInvocation) {
        match invocation.kind {
            EngineKind::Jadx => write_file(
                &invocation.output_dir,
                "sources/com/example/MainActivity.java",
                "package com.example;\n\npublic class MainActivity {\n    private static final String API_KEY = \"sk-demo-123\";\n}\n",
            ),
            EngineKind::Apktool => {
                if let Some(manifest) = self.manifest {
                    write_file(&invocation.output_dir, "AndroidManifest.xml", manifest);
                }
                write_file(
                    &invocation.output_dir,
                    "smali/com/example/MainActivity.smali",
                    ".class public Lcom/example/MainActivity;\r\n.field private static final API_KEY:Ljava/lang/String; = \"sk-demo-123\"\r\n",
                );
            }
        }
    }

    fn record(&self, event: String) {
        self.events.lock().expect("events lock").push(event);
    }
}

pub fn write_file(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create fixture parent");
    }
    std::fs::write(&path, contents).expect("write fixture file");
}

pub struct Harness {
    pub scratch: tempfile::TempDir,
    pub artifacts: tempfile::TempDir,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            scratch: tempfile::tempdir().expect("scratch tempdir"),
            artifacts: tempfile::tempdir().expect("artifact tempdir"),
        }
    }

    pub fn artifact(&self, name: &str) -> PathBuf {
        let path = self.artifacts.path().join(name);
        std::fs::write(&path, b"PK\x03\x04fake-apk").expect("write artifact");
        path
    }

    pub fn control(&self, engines: &FakeEngines) -> ApkxControlPlane {
        ApkxControlPlane::new(engines.runner(), self.scratch.path())
    }
}
