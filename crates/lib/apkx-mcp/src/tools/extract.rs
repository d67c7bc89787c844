use apkx_core::control::ExtractionReport;
use apkx_core::manifest::ManifestInfo;
use rmcp::{
    ErrorData,
    handler::server::wrapper::Parameters,
    model::CallToolResult,
    schemars,
    tool,
    tool_router,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::ApkxMcp;
use crate::envelope::ToolOutcome;

/// Parameters for decompiling an APK.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExtractParams {
    /// Path to the APK file on the server's filesystem.
    pub artifact_path: String,
}

#[tool_router(router = tool_router_extract, vis = "pub")]
impl ApkxMcp {
    #[tool(description = "Decompile an APK with jadx and apktool. The output root becomes the default for `search` and `readFile`.")]
    async fn extract(
        &self,
        Parameters(params): Parameters<ExtractParams>,
    ) -> Result<CallToolResult, ErrorData> {
        Ok(self.extract_outcome(params).await.into())
    }
}

impl ApkxMcp {
    pub(crate) async fn extract_outcome(&self, params: ExtractParams) -> ToolOutcome {
        match self.control.extract(&params.artifact_path).await {
            Ok(report) => ToolOutcome::text(render_report(&report)),
            Err(err) => {
                warn!("extract failed: {err}");
                ToolOutcome::error(format!("Extraction failed: {err}"))
            }
        }
    }
}

fn render_report(report: &ExtractionReport) -> String {
    let mut lines = vec![
        format!("Decompiled {}", report.artifact.display()),
        format!("Output root: {}", report.output_root.display()),
        format!("jadx output: {}", report.jadx_dir.display()),
        format!("apktool output: {}", report.apktool_dir.display()),
    ];
    match &report.manifest {
        ManifestInfo::Parsed(summary) => {
            lines.push(format!("Package: {}", summary.package));
            lines.push(format!("Version name: {}", summary.version_name));
            lines.push(format!("Version code: {}", summary.version_code));
        }
        ManifestInfo::Unavailable { reason } => {
            lines.push(format!("Warning: manifest summary unavailable ({reason})"));
        }
    }
    if !report.jadx_succeeded {
        lines.push("Warning: jadx did not finish cleanly; Java sources may be incomplete.".to_string());
    }
    lines.push(
        "Paths for readFile are relative to the output root, e.g. apktool_output/AndroidManifest.xml"
            .to_string(),
    );
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use apkx_core::manifest::{ManifestSummary, UNKNOWN_FIELD};
    use std::path::PathBuf;

    fn report(manifest: ManifestInfo, jadx_succeeded: bool) -> ExtractionReport {
        let root = PathBuf::from("/tmp/demo");
        ExtractionReport {
            artifact: PathBuf::from("/apps/demo.apk"),
            jadx_dir: root.join("jadx_output"),
            apktool_dir: root.join("apktool_output"),
            output_root: root,
            jadx_succeeded,
            manifest,
        }
    }

    #[test]
    fn renders_manifest_fields() {
        let text = render_report(&report(
            ManifestInfo::Parsed(ManifestSummary {
                package: "com.example".to_string(),
                version_name: "1.2".to_string(),
                version_code: "7".to_string(),
            }),
            true,
        ));
        assert!(text.contains("Output root: /tmp/demo"));
        assert!(text.contains("jadx output: /tmp/demo/jadx_output"));
        assert!(text.contains("apktool output: /tmp/demo/apktool_output"));
        assert!(text.contains("Package: com.example"));
        assert!(text.contains("Version name: 1.2"));
        assert!(text.contains("Version code: 7"));
        assert!(!text.contains("Warning"));

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 8);
        assert_eq!(lines[0], "Decompiled /apps/demo.apk");
        assert!(lines[7].starts_with("Paths for readFile"));
        assert!(!text.ends_with('\n'));
    }

    #[test]
    fn renders_degraded_results_as_warnings() {
        let text = render_report(&report(ManifestInfo::Parsed(ManifestSummary::default()), false));
        assert!(text.contains(&format!("Package: {UNKNOWN_FIELD}")));
        assert!(text.contains("Warning: jadx did not finish cleanly"));

        let text = render_report(&report(
            ManifestInfo::Unavailable {
                reason: "failed to read manifest".to_string(),
            },
            true,
        ));
        assert!(text.contains("Warning: manifest summary unavailable (failed to read manifest)"));
    }
}
