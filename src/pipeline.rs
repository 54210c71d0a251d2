use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::config::{CommentSet, Config};
use crate::error::{Error, Result};
use crate::exif::{self, ContainerKind, ExifRecord};
use crate::png;
use crate::ucs2;

/// Where a scenario's clean base image comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageSource {
    /// Built in memory by [`png::build_minimal_png`].
    Synthesized,
    /// Read from a metadata-free file on disk.
    Fixture(PathBuf),
}

/// One container format to round-trip through.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub kind: ContainerKind,
    pub source: ImageSource,
    /// The embedded image is written here for manual inspection.
    pub output: PathBuf,
}

/// Outcome of a single scenario.
#[derive(Debug, Serialize)]
pub struct ScenarioReport {
    pub format: ContainerKind,
    pub output: PathBuf,
    pub passed: bool,
    /// Size of the written artifact; set only when the scenario passed.
    pub bytes_written: Option<usize>,
    pub error: Option<String>,
}

/// Aggregate of every scenario that ran.
///
/// Scenarios run in order and the first failure stops the run, so a failing
/// summary's last report is the failing one.
#[derive(Debug, Default, Serialize)]
pub struct RunSummary {
    pub scenarios: Vec<ScenarioReport>,
}

impl RunSummary {
    pub fn passed(&self) -> bool {
        !self.scenarios.is_empty() && self.scenarios.iter().all(|s| s.passed)
    }

    /// Process exit status: 0 when every scenario passed, 1 otherwise.
    pub fn exit_code(&self) -> u8 {
        if self.passed() { 0 } else { 1 }
    }
}

/// The PNG and JPEG scenarios described by `config`, in run order.
pub fn scenarios(config: &Config) -> Vec<Scenario> {
    let files = &config.files;
    vec![
        Scenario {
            kind: ContainerKind::Png,
            source: ImageSource::Synthesized,
            output: files.resolve(&files.png_output),
        },
        Scenario {
            kind: ContainerKind::Jpeg,
            source: ImageSource::Fixture(files.resolve(&files.jpeg_fixture)),
            output: files.resolve(&files.jpeg_output),
        },
    ]
}

/// Produce the clean base image for a scenario.
pub fn base_image(source: &ImageSource) -> Result<Vec<u8>> {
    match source {
        ImageSource::Synthesized => Ok(png::build_minimal_png()),
        ImageSource::Fixture(path) => std::fs::read(path).map_err(|e| Error::io(path, e)),
    }
}

/// Serialize `record` and splice it into `image`.
pub fn embed(record: &ExifRecord, image: &[u8]) -> Result<Vec<u8>> {
    let tiff = exif::dump(record)?;
    exif::insert(&tiff, image)
}

fn check_field(
    kind: ContainerKind,
    field: &'static str,
    expected: &str,
    actual: Option<String>,
) -> Result<()> {
    match actual {
        Some(ref value) if value == expected => Ok(()),
        _ => Err(Error::Mismatch {
            format: kind.name(),
            field,
            expected: expected.to_string(),
            actual: actual.unwrap_or_else(|| "<missing>".to_string()),
        }),
    }
}

/// Compare a reloaded record against the comments that were embedded.
///
/// String fields are compared directly; XPComment is compared after UCS-2
/// decoding both sides.
pub fn verify(kind: ContainerKind, expected: &CommentSet, loaded: &ExifRecord) -> Result<()> {
    check_field(
        kind,
        "ImageDescription",
        &expected.image_description,
        loaded.zeroth.image_description.clone(),
    )?;
    check_field(
        kind,
        "UserComment",
        &expected.user_comment,
        loaded.exif.user_comment.clone(),
    )?;
    check_field(
        kind,
        "XPComment",
        &ucs2::decode(&ucs2::encode(&expected.xp_comment)),
        loaded.zeroth.xp_comment.as_deref().map(ucs2::decode),
    )
}

fn write_artifact(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
    }
    std::fs::write(path, bytes).map_err(|e| Error::io(path, e))
}

/// Run one scenario end to end and return the artifact size.
///
/// 1. **Base** — synthesize the PNG or read the JPEG fixture
/// 2. **Embed** — `dump` the comments and `insert` them
/// 3. **Persist** — write the new image to `scenario.output`
/// 4. **Reload** — `load` the new image and compare every field
pub fn run_scenario(scenario: &Scenario, comments: &CommentSet) -> Result<usize> {
    let name = scenario.kind.name();
    let clean = base_image(&scenario.source)?;
    log::debug!("{name}: base image is {} bytes", clean.len());

    let embedded = embed(&comments.to_record(), &clean)?;
    if scenario.kind == ContainerKind::Png {
        let chunks = png::read_chunks(&embedded)?;
        log::debug!("{name}: {} chunks, all CRCs valid", chunks.len());
    }

    let ext = scenario.output.extension().and_then(|e| e.to_str());
    if !ext.is_some_and(|e| e.eq_ignore_ascii_case(scenario.kind.extension())) {
        log::warn!(
            "{name}: output {} does not have a .{} extension",
            scenario.output.display(),
            scenario.kind.extension()
        );
    }
    write_artifact(&scenario.output, &embedded)?;
    log::info!("Saved {name} to {}", scenario.output.display());

    let loaded = exif::load(&embedded)?;
    verify(scenario.kind, comments, &loaded)?;
    Ok(embedded.len())
}

/// Run every scenario in order, stopping at the first failure.
///
/// # Example
///
/// ```rust,no_run
/// use comment_roundtrip::config::Config;
/// use comment_roundtrip::pipeline::run_all;
///
/// let summary = run_all(&Config::default());
/// std::process::exit(i32::from(summary.exit_code()));
/// ```
pub fn run_all(config: &Config) -> RunSummary {
    let mut summary = RunSummary::default();

    for scenario in scenarios(config) {
        let name = scenario.kind.name();
        log::info!("Running {name} comment round trip");

        let report = match run_scenario(&scenario, &config.comments) {
            Ok(bytes) => {
                log::info!("{name}: all comment fields round-tripped");
                ScenarioReport {
                    format: scenario.kind,
                    output: scenario.output,
                    passed: true,
                    bytes_written: Some(bytes),
                    error: None,
                }
            }
            Err(e) => {
                log::error!("{name} scenario stopped the run: {e}");
                ScenarioReport {
                    format: scenario.kind,
                    output: scenario.output,
                    passed: false,
                    bytes_written: None,
                    error: Some(e.to_string()),
                }
            }
        };

        let passed = report.passed;
        summary.scenarios.push(report);
        if !passed {
            break;
        }
    }

    summary
}
