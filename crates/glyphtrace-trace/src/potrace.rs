//! The potrace subprocess backend.
//!
//! Serializes the mask to a temporary lossless BMP, invokes `potrace`
//! with SVG output, a tight bounding box, and the configured corner
//! and optimization tuning, then reads back the produced document.
//! The child process runs under a timeout and is killed on expiry.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Instant;

use glyphtrace_pipeline::BinaryMask;

use crate::{TraceError, TraceOptions, VectorTracer};

/// Poll interval while waiting on the child process.
const WAIT_POLL: std::time::Duration = std::time::Duration::from_millis(10);

/// The potrace tracing backend.
#[derive(Debug, Clone)]
pub struct Potrace {
    binary: PathBuf,
    options: TraceOptions,
}

impl Potrace {
    /// Backend using `potrace` from `PATH` with the given options.
    #[must_use]
    pub fn new(options: TraceOptions) -> Self {
        Self {
            binary: PathBuf::from("potrace"),
            options,
        }
    }

    /// Backend using an explicit binary path (tests, vendored builds).
    #[must_use]
    pub fn with_binary(binary: impl Into<PathBuf>, options: TraceOptions) -> Self {
        Self {
            binary: binary.into(),
            options,
        }
    }

    /// Probe whether the binary can be executed at all.
    ///
    /// Batch callers use this up front so a missing tool aborts the
    /// whole run instead of failing once per item.
    #[must_use]
    pub fn is_available(&self) -> bool {
        Command::new(&self.binary)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .is_ok_and(|status| status.success())
    }

    /// The command-line arguments for one trace invocation.
    fn build_args(&self, input: &Path, output: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![input.as_os_str().to_owned()];
        args.push("-s".into()); // SVG backend
        args.push("--tight".into()); // crop to content
        args.push("--turnpolicy".into());
        args.push(self.options.turn_policy.as_str().into());
        args.push("--alphamax".into());
        args.push(self.options.alphamax.to_string().into());
        args.push("--opttolerance".into());
        args.push(self.options.opttolerance.to_string().into());
        args.push("-o".into());
        args.push(output.as_os_str().to_owned());
        args
    }

    /// Spawn the child and wait for it within the timeout, killing it
    /// on expiry.
    fn run_with_timeout(&self, args: &[OsString]) -> Result<std::process::Output, TraceError> {
        let mut child = Command::new(&self.binary)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    TraceError::Unavailable(format!(
                        "{} not found on PATH; install potrace",
                        self.binary.display(),
                    ))
                } else {
                    TraceError::Io(e)
                }
            })?;

        let started = Instant::now();
        loop {
            if child.try_wait()?.is_some() {
                return Ok(child.wait_with_output()?);
            }
            if started.elapsed() >= self.options.timeout {
                tracing::warn!(
                    timeout = ?self.options.timeout,
                    "tracer exceeded time budget, killing subprocess",
                );
                child.kill()?;
                child.wait()?;
                return Err(TraceError::Timeout(self.options.timeout));
            }
            std::thread::sleep(WAIT_POLL);
        }
    }
}

impl VectorTracer for Potrace {
    fn trace(&self, mask: &BinaryMask) -> Result<String, TraceError> {
        let dir = tempfile::tempdir()?;
        let input = dir.path().join("mask.bmp");
        let output = dir.path().join("trace.svg");

        // Stage as RGB BMP: a format both the encoder and potrace
        // handle; potrace re-thresholds it at 50% without loss since
        // the mask is strictly two-level.
        let staged = image::DynamicImage::ImageLuma8(mask.image().clone()).to_rgb8();
        staged.save(&input)?;

        let args = self.build_args(&input, &output);
        tracing::debug!(binary = %self.binary.display(), "invoking tracer");
        let result = self.run_with_timeout(&args)?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(TraceError::Failed(format!(
                "potrace exited with {}: {}",
                result.status,
                stderr.trim(),
            )));
        }

        let svg = std::fs::read_to_string(&output)?;
        if !svg.contains("<path") {
            return Err(TraceError::Failed(
                "tracer output contains no path elements (blank mask?)".to_string(),
            ));
        }
        Ok(svg)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use glyphtrace_pipeline::GrayImage;

    use super::*;

    fn tiny_mask() -> BinaryMask {
        let img = GrayImage::from_fn(4, 4, |x, _| {
            image::Luma([if x < 2 { 0 } else { 255 }])
        });
        BinaryMask::from_gray(&img)
    }

    #[test]
    fn args_carry_the_configured_tuning() {
        let tracer = Potrace::new(TraceOptions {
            alphamax: 1.0,
            opttolerance: 0.2,
            ..TraceOptions::default()
        });
        let args = tracer.build_args(Path::new("in.bmp"), Path::new("out.svg"));
        let spelled: Vec<String> = args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();

        assert!(spelled.contains(&"-s".to_string()));
        assert!(spelled.contains(&"--tight".to_string()));
        assert!(spelled.contains(&"minority".to_string()));
        assert!(spelled.contains(&"1".to_string()));
        assert!(spelled.contains(&"0.2".to_string()));
        assert_eq!(spelled.last().unwrap(), "out.svg");
    }

    #[test]
    fn missing_binary_is_unavailable_not_failed() {
        let tracer = Potrace::with_binary(
            "/nonexistent/glyphtrace-no-such-tracer",
            TraceOptions::default(),
        );
        let result = tracer.trace(&tiny_mask());
        assert!(matches!(result, Err(TraceError::Unavailable(_))));
    }

    #[test]
    fn availability_probe_is_false_for_missing_binary() {
        let tracer = Potrace::with_binary(
            "/nonexistent/glyphtrace-no-such-tracer",
            TraceOptions::default(),
        );
        assert!(!tracer.is_available());
    }
}
