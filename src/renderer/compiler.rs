//! External LaTeX compiler invocation
//!
//! Every compile gets its own scratch directory. The compiler runs a fixed
//! number of passes (the second resolves cross-references), each bounded by
//! a timeout. Nothing is retried.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::config::CompilerConfig;
use crate::error::EngineError;

const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Base name used for the source and output files inside the scratch dir
const JOB_NAME: &str = "resume";

/// Compile `source` and move the resulting PDF to `output_path`
pub fn compile_to(
    config: &CompilerConfig,
    scratch_root: &Path,
    source: &str,
    output_path: &Path,
) -> Result<PathBuf, EngineError> {
    fs::create_dir_all(scratch_root).map_err(|e| EngineError::io(scratch_root, e))?;
    let workdir = tempfile::Builder::new()
        .prefix("render-")
        .tempdir_in(scratch_root)
        .map_err(|e| EngineError::io(scratch_root, e))?;

    let tex_path = workdir.path().join(format!("{JOB_NAME}.tex"));
    fs::write(&tex_path, source).map_err(|e| EngineError::io(&tex_path, e))?;

    for pass in 1..=config.passes.max(1) {
        debug!(pass, program = %config.program, "running compiler pass");
        run_pass(config, workdir.path(), &tex_path)?;
    }

    let produced = workdir.path().join(format!("{JOB_NAME}.pdf"));
    if !produced.exists() {
        return Err(EngineError::ArtifactMissing {
            path: produced,
            log: read_job_log(workdir.path()),
        });
    }

    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| EngineError::io(parent, e))?;
    }
    move_file(&produced, output_path)?;
    Ok(output_path.to_path_buf())
}

/// Run one compiler pass, failing on non-zero exit or timeout
fn run_pass(config: &CompilerConfig, workdir: &Path, tex_path: &Path) -> Result<(), EngineError> {
    let mut child = Command::new(&config.program)
        .args(&config.args)
        .arg(format!("-output-directory={}", workdir.display()))
        .arg(tex_path)
        .current_dir(workdir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| {
            EngineError::compilation(
                format!("failed to start '{}': {e}", config.program),
                String::new(),
            )
        })?;

    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());
    let waited = wait_with_timeout(&mut child, config.timeout());

    let stdout = stdout.join().unwrap_or_default();
    let stderr = stderr.join().unwrap_or_default();

    match waited {
        Ok(Some(status)) if status.success() => Ok(()),
        Ok(Some(status)) => Err(EngineError::compilation(
            format!("'{}' exited with {status}", config.program),
            diagnostics(&stdout, &stderr, workdir),
        )),
        Ok(None) => Err(EngineError::compilation(
            format!(
                "'{}' timed out after {} seconds",
                config.program, config.timeout_secs
            ),
            diagnostics(&stdout, &stderr, workdir),
        )),
        Err(e) => Err(EngineError::compilation(
            format!("failed waiting for '{}': {e}", config.program),
            diagnostics(&stdout, &stderr, workdir),
        )),
    }
}

/// Collect a pipe on a helper thread so the child never blocks on a full buffer
fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> thread::JoinHandle<String> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buf);
        }
        String::from_utf8_lossy(&buf).into_owned()
    })
}

/// `Ok(None)` when the deadline passed; the child has been killed by then
fn wait_with_timeout(child: &mut Child, timeout: Duration) -> std::io::Result<Option<ExitStatus>> {
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if Instant::now() >= deadline {
            let _ = child.kill();
            let _ = child.wait();
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    }
}

fn diagnostics(stdout: &str, stderr: &str, workdir: &Path) -> String {
    format!(
        "stdout:\n{stdout}\nstderr:\n{stderr}\nlog:\n{}",
        read_job_log(workdir)
    )
}

fn read_job_log(workdir: &Path) -> String {
    fs::read_to_string(workdir.join(format!("{JOB_NAME}.log"))).unwrap_or_default()
}

/// Rename, falling back to copy + remove across filesystems
pub(crate) fn move_file(from: &Path, to: &Path) -> Result<(), EngineError> {
    if fs::rename(from, to).is_ok() {
        return Ok(());
    }
    fs::copy(from, to).map_err(|e| EngineError::io(to, e))?;
    fs::remove_file(from).map_err(|e| EngineError::io(from, e))
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    /// Stand-in compiler script, run through `/bin/sh` so it is never exec'd directly
    fn script(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join("fake-latex.sh");
        fs::write(&path, format!("{body}\n")).unwrap();
        path
    }

    fn config(script: &Path, timeout_secs: u64) -> CompilerConfig {
        CompilerConfig {
            program: "/bin/sh".to_string(),
            args: vec![
                script.display().to_string(),
                "-interaction=nonstopmode".to_string(),
            ],
            timeout_secs,
            passes: 2,
        }
    }

    #[test]
    fn test_compile_moves_output() {
        let dir = tempfile::tempdir().unwrap();
        let program = script(
            dir.path(),
            r#"eval "last=\${$#}"
echo pass >> "$(dirname "$last")/passes"
cat "$(dirname "$last")/passes" "$last" > "${last%.tex}.pdf""#,
        );
        let out = dir.path().join("out/final.pdf");
        let result = compile_to(&config(&program, 10), dir.path(), "hello", &out).unwrap();

        assert_eq!(result, out);
        let content = fs::read_to_string(&out).unwrap();
        assert_eq!(content, "pass\npass\nhello");
    }

    #[test]
    fn test_nonzero_exit_carries_log() {
        let dir = tempfile::tempdir().unwrap();
        let program = script(dir.path(), "echo '! Undefined control sequence.'\nexit 1");
        let out = dir.path().join("final.pdf");
        let err = compile_to(&config(&program, 10), dir.path(), "x", &out).unwrap_err();

        assert!(matches!(err, EngineError::Compilation { .. }));
        assert!(err.log().unwrap().contains("Undefined control sequence"));
        assert!(!out.exists());
    }

    #[test]
    fn test_success_without_pdf_is_artifact_missing() {
        let dir = tempfile::tempdir().unwrap();
        let program = script(dir.path(), "exit 0");
        let out = dir.path().join("final.pdf");
        let err = compile_to(&config(&program, 10), dir.path(), "x", &out).unwrap_err();
        assert!(matches!(err, EngineError::ArtifactMissing { .. }));
    }

    #[test]
    fn test_timeout() {
        let dir = tempfile::tempdir().unwrap();
        let program = script(dir.path(), "exec sleep 10");
        let out = dir.path().join("final.pdf");
        let started = Instant::now();
        let err = compile_to(&config(&program, 1), dir.path(), "x", &out).unwrap_err();

        assert!(err.to_string().contains("timed out"));
        assert!(started.elapsed() < Duration::from_secs(8));
    }

    #[test]
    fn test_missing_program() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config(Path::new("unused"), 1);
        config.program = dir.path().join("no-such-compiler").display().to_string();
        let out = dir.path().join("final.pdf");
        let err = compile_to(&config, dir.path(), "x", &out).unwrap_err();
        assert!(err.to_string().contains("failed to start"));
    }

    #[test]
    fn test_scratch_dir_removed_after_compile() {
        let dir = tempfile::tempdir().unwrap();
        let scratch = dir.path().join("scratch");
        let program = script(dir.path(), "exit 3");
        let _ = compile_to(&config(&program, 5), &scratch, "x", &dir.path().join("o.pdf"));
        assert_eq!(fs::read_dir(&scratch).unwrap().count(), 0);
    }
}
