//! Document conversion adapter: `convert_document`.
//!
//! The adapter only validates paths and derives the output format from the
//! output extension. Byte-level conversion is delegated to a
//! [`ConversionEngine`]; the production engine shells out to pandoc.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::path::{Path, PathBuf};

use crate::error::AdapterError;

/// Arguments of `convert_document`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ConvertArgs {
    /// Local path to the source file that needs to be converted.
    pub input_path: String,

    /// Local path where the converted file is saved. Its extension (e.g. `.docx`, `.pdf`, `.html`) selects the output format.
    pub output_path: String,
}

/// One validated conversion handed to the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionJob {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Output format taken from the output extension, e.g. `pdf`.
    pub format: String,
}

/// Failure reported by a conversion engine.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("{0}")]
    Unavailable(String),

    #[error("{0}")]
    Failed(String),
}

/// Something that turns one document into another.
pub trait ConversionEngine: Send + Sync {
    fn convert(&self, job: &ConversionJob) -> impl Future<Output = Result<(), EngineError>> + Send;
}

/// Runs the `pandoc` executable.
#[derive(Debug, Clone)]
pub struct PandocEngine {
    binary: PathBuf,
}

impl PandocEngine {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Executable this engine runs.
    pub fn binary(&self) -> &Path {
        &self.binary
    }

    fn arguments(job: &ConversionJob) -> Vec<String> {
        let mut args = vec![
            job.input.display().to_string(),
            "-o".to_string(),
            job.output.display().to_string(),
        ];
        if let Some(writer) = writer_name(&job.format) {
            args.push("--to".to_string());
            args.push(writer);
        }
        args
    }
}

/// pandoc writer for an output extension. `None` for pdf: pandoc has no `pdf`
/// writer and picks a PDF engine from the `-o` extension.
fn writer_name(format: &str) -> Option<String> {
    let format = format.to_ascii_lowercase();
    let writer = match format.as_str() {
        "pdf" => return None,
        "md" => "markdown",
        "txt" => "plain",
        "tex" => "latex",
        "htm" | "xhtml" => "html",
        "adoc" => "asciidoc",
        "wiki" => "mediawiki",
        other => return Some(other.to_string()),
    };
    Some(writer.to_string())
}

impl Default for PandocEngine {
    fn default() -> Self {
        Self::new("pandoc")
    }
}

impl ConversionEngine for PandocEngine {
    async fn convert(&self, job: &ConversionJob) -> Result<(), EngineError> {
        let args = Self::arguments(job);
        log::debug!("Running {} {}", self.binary.display(), args.join(" "));

        let output = tokio::process::Command::new(&self.binary)
            .args(&args)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => EngineError::Unavailable(format!(
                    "'{}' was not found. Install pandoc or set PANDOC_PATH.",
                    self.binary.display()
                )),
                _ => EngineError::Failed(format!("failed to run {}: {e}", self.binary.display())),
            })?;

        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let detail = stderr.trim();
        Err(EngineError::Failed(if detail.is_empty() {
            format!("pandoc exited with {}", output.status)
        } else {
            detail.to_string()
        }))
    }
}

/// Adapter validating conversion requests before handing them to `E`.
#[derive(Debug, Clone)]
pub struct ConvertAdapter<E = PandocEngine> {
    engine: E,
}

impl<E: ConversionEngine> ConvertAdapter<E> {
    pub fn new(engine: E) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub async fn convert(&self, args: &ConvertArgs) -> Result<String, AdapterError> {
        let job = prepare_job(args)?;

        if !job.input.exists() {
            return Err(AdapterError::InputNotFound(job.input));
        }

        log::debug!(
            "Converting {} to {} (format: {})",
            job.input.display(),
            job.output.display(),
            job.format
        );

        self.engine.convert(&job).await.map_err(|e| match e {
            EngineError::Unavailable(message) => AdapterError::EngineUnavailable(message),
            EngineError::Failed(message) => AdapterError::ConversionFailed(message),
        })?;

        Ok(format!(
            "Successfully converted '{}' to '{}'.",
            args.input_path, args.output_path
        ))
    }
}

/// Validate paths and infer the output format.
pub fn prepare_job(args: &ConvertArgs) -> Result<ConversionJob, AdapterError> {
    let input = args.input_path.trim();
    let output = args.output_path.trim();

    if input.is_empty() {
        return Err(AdapterError::InvalidArgument("input_path must not be empty".to_string()));
    }
    if output.is_empty() {
        return Err(AdapterError::InvalidArgument("output_path must not be empty".to_string()));
    }

    let output = PathBuf::from(output);
    let format = output_format(&output).ok_or_else(|| AdapterError::MissingExtension(output.clone()))?;

    Ok(ConversionJob {
        input: PathBuf::from(input),
        output,
        format,
    })
}

/// Extension of `path` without the dot, if there is a non-empty one.
pub fn output_format(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(input: &str, output: &str) -> ConvertArgs {
        ConvertArgs {
            input_path: input.to_string(),
            output_path: output.to_string(),
        }
    }

    #[test]
    fn format_comes_from_extension() {
        let job = prepare_job(&args("a.md", "out/b.pdf")).expect("valid");
        assert_eq!(job.format, "pdf");
        assert_eq!(job.output, PathBuf::from("out/b.pdf"));
    }

    #[test]
    fn missing_extension_is_rejected() {
        let err = prepare_job(&args("a.md", "b")).expect_err("no extension");
        assert!(matches!(err, AdapterError::MissingExtension(_)));
        assert!(prepare_job(&args("a.md", "b.")).is_err());
        assert!(prepare_job(&args("a.md", ".hidden")).is_err());
    }

    #[test]
    fn empty_paths_are_rejected() {
        assert!(matches!(
            prepare_job(&args(" ", "b.pdf")),
            Err(AdapterError::InvalidArgument(_))
        ));
        assert!(matches!(
            prepare_job(&args("a.md", "")),
            Err(AdapterError::InvalidArgument(_))
        ));
    }

    #[test]
    fn pandoc_arguments() {
        let pdf = ConversionJob {
            input: "a.md".into(),
            output: "b.pdf".into(),
            format: "pdf".into(),
        };
        assert_eq!(PandocEngine::arguments(&pdf), vec!["a.md", "-o", "b.pdf"]);

        let docx = ConversionJob {
            format: "docx".into(),
            output: "b.docx".into(),
            ..pdf
        };
        assert_eq!(
            PandocEngine::arguments(&docx),
            vec!["a.md", "-o", "b.docx", "--to", "docx"]
        );
    }

    #[test]
    fn extension_aliases_map_to_writers() {
        let job = |output: &str, format: &str| ConversionJob {
            input: "a.docx".into(),
            output: output.into(),
            format: format.into(),
        };
        assert_eq!(
            PandocEngine::arguments(&job("b.md", "md")),
            vec!["a.docx", "-o", "b.md", "--to", "markdown"]
        );
        assert_eq!(
            PandocEngine::arguments(&job("b.txt", "txt")),
            vec!["a.docx", "-o", "b.txt", "--to", "plain"]
        );
        assert_eq!(
            PandocEngine::arguments(&job("b.tex", "tex")),
            vec!["a.docx", "-o", "b.tex", "--to", "latex"]
        );
        assert_eq!(
            PandocEngine::arguments(&job("b.HTM", "HTM")),
            vec!["a.docx", "-o", "b.HTM", "--to", "html"]
        );
        assert_eq!(PandocEngine::arguments(&job("b.PDF", "PDF")), vec!["a.docx", "-o", "b.PDF"]);
    }

    #[tokio::test]
    async fn missing_binary_is_engine_unavailable() {
        let dir = tempfile::tempdir().expect("tempdir");
        let input = dir.path().join("a.md");
        std::fs::write(&input, "# hi").expect("write input");

        let adapter = ConvertAdapter::new(PandocEngine::new("/nonexistent/bin/pandoc"));
        let err = adapter
            .convert(&args(
                &input.display().to_string(),
                &dir.path().join("b.html").display().to_string(),
            ))
            .await
            .expect_err("binary missing");
        assert!(matches!(err, AdapterError::EngineUnavailable(_)));
    }
}
