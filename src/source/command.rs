use std::process::Command;

use tracing::debug;

use crate::error::SourceError;
use crate::model::Batch;

use super::{DataSource, ExpandKind, ExpandRequest, FetchRequest, parse_batch};

/// Runs an external program per request and parses its stdout as a batch.
///
/// The request is appended to the configured arguments as
/// `relations <identity> <limit>`, `members <identity> <limit>` or `classes`.
#[derive(Clone, Debug)]
pub struct CommandSource {
    program: String,
    args: Vec<String>,
}

impl CommandSource {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn request_args(request: &FetchRequest) -> Vec<String> {
        match request {
            FetchRequest::Classes => vec!["classes".to_owned()],
            FetchRequest::Expand(ExpandRequest {
                identity,
                sample_limit,
                kind,
            }) => {
                let verb = match kind {
                    ExpandKind::Relations => "relations",
                    ExpandKind::Members => "members",
                };
                vec![verb.to_owned(), identity.clone(), sample_limit.to_string()]
            }
        }
    }

    fn run(&self, request_args: &[String]) -> Result<String, SourceError> {
        debug!(program = %self.program, args = ?self.args, ?request_args, "running source command");

        let output = Command::new(&self.program)
            .args(&self.args)
            .args(request_args)
            .output()
            .map_err(|source| SourceError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if output.status.success() {
            String::from_utf8(output.stdout).map_err(|source| SourceError::Utf8 {
                program: self.program.clone(),
                source,
            })
        } else {
            Err(SourceError::CommandFailed {
                program: self.program.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            })
        }
    }
}

impl DataSource for CommandSource {
    fn fetch(&self, request: &FetchRequest) -> Result<Batch, SourceError> {
        let stdout = self.run(&Self::request_args(request))?;
        parse_batch(&stdout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requests_become_trailing_arguments() {
        assert_eq!(
            CommandSource::request_args(&FetchRequest::relations("urn:a", 5)),
            ["relations", "urn:a", "5"]
        );
        assert_eq!(
            CommandSource::request_args(&FetchRequest::members("urn:Class", 3)),
            ["members", "urn:Class", "3"]
        );
        assert_eq!(
            CommandSource::request_args(&FetchRequest::Classes),
            ["classes"]
        );
    }

    #[test]
    fn missing_program_fails_to_spawn() {
        let source = CommandSource::new("definitely-not-a-real-graph-source", Vec::new());
        let result = source.fetch(&FetchRequest::Classes);
        assert!(matches!(result, Err(SourceError::Spawn { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn stdout_is_parsed_as_a_batch() {
        let source = CommandSource::new(
            "sh",
            vec![
                "-c".to_owned(),
                r#"echo "[{\"source\": \"$2\", \"label\": \"knows\", \"destination\": \"b\"}]""#
                    .to_owned(),
                "source".to_owned(),
            ],
        );

        let batch = source
            .fetch(&FetchRequest::relations("a", 5))
            .expect("command succeeds");
        assert_eq!(batch.edges.len(), 1);
        assert_eq!(batch.edges[0].source.as_deref(), Some("a"));
    }

    #[cfg(unix)]
    #[test]
    fn nonzero_exit_reports_stderr() {
        let source = CommandSource::new(
            "sh",
            vec!["-c".to_owned(), "echo boom >&2; exit 3".to_owned(), "source".to_owned()],
        );

        match source.fetch(&FetchRequest::Classes) {
            Err(SourceError::CommandFailed { stderr, .. }) => assert_eq!(stderr, "boom"),
            other => panic!("expected command failure, got {other:?}"),
        }
    }
}
