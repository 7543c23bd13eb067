use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::event::{AppEvent, EventTx};
use crate::log::LogSink;
use crate::openai::{CompletionSource, GenerationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenAction {
    Resume,
    CoverLetter,
}

impl GenAction {
    pub fn label(self) -> &'static str {
        match self {
            Self::Resume => "resume",
            Self::CoverLetter => "cover letter",
        }
    }

    pub fn output_file(self) -> &'static str {
        match self {
            Self::Resume => "generated_resume.txt",
            Self::CoverLetter => "generated_cover_letter.txt",
        }
    }

    pub fn system_preamble(self) -> &'static str {
        match self {
            Self::Resume => {
                "You are a professional resume writer. You may not have all the \
                 information but dissect the project readmes and generate a \
                 professional resume anyways. You should heavily include my \
                 projects in the resume."
            }
            Self::CoverLetter => {
                "You are a professional cover letter writer. Generate a compelling \
                 cover letter based on the provided information. Tailor the letter \
                 to highlight the candidate's skills and experiences that are most \
                 relevant to a software development position."
            }
        }
    }

    fn user_prompt(self, input_data: &str) -> String {
        format!(
            "Using the following data, generate a professional {}:\n\n{}",
            self.label(),
            input_data
        )
    }

    fn success_message(self) -> String {
        let noun = match self {
            Self::Resume => "Resume",
            Self::CoverLetter => "Cover letter",
        };
        format!("{} generated and saved to '{}'", noun, self.output_file())
    }
}

/// Everything prompt assembly needs, cloned out of application state so the
/// generation thread never touches `App`.
#[derive(Debug, Clone, Default)]
pub struct PromptInputs {
    pub files: Vec<PathBuf>,
    pub readme_names: Vec<String>,
    pub readmes: HashMap<String, String>,
    pub picked: HashMap<String, bool>,
}

#[derive(Debug)]
pub struct GenerationOutcome {
    pub action: GenAction,
    pub message: String,
    pub elapsed: Duration,
}

/// Deterministic concatenation: imported files in selection order, then the
/// picked READMEs in fetch order. Empty sections get a placeholder line so
/// the model knows what is missing.
pub fn build_input_data(inputs: &PromptInputs) -> Result<String, GenerationError> {
    let mut out = String::new();

    if inputs.files.is_empty() {
        out.push_str("No resume or cover letter provided.\n\n");
    } else {
        for path in &inputs.files {
            let content = std::fs::read_to_string(path).map_err(|e| {
                GenerationError::Io(format!("error reading file {}: {}", path.display(), e))
            })?;
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| path.display().to_string());
            out.push_str(&format!("File: {}\n{}\n\n", name, content));
        }
    }

    let picked: Vec<&String> = inputs
        .readme_names
        .iter()
        .filter(|name| inputs.picked.get(*name).copied().unwrap_or(false))
        .collect();

    if picked.is_empty() {
        out.push_str("No GitHub README files found.\n\n");
    } else {
        for name in picked {
            if let Some(content) = inputs.readmes.get(name) {
                out.push_str(&format!("Project: {}\n{}\n\n", name, content));
            }
        }
    }

    Ok(out)
}

/// Run one generation call on a background thread: assemble the prompt, call
/// the completion API once, persist the artifact, then emit a single
/// `Generation` event.
pub fn spawn_generation(
    client: Arc<dyn CompletionSource>,
    action: GenAction,
    inputs: PromptInputs,
    out_dir: PathBuf,
    tx: EventTx,
    log: LogSink,
) {
    std::thread::spawn(move || {
        let result = run_generation(client.as_ref(), action, &inputs, &out_dir, &log);
        let _ = tx.send(AppEvent::Generation(result));
    });
}

fn run_generation(
    client: &dyn CompletionSource,
    action: GenAction,
    inputs: &PromptInputs,
    out_dir: &Path,
    log: &LogSink,
) -> Result<GenerationOutcome, GenerationError> {
    let started = Instant::now();

    let input_data = build_input_data(inputs)?;
    let text = client.complete(action.system_preamble(), &action.user_prompt(&input_data))?;

    // Persist before reporting success so the on-disk artifact always matches
    // the message shown to the user.
    std::fs::write(out_dir.join(action.output_file()), &text).map_err(|e| {
        GenerationError::Io(format!("error saving {}: {}", action.label(), e))
    })?;

    let elapsed = started.elapsed();
    log.info(format!(
        "Completed {} generation in {:.1}s.",
        action.label(),
        elapsed.as_secs_f64()
    ));
    Ok(GenerationOutcome {
        action,
        message: action.success_message(),
        elapsed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event;

    struct StubCompletion {
        text: String,
    }

    impl CompletionSource for StubCompletion {
        fn complete(&self, _system: &str, _user: &str) -> Result<String, GenerationError> {
            Ok(self.text.clone())
        }
    }

    fn inputs_with_readmes(pairs: &[(&str, &str, bool)]) -> PromptInputs {
        let mut inputs = PromptInputs::default();
        for (name, content, picked) in pairs {
            inputs.readme_names.push(name.to_string());
            inputs.readmes.insert(name.to_string(), content.to_string());
            inputs.picked.insert(name.to_string(), *picked);
        }
        inputs
    }

    #[test]
    fn test_placeholders_when_empty() {
        let data = build_input_data(&PromptInputs::default()).unwrap();
        assert!(data.contains("No resume or cover letter provided."));
        assert!(data.contains("No GitHub README files found."));
    }

    #[test]
    fn test_readmes_follow_fetch_order_and_picks() {
        let inputs = inputs_with_readmes(&[
            ("zeta", "zeta readme", true),
            ("alpha", "alpha readme", false),
            ("mid", "mid readme", true),
        ]);
        let data = build_input_data(&inputs).unwrap();
        let zeta = data.find("Project: zeta").unwrap();
        let mid = data.find("Project: mid").unwrap();
        assert!(zeta < mid);
        assert!(!data.contains("Project: alpha"));
    }

    #[test]
    fn test_files_come_before_readmes() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("old_resume.txt");
        std::fs::write(&file, "ten years of experience").unwrap();

        let mut inputs = inputs_with_readmes(&[("proj", "proj readme", true)]);
        inputs.files.push(file);

        let data = build_input_data(&inputs).unwrap();
        let file_pos = data.find("File: old_resume.txt").unwrap();
        let proj_pos = data.find("Project: proj").unwrap();
        assert!(file_pos < proj_pos);
        assert!(data.contains("ten years of experience"));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let mut inputs = PromptInputs::default();
        inputs.files.push(PathBuf::from("/nonexistent/resume.txt"));
        match build_input_data(&inputs) {
            Err(GenerationError::Io(msg)) => assert!(msg.contains("error reading file")),
            other => panic!("expected Io error, got {:?}", other),
        }
    }

    #[test]
    fn test_build_is_deterministic() {
        let inputs = inputs_with_readmes(&[
            ("a", "one", true),
            ("b", "two", true),
            ("c", "three", true),
        ]);
        let first = build_input_data(&inputs).unwrap();
        let second = build_input_data(&inputs).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_generated_text_round_trips_to_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let generated = "Jane Doe\nSoftware Developer\n\n- shipped things\n";
        let stub = StubCompletion {
            text: generated.to_string(),
        };

        let outcome = run_generation(
            &stub,
            GenAction::Resume,
            &PromptInputs::default(),
            dir.path(),
            &crate::log::LogSink::unmirrored(),
        )
        .unwrap();

        let on_disk = std::fs::read(dir.path().join(GenAction::Resume.output_file())).unwrap();
        assert_eq!(on_disk, generated.as_bytes());
        assert_eq!(outcome.action, GenAction::Resume);
        assert!(outcome.message.contains("generated_resume.txt"));
    }

    #[test]
    fn test_artifact_is_on_disk_before_completion_event() {
        let dir = tempfile::tempdir().unwrap();
        let stub = StubCompletion {
            text: "Dear hiring manager,".to_string(),
        };
        let (tx, rx) = event::channel();
        spawn_generation(
            Arc::new(stub),
            GenAction::CoverLetter,
            PromptInputs::default(),
            dir.path().to_path_buf(),
            tx,
            crate::log::LogSink::unmirrored(),
        );

        match rx.recv_timeout(Duration::from_secs(5)).unwrap() {
            AppEvent::Generation(Ok(outcome)) => {
                let on_disk = std::fs::read_to_string(
                    dir.path().join(GenAction::CoverLetter.output_file()),
                )
                .unwrap();
                assert_eq!(on_disk, "Dear hiring manager,");
                assert_eq!(outcome.action, GenAction::CoverLetter);
            }
            other => panic!("expected successful generation, got {:?}", other),
        }
    }

    #[test]
    fn test_action_metadata() {
        assert_eq!(GenAction::Resume.output_file(), "generated_resume.txt");
        assert_eq!(
            GenAction::CoverLetter.output_file(),
            "generated_cover_letter.txt"
        );
        assert!(GenAction::Resume.system_preamble().contains("resume writer"));
        assert!(GenAction::CoverLetter
            .user_prompt("DATA")
            .ends_with("cover letter:\n\nDATA"));
    }
}
