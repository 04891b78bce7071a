use crate::domain::model::{BackgroundAsset, Roster};
use crate::utils::error::{CertError, Result};

/// How many roster rows the preview surface shows before switching to a
/// "Showing N of M" note.
pub const PREVIEW_LIMIT: usize = 5;

/// Per-run state holder: current roster, background asset, progress, output
/// references and the most recent error. Every user-visible surface is a
/// projection of this struct, and all mutation happens through the
/// `on_*`/`begin_run`/`end_run` methods.
#[derive(Debug, Default)]
pub struct Session {
    roster: Option<Roster>,
    background: Option<BackgroundAsset>,
    generating: bool,
    progress: f64,
    outputs: Vec<String>,
    last_error: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// A newly loaded roster replaces the previous one wholesale and clears
    /// the error surface.
    pub fn on_roster_loaded(&mut self, roster: Roster) {
        self.roster = Some(roster);
        self.last_error = None;
    }

    /// Replacing the background asset also drops its preview reference,
    /// which lives inside the asset.
    pub fn on_background_loaded(&mut self, background: BackgroundAsset) {
        self.background = Some(background);
        self.last_error = None;
    }

    /// Run token: a second run cannot start while one is in flight.
    pub fn begin_run(&mut self) -> Result<()> {
        if self.generating {
            return Err(CertError::RunInProgressError);
        }

        self.generating = true;
        self.progress = 0.0;
        self.outputs.clear();
        Ok(())
    }

    pub fn on_record_complete(&mut self, progress: f64) {
        self.progress = progress;
    }

    /// Terminal for the current run, success or failure: the in-progress flag
    /// is always cleared so the session can host another run. A failed run
    /// retains no output references.
    pub fn end_run(&mut self, outcome: std::result::Result<Vec<String>, &CertError>) {
        self.generating = false;
        match outcome {
            Ok(file_names) => {
                self.outputs = file_names;
                self.last_error = None;
            }
            Err(e) => {
                self.outputs.clear();
                self.last_error = Some(e.user_friendly_message());
            }
        }
    }

    /// Failures outside a run (parse errors, bad uploads) surface the same
    /// way: one message, replacing whatever was shown before.
    pub fn on_error(&mut self, error: &CertError) {
        self.last_error = Some(error.user_friendly_message());
    }

    pub fn roster(&self) -> Option<&Roster> {
        self.roster.as_ref()
    }

    pub fn background(&self) -> Option<&BackgroundAsset> {
        self.background.as_ref()
    }

    pub fn is_generating(&self) -> bool {
        self.generating
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn outputs(&self) -> &[String] {
        &self.outputs
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Record;

    fn roster(n: usize) -> Roster {
        Roster::new(
            (0..n)
                .map(|i| Record {
                    student_name: format!("Student {}", i),
                    course_name: "Algebra".to_string(),
                    date: "2024-01-01".to_string(),
                })
                .collect(),
        )
    }

    #[test]
    fn begin_run_rejects_reentrant_invocation() {
        let mut session = Session::new();
        session.begin_run().unwrap();

        let err = session.begin_run().unwrap_err();
        assert!(matches!(err, CertError::RunInProgressError));
    }

    #[test]
    fn end_run_clears_the_flag_on_both_outcomes() {
        let mut session = Session::new();

        session.begin_run().unwrap();
        session.end_run(Ok(vec!["Jane_Doe_certificate.pdf".to_string()]));
        assert!(!session.is_generating());
        assert_eq!(session.outputs().len(), 1);

        session.begin_run().unwrap();
        session.end_run(Err(&CertError::GenerationRequestError {
            student: "Bob".to_string(),
        }));
        assert!(!session.is_generating());
        assert!(session.outputs().is_empty());
        assert_eq!(
            session.last_error(),
            Some("Failed to generate certificate for Bob")
        );
    }

    #[test]
    fn a_failed_run_discards_prior_outputs() {
        let mut session = Session::new();
        session.begin_run().unwrap();
        session.end_run(Ok(vec!["a.pdf".to_string(), "b.pdf".to_string()]));

        session.begin_run().unwrap();
        assert!(session.outputs().is_empty());
        session.end_run(Err(&CertError::EmptyRosterError));
        assert!(session.outputs().is_empty());
    }

    #[test]
    fn loading_a_roster_replaces_the_old_one_and_clears_the_error() {
        let mut session = Session::new();
        session.on_error(&CertError::SchemaError);
        assert!(session.last_error().is_some());

        session.on_roster_loaded(roster(3));
        assert!(session.last_error().is_none());
        assert_eq!(session.roster().unwrap().len(), 3);

        session.on_roster_loaded(roster(1));
        assert_eq!(session.roster().unwrap().len(), 1);
    }

    #[test]
    fn replacing_the_background_drops_the_old_preview() {
        let mut session = Session::new();

        let first = BackgroundAsset::new("a.png".into(), "image/png".into(), vec![1])
            .unwrap()
            .with_preview("/tmp/a.png");
        session.on_background_loaded(first);
        assert!(session.background().unwrap().preview.is_some());

        let second = BackgroundAsset::new("b.png".into(), "image/png".into(), vec![2]).unwrap();
        session.on_background_loaded(second);
        assert!(session.background().unwrap().preview.is_none());
        assert_eq!(session.background().unwrap().file_name, "b.png");
    }

    #[test]
    fn progress_tracks_record_completion() {
        let mut session = Session::new();
        session.begin_run().unwrap();

        session.on_record_complete(50.0);
        assert_eq!(session.progress(), 50.0);
        session.on_record_complete(100.0);
        assert_eq!(session.progress(), 100.0);
    }
}
