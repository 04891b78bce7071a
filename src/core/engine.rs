use crate::core::session::{Session, PREVIEW_LIMIT};
use crate::core::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::RunMonitor;

/// Drives one full generation run: gather -> preview -> render -> deliver.
/// Owns the session state so every stage mutates it through the defined
/// mutation points only.
pub struct GenerationEngine<P: Pipeline> {
    pipeline: P,
    session: Session,
    monitor: RunMonitor,
}

impl<P: Pipeline> GenerationEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            session: Session::new(),
            monitor: RunMonitor::new(monitor_enabled),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub async fn run(&mut self) -> Result<String> {
        println!("Starting certificate generation...");

        // Gather
        println!("Reading inputs...");
        let (roster, background) = match self.pipeline.gather().await {
            Ok(inputs) => inputs,
            Err(e) => {
                self.session.on_error(&e);
                return Err(e);
            }
        };
        println!("Loaded {} records", roster.len());
        self.monitor.log_phase("Gather");

        // Preview
        for record in roster.preview(PREVIEW_LIMIT) {
            println!(
                "  {} | {} | {}",
                record.student_name, record.course_name, record.date
            );
        }
        if roster.len() > PREVIEW_LIMIT {
            println!("Showing {} of {} records", PREVIEW_LIMIT, roster.len());
        }

        self.session.on_roster_loaded(roster.clone());
        self.session.on_background_loaded(background.clone());

        // Render
        println!("Generating {} certificates...", roster.len());
        self.session.begin_run()?;

        let total = roster.len();
        let session = &mut self.session;
        let monitor = &self.monitor;
        let mut completed = 0usize;
        let mut on_progress = |progress: f64| {
            completed += 1;
            session.on_record_complete(progress);
            tracing::info!("Progress: {:.0}%", progress);
            monitor.log_record(completed, total);
        };

        let rendered = self
            .pipeline
            .render(&roster, Some(&background), &mut on_progress)
            .await;

        let rendered = match rendered {
            Ok(output) => output,
            Err(e) => {
                self.session.end_run(Err(&e));
                self.monitor.log_final_stats();
                return Err(e);
            }
        };
        println!("Generated {} certificates", rendered.len());
        self.monitor.log_phase("Render");

        // Deliver
        println!("Writing output files...");
        let delivered = self.pipeline.deliver(&roster, &rendered).await;
        let output_path = match delivered {
            Ok(path) => path,
            Err(e) => {
                self.session.end_run(Err(&e));
                self.monitor.log_final_stats();
                return Err(e);
            }
        };

        self.session.end_run(Ok(rendered.file_names()));
        self.monitor.log_final_stats();
        println!("Output saved to: {}", output_path);

        Ok(output_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ProgressSink;
    use crate::domain::model::{BackgroundAsset, Certificate, GenerationOutput, Record, Roster};
    use crate::utils::error::CertError;
    use async_trait::async_trait;

    struct FakePipeline {
        records: usize,
        fail_render: bool,
    }

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

    #[async_trait]
    impl Pipeline for FakePipeline {
        async fn gather(&self) -> Result<(Roster, BackgroundAsset)> {
            let background =
                BackgroundAsset::new("bg.png".into(), "image/png".into(), vec![1, 2, 3]).unwrap();
            Ok((roster(self.records), background))
        }

        async fn render(
            &self,
            roster: &Roster,
            _background: Option<&BackgroundAsset>,
            on_progress: ProgressSink<'_>,
        ) -> Result<GenerationOutput> {
            if self.fail_render {
                return Err(CertError::GenerationRequestError {
                    student: roster.records[0].student_name.clone(),
                });
            }

            let total = roster.len();
            let mut certificates = Vec::new();
            for (index, record) in roster.iter().enumerate() {
                certificates.push(Certificate {
                    student_name: record.student_name.clone(),
                    file_name: format!("{}.pdf", index),
                    bytes: vec![0],
                });
                on_progress(((index + 1) as f64 / total as f64) * 100.0);
            }
            Ok(GenerationOutput { certificates })
        }

        async fn deliver(&self, _roster: &Roster, _output: &GenerationOutput) -> Result<String> {
            Ok("out".to_string())
        }
    }

    #[tokio::test]
    async fn run_completes_and_records_outputs_in_the_session() {
        let mut engine = GenerationEngine::new(FakePipeline {
            records: 2,
            fail_render: false,
        });

        let path = engine.run().await.unwrap();

        assert_eq!(path, "out");
        assert!(!engine.session().is_generating());
        assert_eq!(engine.session().progress(), 100.0);
        assert_eq!(engine.session().outputs(), ["0.pdf", "1.pdf"]);
        assert!(engine.session().last_error().is_none());
    }

    #[tokio::test]
    async fn a_failed_render_leaves_an_error_and_no_outputs() {
        let mut engine = GenerationEngine::new(FakePipeline {
            records: 3,
            fail_render: true,
        });

        let err = engine.run().await.unwrap_err();

        assert!(matches!(err, CertError::GenerationRequestError { .. }));
        assert!(!engine.session().is_generating());
        assert!(engine.session().outputs().is_empty());
        assert_eq!(
            engine.session().last_error(),
            Some("Failed to generate certificate for Student 0")
        );
    }

    #[tokio::test]
    async fn the_session_can_host_a_second_run_after_a_failure() {
        let mut engine = GenerationEngine::new(FakePipeline {
            records: 1,
            fail_render: true,
        });
        engine.run().await.unwrap_err();

        // flag was cleared, so a fresh run is admitted
        assert!(!engine.session().is_generating());
        engine.session.begin_run().unwrap();
    }
}
