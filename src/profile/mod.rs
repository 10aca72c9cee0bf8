mod stats;

use crate::error::{Error, Result};
use crate::request::Execute;
use crate::target::Target;
use std::time::Instant;

pub use stats::{ProfileReport, ResponseSample, SampleSet};

/// What to do when an iteration fails before a response is read
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Stop the run and return the error. No report is produced.
    #[default]
    Abort,
    /// Record the iteration as an error sample and keep going
    Record,
}

#[derive(Debug, Clone)]
pub struct ProfilerConfig {
    /// Number of sequential requests, must be at least 1
    pub requests: u32,
    pub policy: FailurePolicy,
}

/// Progress after each completed iteration
pub struct Progress<'a> {
    pub completed: u32,
    pub total: u32,
    /// Set when the iteration failed and was recorded under `FailurePolicy::Record`
    pub error: Option<&'a Error>,
}

/// Drives an executor repeatedly and reduces the samples into a report
pub struct Profiler<E> {
    executor: E,
    config: ProfilerConfig,
}

impl<E: Execute> Profiler<E> {
    pub fn new(executor: E, config: ProfilerConfig) -> Result<Self> {
        if config.requests == 0 {
            return Err(Error::InvalidArgument(
                "Profile request count must be at least 1".to_string(),
            ));
        }
        Ok(Profiler { executor, config })
    }

    /// Run all iterations sequentially
    pub fn run<F>(&self, target: &Target, mut on_progress: F) -> Result<ProfileReport>
    where
        F: FnMut(Progress<'_>),
    {
        let total = self.config.requests;
        let mut samples = SampleSet::with_capacity(total as usize);
        let run_start = Instant::now();

        for completed in 1..=total {
            let start = Instant::now();
            match self.executor.execute(target) {
                Ok(response) => {
                    samples.record(ResponseSample::new(response, start.elapsed()));
                    on_progress(Progress {
                        completed,
                        total,
                        error: None,
                    });
                }
                Err(e) => match self.config.policy {
                    FailurePolicy::Abort => return Err(e),
                    FailurePolicy::Record => {
                        samples.record_failure(start.elapsed().as_millis() as u64);
                        on_progress(Progress {
                            completed,
                            total,
                            error: Some(&e),
                        });
                    }
                },
            }
        }

        samples
            .finish(target.host(), run_start.elapsed())
            .ok_or_else(|| Error::InvalidArgument("No requests were made".to_string()))
    }
}
