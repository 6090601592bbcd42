//! Pipeline invoker
//!
//! Runs one invocation as a straight line: parse parameters, resolve the
//! name, construct the instance, run it. Each step only starts once the
//! previous one succeeded, and nothing is retried.

use chrono::{DateTime, Utc};
use medallion_core::domain::params::{PipelineName, PipelineParameters};
use serde::Serialize;
use std::time::Instant;
use tracing::{debug, error, info, info_span};
use uuid::Uuid;

use crate::error::InvocationError;
use crate::registry::PipelineResolver;

/// Raw caller input for one invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationRequest {
    pub pipeline_name: String,
    pub source: String,
    pub target: String,
    /// `YYYY-MM-DD`
    pub start_date: String,
    /// `YYYY-MM-DD`
    pub end_date: String,
}

impl InvocationRequest {
    pub fn new(
        pipeline_name: impl Into<String>,
        source: impl Into<String>,
        target: impl Into<String>,
        start_date: impl Into<String>,
        end_date: impl Into<String>,
    ) -> Self {
        Self {
            pipeline_name: pipeline_name.into(),
            source: source.into(),
            target: target.into(),
            start_date: start_date.into(),
            end_date: end_date.into(),
        }
    }
}

/// Outcome of a successful invocation
#[derive(Debug, Clone, Serialize)]
pub struct InvocationResult {
    pub run_id: Uuid,
    pub pipeline: PipelineName,
    pub parameters: PipelineParameters,
    pub started_at: DateTime<Utc>,
    pub elapsed_ms: u64,
}

/// Drives invocations against a resolver
pub struct Invoker<R> {
    resolver: R,
}

impl<R: PipelineResolver> Invoker<R> {
    pub fn new(resolver: R) -> Self {
        Self { resolver }
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    /// Run one pipeline to completion
    ///
    /// # Errors
    /// - `InvocationError::InvalidParameters` for malformed dates, an inverted
    ///   range or empty identifiers; the resolver is never consulted
    /// - `InvocationError::Resolve` when the name is unknown or the
    ///   implementation fails to load or construct
    /// - `InvocationError::Execution` when `run` fails, with the pipeline's
    ///   error as the source
    pub fn invoke(&self, request: &InvocationRequest) -> Result<InvocationResult, InvocationError> {
        let parameters = PipelineParameters::parse(
            &request.source,
            &request.target,
            &request.start_date,
            &request.end_date,
        )?;
        let name = PipelineName::new(request.pipeline_name.as_str())?;

        let run_id = Uuid::new_v4();
        let span = info_span!("invocation", %run_id, pipeline = %name);
        let _guard = span.enter();

        let handle = self.resolver.resolve(&name)?;
        debug!(kind = %handle.descriptor().kind, "pipeline resolved");

        let instance = handle.construct(parameters.clone())?;

        info!(
            source = parameters.source(),
            target = parameters.target(),
            start_date = %parameters.start_date(),
            end_date = %parameters.end_date(),
            "starting pipeline"
        );
        let started_at = Utc::now();
        let clock = Instant::now();

        if let Err(source) = instance.run() {
            error!(error = %format!("{:#}", source), "pipeline failed");
            return Err(InvocationError::Execution {
                name: name.to_string(),
                run_id,
                source,
            });
        }

        let elapsed_ms = u64::try_from(clock.elapsed().as_millis()).unwrap_or(u64::MAX);
        info!(elapsed_ms, "pipeline completed");

        Ok(InvocationResult {
            run_id,
            pipeline: name,
            parameters,
            started_at,
            elapsed_ms,
        })
    }
}
