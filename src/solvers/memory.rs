//! An in-memory backend that answers every run with a prepared solution
use log::debug;

use crate::dataset::{Dataset, SymbolKind, VariableRecord};
use crate::error::SolveError;
use crate::key::Key;
use crate::solvers::{Job, Solution, SolverBackend, Status, Workspace};

/// A run received by a [MemoryBackend]
#[derive(Debug, Clone)]
pub struct RecordedRun {
    /// workspace of the session
    pub workspace: Workspace,
    /// model and options
    pub job: Job,
    /// input dataset, as it was at run time
    pub input: Dataset,
}

/// Backend that never starts a solver.
///
/// It keeps every run it receives and answers with the variables and status
/// it was prepared with, or with a failure.
///
/// ```
/// use gams_session::dataset::VariableRecord;
/// use gams_session::solvers::{MemoryBackend, Status};
///
/// let backend = MemoryBackend::new()
///     .with_status(Status::Optimal)
///     .with_variable("z", vec![((), VariableRecord::new(f64::NEG_INFINITY, f64::INFINITY, 42.))]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    status: Option<Status>,
    variables: Vec<(String, usize, Vec<(Key, VariableRecord)>)>,
    echo_input: bool,
    failure: Option<String>,
    runs: Vec<RecordedRun>,
}

impl MemoryBackend {
    /// A backend answering with an empty output dataset and no status
    pub fn new() -> MemoryBackend {
        MemoryBackend::default()
    }

    /// Report `status` as the model status
    pub fn with_status(self, status: Status) -> MemoryBackend {
        MemoryBackend {
            status: Some(status),
            ..self
        }
    }

    /// Add a variable with the given records to the output.
    ///
    /// Its dimension is the width of the first key. A variable without
    /// records is one-dimensional; see [MemoryBackend::with_empty_variable].
    pub fn with_variable<K, I>(mut self, name: &str, records: I) -> MemoryBackend
    where
        K: Into<Key>,
        I: IntoIterator<Item = (K, VariableRecord)>,
    {
        let records: Vec<(Key, VariableRecord)> = records
            .into_iter()
            .map(|(k, r)| (k.into(), r))
            .collect();
        let dim = records.first().map_or(1, |(k, _)| k.dim());
        self.variables.push((name.to_string(), dim, records));
        self
    }

    /// Add a variable of dimension `dim` without any record
    pub fn with_empty_variable(mut self, name: &str, dim: usize) -> MemoryBackend {
        self.variables.push((name.to_string(), dim, Vec::new()));
        self
    }

    /// Add a variable whose records only carry levels, with free bounds
    pub fn with_levels<K, I>(self, name: &str, levels: I) -> MemoryBackend
    where
        K: Into<Key>,
        I: IntoIterator<Item = (K, f64)>,
    {
        let records: Vec<_> = levels
            .into_iter()
            .map(|(k, level)| {
                (
                    k.into(),
                    VariableRecord::new(f64::NEG_INFINITY, f64::INFINITY, level),
                )
            })
            .collect();
        self.with_variable(name, records)
    }

    /// Start the output from a copy of the input dataset, so that input
    /// variables come back with the bounds and levels they were given
    pub fn echoing_input(self) -> MemoryBackend {
        MemoryBackend {
            echo_input: true,
            ..self
        }
    }

    /// Fail every run with `message`
    pub fn failing_with(self, message: impl Into<String>) -> MemoryBackend {
        MemoryBackend {
            failure: Some(message.into()),
            ..self
        }
    }

    /// All runs received so far
    pub fn runs(&self) -> &[RecordedRun] {
        &self.runs
    }

    /// The most recent run
    pub fn last_run(&self) -> Option<&RecordedRun> {
        self.runs.last()
    }

    fn output(&self, input: &Dataset) -> Result<Dataset, SolveError> {
        let mut output = if self.echo_input {
            input.clone()
        } else {
            Dataset::new(format!("{}_out", input.name()))
        };
        for (name, dim, records) in &self.variables {
            if output.contains(name) {
                output.undeclare(name);
            }
            let symbol = output
                .declare(name, SymbolKind::Variable, *dim)
                .map_err(|e| SolveError::MalformedOutput(e.to_string()))?;
            for (key, record) in records {
                symbol
                    .add_variable_record(key.clone(), *record)
                    .map_err(|e| SolveError::MalformedOutput(e.to_string()))?;
            }
        }
        Ok(output)
    }
}

impl SolverBackend for MemoryBackend {
    fn run_job(
        &mut self,
        workspace: &Workspace,
        job: &Job,
        input: &Dataset,
    ) -> Result<Solution, SolveError> {
        debug!(
            "in-memory run of {} with {} input symbols",
            job.model_file.display(),
            input.len()
        );
        self.runs.push(RecordedRun {
            workspace: workspace.clone(),
            job: job.clone(),
            input: input.clone(),
        });
        if let Some(message) = &self.failure {
            return Err(SolveError::Other(message.clone()));
        }
        Ok(Solution::new(self.status, self.output(input)?))
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::solvers::Options;

    fn run(backend: &mut MemoryBackend) -> Dataset {
        let dir = tempfile::tempdir().unwrap();
        let workspace = Workspace::open(dir.path()).unwrap();
        let job = Job {
            model_file: PathBuf::from("model.gms"),
            include_define: "gdxincname".to_string(),
            options: Options::default(),
        };
        backend
            .run_job(&workspace, &job, &Dataset::new("data"))
            .unwrap()
            .output
    }

    #[test]
    fn variables_without_records_keep_a_dimension() {
        let mut backend = MemoryBackend::new()
            .with_variable("x", Vec::<(&str, VariableRecord)>::new())
            .with_empty_variable("flow", 2);
        let output = run(&mut backend);
        assert_eq!(output.get("x").unwrap().dim(), 1);
        assert!(output.variable("x").unwrap().is_empty());
        assert_eq!(output.get("flow").unwrap().dim(), 2);
    }

    #[test]
    fn variables_take_the_width_of_their_keys() {
        let mut backend = MemoryBackend::new()
            .with_levels("z", vec![((), 3.)])
            .with_levels("y", vec![(["a", "b"], 1.)]);
        let output = run(&mut backend);
        assert_eq!(output.get("z").unwrap().dim(), 0);
        assert_eq!(output.get("y").unwrap().dim(), 2);
    }
}
