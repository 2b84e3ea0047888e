//! A session: load data, run a model once, read its variables
use std::path::PathBuf;

use log::{debug, info, warn};

use crate::config::SessionConfig;
use crate::dataset::{Dataset, DatasetError, Records, Symbol, SymbolKind, VariableRecord};
use crate::error::{SessionError, SolveError};
use crate::key::Key;
use crate::solvers::{Job, Options, SolverBackend, Status, Workspace};
use crate::util::is_valid_identifier;

enum State {
    Building,
    Solved {
        status: Option<Status>,
        output: Dataset,
    },
    Failed,
}

/// One run of a GAMS model.
///
/// A session moves through three phases, in this order only:
///
///  1. data is declared with [Session::create_set], [Session::create_parameter]
///     and [Session::create_variable],
///  2. [Session::run] solves the model once,
///  3. results are read with [Session::variable_values] and
///     [Session::variable_bounds].
///
/// ```
/// use gams_session::session::Session;
/// use gams_session::solvers::MemoryBackend;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let dir = tempfile::tempdir()?;
/// let model = dir.path().join("model.gms");
/// std::fs::write(&model, "* model")?;
///
/// let backend = MemoryBackend::new().with_levels("x", vec![("a", 1.), ("b", 2.)]);
/// let mut session = Session::from_model_file(&model, backend)?;
/// session.create_set("i", ["a", "b"])?;
/// session.create_parameter("cost", ["a", "b"], [10., 20.])?;
/// session.run()?;
/// assert_eq!(session.variable_values("x", ["b", "a"])?, vec![2., 1.]);
/// # Ok(())
/// # }
/// ```
pub struct Session<B: SolverBackend> {
    config: SessionConfig,
    workspace: Workspace,
    job: Job,
    backend: B,
    input: Dataset,
    state: State,
}

impl<B: SolverBackend> Session<B> {
    /// Open a session on `model_file` with the default configuration
    pub fn from_model_file(model_file: impl Into<PathBuf>, backend: B) -> Result<Self, SessionError> {
        Session::new(SessionConfig::new(model_file), backend)
    }

    /// Open a session.
    ///
    /// The model file must exist. The workspace is the configured working
    /// directory, or else the directory containing the model.
    pub fn new(config: SessionConfig, mut backend: B) -> Result<Self, SessionError> {
        let model_file = config.model_file().canonicalize().map_err(|e| {
            SessionError::Initialization(format!(
                "model file {}: {}",
                config.model_file().display(),
                e
            ))
        })?;
        if !model_file.is_file() {
            return Err(SessionError::Initialization(format!(
                "{} is not a file",
                model_file.display()
            )));
        }
        if !is_valid_identifier(config.dataset_name()) {
            return Err(SessionError::Initialization(format!(
                "'{}' is not a valid dataset name",
                config.dataset_name()
            )));
        }
        check_config_names(&config)?;
        let directory = match config.working_directory() {
            Some(dir) => dir.to_path_buf(),
            None => model_file
                .parent()
                .ok_or_else(|| {
                    SessionError::Initialization(format!(
                        "{} has no parent directory",
                        model_file.display()
                    ))
                })?
                .to_path_buf(),
        };
        let workspace = backend.create_workspace(&directory).map_err(|e| {
            SessionError::Initialization(format!("workspace {}: {}", directory.display(), e))
        })?;

        let mut options = Options::default();
        for (name, value) in config.defines() {
            options.define(name, value);
        }
        for (name, value) in config.options() {
            options.parameter(name, value);
        }
        let job = Job {
            model_file,
            include_define: config.include_define().to_string(),
            options,
        };
        info!(
            "session for {} in {}",
            job.model_file.display(),
            workspace.directory().display()
        );
        Ok(Session {
            input: Dataset::new(config.dataset_name()),
            config,
            workspace,
            job,
            backend,
            state: State::Building,
        })
    }

    /// Declare a set with the given elements, in order.
    ///
    /// The dimension is the width of the first element; all elements must
    /// have that width. Without elements the set is one-dimensional.
    pub fn create_set<K, I>(&mut self, symbol: &str, elements: I) -> Result<(), SessionError>
    where
        K: Into<Key>,
        I: IntoIterator<Item = K>,
    {
        self.build_set(symbol, None, collect_keys(elements))
    }

    /// Declare a set of dimension `dim`, possibly without elements
    pub fn create_set_with_dim<K, I>(
        &mut self,
        symbol: &str,
        dim: usize,
        elements: I,
    ) -> Result<(), SessionError>
    where
        K: Into<Key>,
        I: IntoIterator<Item = K>,
    {
        self.build_set(symbol, Some(dim), collect_keys(elements))
    }

    fn build_set(&mut self, symbol: &str, dim: Option<usize>, keys: Vec<Key>) -> Result<(), SessionError> {
        self.check_declarable(symbol)?;
        let dim = key_dim(symbol, &keys, dim)?;
        self.declare(symbol, SymbolKind::Set, dim, |set| {
            for key in keys {
                set.add_element(key)?;
            }
            Ok(())
        })
    }

    /// Declare a parameter with one value per key.
    ///
    /// Without keys the parameter is one-dimensional.
    pub fn create_parameter<K, I, V>(
        &mut self,
        symbol: &str,
        keys: I,
        values: V,
    ) -> Result<(), SessionError>
    where
        K: Into<Key>,
        I: IntoIterator<Item = K>,
        V: IntoIterator<Item = f64>,
    {
        self.build_parameter(symbol, None, collect_keys(keys), values.into_iter().collect())
    }

    /// Declare a parameter of dimension `dim`, possibly without values
    pub fn create_parameter_with_dim<K, I, V>(
        &mut self,
        symbol: &str,
        dim: usize,
        keys: I,
        values: V,
    ) -> Result<(), SessionError>
    where
        K: Into<Key>,
        I: IntoIterator<Item = K>,
        V: IntoIterator<Item = f64>,
    {
        self.build_parameter(symbol, Some(dim), collect_keys(keys), values.into_iter().collect())
    }

    fn build_parameter(
        &mut self,
        symbol: &str,
        dim: Option<usize>,
        keys: Vec<Key>,
        values: Vec<f64>,
    ) -> Result<(), SessionError> {
        self.check_declarable(symbol)?;
        if keys.len() != values.len() {
            return Err(SessionError::validation(
                symbol,
                format!("{} keys but {} values", keys.len(), values.len()),
            ));
        }
        let dim = key_dim(symbol, &keys, dim)?;
        self.declare(symbol, SymbolKind::Parameter, dim, |param| {
            for (key, value) in keys.into_iter().zip(values) {
                param.add_value(key, value)?;
            }
            Ok(())
        })
    }

    /// Declare a variable with its bounds and initial level for each key.
    ///
    /// All records of a variable are given in this one call. To fix a
    /// variable, give the same value as lower bound, upper bound and level.
    pub fn create_variable<K, I, L, U, V>(
        &mut self,
        symbol: &str,
        keys: I,
        lower: L,
        upper: U,
        init: V,
    ) -> Result<(), SessionError>
    where
        K: Into<Key>,
        I: IntoIterator<Item = K>,
        L: IntoIterator<Item = f64>,
        U: IntoIterator<Item = f64>,
        V: IntoIterator<Item = f64>,
    {
        self.check_declarable(symbol)?;
        let keys = collect_keys(keys);
        let lower: Vec<f64> = lower.into_iter().collect();
        let upper: Vec<f64> = upper.into_iter().collect();
        let init: Vec<f64> = init.into_iter().collect();
        if lower.len() != keys.len() || upper.len() != keys.len() || init.len() != keys.len() {
            return Err(SessionError::validation(
                symbol,
                format!(
                    "{} keys but {} lower bounds, {} upper bounds and {} levels",
                    keys.len(),
                    lower.len(),
                    upper.len(),
                    init.len()
                ),
            ));
        }
        let dim = key_dim(symbol, &keys, None)?;
        let mut records = Vec::with_capacity(keys.len());
        for (key, ((lo, up), level)) in keys.into_iter().zip(lower.into_iter().zip(upper).zip(init)) {
            if lo.is_nan() || up.is_nan() || level.is_nan() {
                return Err(SessionError::validation(symbol, format!("NaN in record {}", key)));
            }
            if lo > up {
                return Err(SessionError::validation(
                    symbol,
                    format!("lower bound {} above upper bound {} in record {}", lo, up, key),
                ));
            }
            records.push((key, VariableRecord::new(lo, up, level)));
        }
        self.declare(symbol, SymbolKind::Variable, dim, |var| {
            for (key, record) in records {
                var.add_variable_record(key, record)?;
            }
            Ok(())
        })
    }

    fn check_declarable(&self, symbol: &str) -> Result<(), SessionError> {
        if !matches!(self.state, State::Building) {
            return Err(SessionError::AlreadyRun);
        }
        if self.input.contains(symbol) {
            return Err(SessionError::DuplicateSymbol(symbol.to_string()));
        }
        Ok(())
    }

    fn declare<F>(
        &mut self,
        symbol: &str,
        kind: SymbolKind,
        dim: usize,
        fill: F,
    ) -> Result<(), SessionError>
    where
        F: FnOnce(&mut Symbol) -> Result<(), DatasetError>,
    {
        let declared = self
            .input
            .declare(symbol, kind, dim)
            .map_err(|e| dataset_error(symbol, e))?;
        if let Err(e) = fill(declared) {
            // a half-filled symbol must not reach the solver
            self.input.undeclare(symbol);
            return Err(dataset_error(symbol, e));
        }
        if let Some(declared) = self.input.get(symbol) {
            debug!(
                "declared {} {} with dimension {} and {} records",
                kind.keyword(),
                symbol,
                dim,
                declared.len()
            );
        }
        Ok(())
    }

    /// Run the model with the declared data and wait for it to finish.
    ///
    /// A session runs at most once. If the run fails, or GAMS reports a model
    /// status without a usable solution, the session has no results.
    pub fn run(&mut self) -> Result<(), SessionError> {
        if !matches!(self.state, State::Building) {
            return Err(SessionError::AlreadyRun);
        }
        info!(
            "running {} with {} input symbols",
            self.job.model_file.display(),
            self.input.len()
        );
        let solution = match self.backend.run_job(&self.workspace, &self.job, &self.input) {
            Ok(solution) => solution,
            Err(e) => {
                warn!("run of {} failed: {}", self.job.model_file.display(), e);
                self.state = State::Failed;
                return Err(e.into());
            }
        };
        if let Some(status) = solution.status.filter(|s| s.is_failure()) {
            warn!("{} ended with model status {}", self.job.model_file.display(), status);
            self.state = State::Failed;
            return Err(SolveError::Status(status).into());
        }
        self.state = State::Solved {
            status: solution.status,
            output: solution.output,
        };
        Ok(())
    }

    /// All records of a solved variable
    pub fn variable_records(&self, symbol: &str) -> Result<&Records<VariableRecord>, SessionError> {
        match &self.state {
            State::Solved { output, .. } => output
                .variable(symbol)
                .ok_or_else(|| SessionError::UnknownSymbol(symbol.to_string())),
            _ => Err(SessionError::NotReady),
        }
    }

    fn lookup<K, I, T, F>(&self, symbol: &str, keys: I, field: F) -> Result<Vec<T>, SessionError>
    where
        K: Into<Key>,
        I: IntoIterator<Item = K>,
        F: Fn(&VariableRecord) -> T,
    {
        let records = self.variable_records(symbol)?;
        keys.into_iter()
            .map(|key| {
                let key = key.into();
                match records.get(&key) {
                    Some(record) => Ok(field(record)),
                    None => Err(SessionError::UnknownKey {
                        symbol: symbol.to_string(),
                        key,
                    }),
                }
            })
            .collect()
    }

    /// Solved levels of a variable, in the order of `keys`
    pub fn variable_values<K, I>(&self, symbol: &str, keys: I) -> Result<Vec<f64>, SessionError>
    where
        K: Into<Key>,
        I: IntoIterator<Item = K>,
    {
        self.lookup(symbol, keys, |r| r.level)
    }

    /// Solved levels of every record of a variable, in GAMS order.
    /// Use this for scalar variables like the objective.
    pub fn variable_values_all(&self, symbol: &str) -> Result<Vec<f64>, SessionError> {
        Ok(self
            .variable_records(symbol)?
            .iter()
            .map(|(_, r)| r.level)
            .collect())
    }

    /// `(lower, upper)` bounds of a variable, in the order of `keys`
    pub fn variable_bounds<K, I>(
        &self,
        symbol: &str,
        keys: I,
    ) -> Result<Vec<(f64, f64)>, SessionError>
    where
        K: Into<Key>,
        I: IntoIterator<Item = K>,
    {
        self.lookup(symbol, keys, |r| (r.lower, r.upper))
    }

    /// `(lower, upper)` bounds of every record of a variable, in GAMS order
    pub fn variable_bounds_all(&self, symbol: &str) -> Result<Vec<(f64, f64)>, SessionError> {
        Ok(self
            .variable_records(symbol)?
            .iter()
            .map(|(_, r)| (r.lower, r.upper))
            .collect())
    }

    /// The data declared so far
    pub fn input(&self) -> &Dataset {
        &self.input
    }

    /// The output dataset, once the session has run successfully
    pub fn output(&self) -> Option<&Dataset> {
        match &self.state {
            State::Solved { output, .. } => Some(output),
            _ => None,
        }
    }

    /// Model status of the last solve, if the run reported one
    pub fn status(&self) -> Option<Status> {
        match &self.state {
            State::Solved { status, .. } => *status,
            _ => None,
        }
    }

    /// The configuration the session was opened with
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// The directory the model runs in
    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// The model and options handed to the backend
    pub fn job(&self) -> &Job {
        &self.job
    }

    /// The solver backend
    pub fn backend(&self) -> &B {
        &self.backend
    }
}

fn collect_keys<K: Into<Key>, I: IntoIterator<Item = K>>(keys: I) -> Vec<Key> {
    keys.into_iter().map(Into::into).collect()
}

fn key_dim(symbol: &str, keys: &[Key], dim: Option<usize>) -> Result<usize, SessionError> {
    // an empty collection is one-dimensional unless told otherwise
    let dim = match (dim, keys.first()) {
        (Some(dim), _) => dim,
        (None, Some(key)) => key.dim(),
        (None, None) => 1,
    };
    if dim == 0 {
        return Err(SessionError::validation(symbol, "keys need at least one label"));
    }
    if let Some(key) = keys.iter().find(|k| k.dim() != dim) {
        return Err(SessionError::validation(
            symbol,
            format!("key {} has {} labels, expected {}", key, key.dim(), dim),
        ));
    }
    Ok(dim)
}

fn check_config_names(config: &SessionConfig) -> Result<(), SessionError> {
    let invalid = |what: &str, name: &str| {
        SessionError::Initialization(format!("'{}' is not a valid {} name", name, what))
    };
    if !is_valid_identifier(config.include_define()) {
        return Err(invalid("define", config.include_define()));
    }
    for (name, _) in config.defines() {
        if !is_valid_identifier(name) {
            return Err(invalid("define", name));
        }
        if name.eq_ignore_ascii_case(config.include_define()) {
            return Err(SessionError::Initialization(format!(
                "define '{}' would replace the input data location",
                name
            )));
        }
    }
    for (name, _) in config.options() {
        if !is_valid_identifier(name) {
            return Err(invalid("option", name));
        }
    }
    Ok(())
}

fn dataset_error(symbol: &str, e: DatasetError) -> SessionError {
    match e {
        DatasetError::DuplicateSymbol(name) => SessionError::DuplicateSymbol(name),
        other => SessionError::validation(symbol, other.to_string()),
    }
}
