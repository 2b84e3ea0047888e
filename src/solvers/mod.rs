//! This module provides the interface to the solver that runs a session.
//!
//! A [SolverBackend] gets a workspace directory, a [Job] (model file and
//! options) and the input [Dataset], runs the model and hands back the output
//! dataset. Two backends are provided:
//!
//!  - [GamsProcess] calls the `gams` and `gdxdump` programs, which need to be
//!    installed on your system and found in the `PATH` (or configured with
//!    [GamsProcess::command_name]).
//!  - [MemoryBackend] never calls any program. It records what it was given
//!    and answers with a prepared solution, which makes it a test double for
//!    code built on sessions.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::dataset::Dataset;
use crate::error::SolveError;

pub use self::gams::*;
pub use self::memory::*;

pub mod gams;
pub mod gdxdump;
pub mod memory;

/// Model status reported by GAMS after a solve
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Status {
    /// 1
    Optimal,
    /// 2
    LocallyOptimal,
    /// 3
    Unbounded,
    /// 4
    Infeasible,
    /// 5
    LocallyInfeasible,
    /// 6
    IntermediateInfeasible,
    /// 7
    FeasibleSolution,
    /// 8
    IntegerSolution,
    /// 9
    IntermediateNonInteger,
    /// 10
    IntegerInfeasible,
    /// 11
    LicensingProblem,
    /// 12
    ErrorUnknown,
    /// 13
    ErrorNoSolution,
    /// 14
    NoSolutionReturned,
    /// 15
    SolvedUnique,
    /// 16
    Solved,
    /// 17
    SolvedSingular,
    /// 18
    UnboundedNoSolution,
    /// 19
    InfeasibleNoSolution,
}

impl Status {
    /// The status for a GAMS model status code
    pub fn from_code(code: u32) -> Option<Status> {
        use Status::*;
        Some(match code {
            1 => Optimal,
            2 => LocallyOptimal,
            3 => Unbounded,
            4 => Infeasible,
            5 => LocallyInfeasible,
            6 => IntermediateInfeasible,
            7 => FeasibleSolution,
            8 => IntegerSolution,
            9 => IntermediateNonInteger,
            10 => IntegerInfeasible,
            11 => LicensingProblem,
            12 => ErrorUnknown,
            13 => ErrorNoSolution,
            14 => NoSolutionReturned,
            15 => SolvedUnique,
            16 => Solved,
            17 => SolvedSingular,
            18 => UnboundedNoSolution,
            19 => InfeasibleNoSolution,
            _ => return None,
        })
    }

    /// Whether the solve ended without a usable solution
    pub fn is_failure(self) -> bool {
        use Status::*;
        matches!(
            self,
            Unbounded
                | Infeasible
                | LocallyInfeasible
                | IntermediateInfeasible
                | IntegerInfeasible
                | LicensingProblem
                | ErrorUnknown
                | ErrorNoSolution
                | NoSolutionReturned
                | UnboundedNoSolution
                | InfeasibleNoSolution
        )
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Status::*;
        f.write_str(match self {
            Optimal => "optimal",
            LocallyOptimal => "locally optimal",
            Unbounded => "unbounded",
            Infeasible => "infeasible",
            LocallyInfeasible => "locally infeasible",
            IntermediateInfeasible => "intermediate infeasible",
            FeasibleSolution => "feasible solution",
            IntegerSolution => "integer solution",
            IntermediateNonInteger => "intermediate non-integer",
            IntegerInfeasible => "integer infeasible",
            LicensingProblem => "licensing problem",
            ErrorUnknown => "error unknown",
            ErrorNoSolution => "error no solution",
            NoSolutionReturned => "no solution returned",
            SolvedUnique => "solved unique",
            Solved => "solved",
            SolvedSingular => "solved singular",
            UnboundedNoSolution => "unbounded, no solution",
            InfeasibleNoSolution => "infeasible, no solution",
        })
    }
}

/// What a run produced
#[derive(Debug, Clone)]
pub struct Solution {
    /// Status of the last solve in the model, if the model solved anything
    pub status: Option<Status>,
    /// Symbols of the model after the run
    pub output: Dataset,
}

impl Solution {
    /// A solution with the given status and output
    pub fn new(status: Option<Status>, output: Dataset) -> Solution {
        Solution { status, output }
    }
}

/// The directory a session runs in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    directory: PathBuf,
}

impl Workspace {
    /// Use `directory` as workspace, creating it if needed
    pub fn open(directory: &Path) -> io::Result<Workspace> {
        fs::create_dir_all(directory)?;
        let directory = directory.canonicalize()?;
        if !directory.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                format!("{} is not a directory", directory.display()),
            ));
        }
        Ok(Workspace { directory })
    }

    /// Absolute path of the workspace
    pub fn directory(&self) -> &Path {
        &self.directory
    }
}

/// Defines and command line parameters of a run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Options {
    defines: Vec<(String, String)>,
    parameters: Vec<(String, String)>,
}

impl Options {
    /// Set a `--name=value` define, replacing an earlier value
    pub fn define(&mut self, name: &str, value: &str) -> &mut Self {
        set_pair(&mut self.defines, name, value);
        self
    }

    /// Set a `name=value` command line parameter, replacing an earlier value
    pub fn parameter(&mut self, name: &str, value: &str) -> &mut Self {
        set_pair(&mut self.parameters, name, value);
        self
    }

    /// Defines, in insertion order
    pub fn defines(&self) -> &[(String, String)] {
        &self.defines
    }

    /// Command line parameters, in insertion order
    pub fn parameters(&self) -> &[(String, String)] {
        &self.parameters
    }
}

fn set_pair(pairs: &mut Vec<(String, String)>, name: &str, value: &str) {
    match pairs.iter_mut().find(|(n, _)| n.eq_ignore_ascii_case(name)) {
        Some(pair) => pair.1 = value.to_string(),
        None => pairs.push((name.to_string(), value.to_string())),
    }
}

/// A model to run, with the define through which it finds its input data
#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    /// Absolute path of the model file
    pub model_file: PathBuf,
    /// Define that receives the location of the input data
    pub include_define: String,
    /// Extra defines and parameters
    pub options: Options,
}

/// A program or library able to run a GAMS model on an input dataset
pub trait SolverBackend {
    /// Prepare a workspace rooted at `directory`
    fn create_workspace(&mut self, directory: &Path) -> io::Result<Workspace> {
        Workspace::open(directory)
    }

    /// Run `job` with `input` included, and block until it finishes
    fn run_job(
        &mut self,
        workspace: &Workspace,
        job: &Job,
        input: &Dataset,
    ) -> Result<Solution, SolveError>;
}

impl<B: SolverBackend + ?Sized> SolverBackend for &mut B {
    fn create_workspace(&mut self, directory: &Path) -> io::Result<Workspace> {
        (**self).create_workspace(directory)
    }

    fn run_job(
        &mut self,
        workspace: &Workspace,
        job: &Job,
        input: &Dataset,
    ) -> Result<Solution, SolveError> {
        (**self).run_job(workspace, job, input)
    }
}

impl<B: SolverBackend + ?Sized> SolverBackend for Box<B> {
    fn create_workspace(&mut self, directory: &Path) -> io::Result<Workspace> {
        (**self).create_workspace(directory)
    }

    fn run_job(
        &mut self,
        workspace: &Workspace,
        job: &Job,
        input: &Dataset,
    ) -> Result<Solution, SolveError> {
        (**self).run_job(workspace, job, input)
    }
}

/// Backends that accept a time limit
pub trait WithMaxSeconds<T> {
    /// time limit, if any
    fn max_seconds(&self) -> Option<u32>;
    /// set the time limit
    fn with_max_seconds(&self, seconds: u32) -> T;
}

/// Backends that accept a thread count
pub trait WithNbThreads<T> {
    /// thread count, if any
    fn nb_threads(&self) -> Option<u32>;
    /// set the thread count
    fn with_nb_threads(&self, threads: u32) -> T;
}
