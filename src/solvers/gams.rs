//! Run models with the GAMS command line tools
use std::ffi::OsString;
use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use log::{debug, info, warn};

use crate::dataset::Dataset;
use crate::error::{describe_return_code, SolveError};
use crate::solvers::gdxdump::{parse_model_status, parse_symbol_list, read_variable_csv};
use crate::solvers::{Job, Solution, SolverBackend, WithMaxSeconds, WithNbThreads, Workspace};

/// Runs a model with the `gams` program and reads its results with `gdxdump`.
///
/// Every run happens in a fresh temporary directory inside the workspace:
///
///  1. the input dataset is written as GAMS source and compiled to
///     `<dataset>.gdx`,
///  2. the model runs with `--<include define>=<temporary dir>/<dataset>`, so
///     a model reading its data with `$gdxin %gdxincname%` finds it,
///  3. every variable of the model is dumped from the output GDX file.
#[derive(Debug, Clone)]
pub struct GamsProcess {
    command_name: String,
    gdxdump_command_name: String,
    log_option: u32,
    seconds: Option<u32>,
    threads: Option<u32>,
    keep_files: bool,
}

impl Default for GamsProcess {
    fn default() -> Self {
        Self::new()
    }
}

impl GamsProcess {
    /// Use the `gams` and `gdxdump` programs found in the `PATH`
    pub fn new() -> GamsProcess {
        GamsProcess {
            command_name: "gams".to_string(),
            gdxdump_command_name: "gdxdump".to_string(),
            log_option: 3,
            seconds: None,
            threads: None,
            keep_files: false,
        }
    }

    /// set the gams executable to use
    pub fn command_name(&self, command_name: String) -> GamsProcess {
        GamsProcess {
            command_name,
            ..self.clone()
        }
    }

    /// set the gdxdump executable to use
    pub fn gdxdump_command_name(&self, gdxdump_command_name: String) -> GamsProcess {
        GamsProcess {
            gdxdump_command_name,
            ..self.clone()
        }
    }

    /// set the GAMS `logOption` (0: no log, 3: log to standard output)
    pub fn with_log_option(&self, log_option: u32) -> GamsProcess {
        GamsProcess {
            log_option,
            ..self.clone()
        }
    }

    /// keep the temporary run directories instead of deleting them
    pub fn keeping_files(&self) -> GamsProcess {
        GamsProcess {
            keep_files: true,
            ..self.clone()
        }
    }

    fn execute(&self, program: &str, args: &[OsString]) -> Result<Output, SolveError> {
        debug!("running {} {:?}", program, args);
        let output = Command::new(program)
            .args(args)
            .output()
            .map_err(|source| SolveError::Spawn {
                command: program.to_string(),
                source,
            })?;
        match output.status.code() {
            Some(0) => Ok(output),
            Some(code) if program == self.command_name => {
                warn!("{} returned {} ({})", program, code, describe_return_code(code));
                Err(SolveError::ReturnCode {
                    code,
                    description: describe_return_code(code),
                    output: String::from_utf8_lossy(&output.stdout).into_owned(),
                })
            }
            Some(code) => Err(SolveError::Other(format!(
                "{} returned {}: {}",
                program,
                code,
                String::from_utf8_lossy(&output.stderr).trim()
            ))),
            None => Err(SolveError::Terminated(program.to_string())),
        }
    }

    /// Arguments of the model run
    pub fn arguments(&self, workspace: &Workspace, job: &Job, data: &Path, run_dir: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![job.model_file.as_os_str().to_owned()];
        let mut include: OsString = format!("--{}=", job.include_define).into();
        include.push(data.as_os_str());
        args.push(include);
        for (name, value) in job.options.defines() {
            args.push(format!("--{}={}", name, value).into());
        }
        args.push(path_parameter("gdx", &run_dir.join("output.gdx")));
        args.push(path_parameter("o", &run_dir.join("model.lst")));
        args.push(path_parameter("curDir", workspace.directory()));
        args.push(format!("lo={}", self.log_option).into());
        for (name, value) in [
            ("reslim", self.max_seconds()),
            ("threads", self.nb_threads()),
        ]
        .iter()
        {
            if let Some(val) = value {
                args.push(format!("{}={}", name, val).into());
            }
        }
        for (name, value) in job.options.parameters() {
            args.push(format!("{}={}", name, value).into());
        }
        args
    }

    fn compile_data(&self, input: &Dataset, run_dir: &Path) -> Result<(), SolveError> {
        let source = run_dir.join(format!("{}.gms", input.name()));
        input.to_gms_file(&source)?;
        let args = vec![
            source.into_os_string(),
            path_parameter("gdx", &run_dir.join(format!("{}.gdx", input.name()))),
            path_parameter("o", &run_dir.join(format!("{}.lst", input.name()))),
            path_parameter("curDir", run_dir),
            format!("lo={}", self.log_option).into(),
        ];
        self.execute(&self.command_name, &args)?;
        Ok(())
    }

    fn read_output(&self, gdx: &Path, name: String) -> Result<Dataset, SolveError> {
        let listing = self.execute(
            &self.gdxdump_command_name,
            &[gdx.as_os_str().to_owned(), "symbols".into()],
        )?;
        let mut output = Dataset::new(name);
        for entry in parse_symbol_list(&String::from_utf8_lossy(&listing.stdout)) {
            if !entry.is_variable() {
                continue;
            }
            let dump = self.execute(
                &self.gdxdump_command_name,
                &[
                    gdx.as_os_str().to_owned(),
                    format!("symb={}", entry.name).into(),
                    "format=csv".into(),
                    "CSVAllFields".into(),
                ],
            )?;
            read_variable_csv(&mut output, &entry.name, entry.dim, &dump.stdout[..])?;
        }
        debug!("read {} variables from {}", output.len(), gdx.display());
        Ok(output)
    }
}

fn path_parameter(name: &str, path: &Path) -> OsString {
    let mut arg: OsString = format!("{}=", name).into();
    arg.push(path.as_os_str());
    arg
}

impl GamsProcess {
    fn run_in(
        &self,
        run_dir: &Path,
        workspace: &Workspace,
        job: &Job,
        input: &Dataset,
    ) -> Result<Solution, SolveError> {
        self.compile_data(input, run_dir)?;

        let data = run_dir.join(input.name());
        let args = self.arguments(workspace, job, &data, run_dir);
        info!("solving {}", job.model_file.display());
        self.execute(&self.command_name, &args)?;

        let status = match fs::read(run_dir.join("model.lst")) {
            Ok(listing) => parse_model_status(&String::from_utf8_lossy(&listing)),
            Err(e) => {
                warn!("cannot read the listing file: {}", e);
                None
            }
        };
        match status {
            Some(s) => info!("model status: {}", s),
            None => debug!("the model reported no solve"),
        }
        let output = self.read_output(
            &run_dir.join("output.gdx"),
            format!("{}_out", input.name()),
        )?;
        Ok(Solution::new(status, output))
    }
}

impl SolverBackend for GamsProcess {
    fn run_job(
        &mut self,
        workspace: &Workspace,
        job: &Job,
        input: &Dataset,
    ) -> Result<Solution, SolveError> {
        let run_dir = tempfile::Builder::new()
            .prefix("gams_session")
            .tempdir_in(workspace.directory())?;
        let result = self.run_in(run_dir.path(), workspace, job, input);
        if self.keep_files {
            let kept = run_dir.into_path();
            info!("run files kept in {}", kept.display());
        }
        result
    }
}

impl WithMaxSeconds<GamsProcess> for GamsProcess {
    fn max_seconds(&self) -> Option<u32> {
        self.seconds
    }
    fn with_max_seconds(&self, seconds: u32) -> GamsProcess {
        GamsProcess {
            seconds: Some(seconds),
            ..(*self).clone()
        }
    }
}

impl WithNbThreads<GamsProcess> for GamsProcess {
    fn nb_threads(&self) -> Option<u32> {
        self.threads
    }
    fn with_nb_threads(&self, threads: u32) -> GamsProcess {
        GamsProcess {
            threads: Some(threads),
            ..(*self).clone()
        }
    }
}
