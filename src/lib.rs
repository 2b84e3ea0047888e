#![deny(missing_docs)]
//! Run GAMS models as sessions: declare sets, parameters and variables,
//! include them into a model run and read back the solved variables.
//!
//! ```no_run
//! use gams_session::session::Session;
//! use gams_session::solvers::GamsProcess;
//!
//! # fn main() -> Result<(), gams_session::error::SessionError> {
//! let mut session = Session::from_model_file("models/transport.gms", GamsProcess::default())?;
//! session.create_set("i", ["seattle", "san-diego"])?;
//! session.create_parameter("a", ["seattle", "san-diego"], [350., 600.])?;
//! session.run()?;
//! let cost = session.variable_values_all("z")?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod dataset;
pub mod error;
pub mod gms_format;
pub mod key;
pub mod session;
pub mod solvers;
pub mod util;
