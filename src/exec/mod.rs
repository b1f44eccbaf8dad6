// src/exec/mod.rs

//! Process execution layer.
//!
//! Everything that launches the managed executable lives here:
//!
//! - [`validator`] decides whether a configured executable is usable
//!   (existence, identity and minimum version via a one-shot probe).
//! - [`args`] turns a settings snapshot into the continuous-mode argument list.
//! - [`oneshot`] runs a process to completion and captures its output.
//! - [`supervisor`] owns the single long-running instance, detects crashes
//!   and raises quit notifications ([`notify`]).
//! - [`stale`] kills instances left over from an earlier session.
//! - [`backend`] provides the `ProcessBackend` trait and the concrete
//!   `RealProcessBackend` that the runtime uses in production, and which
//!   tests can replace with a fake implementation.

pub mod args;
pub mod backend;
pub mod notify;
pub mod oneshot;
pub mod stale;
pub mod supervisor;
pub mod validator;

pub use args::{arguments_for, build_arguments, build_config_arguments, build_reset_arguments};
pub use backend::{ProcessBackend, Readiness, RealProcessBackend};
pub use notify::{QuitCallback, QuitNotification, QuitObservers, SubscriptionId};
pub use oneshot::{
    reset_screen, run_and_capture, run_and_capture_with_timeout, run_one_shot, OneShotOutput,
};
pub use stale::kill_stale_instances;
pub use supervisor::{Liveness, ProcessSupervisor, SupervisorState, POLL_CHECK_DELAY};
pub use validator::{ExecutableValidator, PROGRAM_IDENTIFIER};
