mod app_cfg;
mod app_fns;
mod arg_parse;
mod dir_persister;
mod errors;
mod replay_source;

pub(crate) use app_cfg::*;
pub(crate) use errors::*;

pub(crate) use dir_persister::DirPersister;
pub(crate) use replay_source::{ReplayClip, ReplayClock, ReplaySource};

pub use app_fns::run_app;
