//! Sub-commands of the `qapkg` binary.
//!
//! Each command takes the registry built from [`config::Config`] and writes
//! its report to `out`.

pub mod config;
mod dependents;
mod list;
mod scan;
mod show;
mod validate;
mod version;

pub use dependents::dependents;
pub use list::list;
pub use scan::scan;
pub use show::show;
pub use validate::validate;
pub use version::version;
