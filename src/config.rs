//! Configuration for ferrule.
//!
//! - [load]: the [Config] root, path resolution and `--init`.
//! - [general]: behaviour switches and the persisted list paths.
//! - [launcher]: shell and terminal argv templates and the opener.
//! - [input]: idle-browser key bindings.
//! - [theme]: the look table.

pub mod general;
pub mod input;
pub mod launcher;
pub mod load;
pub mod theme;

pub(crate) use general::General;
pub use general::InternalGeneral;
pub use input::Keys;
pub use launcher::LauncherConfig;
pub use load::Config;
pub use theme::Theme;
