//! Terminal feedback on stderr
//!
//! Stdout belongs to the command run through `bundle exec`, so every status
//! line goes to stderr. Interactive terminals get an `indicatif` spinner;
//! CI and pipes get plain prefixed lines.

mod context;
mod output;
mod progress;

pub use context::UiContext;
pub use output::{step_info, step_ok, step_ok_detail, step_warn_hint};
pub use progress::TaskSpinner;
