//! Course authoring SDK: the curriculum editor core (tree store, dialog
//! workflow, REST sync) and the wizard session it runs in.

pub mod config;
pub mod curriculum;
pub mod logging;
pub mod notice;
pub mod wizard;
