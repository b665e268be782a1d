//! Role editing on top of [`permtree_core`]: loading trees from configuration,
//! an undoable editing session, role selection and batch toggling,
//! plain-text rendering and logging setup.

pub mod editor;
pub mod logging;
pub mod render;
pub mod session;
pub mod tree_source;
