//! UI components for Agent Status Desktop.
//!
//! This module contains reusable UI components and windows.

pub mod status_widget;

pub use status_widget::StatusWidget;
