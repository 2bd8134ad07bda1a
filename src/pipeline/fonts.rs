//! Fonts task: verbatim copy of font files.

use anyhow::Result;

use crate::config::PathTable;
use crate::core::Category;

use super::{TaskReport, passthrough};

pub fn run(table: &PathTable) -> Result<TaskReport> {
    passthrough(Category::Fonts, table)
}
