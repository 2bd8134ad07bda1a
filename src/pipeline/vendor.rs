//! Vendor task: verbatim copy of pre-built third-party files.

use anyhow::Result;

use crate::config::PathTable;
use crate::core::Category;

use super::{TaskReport, passthrough};

pub fn run(table: &PathTable) -> Result<TaskReport> {
    passthrough(Category::Vendor, table)
}
