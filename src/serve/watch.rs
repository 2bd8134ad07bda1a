//! Filesystem watcher: routes debounced changes to category tasks and
//! pushes reload notifications.
//!
//! One long-lived thread owns the notify watcher. Changes are routed
//! through the path table's watch globs; each triggered task run is
//! independent and a per-file failure never terminates the loop.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread::JoinHandle;

use anyhow::Result;
use crossbeam::channel::RecvTimeoutError;
use notify::{RecursiveMode, Watcher};
use rustc_hash::FxHashMap;

use crate::config::{Config, PathTable};
use crate::core::{Category, Mode, is_shutdown};
use crate::pipeline;
use crate::reload::{Clients, ReloadMessage};
use crate::{log, logger};

use super::debounce::{ChangeKind, Debouncer};

/// Spawn the watcher thread.
pub fn spawn(config: Arc<Config>, clients: Clients) -> JoinHandle<()> {
    std::thread::spawn(move || {
        if let Err(e) = watch_loop(&config, &clients) {
            log!("watch"; "watcher stopped: {e:#}");
        }
    })
}

fn watch_loop(config: &Config, clients: &Clients) -> Result<()> {
    let table = config.path_table();
    let source_root = table.source_root().to_path_buf();

    let (tx, rx) = crossbeam::channel::unbounded();
    let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
        if let Ok(event) = res {
            let _ = tx.send(event);
        }
    })?;
    watcher.watch(&source_root, RecursiveMode::Recursive)?;
    log!("watch"; "{}", source_root.display());

    let mut debouncer = Debouncer::new();
    loop {
        if is_shutdown() {
            return Ok(());
        }

        match rx.recv_timeout(debouncer.sleep_duration()) {
            Ok(event) => debouncer.add_event(&event),
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => return Ok(()),
        }

        if let Some(changes) = debouncer.take_if_ready() {
            handle_changes(&changes, config, &table, clients);
        }
    }
}

/// Map the changed paths to their categories and re-run each once.
fn handle_changes(
    changes: &FxHashMap<PathBuf, ChangeKind>,
    config: &Config,
    table: &PathTable,
    clients: &Clients,
) {
    let mut categories: Vec<Category> = Vec::new();
    for path in changes.keys() {
        if let Some(category) = table.category_for_change(path)
            && !categories.contains(&category)
        {
            categories.push(category);
        }
    }

    for category in categories {
        rerun(category, config, table, clients);
    }
}

/// Re-run one category task; report the outcome without ever tearing
/// down the watch loop.
fn rerun(category: Category, config: &Config, table: &PathTable, clients: &Clients) {
    match pipeline::run_task(category, Mode::Development, config, table) {
        Ok(report) => {
            logger::status_success(&format!(
                "rebuilt {} ({} file(s))",
                category, report.files
            ));
            if config.serve.notify {
                notify_clients(category, config, table, clients);
            }
        }
        Err(e) => {
            logger::status_error(&format!("{category} failed"), &format!("{e:#}"));
        }
    }
}

/// Styles stream their compiled sheet for in-place swap; every other
/// category triggers a full page reload.
fn notify_clients(category: Category, config: &Config, table: &PathTable, clients: &Clients) {
    match category {
        Category::Styles => {
            let name = pipeline::styles::output_name(&config.styles.entry, Mode::Development);
            let path = table.entry(Category::Styles).dest.join(&name);
            match fs::read_to_string(&path) {
                Ok(content) => clients.broadcast(&ReloadMessage::css(name, content)),
                Err(_) => clients.broadcast(&ReloadMessage::reload_with_reason("styles")),
            }
        }
        _ => clients.broadcast(&ReloadMessage::reload_with_reason(category.name())),
    }
}
