use crate::report;
use crate::workflow::command::Command;
use crate::workflow::config::SessionConfig;
use anyhow::{bail, Context};
use clickcore::telemetry::LogManager;
use clickcore::{GroupedPointStore, PointerEvent};
use std::path::PathBuf;

/// Controller that owns one store, applies commands to it and writes it back.
///
/// A failed command leaves both the store and the file untouched; the file is
/// rewritten only after a command that changed the store.
pub struct Session {
    store: GroupedPointStore,
    path: PathBuf,
    logger: LogManager,
    dirty: bool,
    /// Start group that is not in the file yet; created by the first command
    /// that needs it.
    pending_group: Option<String>,
}

impl Session {
    pub fn open(config: &SessionConfig) -> anyhow::Result<Self> {
        let logger = LogManager::new("session");
        let path = config.output.clone();

        let mut store = if path.exists() {
            let store = GroupedPointStore::load(&path)
                .with_context(|| format!("loading clicks from {}", path.display()))?;
            logger.record(&format!(
                "loaded {} groups from {}",
                store.group_count(),
                path.display()
            ));
            store
        } else {
            logger.record(&format!(
                "{} does not exist yet, starting empty",
                path.display()
            ));
            GroupedPointStore::new()
        };

        let mut pending_group = None;
        if let Some(group) = config.group.as_deref() {
            if group.is_empty() {
                bail!("group name must not be empty");
            }
            if store.contains_group(group) {
                store
                    .select_group(group)
                    .with_context(|| format!("selecting group '{}'", group))?;
            } else {
                pending_group = Some(group.to_string());
            }
        }

        Ok(Self {
            store,
            path,
            logger,
            dirty: false,
            pending_group,
        })
    }

    #[cfg(test)]
    pub fn store(&self) -> &GroupedPointStore {
        &self.store
    }

    #[cfg(test)]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Runs one command and returns the text to show the user.
    pub fn apply(&mut self, command: &Command) -> anyhow::Result<String> {
        // A rename may be what brings the start group into existence.
        let renaming = matches!(command, Command::Rename { .. });
        if !renaming {
            self.select_pending_group()?;
        }
        let message = self.dispatch(command)?;
        if renaming && self.pending_group_exists() {
            self.select_pending_group()?;
        }
        if command.mutates() {
            self.dirty = true;
            self.logger.record(&message);
        }
        Ok(message)
    }

    /// Saves pending changes; returns whether anything was written.
    pub fn commit(&mut self) -> anyhow::Result<bool> {
        if !self.dirty {
            return Ok(false);
        }
        self.store
            .save(&self.path)
            .with_context(|| format!("saving clicks to {}", self.path.display()))?;
        self.dirty = false;
        self.logger.record(&format!(
            "saved {} clicks to {}",
            self.store.to_mapping().click_count(),
            self.path.display()
        ));
        Ok(true)
    }

    fn select_pending_group(&mut self) -> anyhow::Result<()> {
        let Some(group) = self.pending_group.take() else {
            return Ok(());
        };
        if !self.store.contains_group(&group) {
            self.logger
                .warn(&format!("group '{}' not in file, creating it", group));
        }
        self.store
            .set_group(&group)
            .with_context(|| format!("selecting group '{}'", group))?;
        Ok(())
    }

    fn pending_group_exists(&self) -> bool {
        self.pending_group
            .as_deref()
            .is_some_and(|group| self.store.contains_group(group))
    }

    fn dispatch(&mut self, command: &Command) -> anyhow::Result<String> {
        let current = self.store.current_group().to_string();
        let message = match command {
            Command::Show { json: true } => report::render_json(&self.store.to_mapping())?,
            Command::Show { json: false } => {
                report::render_group(&current, self.store.extract_group(None)?)
            }
            Command::Groups => report::render_groups(&self.store),
            Command::Click { x, y } => {
                let point = self
                    .store
                    .record_pointer(PointerEvent::Primary { x: *x, y: *y }, None)?;
                format!("added {} to '{}'", point, current)
            }
            Command::Placeholder => {
                self.store.record_pointer(PointerEvent::Secondary, None)?;
                format!("added placeholder to '{}'", current)
            }
            Command::Get { index } => {
                let point = self.store.get_click(*index, None)?;
                format!("'{}'[{}] = {}", current, index, point)
            }
            Command::Remove { index } => {
                let point = self.store.remove_click(*index, None)?;
                format!("removed {} at index {} from '{}'", point, index, current)
            }
            Command::Undo => {
                let len = self.store.extract_group(None)?.len();
                let Some(last) = len.checked_sub(1) else {
                    bail!("group '{}' has no clicks to undo", current);
                };
                let point = self.store.remove_click(last, None)?;
                format!("removed last click {} from '{}'", point, current)
            }
            Command::Clear => {
                let removed = self.store.clear_group(None)?;
                format!("cleared {} clicks from '{}'", removed, current)
            }
            Command::Rename { old, new } => {
                self.store.rename_group(old, new)?;
                format!("renamed '{}' to '{}'", old, new)
            }
            Command::RemoveGroup { name } => {
                let target = name.as_deref().unwrap_or(current.as_str());
                let points = self.store.remove_group(Some(target))?;
                format!(
                    "removed group '{}' with {} clicks; current group is '{}'",
                    target,
                    points.len(),
                    self.store.current_group()
                )
            }
            Command::Export { path } => {
                self.store
                    .save(path)
                    .with_context(|| format!("exporting clicks to {}", path.display()))?;
                format!("exported clicks to {}", path.display())
            }
        };
        Ok(message)
    }
}
