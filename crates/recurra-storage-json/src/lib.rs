use std::{
    cmp::Reverse,
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard},
};

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, SubsecRound, Utc};
use uuid::Uuid;

use recurra_core::{
    storage::{DatePredicate, InstanceStore, RuleStore, Snapshot},
    CoreError,
};
use recurra_domain::{Page, RecurrenceRule, RuleFilter, TransactionInstance};

const DATA_FILE_NAME: &str = "recurra.json";
const BACKUP_DIR_NAME: &str = "backups";
const BACKUP_PREFIX: &str = "recurra";
const FILE_EXTENSION: &str = "json";
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S%3f";
const TMP_SUFFIX: &str = "tmp";
pub const DEFAULT_RETENTION: usize = 5;

/// Where the snapshot and its backups live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorePaths {
    pub data_file: PathBuf,
    pub backup_root: PathBuf,
}

impl StorePaths {
    /// `<dir>/recurra.json`, with backups under `<dir>/backups`.
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            data_file: dir.join(DATA_FILE_NAME),
            backup_root: dir.join(BACKUP_DIR_NAME),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotBackup {
    pub id: String,
    pub created_at: Option<DateTime<Utc>>,
    pub path: PathBuf,
}

/// File-backed store that keeps every rule and instance in one JSON snapshot.
///
/// Mutations are staged on a copy of the in-memory snapshot, written to a
/// temp file and renamed over the data file; the in-memory copy is replaced
/// only after the rename succeeds.
#[derive(Debug)]
pub struct JsonStore {
    paths: StorePaths,
    retention: usize,
    state: Mutex<Snapshot>,
}

impl JsonStore {
    pub fn open(paths: StorePaths) -> Result<Self, CoreError> {
        Self::with_retention(paths, DEFAULT_RETENTION)
    }

    pub fn with_retention(paths: StorePaths, retention: usize) -> Result<Self, CoreError> {
        if let Some(parent) = paths.data_file.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::create_dir_all(&paths.backup_root)?;
        let snapshot = if paths.data_file.exists() {
            load_snapshot(&paths.data_file)?
        } else {
            Snapshot::default()
        };
        Ok(Self {
            paths,
            retention: retention.max(1),
            state: Mutex::new(snapshot),
        })
    }

    pub fn paths(&self) -> &StorePaths {
        &self.paths
    }

    pub fn snapshot(&self) -> Result<Snapshot, CoreError> {
        Ok(self.lock()?.clone())
    }

    /// Writes the current contents to a new backup file.
    pub fn backup(&self, note: Option<&str>) -> Result<SnapshotBackup, CoreError> {
        let guard = self.lock()?;
        let backup = self.next_backup(note)?;
        write_atomic(&backup.path, &serialize_snapshot(&guard)?)?;
        self.prune_backups()?;
        Ok(backup)
    }

    /// Backups, newest first.
    pub fn list_backups(&self) -> Result<Vec<SnapshotBackup>, CoreError> {
        if !self.paths.backup_root.exists() {
            return Ok(Vec::new());
        }
        let mut entries = Vec::new();
        for entry in fs::read_dir(&self.paths.backup_root)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(FILE_EXTENSION) {
                continue;
            }
            if let Some(file_name) = path.file_name().and_then(|name| name.to_str()) {
                entries.push(SnapshotBackup {
                    id: file_name.to_string(),
                    created_at: parse_backup_timestamp(file_name),
                    path: path.clone(),
                });
            }
        }
        entries.sort_by_key(|backup| Reverse((backup.created_at, backup.id.clone())));
        Ok(entries)
    }

    /// Replaces the live snapshot with the contents of backup `id`.
    pub fn restore_backup(&self, id: &str) -> Result<Snapshot, CoreError> {
        let mut guard = self.lock()?;
        let path = self.paths.backup_root.join(id);
        if !path.exists() {
            return Err(CoreError::Storage(format!("backup `{id}` not found")));
        }
        let restored = load_snapshot(&path)?;
        self.persist(&restored)?;
        *guard = restored.clone();
        Ok(restored)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Snapshot>, CoreError> {
        self.state
            .lock()
            .map_err(|_| CoreError::Storage("json store lock poisoned".into()))
    }

    fn read<T>(&self, f: impl FnOnce(&Snapshot) -> T) -> Result<T, CoreError> {
        let guard = self.lock()?;
        Ok(f(&guard))
    }

    fn mutate<T>(
        &self,
        f: impl FnOnce(&mut Snapshot) -> Result<T, CoreError>,
    ) -> Result<T, CoreError> {
        let mut guard = self.lock()?;
        let mut staged = guard.clone();
        let outcome = f(&mut staged)?;
        if staged != *guard {
            self.persist(&staged)?;
            *guard = staged;
        }
        Ok(outcome)
    }

    fn persist(&self, snapshot: &Snapshot) -> Result<(), CoreError> {
        let path = &self.paths.data_file;
        if path.exists() {
            self.backup_existing_file(path)?;
        }
        save_snapshot(snapshot, path)
    }

    fn backup_existing_file(&self, path: &Path) -> Result<(), CoreError> {
        fs::create_dir_all(&self.paths.backup_root)?;
        let backup = self.next_backup(None)?;
        fs::copy(path, &backup.path)?;
        self.prune_backups()
    }

    /// Picks a backup name that no existing file uses. Names carry
    /// millisecond stamps that always move past the newest backup, so
    /// name order follows write order even within one millisecond.
    fn next_backup(&self, note: Option<&str>) -> Result<SnapshotBackup, CoreError> {
        let label = sanitize_backup_note(note);
        let mut stamp = Utc::now().trunc_subsecs(3);
        if let Some(latest) = self.list_backups()?.first().and_then(|b| b.created_at) {
            if latest >= stamp {
                stamp = latest + Duration::milliseconds(1);
            }
        }
        loop {
            let backup = self.backup_at(stamp, label.as_deref());
            if !backup.path.exists() {
                return Ok(backup);
            }
            stamp += Duration::milliseconds(1);
        }
    }

    fn backup_at(&self, stamp: DateTime<Utc>, label: Option<&str>) -> SnapshotBackup {
        let mut stem = format!("{}_{}", BACKUP_PREFIX, stamp.format(BACKUP_TIMESTAMP_FORMAT));
        if let Some(label) = label {
            stem.push('_');
            stem.push_str(label);
        }
        let id = format!("{}.{}", stem, FILE_EXTENSION);
        SnapshotBackup {
            path: self.paths.backup_root.join(&id),
            created_at: parse_backup_timestamp(&id),
            id,
        }
    }

    fn prune_backups(&self) -> Result<(), CoreError> {
        for stale in self.list_backups()?.into_iter().skip(self.retention) {
            let _ = fs::remove_file(stale.path);
        }
        Ok(())
    }
}

impl RuleStore for JsonStore {
    fn insert_rule(&self, rule: &RecurrenceRule) -> Result<(), CoreError> {
        self.mutate(|snapshot| snapshot.insert_rule(rule))
    }

    fn find_rule(&self, id: Uuid) -> Result<Option<RecurrenceRule>, CoreError> {
        self.read(|snapshot| snapshot.find_rule(id).cloned())
    }

    fn set_active(&self, id: Uuid, active: bool, at: DateTime<Utc>) -> Result<(), CoreError> {
        self.mutate(|snapshot| snapshot.set_active(id, active, at))
    }

    fn delete_rule(&self, id: Uuid) -> Result<bool, CoreError> {
        self.mutate(|snapshot| Ok(snapshot.delete_rule(id)))
    }

    fn list_rules(
        &self,
        owner_id: Uuid,
        filter: &RuleFilter,
    ) -> Result<Page<RecurrenceRule>, CoreError> {
        self.read(|snapshot| snapshot.list_rules(owner_id, filter))
    }
}

impl InstanceStore for JsonStore {
    fn count_instances(
        &self,
        rule_id: Uuid,
        before: Option<NaiveDate>,
    ) -> Result<usize, CoreError> {
        self.read(|snapshot| snapshot.count_instances(rule_id, before))
    }

    fn insert_instances(&self, instances: &[TransactionInstance]) -> Result<(), CoreError> {
        self.mutate(|snapshot| snapshot.insert_instances(instances))
    }

    fn update_instances(&self, instances: &[TransactionInstance]) -> Result<(), CoreError> {
        self.mutate(|snapshot| snapshot.update_instances(instances))
    }

    fn delete_instances(
        &self,
        rule_id: Uuid,
        predicate: DatePredicate,
    ) -> Result<usize, CoreError> {
        self.mutate(|snapshot| Ok(snapshot.delete_instances(rule_id, predicate)))
    }

    fn find_instances(
        &self,
        rule_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<TransactionInstance>, CoreError> {
        self.read(|snapshot| snapshot.find_instances(rule_id, start, end))
    }

    fn list_instances(&self, rule_id: Uuid) -> Result<Vec<TransactionInstance>, CoreError> {
        self.read(|snapshot| snapshot.list_instances(rule_id))
    }
}

/// Saves a snapshot to an arbitrary path, replacing it atomically.
pub fn save_snapshot(snapshot: &Snapshot, path: &Path) -> Result<(), CoreError> {
    let tmp = tmp_path(path);
    write_atomic(&tmp, &serialize_snapshot(snapshot)?)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

pub fn load_snapshot(path: &Path) -> Result<Snapshot, CoreError> {
    let data = fs::read_to_string(path)?;
    serde_json::from_str(&data).map_err(|err| CoreError::Serde(err.to_string()))
}

fn sanitize_backup_note(note: Option<&str>) -> Option<String> {
    let raw = note?.trim();
    if raw.is_empty() {
        return None;
    }
    let mut sanitized = String::new();
    let mut last_dash = false;
    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() {
            sanitized.push(ch.to_ascii_lowercase());
            last_dash = false;
        } else if (ch.is_whitespace() || matches!(ch, '-' | '.' | '_'))
            && !sanitized.is_empty()
            && !last_dash
        {
            sanitized.push('-');
            last_dash = true;
        }
    }
    let trimmed = sanitized.trim_matches('-').to_string();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

/// Reads the timestamp out of `recurra_YYYYMMDD_HHMMSS[_note].json`.
fn parse_backup_timestamp(name: &str) -> Option<DateTime<Utc>> {
    let stem = name.strip_suffix(&format!(".{}", FILE_EXTENSION))?;
    let rest = stem.strip_prefix(&format!("{}_", BACKUP_PREFIX))?;
    let mut segments = rest.split('_');
    let date = segments.next()?;
    let time = segments.next()?;
    if !is_digits(date, 8) {
        return None;
    }
    // Older names stop at whole seconds.
    let format = if is_digits(time, 9) {
        "%Y%m%d%H%M%S%3f"
    } else if is_digits(time, 6) {
        "%Y%m%d%H%M%S"
    } else {
        return None;
    };
    NaiveDateTime::parse_from_str(&format!("{date}{time}"), format)
        .ok()
        .map(|naive| DateTime::from_naive_utc_and_offset(naive, Utc))
}

fn is_digits(value: &str, len: usize) -> bool {
    value.len() == len && value.chars().all(|c| c.is_ascii_digit())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<(), CoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.sync_all()?;
    Ok(())
}

fn serialize_snapshot(snapshot: &Snapshot) -> Result<String, CoreError> {
    serde_json::to_string_pretty(snapshot).map_err(|err| CoreError::Serde(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backup_notes_are_slugged() {
        assert_eq!(
            sanitize_backup_note(Some("  Before delete: Rent! ")),
            Some("before-delete-rent".into())
        );
        assert_eq!(sanitize_backup_note(Some("***")), None);
        assert_eq!(sanitize_backup_note(None), None);
    }

    #[test]
    fn backup_timestamps_parse_with_and_without_note() {
        let plain = parse_backup_timestamp("recurra_20250314_081502250.json").unwrap();
        assert_eq!(
            plain.format("%Y-%m-%d %H:%M:%S%.3f").to_string(),
            "2025-03-14 08:15:02.250"
        );
        assert_eq!(
            parse_backup_timestamp("recurra_20250314_081502250_pre-import.json"),
            Some(plain)
        );
        let whole_seconds = parse_backup_timestamp("recurra_20250314_081502.json").unwrap();
        assert!(whole_seconds < plain);
        assert_eq!(parse_backup_timestamp("recurra_2025_0814.json"), None);
        assert_eq!(parse_backup_timestamp("notes.txt"), None);
    }

    #[test]
    fn tmp_path_keeps_original_extension() {
        assert_eq!(
            tmp_path(Path::new("/data/recurra.json")),
            PathBuf::from("/data/recurra.json.tmp")
        );
    }
}
