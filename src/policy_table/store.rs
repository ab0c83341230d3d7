//! Where policy tables live between the build and query time.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use super::error::PolicyTableError;
use super::table::{PolicyRecord, PolicyTable};
use crate::algorithms::rl::Algorithm;
use crate::VertexId;

/// Persistence interface for policy tables keyed by algorithm and goal.
pub trait PolicyStore {
    fn save(&mut self, table: &PolicyTable) -> Result<(), PolicyTableError>;

    /// Returns `Ok(None)` when no table was saved for this key.
    fn load(
        &self,
        algorithm: Algorithm,
        goal: VertexId,
    ) -> Result<Option<PolicyTable>, PolicyTableError>;
}

/// In-memory collection of tables; what the route assembler reads from.
#[derive(Debug, Clone, Default)]
pub struct PolicySet {
    tables: HashMap<(Algorithm, VertexId), PolicyTable>,
}

impl PolicySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a table, replacing (and returning) any table for the same key.
    pub fn insert(&mut self, table: PolicyTable) -> Option<PolicyTable> {
        self.tables
            .insert((table.algorithm(), table.goal()), table)
    }

    pub fn get(&self, algorithm: Algorithm, goal: VertexId) -> Option<&PolicyTable> {
        self.tables.get(&(algorithm, goal))
    }

    /// Like [`PolicySet::get`], failing with `MissingPolicyTable`.
    pub fn require(
        &self,
        algorithm: Algorithm,
        goal: VertexId,
    ) -> Result<&PolicyTable, PolicyTableError> {
        self.get(algorithm, goal)
            .ok_or(PolicyTableError::MissingPolicyTable { goal, algorithm })
    }

    pub fn contains(&self, algorithm: Algorithm, goal: VertexId) -> bool {
        self.tables.contains_key(&(algorithm, goal))
    }

    /// Goals with a table for `algorithm`, ascending.
    pub fn goals(&self, algorithm: Algorithm) -> Vec<VertexId> {
        let mut goals: Vec<VertexId> = self
            .tables
            .keys()
            .filter(|(alg, _)| *alg == algorithm)
            .map(|&(_, goal)| goal)
            .collect();
        goals.sort_unstable();
        goals
    }

    pub fn tables(&self) -> impl Iterator<Item = &PolicyTable> {
        self.tables.values()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

impl FromIterator<PolicyTable> for PolicySet {
    fn from_iter<I: IntoIterator<Item = PolicyTable>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl Extend<PolicyTable> for PolicySet {
    fn extend<I: IntoIterator<Item = PolicyTable>>(&mut self, iter: I) {
        for table in iter {
            self.insert(table);
        }
    }
}

impl PolicyStore for PolicySet {
    fn save(&mut self, table: &PolicyTable) -> Result<(), PolicyTableError> {
        self.insert(table.clone());
        Ok(())
    }

    fn load(
        &self,
        algorithm: Algorithm,
        goal: VertexId,
    ) -> Result<Option<PolicyTable>, PolicyTableError> {
        Ok(self.get(algorithm, goal).cloned())
    }
}

const FILE_PREFIX: &str = "table_q_";
const FILE_SUFFIX: &str = ".csv";

/// Directory of headerless CSV files, `<root>/<algorithm>/table_q_<goal>.csv`,
/// one `vertex,next,q` row per vertex.
#[derive(Debug, Clone)]
pub struct CsvDirStore {
    root: PathBuf,
}

impl CsvDirStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, algorithm: Algorithm, goal: VertexId) -> PathBuf {
        self.root
            .join(algorithm.as_str())
            .join(format!("{}{}{}", FILE_PREFIX, goal, FILE_SUFFIX))
    }

    /// Loads every table saved for `algorithm`. Files not named like a table
    /// are ignored; a missing directory yields an empty set.
    pub fn load_all(&self, algorithm: Algorithm) -> Result<PolicySet, PolicyTableError> {
        let dir = self.root.join(algorithm.as_str());
        let mut set = PolicySet::new();
        if !dir.is_dir() {
            return Ok(set);
        }
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            let Some(goal) = goal_from_file_name(&path) else {
                continue;
            };
            set.insert(read_table(&path, goal, algorithm)?);
        }
        debug!("loaded {} {} tables from {}", set.len(), algorithm, dir.display());
        Ok(set)
    }
}

impl PolicyStore for CsvDirStore {
    fn save(&mut self, table: &PolicyTable) -> Result<(), PolicyTableError> {
        let path = self.path_for(table.algorithm(), table.goal());
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(&path)?;
        for record in table.records() {
            writer.write_record([
                record.vertex.to_string(),
                record.next.to_string(),
                record.q.to_string(),
            ])?;
        }
        writer.flush()?;
        debug!("saved {} rows to {}", table.len(), path.display());
        Ok(())
    }

    fn load(
        &self,
        algorithm: Algorithm,
        goal: VertexId,
    ) -> Result<Option<PolicyTable>, PolicyTableError> {
        let path = self.path_for(algorithm, goal);
        if !path.is_file() {
            return Ok(None);
        }
        read_table(&path, goal, algorithm).map(Some)
    }
}

fn goal_from_file_name(path: &Path) -> Option<VertexId> {
    path.file_name()?
        .to_str()?
        .strip_prefix(FILE_PREFIX)?
        .strip_suffix(FILE_SUFFIX)?
        .parse()
        .ok()
}

fn read_table(
    path: &Path,
    goal: VertexId,
    algorithm: Algorithm,
) -> Result<PolicyTable, PolicyTableError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)?;

    let mut table = PolicyTable::new(goal, algorithm);
    for result in reader.records() {
        let record = result?;
        let line = record.position().map_or(0, |pos| pos.line());
        let row = parse_record(&record).map_err(|reason| PolicyTableError::Parse {
            path: path.to_path_buf(),
            line,
            reason,
        })?;
        table.insert(row.vertex, row.next, row.q);
    }
    Ok(table)
}

fn parse_record(record: &csv::StringRecord) -> Result<PolicyRecord, String> {
    if record.len() != 3 {
        return Err(format!("expected 3 fields, found {}", record.len()));
    }
    let vertex = record[0]
        .parse()
        .map_err(|e| format!("invalid vertex id '{}': {}", &record[0], e))?;
    let next = record[1]
        .parse()
        .map_err(|e| format!("invalid next hop '{}': {}", &record[1], e))?;
    let q = record[2]
        .parse()
        .map_err(|e| format!("invalid value '{}': {}", &record[2], e))?;
    Ok(PolicyRecord { vertex, next, q })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(goal: VertexId, algorithm: Algorithm) -> PolicyTable {
        let mut table = PolicyTable::new(goal, algorithm);
        table.insert(0, 1, 4.9);
        table.insert(1, goal, 7.000000000000001);
        table.insert(goal, goal, 0.0);
        table
    }

    #[test]
    fn policy_set_keys_by_algorithm_and_goal() {
        let mut set: PolicySet = vec![
            sample(2, Algorithm::QLearning),
            sample(3, Algorithm::QLearning),
            sample(2, Algorithm::Sarsa),
        ]
        .into_iter()
        .collect();
        assert_eq!(set.len(), 3);
        assert_eq!(set.goals(Algorithm::QLearning), vec![2, 3]);
        assert_eq!(set.goals(Algorithm::Sarsa), vec![2]);
        assert!(set.contains(Algorithm::Sarsa, 2));
        assert!(!set.contains(Algorithm::Sarsa, 3));

        assert!(set.insert(sample(2, Algorithm::Sarsa)).is_some());
        assert_eq!(set.len(), 3);

        match set.require(Algorithm::Sarsa, 9) {
            Err(PolicyTableError::MissingPolicyTable { goal, algorithm }) => {
                assert_eq!(goal, 9);
                assert_eq!(algorithm, Algorithm::Sarsa);
            }
            other => panic!("expected MissingPolicyTable, got {:?}", other),
        }
    }

    #[test]
    fn csv_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = CsvDirStore::new(dir.path());
        let table = sample(2, Algorithm::QLearning);
        store.save(&table).unwrap();

        let path = store.path_for(Algorithm::QLearning, 2);
        assert!(path.ends_with("qlearning/table_q_2.csv"));
        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().next(), Some("0,1,4.9"));

        let loaded = store.load(Algorithm::QLearning, 2).unwrap().unwrap();
        assert_eq!(loaded, table);
        assert!(store.load(Algorithm::Sarsa, 2).unwrap().is_none());
    }

    #[test]
    fn load_all_skips_foreign_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = CsvDirStore::new(dir.path());
        store.save(&sample(2, Algorithm::Sarsa)).unwrap();
        store.save(&sample(5, Algorithm::Sarsa)).unwrap();
        fs::write(dir.path().join("sarsa").join("notes.txt"), "hello").unwrap();

        let set = store.load_all(Algorithm::Sarsa).unwrap();
        assert_eq!(set.goals(Algorithm::Sarsa), vec![2, 5]);
        assert!(store.load_all(Algorithm::QLearning).unwrap().is_empty());
    }

    #[test]
    fn malformed_row_reports_line() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvDirStore::new(dir.path());
        let path = store.path_for(Algorithm::QLearning, 1);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "0,1,2.5\n2,x,1.0\n").unwrap();

        match store.load(Algorithm::QLearning, 1) {
            Err(PolicyTableError::Parse { line, reason, .. }) => {
                assert_eq!(line, 2);
                assert!(reason.contains("next hop"));
            }
            other => panic!("expected Parse error, got {:?}", other),
        }

        fs::write(&path, "0,1\n").unwrap();
        assert!(matches!(
            store.load(Algorithm::QLearning, 1),
            Err(PolicyTableError::Parse { line: 1, .. })
        ));
    }
}
