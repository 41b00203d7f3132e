//! Week snapshot: the tasks and completion flags of one calendar week.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use shared::DayKey;
use std::collections::{BTreeMap, BTreeSet};

use super::lenient::{day_entries, records};
use super::TaskInstance;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekSnapshot {
    /// Ordered tasks per bucket
    #[serde(default, deserialize_with = "deserialize_days")]
    pub days: BTreeMap<DayKey, Vec<TaskInstance>>,
    /// Ids of completed tasks per bucket
    #[serde(default, deserialize_with = "deserialize_completed")]
    pub completed: BTreeMap<DayKey, BTreeSet<String>>,
    /// Set when the week was explicitly cleared, so nobody earns the fixed
    /// allowance for it again
    #[serde(default, deserialize_with = "super::lenient::or_default")]
    pub allowance_disabled: bool,
}

impl Default for WeekSnapshot {
    fn default() -> Self {
        Self::empty()
    }
}

impl WeekSnapshot {
    /// Seven empty weekdays plus an empty market bucket
    pub fn empty() -> Self {
        Self {
            days: DayKey::ALL.iter().map(|day| (*day, Vec::new())).collect(),
            completed: BTreeMap::new(),
            allowance_disabled: false,
        }
    }

    /// Empty week that no longer pays the fixed allowance
    pub fn cleared() -> Self {
        Self {
            allowance_disabled: true,
            ..Self::empty()
        }
    }

    /// Make sure every bucket exists and drop empty completion sets
    pub fn normalize(&mut self) {
        for day in DayKey::ALL {
            self.days.entry(day).or_default();
        }
        self.completed.retain(|_, ids| !ids.is_empty());
    }

    pub fn tasks(&self, day: DayKey) -> &[TaskInstance] {
        self.days.get(&day).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn tasks_mut(&mut self, day: DayKey) -> &mut Vec<TaskInstance> {
        self.days.entry(day).or_default()
    }

    /// All tasks with the bucket they live in, in board order
    pub fn iter_tasks(&self) -> impl Iterator<Item = (DayKey, &TaskInstance)> {
        self.days
            .iter()
            .flat_map(|(day, tasks)| tasks.iter().map(move |task| (*day, task)))
    }

    pub fn iter_tasks_mut(&mut self) -> impl Iterator<Item = &mut TaskInstance> {
        self.days.values_mut().flat_map(|tasks| tasks.iter_mut())
    }

    pub fn find_task(&self, day: DayKey, task_id: &str) -> Option<&TaskInstance> {
        self.tasks(day).iter().find(|task| task.id == task_id)
    }

    pub fn find_task_mut(&mut self, day: DayKey, task_id: &str) -> Option<&mut TaskInstance> {
        self.days
            .get_mut(&day)
            .and_then(|tasks| tasks.iter_mut().find(|task| task.id == task_id))
    }

    pub fn task_count(&self) -> usize {
        self.days.values().map(Vec::len).sum()
    }

    pub fn is_completed(&self, day: DayKey, task_id: &str) -> bool {
        self.completed
            .get(&day)
            .map(|ids| ids.contains(task_id))
            .unwrap_or(false)
    }

    pub fn set_completed(&mut self, day: DayKey, task_id: &str, completed: bool) {
        if completed {
            self.completed.entry(day).or_default().insert(task_id.to_string());
        } else if let Some(ids) = self.completed.get_mut(&day) {
            ids.remove(task_id);
            if ids.is_empty() {
                self.completed.remove(&day);
            }
        }
    }

    /// Flip the completion flag and return the new state
    pub fn toggle_completed(&mut self, day: DayKey, task_id: &str) -> bool {
        let completed = !self.is_completed(day, task_id);
        self.set_completed(day, task_id, completed);
        completed
    }

    /// Completed tasks with their bucket
    pub fn completed_tasks(&self) -> impl Iterator<Item = (DayKey, &TaskInstance)> {
        self.iter_tasks()
            .filter(move |(day, task)| self.is_completed(*day, &task.id))
    }
}

fn deserialize_days<'de, D>(deserializer: D) -> Result<BTreeMap<DayKey, Vec<TaskInstance>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(day_entries(value)
        .into_iter()
        .map(|(day, tasks)| (day, records::<TaskInstance>(tasks)))
        .collect())
}

fn deserialize_completed<'de, D>(deserializer: D) -> Result<BTreeMap<DayKey, BTreeSet<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(day_entries(value)
        .into_iter()
        .map(|(day, ids)| (day, records::<String>(ids).into_iter().collect()))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::Assignee;

    #[test]
    fn test_empty_week_has_all_buckets() {
        let week = WeekSnapshot::empty();
        assert_eq!(week.days.len(), 8);
        assert!(week.tasks(DayKey::Market).is_empty());
        assert!(!week.allowance_disabled);
        assert!(WeekSnapshot::cleared().allowance_disabled);
    }

    #[test]
    fn test_normalize_restores_missing_market() {
        let mut week: WeekSnapshot = serde_json::from_str(r#"{"days":{"monday":[]}}"#).unwrap();
        assert_eq!(week.days.len(), 1);
        week.normalize();
        assert_eq!(week.days.len(), 8);
    }

    #[test]
    fn test_completion_is_keyed_by_day_and_id() {
        let mut week = WeekSnapshot::empty();
        let task = TaskInstance::new("Dishes", 5.0, "", Assignee::Unassigned);
        let id = task.id.clone();
        week.tasks_mut(DayKey::Monday).push(task);

        assert!(week.toggle_completed(DayKey::Monday, &id));
        assert!(week.is_completed(DayKey::Monday, &id));
        assert!(!week.is_completed(DayKey::Tuesday, &id));
        assert_eq!(week.completed_tasks().count(), 1);

        assert!(!week.toggle_completed(DayKey::Monday, &id));
        assert!(week.completed.is_empty());
    }

    #[test]
    fn test_bad_tasks_and_days_are_skipped() {
        let json = r#"{
            "days": {
                "monday": [{"id": "t1", "text": "Dishes", "value": null}, {"text": "no id"}, 7],
                "blursday": [{"id": "t2", "text": "Lost", "value": 1}]
            },
            "completed": {"monday": ["t1", 3], "market": "t9"},
            "allowance_disabled": "no"
        }"#;
        let week: WeekSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(week.days.len(), 1);
        assert_eq!(week.tasks(DayKey::Monday).len(), 1);
        assert_eq!(week.tasks(DayKey::Monday)[0].value, 0.0);
        assert!(week.is_completed(DayKey::Monday, "t1"));
        assert!(!week.allowance_disabled);
    }
}
