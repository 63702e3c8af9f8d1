use chrono::NaiveDateTime;
use serde::{de, Deserialize, Deserializer, Serialize};
use validator::Validate;

/// Stored task row. `id == 0` means the row has not been persisted yet.
#[derive(Debug, Clone, Default, PartialEq, Validate)]
pub struct Task {
    pub id: i64,
    pub created: Option<NaiveDateTime>,
    pub last_upd: Option<NaiveDateTime>,
    #[validate(
        required(message = "Поле title не должно быть пустым"),
        length(
            min = 3,
            max = 200,
            message = "Размер title должен находиться в диапазоне от 3 до 200 символов"
        )
    )]
    pub title: Option<String>,
    #[validate(length(max = 2000, message = "Размер description должен быть не более 2000 символов"))]
    pub description: Option<String>,
    #[validate(required(message = "Поле dueDate не должно быть пустым"))]
    pub due_date: Option<NaiveDateTime>,
    pub completed: bool,
}

/// What clients send and receive. Timestamps never leave the server.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TaskData {
    #[serde(deserialize_with = "null_as_default")]
    pub id: i64,
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(deserialize_with = "blank_as_none")]
    pub due_date: Option<NaiveDateTime>,
    #[serde(deserialize_with = "null_as_default")]
    pub completed: bool,
}

impl Task {
    /// Human-readable messages for every violated field constraint, sorted.
    /// Empty when the task may be persisted.
    pub fn violations(&self) -> Vec<String> {
        let Err(errors) = self.validate() else {
            return Vec::new();
        };
        let mut messages: Vec<String> = errors
            .field_errors()
            .into_values()
            .flatten()
            .map(|e| match &e.message {
                Some(message) => message.to_string(),
                None => e.code.to_string(),
            })
            .collect();
        messages.sort();
        messages
    }
}

impl From<&Task> for TaskData {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id,
            title: task.title.clone(),
            description: task.description.clone(),
            due_date: task.due_date,
            completed: task.completed,
        }
    }
}

impl From<&TaskData> for Task {
    fn from(data: &TaskData) -> Self {
        Self {
            title: data.title.clone(),
            description: data.description.clone(),
            due_date: data.due_date,
            completed: data.completed,
            ..Self::default()
        }
    }
}

pub fn to_transport(task: Option<&Task>) -> TaskData {
    task.map(TaskData::from).unwrap_or_default()
}

/// The client-supplied id is dropped; storage or the caller assigns it.
pub fn to_entity(data: Option<&TaskData>) -> Task {
    data.map(Task::from).unwrap_or_default()
}

const DATE_TIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// Clients send `"dueDate": "  "` for an unset date. Seconds are optional.
fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => DATE_TIME_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
            .map(Some)
            .ok_or_else(|| {
                <D::Error as de::Error>::custom(format!("invalid local date-time: {value}"))
            }),
    }
}
