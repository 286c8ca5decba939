use serde::{Deserialize, Deserializer, Serialize};

use crate::validation::{
    check_description, check_title, Collector, ErrorKind, FieldError, ValidationError,
};

/// A stored task. `id` is assigned by storage at insertion and never changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
}

impl Task {
    /// Builds the stored record once storage has assigned `id`.
    pub fn from_create(id: i64, input: TaskCreate) -> Self {
        Self {
            id,
            title: input.title,
            description: input.description,
            completed: input.completed,
        }
    }
}

/// Wire shape of a creation request. Unknown keys, `id` included, are ignored.
///
/// `title` keeps "missing" apart from an explicit `null` the same way
/// [`UpdateTaskRequest`] does.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateTaskRequest {
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub title: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub completed: bool,
}

/// Wire shape of an update request.
///
/// The outer `Option` is whether the key was sent at all, the inner one is
/// whether it was `null`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTaskRequest {
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub title: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub completed: Option<Option<bool>>,
}

// Only called when the key exists, so a `null` value becomes `Some(None)`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Validated creation input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskCreate {
    title: String,
    description: Option<String>,
    completed: bool,
}

impl TaskCreate {
    pub fn new(
        title: impl Into<String>,
        description: Option<String>,
        completed: bool,
    ) -> Result<Self, ValidationError> {
        Self::try_from(CreateTaskRequest {
            title: Some(Some(title.into())),
            description,
            completed,
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn completed(&self) -> bool {
        self.completed
    }
}

impl TryFrom<CreateTaskRequest> for TaskCreate {
    type Error = ValidationError;

    fn try_from(request: CreateTaskRequest) -> Result<Self, Self::Error> {
        let mut errors = Collector::default();

        let title = match request.title {
            None => {
                errors.push(FieldError::body(
                    "title",
                    "Field required",
                    ErrorKind::Missing,
                ));
                String::new()
            }
            Some(None) => {
                errors.push(null_not_allowed("title"));
                String::new()
            }
            Some(Some(title)) => {
                if let Some(error) = check_title(&title) {
                    errors.push(error);
                }
                title
            }
        };
        if let Some(error) = request.description.as_deref().and_then(check_description) {
            errors.push(error);
        }

        errors.finish(())?;
        Ok(Self {
            title,
            description: request.description,
            completed: request.completed,
        })
    }
}

/// Validated partial update. `None` on any field means "leave unchanged".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskUpdate {
    title: Option<String>,
    description: Option<Option<String>>,
    completed: Option<bool>,
}

impl TaskUpdate {
    pub fn new(
        title: Option<String>,
        description: Option<Option<String>>,
        completed: Option<bool>,
    ) -> Result<Self, ValidationError> {
        Self::try_from(UpdateTaskRequest {
            title: title.map(Some),
            description,
            completed: completed.map(Some),
        })
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// `Some(None)` clears the description.
    pub fn description(&self) -> Option<Option<&str>> {
        self.description.as_ref().map(Option::as_deref)
    }

    pub fn completed(&self) -> Option<bool> {
        self.completed
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.completed.is_none()
    }

    /// Copies the fields that were provided onto `task`. Never touches `id`.
    pub fn apply_to(self, task: &mut Task) {
        if let Some(title) = self.title {
            task.title = title;
        }
        if let Some(description) = self.description {
            task.description = description;
        }
        if let Some(completed) = self.completed {
            task.completed = completed;
        }
    }
}

impl TryFrom<UpdateTaskRequest> for TaskUpdate {
    type Error = ValidationError;

    fn try_from(request: UpdateTaskRequest) -> Result<Self, Self::Error> {
        let mut errors = Collector::default();

        let title = match request.title {
            None => None,
            Some(None) => {
                errors.push(null_not_allowed("title"));
                None
            }
            Some(Some(title)) => {
                if let Some(error) = check_title(&title) {
                    errors.push(error);
                }
                Some(title)
            }
        };
        if let Some(Some(description)) = &request.description {
            if let Some(error) = check_description(description) {
                errors.push(error);
            }
        }
        let completed = match request.completed {
            None => None,
            Some(None) => {
                errors.push(null_not_allowed("completed"));
                None
            }
            Some(Some(completed)) => Some(completed),
        };

        errors.finish(Self {
            title,
            description: request.description,
            completed,
        })
    }
}

fn null_not_allowed(field: &str) -> FieldError {
    FieldError::body(field, "Field may not be null", ErrorKind::NullNotAllowed)
}
