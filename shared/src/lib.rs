//! Task entity and its request shapes, with the validation rules applied
//! before anything is written.

mod task;
pub mod validation;

pub use task::{CreateTaskRequest, Task, TaskCreate, TaskUpdate, UpdateTaskRequest};
pub use validation::{ErrorKind, FieldError, ValidationError};
