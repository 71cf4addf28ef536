/// A canonical entity together with the store row that holds it
///
/// The row id targets updates and deletes; it is not part of the entity
/// handed to the authentication framework.
#[derive(Debug, Clone, PartialEq)]
pub struct Row<T> {
    pub id: String,
    pub entity: T,
}

impl<T> Row<T> {
    pub(crate) fn new(id: impl Into<String>, entity: T) -> Self {
        Self {
            id: id.into(),
            entity,
        }
    }

    pub fn into_entity(self) -> T {
        self.entity
    }
}

// Field names, shared by every table that carries them
pub(crate) const FIELD_USER_ID: &str = "userId";
pub(crate) const FIELD_EXPIRES: &str = "expires";
