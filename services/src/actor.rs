use db::models::user::{self, Role};

/// The authenticated caller of a lifecycle operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub id: i64,
    pub username: String,
    pub role: Role,
}

impl Actor {
    pub fn new(id: i64, username: impl Into<String>, role: Role) -> Self {
        Self { id, username: username.into(), role }
    }

    pub fn is_administrative(&self) -> bool {
        self.role.is_administrative()
    }
}

impl From<&user::Model> for Actor {
    fn from(user: &user::Model) -> Self {
        Actor::new(user.id, user.username.clone(), user.role)
    }
}
