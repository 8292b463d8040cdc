use libris_authz::Registration;
use libris_db::{AdminId, Administrator};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub last_name: String,
}

impl From<RegisterRequest> for Registration {
    fn from(request: RegisterRequest) -> Self {
        Self {
            username: request.username,
            password: request.password,
            name: request.name,
            last_name: request.last_name,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Administrator without credential material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminView {
    pub id: AdminId,
    pub username: String,
    pub name: String,
    pub last_name: String,
}

impl From<Administrator> for AdminView {
    fn from(admin: Administrator) -> Self {
        Self {
            id: admin.id,
            username: admin.username,
            name: admin.name,
            last_name: admin.last_name,
        }
    }
}
