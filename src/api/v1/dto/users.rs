use serde::Serialize;
use uuid::Uuid;

use crate::services::auth::principal::{Principal, Role};

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub id: Uuid,
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub email: String,
    pub role: Role,
}

impl From<&Principal> for ProfileResponse {
    fn from(p: &Principal) -> Self {
        Self {
            id: p.id,
            firstname: p.firstname.clone(),
            lastname: p.lastname.clone(),
            email: p.email.clone(),
            role: p.role,
        }
    }
}
