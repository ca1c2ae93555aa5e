use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Member,
    Trainer,
    Admin,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Member => "member",
            Role::Trainer => "trainer",
            Role::Admin => "admin",
        };
        f.write_str(name)
    }
}

impl FromStr for Role {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "member" => Ok(Role::Member),
            "trainer" => Ok(Role::Trainer),
            "admin" => Ok(Role::Admin),
            _ => Err(()),
        }
    }
}

/// Stored user document. Never serialized into a response, so the password
/// hash stays internal.
#[derive(Debug, Clone)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: Role,
    pub password_hash: String,
    pub birthdate: Option<String>,
    pub gender: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct FitnessClass {
    #[schema(example = "68a1f0c2e4b0a1b2c3d4e5f6")]
    pub id: String,
    #[schema(example = "Yoga")]
    pub name: String,
    #[schema(example = "A relaxing yoga class")]
    pub description: String,
    #[schema(example = "2025-10-10")]
    pub date: String,
    #[schema(example = "10:00")]
    pub start_time: String,
    #[schema(example = "11:00")]
    pub end_time: String,
    #[schema(example = "Gym")]
    pub location: String,
    #[schema(example = "Jane Doe")]
    pub trainer: String,
    pub capacity: u32,
    pub available_slots: u32,
    pub participants: Vec<String>,
    pub created_by: String,
}

/// Mutable class fields, shared by the create and full-record update bodies.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ClassPayload {
    pub name: String,
    pub description: String,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub location: String,
    pub trainer: String,
    pub capacity: u32,
}
