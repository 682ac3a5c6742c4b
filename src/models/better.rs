//! Better model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::BetterId;

/// Someone who places bets on competitors.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Better {
    /// Assigned by the store
    #[serde(default)]
    pub id: BetterId,

    /// Display name
    #[validate(length(min = 1, message = "cannot be blank"))]
    pub name: String,

    /// Contact email, unique across betters
    #[validate(
        length(min = 1, message = "cannot be blank"),
        email(message = "must be a valid email address")
    )]
    pub email: String,

    /// Avatar URL
    #[serde(default)]
    pub image: Option<String>,

    /// When this better registered
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Better {
    /// Create a new unsaved Better.
    pub fn new(name: String, email: String) -> Self {
        Self {
            id: BetterId::default(),
            name,
            email,
            image: None,
            created_at: Utc::now(),
        }
    }

    /// Builder method to set the avatar.
    pub fn with_image(mut self, image: String) -> Self {
        self.image = Some(image);
        self
    }

    /// The identity carried on bets and metric results.
    pub fn to_ref(&self) -> BetterRef {
        BetterRef {
            id: self.id,
            name: self.name.clone(),
        }
    }
}

/// Resolved better identity attached to bets and metric record holders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BetterRef {
    pub id: BetterId,
    pub name: String,
}

impl BetterRef {
    pub fn new(id: BetterId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}
