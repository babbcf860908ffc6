use auth_services::CurrentUser;

use crate::types::{Campground, CampgroundError};

/// Outcome of an ownership check: the caller either holds the capability to
/// mutate the campground or does not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnershipDecision {
    /// The caller is the campground's owner
    Granted,
    /// The caller is not the campground's owner
    Denied,
}

impl OwnershipDecision {
    /// Convert the decision into a handler result, mapping `Denied` to the
    /// uniform `Forbidden` error.
    pub fn require(self) -> Result<(), CampgroundError> {
        match self {
            OwnershipDecision::Granted => Ok(()),
            OwnershipDecision::Denied => Err(CampgroundError::Forbidden),
        }
    }
}

/// Decide whether the caller owns the campground. Ownership is an identity
/// match against the author persisted at creation time.
pub fn check_campground_ownership(
    user: &CurrentUser,
    campground: &Campground,
) -> OwnershipDecision {
    if campground.author.id == user.id {
        OwnershipDecision::Granted
    } else {
        OwnershipDecision::Denied
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CampgroundAuthor;
    use chrono::Utc;
    use uuid::Uuid;

    fn campground_owned_by(author_id: Uuid) -> Campground {
        Campground {
            id: Uuid::new_v4(),
            name: "Pine Ridge".to_string(),
            price: 10.0,
            description: "quiet".to_string(),
            image_url: "https://example.com/img.jpg".to_string(),
            image_public_id: "campgrounds/img".to_string(),
            location: "Yosemite National Park, CA, USA".to_string(),
            lat: 37.8651,
            lng: -119.5383,
            author: CampgroundAuthor {
                id: author_id,
                username: "camper_joe".to_string(),
            },
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_owner_is_granted() {
        let user = CurrentUser {
            id: Uuid::new_v4(),
            username: "camper_joe".to_string(),
        };
        let campground = campground_owned_by(user.id);

        let decision = check_campground_ownership(&user, &campground);
        assert_eq!(decision, OwnershipDecision::Granted);
        assert!(decision.require().is_ok());
    }

    #[test]
    fn test_non_owner_is_denied() {
        let user = CurrentUser {
            id: Uuid::new_v4(),
            username: "someone_else".to_string(),
        };
        let campground = campground_owned_by(Uuid::new_v4());

        let decision = check_campground_ownership(&user, &campground);
        assert_eq!(decision, OwnershipDecision::Denied);
        assert!(matches!(
            decision.require(),
            Err(CampgroundError::Forbidden)
        ));
    }
}
