use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use bson::oid::ObjectId;
use thiserror::Error;

use crate::models::{ClassPayload, FitnessClass, User};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Email already registered")]
    DuplicateEmail,
}

/// In-memory document collection of users, keyed by ObjectId hex string.
#[derive(Clone, Default)]
pub struct UserCollection {
    inner: Arc<RwLock<HashMap<String, User>>>,
}

impl UserCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a user unless the email is taken. The uniqueness check and the
    /// insert happen under a single write lock.
    pub fn insert_unique(&self, user: User) -> Result<String, StoreError> {
        let mut users = self.inner.write().expect("user store lock poisoned");
        if users.values().any(|u| u.email == user.email) {
            return Err(StoreError::DuplicateEmail);
        }
        let id = user.id.clone();
        users.insert(id.clone(), user);
        Ok(id)
    }

    pub fn find_by_email(&self, email: &str) -> Option<User> {
        let users = self.inner.read().expect("user store lock poisoned");
        users.values().find(|u| u.email == email).cloned()
    }

    /// Bulk-delete accessor for test utilities.
    pub fn delete_all(&self) {
        self.inner
            .write()
            .expect("user store lock poisoned")
            .clear();
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookOutcome {
    Booked,
    NotFound,
    AlreadyBooked,
    Full,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    Updated,
    NotFound,
    /// New capacity is below the current participant count.
    CapacityTooSmall,
}

/// Listing filters. Name-like fields match on substring, the rest exactly.
#[derive(Debug, Default)]
pub struct ClassFilter {
    pub name: Option<String>,
    pub description: Option<String>,
    pub date: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub location: Option<String>,
    pub trainer: Option<String>,
    pub capacity: Option<u32>,
    pub available_slots: Option<u32>,
    pub participants: Option<String>,
    pub created_by: Option<String>,
}

impl ClassFilter {
    fn matches(&self, class: &FitnessClass) -> bool {
        let contains = |field: &str, needle: &Option<String>| {
            needle.as_deref().is_none_or(|n| field.contains(n))
        };
        let equals = |field: &str, wanted: &Option<String>| {
            wanted.as_deref().is_none_or(|w| field == w)
        };

        contains(&class.name, &self.name)
            && contains(&class.description, &self.description)
            && equals(&class.date, &self.date)
            && equals(&class.start_time, &self.start_time)
            && equals(&class.end_time, &self.end_time)
            && contains(&class.location, &self.location)
            && contains(&class.trainer, &self.trainer)
            && self.capacity.is_none_or(|c| class.capacity == c)
            && self
                .available_slots
                .is_none_or(|s| class.available_slots == s)
            && self.participants.as_deref().is_none_or(|needle| {
                class.participants.iter().any(|p| p.contains(needle))
            })
            && contains(&class.created_by, &self.created_by)
    }
}

/// In-memory document collection of fitness classes, keyed by ObjectId hex
/// string. Booking is a single conditional update under the write lock, so
/// two requests racing for the last slot cannot overbook.
#[derive(Clone, Default)]
pub struct ClassCollection {
    inner: Arc<RwLock<HashMap<String, FitnessClass>>>,
}

impl ClassCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, class: FitnessClass) -> String {
        let mut classes = self.inner.write().expect("class store lock poisoned");
        let id = class.id.clone();
        classes.insert(id.clone(), class);
        id
    }

    pub fn find(&self, id: &str) -> Option<FitnessClass> {
        if ObjectId::parse_str(id).is_err() {
            return None;
        }
        let classes = self.inner.read().expect("class store lock poisoned");
        classes.get(id).cloned()
    }

    pub fn participants(&self, id: &str) -> Option<Vec<String>> {
        self.find(id).map(|class| class.participants)
    }

    pub fn list(&self, filter: &ClassFilter) -> Vec<FitnessClass> {
        let classes = self.inner.read().expect("class store lock poisoned");
        let mut matched: Vec<FitnessClass> = classes
            .values()
            .filter(|class| filter.matches(class))
            .cloned()
            .collect();
        matched.sort_by(|a, b| {
            (&a.date, &a.start_time, &a.name).cmp(&(&b.date, &b.start_time, &b.name))
        });
        matched
    }

    /// Adds `user_id` to the participant list. The duplicate and capacity
    /// checks happen under the same write lock as the append.
    pub fn book(&self, id: &str, user_id: &str) -> BookOutcome {
        if ObjectId::parse_str(id).is_err() {
            return BookOutcome::NotFound;
        }
        let mut classes = self.inner.write().expect("class store lock poisoned");
        let Some(class) = classes.get_mut(id) else {
            return BookOutcome::NotFound;
        };
        if class.participants.iter().any(|p| p == user_id) {
            return BookOutcome::AlreadyBooked;
        }
        if class.participants.len() as u32 >= class.capacity {
            return BookOutcome::Full;
        }
        class.participants.push(user_id.to_string());
        class.available_slots = class.capacity - class.participants.len() as u32;
        BookOutcome::Booked
    }

    /// Full-record update of the mutable fields. Participants are kept and
    /// `available_slots` is recomputed from the new capacity.
    pub fn update(&self, id: &str, fields: &ClassPayload) -> UpdateOutcome {
        if ObjectId::parse_str(id).is_err() {
            return UpdateOutcome::NotFound;
        }
        let mut classes = self.inner.write().expect("class store lock poisoned");
        let Some(class) = classes.get_mut(id) else {
            return UpdateOutcome::NotFound;
        };
        if fields.capacity < class.participants.len() as u32 {
            return UpdateOutcome::CapacityTooSmall;
        }
        class.name = fields.name.clone();
        class.description = fields.description.clone();
        class.date = fields.date.clone();
        class.start_time = fields.start_time.clone();
        class.end_time = fields.end_time.clone();
        class.location = fields.location.clone();
        class.trainer = fields.trainer.clone();
        class.capacity = fields.capacity;
        class.available_slots = class.capacity - class.participants.len() as u32;
        UpdateOutcome::Updated
    }

    /// Bulk-delete accessor for test utilities.
    pub fn delete_all(&self) {
        self.inner
            .write()
            .expect("class store lock poisoned")
            .clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;

    fn sample_user(email: &str) -> User {
        User {
            id: ObjectId::new().to_hex(),
            name: "Jane Doe".to_string(),
            email: email.to_string(),
            phone: None,
            role: Role::Member,
            password_hash: "hash".to_string(),
            birthdate: None,
            gender: None,
        }
    }

    fn sample_class(capacity: u32) -> FitnessClass {
        FitnessClass {
            id: ObjectId::new().to_hex(),
            name: "Yoga".to_string(),
            description: "A relaxing yoga class".to_string(),
            date: "2025-10-10".to_string(),
            start_time: "10:00".to_string(),
            end_time: "11:00".to_string(),
            location: "Gym".to_string(),
            trainer: "Jane Doe".to_string(),
            capacity,
            available_slots: capacity,
            participants: vec![],
            created_by: "admin".to_string(),
        }
    }

    #[test]
    fn test_duplicate_email_rejected() {
        let users = UserCollection::new();
        assert!(users.insert_unique(sample_user("a@b.com")).is_ok());
        assert!(matches!(
            users.insert_unique(sample_user("a@b.com")),
            Err(StoreError::DuplicateEmail)
        ));
        assert!(users.insert_unique(sample_user("c@d.com")).is_ok());
    }

    #[test]
    fn test_find_by_email() {
        let users = UserCollection::new();
        users.insert_unique(sample_user("a@b.com")).unwrap();
        assert!(users.find_by_email("a@b.com").is_some());
        assert!(users.find_by_email("missing@b.com").is_none());
    }

    #[test]
    fn test_book_updates_slots() {
        let classes = ClassCollection::new();
        let id = classes.insert(sample_class(2));
        assert_eq!(classes.book(&id, "user-1"), BookOutcome::Booked);
        let class = classes.find(&id).unwrap();
        assert_eq!(class.participants, vec!["user-1".to_string()]);
        assert_eq!(class.available_slots, 1);
    }

    #[test]
    fn test_book_rejects_duplicate_participant() {
        let classes = ClassCollection::new();
        let id = classes.insert(sample_class(2));
        assert_eq!(classes.book(&id, "user-1"), BookOutcome::Booked);
        assert_eq!(classes.book(&id, "user-1"), BookOutcome::AlreadyBooked);
        assert_eq!(classes.find(&id).unwrap().participants.len(), 1);
    }

    #[test]
    fn test_book_rejects_full_class() {
        let classes = ClassCollection::new();
        let id = classes.insert(sample_class(1));
        assert_eq!(classes.book(&id, "user-1"), BookOutcome::Booked);
        assert_eq!(classes.book(&id, "user-2"), BookOutcome::Full);
        let class = classes.find(&id).unwrap();
        assert_eq!(class.participants.len(), 1);
        assert_eq!(class.available_slots, 0);
    }

    #[test]
    fn test_book_unknown_and_malformed_ids() {
        let classes = ClassCollection::new();
        let unknown = ObjectId::new().to_hex();
        assert_eq!(classes.book(&unknown, "user-1"), BookOutcome::NotFound);
        assert_eq!(classes.book("not-an-id", "user-1"), BookOutcome::NotFound);
    }

    #[test]
    fn test_concurrent_booking_cannot_overbook() {
        let classes = ClassCollection::new();
        let id = classes.insert(sample_class(1));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let classes = classes.clone();
                let id = id.clone();
                std::thread::spawn(move || classes.book(&id, &format!("user-{i}")))
            })
            .collect();
        let outcomes: Vec<BookOutcome> =
            handles.into_iter().map(|h| h.join().unwrap()).collect();

        let booked = outcomes
            .iter()
            .filter(|o| **o == BookOutcome::Booked)
            .count();
        assert_eq!(booked, 1);
        assert_eq!(classes.find(&id).unwrap().participants.len(), 1);
    }

    #[test]
    fn test_update_recomputes_slots() {
        let classes = ClassCollection::new();
        let id = classes.insert(sample_class(2));
        classes.book(&id, "user-1");

        let mut fields = payload_from(&sample_class(5));
        fields.name = "Pilates".to_string();
        assert_eq!(classes.update(&id, &fields), UpdateOutcome::Updated);

        let class = classes.find(&id).unwrap();
        assert_eq!(class.name, "Pilates");
        assert_eq!(class.capacity, 5);
        assert_eq!(class.available_slots, 4);
        assert_eq!(class.participants, vec!["user-1".to_string()]);
    }

    #[test]
    fn test_update_rejects_capacity_below_booked() {
        let classes = ClassCollection::new();
        let id = classes.insert(sample_class(3));
        classes.book(&id, "user-1");
        classes.book(&id, "user-2");

        let fields = payload_from(&sample_class(1));
        assert_eq!(classes.update(&id, &fields), UpdateOutcome::CapacityTooSmall);
        assert_eq!(classes.find(&id).unwrap().capacity, 3);
    }

    #[test]
    fn test_list_filters() {
        let classes = ClassCollection::new();
        let mut yoga = sample_class(10);
        yoga.name = "Morning Yoga".to_string();
        let mut spin = sample_class(10);
        spin.name = "Spin".to_string();
        spin.trainer = "John Smith".to_string();
        classes.insert(yoga);
        classes.insert(spin);

        let all = classes.list(&ClassFilter::default());
        assert_eq!(all.len(), 2);

        let filter = ClassFilter {
            name: Some("Yoga".to_string()),
            ..Default::default()
        };
        let matched = classes.list(&filter);
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].name, "Morning Yoga");

        let filter = ClassFilter {
            trainer: Some("Smith".to_string()),
            ..Default::default()
        };
        assert_eq!(classes.list(&filter).len(), 1);

        let filter = ClassFilter {
            capacity: Some(99),
            ..Default::default()
        };
        assert!(classes.list(&filter).is_empty());
    }

    #[test]
    fn test_list_filter_by_participant() {
        let classes = ClassCollection::new();
        let booked = classes.insert(sample_class(5));
        classes.insert(sample_class(5));
        classes.book(&booked, "user-42");

        let filter = ClassFilter {
            participants: Some("user-42".to_string()),
            ..Default::default()
        };
        let matched = classes.list(&filter);
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].id, booked);

        let filter = ClassFilter {
            participants: Some("user-99".to_string()),
            ..Default::default()
        };
        assert!(classes.list(&filter).is_empty());
    }

    #[test]
    fn test_delete_all() {
        let users = UserCollection::new();
        users.insert_unique(sample_user("a@b.com")).unwrap();
        users.insert_unique(sample_user("c@d.com")).unwrap();
        users.delete_all();
        assert!(users.find_by_email("a@b.com").is_none());
        // A freed email can register again
        assert!(users.insert_unique(sample_user("a@b.com")).is_ok());

        let classes = ClassCollection::new();
        classes.insert(sample_class(5));
        classes.insert(sample_class(5));
        classes.delete_all();
        assert!(classes.list(&ClassFilter::default()).is_empty());
    }

    fn payload_from(class: &FitnessClass) -> ClassPayload {
        ClassPayload {
            name: class.name.clone(),
            description: class.description.clone(),
            date: class.date.clone(),
            start_time: class.start_time.clone(),
            end_time: class.end_time.clone(),
            location: class.location.clone(),
            trainer: class.trainer.clone(),
            capacity: class.capacity,
        }
    }
}
