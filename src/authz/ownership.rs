use uuid::Uuid;

use crate::models::{Actor, EntityRef, Resource};

/// Collapses a reference to the identifier it points at, whether it arrived
/// bare or as an expanded record. All identity comparisons go through here.
pub fn normalize_ref(reference: &EntityRef) -> Uuid {
    match reference {
        EntityRef::Id(id) => *id,
        EntityRef::Expanded(record) => record.id,
    }
}

pub fn refers_to(reference: &EntityRef, id: Uuid) -> bool {
    normalize_ref(reference) == id
}

/// True when the actor created (or organizes) the resource.
pub fn is_owner(actor: &Actor, resource: &Resource) -> bool {
    resource
        .owner_ref()
        .is_some_and(|owner| refers_to(owner, actor.id))
}

pub fn is_assignee(actor: &Actor, resource: &Resource) -> bool {
    resource
        .assignee_ref()
        .is_some_and(|assignee| refers_to(assignee, actor.id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MeetingRecord, Role, TaskRecord, UserRecord};
    use serde_json::json;

    fn task(created_by: EntityRef, assigned_to: Option<EntityRef>) -> Resource {
        Resource::Task(TaskRecord {
            id: Uuid::new_v4(),
            project: Uuid::new_v4().into(),
            title: "t".into(),
            status: "todo".into(),
            created_by,
            assigned_to,
        })
    }

    #[test]
    fn bare_and_expanded_refs_normalize_to_same_id() {
        let id = Uuid::new_v4();
        let bare: EntityRef = serde_json::from_value(json!(id.to_string())).unwrap();
        let expanded: EntityRef =
            serde_json::from_value(json!({"_id": id.to_string(), "name": "Ada", "role": "admin"})).unwrap();
        let expanded_plain: EntityRef = serde_json::from_value(json!({"id": id})).unwrap();

        assert_eq!(normalize_ref(&bare), id);
        assert_eq!(normalize_ref(&expanded), id);
        assert_eq!(normalize_ref(&expanded_plain), id);
    }

    #[test]
    fn uuid_text_forms_normalize_identically() {
        let id = Uuid::new_v4();
        let upper = id.to_string().to_uppercase();
        let simple = id.simple().to_string();

        for raw in [upper, simple] {
            let reference: EntityRef = serde_json::from_value(json!(raw)).unwrap();
            assert_eq!(normalize_ref(&reference), id);
        }
    }

    #[test]
    fn owner_matches_creator_in_either_shape() {
        let actor = Actor::new(Uuid::new_v4(), Role::TeamMember);
        let mut fields = serde_json::Map::new();
        fields.insert("name".into(), json!("Ada"));

        assert!(is_owner(&actor, &task(actor.id.into(), None)));
        assert!(is_owner(&actor, &task(EntityRef::expanded(actor.id, fields), None)));
        assert!(!is_owner(&actor, &task(Uuid::new_v4().into(), None)));
    }

    #[test]
    fn organizer_owns_meeting() {
        let actor = Actor::new(Uuid::new_v4(), Role::ProjectManager);
        let meeting = Resource::Meeting(MeetingRecord {
            id: Uuid::new_v4(),
            project: Uuid::new_v4().into(),
            title: "standup".into(),
            organizer: actor.id.into(),
            meeting_link: None,
            attendees: Vec::new(),
        });
        assert!(is_owner(&actor, &meeting));
    }

    #[test]
    fn profiles_have_no_owner() {
        let actor = Actor::new(Uuid::new_v4(), Role::Client);
        let profile = Resource::User(UserRecord {
            id: actor.id,
            name: String::new(),
            email: String::new(),
            role: Role::Client,
        });
        assert!(!is_owner(&actor, &profile));
    }

    #[test]
    fn assignee_check_ignores_unassigned() {
        let actor = Actor::new(Uuid::new_v4(), Role::TeamMember);
        assert!(is_assignee(&actor, &task(Uuid::new_v4().into(), Some(actor.id.into()))));
        assert!(!is_assignee(&actor, &task(actor.id.into(), None)));
    }
}
