//! Item event topics
//!
//! openHAB publishes item events under `openhab/items/<item>/<kind>`. Group
//! member state changes nest one level deeper:
//! `openhab/items/<group>/<member>/statechanged`.

use std::fmt;

/// Root of all item event topics
pub const ITEMS_TOPIC: &str = "openhab/items";

/// Kind of item event, as it appears in the last topic segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemEventKind {
    Added,
    Removed,
    Updated,
    Command,
    State,
    StatePredicted,
    StateChanged,
}

impl ItemEventKind {
    pub const ALL: [ItemEventKind; 7] = [
        ItemEventKind::Added,
        ItemEventKind::Removed,
        ItemEventKind::Updated,
        ItemEventKind::Command,
        ItemEventKind::State,
        ItemEventKind::StatePredicted,
        ItemEventKind::StateChanged,
    ];

    /// Topic suffix for this kind
    pub fn suffix(self) -> &'static str {
        match self {
            ItemEventKind::Added => "added",
            ItemEventKind::Removed => "removed",
            ItemEventKind::Updated => "updated",
            ItemEventKind::Command => "command",
            ItemEventKind::State => "state",
            ItemEventKind::StatePredicted => "statepredicted",
            ItemEventKind::StateChanged => "statechanged",
        }
    }
}

/// A subscription topic
///
/// Item names are used as given; no validation or escaping is applied.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Topic {
    /// Every item event
    AllItems,
    /// One kind of event for a single item
    Item { name: String, kind: ItemEventKind },
    /// State changes of one member of a group item
    GroupMemberStateChanged { group: String, member: String },
}

impl Topic {
    pub fn item(name: impl Into<String>, kind: ItemEventKind) -> Self {
        Topic::Item {
            name: name.into(),
            kind,
        }
    }

    pub fn group_member_state_changed(group: impl Into<String>, member: impl Into<String>) -> Self {
        Topic::GroupMemberStateChanged {
            group: group.into(),
            member: member.into(),
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Topic::AllItems => f.write_str(ITEMS_TOPIC),
            Topic::Item { name, kind } => write!(f, "{}/{}/{}", ITEMS_TOPIC, name, kind.suffix()),
            Topic::GroupMemberStateChanged { group, member } => write!(
                f,
                "{}/{}/{}/{}",
                ITEMS_TOPIC,
                group,
                member,
                ItemEventKind::StateChanged.suffix()
            ),
        }
    }
}
