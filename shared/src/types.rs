use std::fmt;

/// Dense per-network index handed to a peer when it joins
pub type PeerIndex = u32;
/// Sequence number assigned to an action when it enters an [`ActionLog`](crate::ActionLog)
pub type ActionIndex = u64;
/// Dense identifier of an object within the set of objects spawned by one peer
pub type NetworkObjectId = u32;

const SCENE_SENTINEL: &str = "__scene__";

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({:?})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(
    /// One network connection. Unique per connection, ordered lexicographically.
    PeerId
);
string_id!(
    /// An end-user identity, which may own several simultaneous peers
    UserId
);
string_id!(
    /// A logical communication group
    NetworkId
);
string_id!(
    /// Cluster-wide stable identifier of a networked object, chosen by its spawner
    EntityUuid
);

impl PeerId {
    /// The pseudo-peer standing in for the persistent scene
    pub fn scene() -> Self {
        Self(SCENE_SENTINEL.to_string())
    }

    pub fn is_scene(&self) -> bool {
        self.0 == SCENE_SENTINEL
    }
}

impl UserId {
    /// The pseudo-user owning objects that belong to the persistent scene
    pub fn scene() -> Self {
        Self(SCENE_SENTINEL.to_string())
    }

    pub fn is_scene(&self) -> bool {
        self.0 == SCENE_SENTINEL
    }
}

/// Independent network category, each with its own host and peer set
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NetworkTopic {
    World,
    Media,
}
