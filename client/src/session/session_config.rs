use std::default::Default;

use tether_shared::PeerIndexPolicy;

/// What happens when the authority peer of a scene-owned object disconnects
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SceneFailover {
    /// The network host takes authority if it is connected, otherwise the
    /// lowest-sorted peer connected to the network does
    #[default]
    HostThenLowest,
    /// Leave the stale authority in place until someone transfers it explicitly
    Disabled,
}

/// Contains Config properties which will be used by a [`Session`](crate::Session)
#[derive(Clone, Debug)]
pub struct SessionConfig {
    /// Failover policy for objects owned by the scene rather than a user
    pub scene_failover: SceneFailover,
    /// How the networks registered with this session hand out peer indices
    pub peer_index_policy: PeerIndexPolicy,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            scene_failover: SceneFailover::default(),
            peer_index_policy: PeerIndexPolicy::default(),
        }
    }
}
