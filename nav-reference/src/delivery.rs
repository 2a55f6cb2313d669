//! Broadcast delivery system classification

use serde::{Deserialize, Serialize};
use std::fmt;

/// The broadcast standard a live service is delivered over.
///
/// The playback engine owns the mapping from a service reference to its
/// delivery system; this crate only carries the result around so the
/// tuner-priority policy can look up a per-standard preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeliverySystem {
    /// DVB-T/T2
    Terrestrial,
    /// DVB-C
    Cable,
    /// DVB-S/S2
    Satellite,
    /// ATSC
    Atsc,
}

impl fmt::Display for DeliverySystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DeliverySystem::Terrestrial => "DVB-T",
            DeliverySystem::Cable => "DVB-C",
            DeliverySystem::Satellite => "DVB-S",
            DeliverySystem::Atsc => "ATSC",
        };
        write!(f, "{}", name)
    }
}
