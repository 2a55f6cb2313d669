//! The service reference value type

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;

/// What kind of entity a reference points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ServiceKind {
    /// The null reference; used as an absent continuity hint.
    #[default]
    Invalid,
    /// A structural node in the channel tree (bouquet roots and the like).
    Structure,
    /// A broadcast DVB service.
    Dvb,
    /// A local recording or other file-backed service.
    File,
    /// A network stream played through the media player service.
    Stream,
    /// The HDMI input passthrough service.
    HdmiIn,
}

bitflags! {
    /// Structural flags carried by a service reference.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct ServiceFlags: u32 {
        const IS_DIRECTORY = 1 << 0;
        const MUST_DESCENT = 1 << 1;
        const CAN_DESCENT = 1 << 2;
        const SHOULD_SORT = 1 << 3;
        const HAS_SORT_KEY = 1 << 4;
        const SORT_1 = 1 << 5;
        const IS_MARKER = 1 << 6;
        /// The reference denotes an ordered collection of alternatives and
        /// must be resolved before it can be tuned.
        const IS_GROUP = 1 << 7;

        /// Composite used for browsable directory nodes.
        const DIRECTORY = Self::IS_DIRECTORY.bits()
            | Self::MUST_DESCENT.bits()
            | Self::CAN_DESCENT.bits();
    }
}

/// Identifier for a playable unit or a group of alternatives.
///
/// References are plain values: construct them once, clone them freely,
/// compare them structurally. The `path` payload is opaque to this crate;
/// depending on the kind it may hold a channel query expression, a file
/// system path or a URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ServiceReference {
    kind: ServiceKind,
    flags: ServiceFlags,
    path: String,
}

impl ServiceReference {
    pub fn new(kind: ServiceKind, flags: ServiceFlags, path: impl Into<String>) -> Self {
        Self {
            kind,
            flags,
            path: path.into(),
        }
    }

    /// A browsable directory node for the given path.
    pub fn directory(path: impl Into<String>) -> Self {
        Self::new(
            ServiceKind::File,
            ServiceFlags::DIRECTORY | ServiceFlags::SHOULD_SORT | ServiceFlags::SORT_1,
            path,
        )
    }

    pub fn kind(&self) -> ServiceKind {
        self.kind
    }

    pub fn flags(&self) -> ServiceFlags {
        self.flags
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Copy of this reference with the path payload replaced.
    ///
    /// Used by the URL-rewrite chain; the returned reference keeps the kind
    /// and flags of the original.
    pub fn with_path(&self, path: impl Into<String>) -> Self {
        Self {
            kind: self.kind,
            flags: self.flags,
            path: path.into(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.kind != ServiceKind::Invalid
    }

    /// Whether this reference denotes a group of alternatives rather than a
    /// concrete tunable service.
    pub fn is_group(&self) -> bool {
        self.flags.contains(ServiceFlags::IS_GROUP)
    }

    pub fn is_directory(&self) -> bool {
        self.flags.intersects(ServiceFlags::DIRECTORY)
    }

    /// Whether the payload is a network stream URL.
    pub fn is_stream_url(&self) -> bool {
        self.path.contains("://")
    }

    /// Whether this looks like a live broadcast service: neither a stream
    /// URL nor a file-backed path. Only live services take part in
    /// tuner-priority selection.
    pub fn is_live_broadcast(&self) -> bool {
        !self.is_stream_url() && !self.path.starts_with('/')
    }
}

impl fmt::Display for ServiceReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{:?}({:#x})", self.kind, self.flags.bits())
        } else {
            write!(f, "{:?}({:#x}):{}", self.kind, self.flags.bits(), self.path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn default_reference_is_invalid() {
        let reference = ServiceReference::default();
        assert!(!reference.is_valid());
        assert!(!reference.is_group());
        assert_eq!(reference.path(), "");
    }

    #[test]
    fn group_flag_detection() {
        let group = ServiceReference::new(
            ServiceKind::Dvb,
            ServiceFlags::IS_GROUP,
            "1:7:1:0:0:0:0:0:0:0:",
        );
        assert!(group.is_group());
        assert!(!ServiceReference::new(ServiceKind::Dvb, ServiceFlags::empty(), "x").is_group());
    }

    #[test]
    fn directory_constructor_sets_composite_flags() {
        let dir = ServiceReference::directory("/media/hdd/movie");
        assert!(dir.is_directory());
        assert!(dir.flags().contains(ServiceFlags::SHOULD_SORT));
        assert_eq!(dir.kind(), ServiceKind::File);
    }

    #[test]
    fn stream_url_classification() {
        let stream =
            ServiceReference::new(ServiceKind::Stream, ServiceFlags::empty(), "http://host/live");
        assert!(stream.is_stream_url());
        assert!(!stream.is_live_broadcast());

        let recording =
            ServiceReference::new(ServiceKind::File, ServiceFlags::empty(), "/media/hdd/rec.ts");
        assert!(!recording.is_stream_url());
        assert!(!recording.is_live_broadcast());

        let live = ServiceReference::new(ServiceKind::Dvb, ServiceFlags::empty(), "");
        assert!(live.is_live_broadcast());
    }

    #[test]
    fn with_path_keeps_kind_and_flags() {
        let original = ServiceReference::new(
            ServiceKind::Stream,
            ServiceFlags::SHOULD_SORT,
            "http://old/url",
        );
        let rewritten = original.with_path("http://new/url");
        assert_eq!(rewritten.kind(), original.kind());
        assert_eq!(rewritten.flags(), original.flags());
        assert_eq!(rewritten.path(), "http://new/url");
        assert_ne!(rewritten, original);
    }

    proptest! {
        #[test]
        fn equality_is_structural(path in ".*", bits in 0u32..256) {
            let flags = ServiceFlags::from_bits_truncate(bits);
            let a = ServiceReference::new(ServiceKind::Dvb, flags, path.clone());
            let b = ServiceReference::new(ServiceKind::Dvb, flags, path.clone());
            prop_assert_eq!(&a, &b);
            let c = ServiceReference::new(ServiceKind::File, flags, path);
            prop_assert_ne!(&a, &c);
        }

        #[test]
        fn clone_round_trips(path in ".*") {
            let reference = ServiceReference::new(ServiceKind::Stream, ServiceFlags::IS_GROUP, path);
            prop_assert_eq!(reference.clone(), reference);
        }
    }
}
