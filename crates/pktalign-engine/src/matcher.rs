use pktalign_proto::ProtocolDescriptor;

/// Masked header-pattern comparison.
///
/// A pure function of the combined `tail ++ payload` window and the
/// descriptor: no internal state. The masked (position, expected-byte)
/// pairs are collected once at construction so each candidate offset only
/// touches the bytes that participate in the match.
#[derive(Debug, Clone)]
pub struct HeaderMatcher {
    checks: Vec<(usize, u8)>,
}

impl HeaderMatcher {
    pub fn new(descriptor: &ProtocolDescriptor) -> Self {
        let checks = descriptor
            .mask()
            .iter()
            .enumerate()
            .filter(|&(_, &masked)| masked)
            .map(|(j, _)| (j, descriptor.pattern()[j]))
            .collect();
        Self { checks }
    }

    /// Returns true if a header could start at `offset` of `window`.
    ///
    /// `window` must hold a full header at `offset`.
    pub fn matches_at(&self, window: &[u8], offset: usize) -> bool {
        self.checks
            .iter()
            .all(|&(j, expected)| window[offset + j] == expected)
    }
}
