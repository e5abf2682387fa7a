//! Options controlling how packed crawler output is unpacked.

use crate::memory::RuntimeAbi;

/// Configuration for [`crate::snapshot::unpack_with`].
///
/// The defaults reproduce the producer's own behaviour: the decoding rules are chosen from
/// the snapshot's declared producer version and crawler-reported sizes are taken as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnpackConfig {
    /// Measure managed objects the crawler reported with size `0` from the captured heap.
    /// Objects that cannot be measured keep size `0` and a warning is logged.
    pub measure_unsized: bool,

    /// Decoding rules to use instead of the ones selected by the producer version.
    pub abi: Option<RuntimeAbi>,
}

impl UnpackConfig {
    /// Takes every size exactly as packed and never touches the managed heap.
    #[must_use]
    pub fn raw() -> Self {
        Self {
            measure_unsized: false,
            abi: None,
        }
    }

    /// Fills in missing managed object sizes from the captured heap.
    #[must_use]
    pub fn measured() -> Self {
        Self {
            measure_unsized: true,
            abi: None,
        }
    }

    /// Returns a copy that decodes with `abi` regardless of the producer version.
    #[must_use]
    pub fn with_abi(mut self, abi: RuntimeAbi) -> Self {
        self.abi = Some(abi);
        self
    }
}

impl Default for UnpackConfig {
    fn default() -> Self {
        Self::raw()
    }
}
