//! Arena configuration parameters.

use quarry_core::MAX_ALIGN;

use crate::error::ArenaError;

/// Configuration for an owned [`Arena`](crate::Arena).
///
/// Validated at construction; the arena never changes size afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArenaConfig {
    /// Usable bytes in the arena, including per-block headers and padding.
    ///
    /// Must be non-zero.
    pub capacity: usize,

    /// Alignment of the first byte of the arena buffer.
    ///
    /// Default: [`MAX_ALIGN`]. Padding inserted in front of a block depends
    /// on this, so byte accounting is only reproducible across arenas that
    /// share it. Must be a power of two and at least 8 so the size header
    /// in front of the first block is naturally aligned.
    pub base_align: usize,
}

impl ArenaConfig {
    /// Default base alignment: the platform `malloc` guarantee.
    pub const DEFAULT_BASE_ALIGN: usize = MAX_ALIGN;

    /// Create a config for an arena of `capacity` bytes.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            base_align: Self::DEFAULT_BASE_ALIGN,
        }
    }

    /// Check every constraint documented on the fields.
    pub fn validate(&self) -> Result<(), ArenaError> {
        if self.capacity == 0 {
            return Err(ArenaError::InvalidConfig {
                reason: "capacity must be non-zero",
            });
        }
        if !self.base_align.is_power_of_two() || self.base_align < 8 {
            return Err(ArenaError::InvalidConfig {
                reason: "base_align must be a power of two of at least 8",
            });
        }
        if self.capacity > isize::MAX as usize - self.base_align {
            return Err(ArenaError::InvalidConfig {
                reason: "capacity overflows isize",
            });
        }
        Ok(())
    }
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self::new(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_uses_max_align() {
        let config = ArenaConfig::new(512);
        assert_eq!(config.capacity, 512);
        assert_eq!(config.base_align, MAX_ALIGN);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn default_fails_validation() {
        assert!(matches!(
            ArenaConfig::default().validate(),
            Err(ArenaError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn rejects_bad_alignment() {
        let mut config = ArenaConfig::new(64);
        config.base_align = 24;
        assert!(config.validate().is_err());
        config.base_align = 4;
        assert!(config.validate().is_err());
        config.base_align = 64;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_oversized_capacity() {
        assert!(ArenaConfig::new(usize::MAX).validate().is_err());
    }
}
