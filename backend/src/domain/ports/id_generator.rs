//! Port for record identity generation.

use rand::RngCore;
use rand::rngs::OsRng;
use uuid::Builder;

use super::define_port_error;

define_port_error! {
    /// Errors raised while generating an identity.
    pub enum IdGenerationError {
        /// The entropy source failed.
        Entropy { message: String } => "identity generation failed: {message}",
    }
}

/// Produces globally unique record identities.
#[cfg_attr(test, mockall::automock)]
pub trait IdGenerator: Send + Sync {
    /// Generate a fresh identity.
    fn generate(&self) -> Result<String, IdGenerationError>;
}

/// Random (version 4) UUIDs drawn from the operating system RNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidIdGenerator;

impl IdGenerator for UuidIdGenerator {
    fn generate(&self) -> Result<String, IdGenerationError> {
        let mut bytes = [0_u8; 16];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|err| IdGenerationError::entropy(err.to_string()))?;
        Ok(Builder::from_random_bytes(bytes).into_uuid().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::{Uuid, Version};

    #[test]
    fn uuid_generator_produces_distinct_v4_ids() {
        let generator = UuidIdGenerator;
        let first = generator.generate().expect("first id");
        let second = generator.generate().expect("second id");

        assert_ne!(first, second);
        let parsed = Uuid::parse_str(&first).expect("valid uuid");
        assert_eq!(parsed.get_version(), Some(Version::Random));
    }
}
