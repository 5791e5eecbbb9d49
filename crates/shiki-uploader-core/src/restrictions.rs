//! Restriction checks run before a file is queued.

use crate::config::Restrictions;
use crate::error::RestrictionError;
use crate::types::FileMeta;

impl Restrictions {
    /// Check a single file against size and type limits.
    pub fn check_file(&self, meta: &FileMeta) -> Result<(), RestrictionError> {
        if !self.allows_type(&meta.mime_type) {
            return Err(RestrictionError::DisallowedType {
                name: meta.name.clone(),
                mime_type: meta.mime_type.clone(),
                allowed: self.allowed_file_types.join(", "),
            });
        }

        if let Some(max_size) = self.max_file_size {
            if meta.size > max_size {
                return Err(RestrictionError::TooLarge {
                    name: meta.name.clone(),
                    size: meta.size,
                    max_size,
                });
            }
        }

        Ok(())
    }

    /// Check whether one more file fits next to `pending` already queued files.
    pub fn check_capacity(&self, pending: usize) -> Result<(), RestrictionError> {
        match self.max_number_of_files {
            Some(max) if pending >= max => Err(RestrictionError::TooManyFiles { max }),
            _ => Ok(()),
        }
    }

    /// Check that an upload run has enough files to start.
    pub fn check_run_size(&self, count: usize) -> Result<(), RestrictionError> {
        match self.min_number_of_files {
            Some(min) if count < min => Err(RestrictionError::TooFewFiles { min }),
            _ => Ok(()),
        }
    }

    fn allows_type(&self, mime_type: &str) -> bool {
        if self.allowed_file_types.is_empty() {
            return true;
        }

        let mime_type = mime_type.to_ascii_lowercase();
        self.allowed_file_types.iter().any(|allowed| {
            let allowed = allowed.to_ascii_lowercase();
            match allowed.strip_suffix("/*") {
                Some(family) => mime_type
                    .split_once('/')
                    .is_some_and(|(ty, _)| ty == family),
                None => allowed == mime_type,
            }
        })
    }
}
