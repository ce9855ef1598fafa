//! Get-or-instantiate lookup that never persists on its own.
//!
//! Unlike get-or-create, the new record is returned unsaved so callers can
//! fill in the remaining required fields before calling `save`.
//!
//! # Invariants
//! - `created == true` implies the returned record has no id unless the
//!   lookup supplied one.
//! - The lookup must include enough uniquely constrained fields to identify
//!   at most one record. This is not checked; an ambiguous lookup surfaces
//!   as [`RepoError::MultipleObjectsReturned`].

use super::model_repo::{ModelRepository, RepoError, RepoResult};
use crate::model::{Lookup, Model};
use log::debug;

/// Adds [`GetOrNew::get_or_new`] to every model repository.
pub trait GetOrNew<M: Model + Default>: ModelRepository<M> {
    /// Returns the record matching `lookup` with `false`, or a new unsaved
    /// record populated from `lookup` with `true`.
    ///
    /// # Errors
    /// - [`RepoError::MultipleObjectsReturned`] when `lookup` is ambiguous.
    /// - [`RepoError::Field`] when a lookup entry cannot be assigned.
    /// - Storage errors from the underlying `get`.
    fn get_or_new(&self, lookup: &Lookup) -> RepoResult<(M, bool)> {
        match self.get(lookup) {
            Ok(existing) => Ok((existing, false)),
            Err(RepoError::DoesNotExist { .. }) => {
                debug!(
                    "event=get_or_new module=repo status=new model={} fields={}",
                    M::NAME,
                    lookup.len()
                );
                Ok((M::from_lookup(lookup)?, true))
            }
            Err(err) => Err(err),
        }
    }
}

impl<M, R> GetOrNew<M> for R
where
    M: Model + Default,
    R: ModelRepository<M> + ?Sized,
{
}
