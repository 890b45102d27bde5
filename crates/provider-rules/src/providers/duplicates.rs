use chrono::NaiveDate;

use super::domain::{Provider, ProviderId};
use super::normalize::name_match_key;
use super::repository::RepositoryError;

/// Name and birth date identity searched for when looking for duplicate providers.
///
/// Names compare after whitespace normalisation and case folding; the date of
/// birth must match exactly. The same predicate backs both the duplicate rule
/// and the registry's duplicate lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateQuery {
    first_name: String,
    last_name: String,
    date_of_birth: NaiveDate,
    exclude: Option<ProviderId>,
}

impl DuplicateQuery {
    pub fn new(
        first_name: &str,
        last_name: &str,
        date_of_birth: NaiveDate,
        exclude: Option<ProviderId>,
    ) -> Self {
        Self {
            first_name: name_match_key(first_name),
            last_name: name_match_key(last_name),
            date_of_birth,
            exclude,
        }
    }

    /// Query for a provider, excluding the provider itself once persisted.
    pub fn for_provider(provider: &Provider) -> Self {
        Self::new(
            &provider.first_name,
            &provider.last_name,
            provider.date_of_birth,
            provider.id,
        )
    }

    pub fn date_of_birth(&self) -> NaiveDate {
        self.date_of_birth
    }

    pub fn excluded(&self) -> Option<ProviderId> {
        self.exclude
    }

    pub fn matches(&self, candidate: &Provider) -> bool {
        if self.exclude.is_some() && candidate.id == self.exclude {
            return false;
        }

        candidate.date_of_birth == self.date_of_birth
            && name_match_key(&candidate.first_name) == self.first_name
            && name_match_key(&candidate.last_name) == self.last_name
    }
}

/// Filter a candidate set down to the providers matching `query`, keeping order.
pub fn find_matches<'a, I>(query: &DuplicateQuery, candidates: I) -> Vec<Provider>
where
    I: IntoIterator<Item = &'a Provider>,
{
    candidates
        .into_iter()
        .filter(|candidate| query.matches(candidate))
        .cloned()
        .collect()
}

/// Collaborator supplying existing providers to compare against.
///
/// Implementations may pre-filter (for example by date of birth) but the
/// final decision always goes through [`DuplicateQuery::matches`].
pub trait DuplicateCandidateSource: Send + Sync {
    fn candidates(&self, query: &DuplicateQuery) -> Result<Vec<Provider>, CandidateSourceError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CandidateSourceError {
    #[error("duplicate candidate source unavailable: {0}")]
    Unavailable(String),
}

impl From<RepositoryError> for CandidateSourceError {
    fn from(err: RepositoryError) -> Self {
        Self::Unavailable(err.to_string())
    }
}

/// Ask `source` for candidates and apply the shared match predicate.
pub fn find_duplicates<S>(
    source: &S,
    query: &DuplicateQuery,
) -> Result<Vec<Provider>, CandidateSourceError>
where
    S: DuplicateCandidateSource + ?Sized,
{
    let candidates = source.candidates(query)?;
    Ok(find_matches(query, &candidates))
}

/// Fixed comparison set, for callers that already hold the candidates.
#[derive(Debug, Clone, Default)]
pub struct StaticCandidates(pub Vec<Provider>);

impl DuplicateCandidateSource for StaticCandidates {
    fn candidates(&self, _query: &DuplicateQuery) -> Result<Vec<Provider>, CandidateSourceError> {
        Ok(self.0.clone())
    }
}
