//! Lifecycle of server-fetched values.

use tracing::debug;

/// The state of one asynchronous fetch.
///
/// Exactly one variant holds at a time. Fields move
/// `NotAsked | Failure | Success -> Loading -> Success | Failure`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteData<T> {
    /// No fetch has been started.
    NotAsked,
    /// A fetch is in flight.
    Loading,
    /// The fetch completed with a value.
    Success(T),
    /// The fetch completed with a human-readable error.
    Failure(String),
}

impl<T> Default for RemoteData<T> {
    fn default() -> Self {
        Self::NotAsked
    }
}

impl<T> RemoteData<T> {
    pub const fn is_not_asked(&self) -> bool {
        matches!(self, Self::NotAsked)
    }

    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Failure(_))
    }

    /// The value of a successful fetch.
    pub fn to_option(self) -> Option<T> {
        match self {
            Self::Success(value) => Some(value),
            _ => None,
        }
    }

    pub const fn as_option(&self) -> Option<&T> {
        match self {
            Self::Success(value) => Some(value),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&str> {
        match self {
            Self::Failure(message) => Some(message),
            _ => None,
        }
    }

    pub fn value_or(self, default: T) -> T {
        self.to_option().unwrap_or(default)
    }

    pub fn as_ref(&self) -> RemoteData<&T> {
        match self {
            Self::NotAsked => RemoteData::NotAsked,
            Self::Loading => RemoteData::Loading,
            Self::Success(value) => RemoteData::Success(value),
            Self::Failure(message) => RemoteData::Failure(message.clone()),
        }
    }

    /// Transforms the success payload, passing every other variant through.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> RemoteData<U> {
        match self {
            Self::NotAsked => RemoteData::NotAsked,
            Self::Loading => RemoteData::Loading,
            Self::Success(value) => RemoteData::Success(f(value)),
            Self::Failure(message) => RemoteData::Failure(message),
        }
    }

    /// Chains a second step that only runs on success.
    pub fn bind<U>(self, f: impl FnOnce(T) -> RemoteData<U>) -> RemoteData<U> {
        match self {
            Self::NotAsked => RemoteData::NotAsked,
            Self::Loading => RemoteData::Loading,
            Self::Success(value) => f(value),
            Self::Failure(message) => RemoteData::Failure(message),
        }
    }
}

impl<T> From<Result<T, String>> for RemoteData<T> {
    fn from(result: Result<T, String>) -> Self {
        match result {
            Ok(value) => Self::Success(value),
            Err(message) => Self::Failure(message),
        }
    }
}

/// Proof that a completion answers the latest request for a [`Remote`] field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket(u64);

/// A [`RemoteData`] field that discards completions of superseded requests.
///
/// Every [`Remote::begin`] bumps the field's epoch. A completion carrying an
/// older [`Ticket`] is dropped, so rapid duplicate loads cannot overwrite newer
/// data with older data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Remote<T> {
    data: RemoteData<T>,
    epoch: u64,
}

impl<T> Default for Remote<T> {
    fn default() -> Self {
        Self {
            data: RemoteData::NotAsked,
            epoch: 0,
        }
    }
}

impl<T> Remote<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn data(&self) -> &RemoteData<T> {
        &self.data
    }

    pub const fn value(&self) -> Option<&T> {
        self.data.as_option()
    }

    /// Marks the field as loading and returns the ticket its completion must
    /// present.
    pub fn begin(&mut self) -> Ticket {
        self.epoch += 1;
        self.data = RemoteData::Loading;
        Ticket(self.epoch)
    }

    /// Applies a completion. Returns `false` and leaves the field untouched when
    /// the ticket is stale.
    pub fn resolve(&mut self, ticket: Ticket, result: Result<T, String>) -> bool {
        if ticket.0 != self.epoch {
            debug!(
                "Discarding stale completion (ticket {}, current {})",
                ticket.0, self.epoch
            );
            return false;
        }
        self.data = result.into();
        true
    }

    /// Overwrites the field and invalidates every outstanding ticket.
    pub fn set(&mut self, data: RemoteData<T>) {
        self.epoch += 1;
        self.data = data;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_not_asked() {
        let data: RemoteData<u32> = RemoteData::default();
        assert!(data.is_not_asked());
        assert!(!data.is_loading());
        assert_eq!(data.to_option(), None);
    }

    #[test]
    fn map_only_touches_success() {
        assert_eq!(RemoteData::Success(2).map(|n| n * 10), RemoteData::Success(20));
        assert_eq!(RemoteData::<u32>::Loading.map(|n| n * 10), RemoteData::Loading);
        assert_eq!(
            RemoteData::<u32>::Failure("boom".to_string()).map(|n| n * 10),
            RemoteData::Failure("boom".to_string())
        );
    }

    #[test]
    fn bind_short_circuits() {
        let halve = |n: u32| {
            if n % 2 == 0 {
                RemoteData::Success(n / 2)
            } else {
                RemoteData::Failure(format!("{n} is odd"))
            }
        };
        assert_eq!(RemoteData::Success(4).bind(halve), RemoteData::Success(2));
        assert_eq!(
            RemoteData::Success(3).bind(halve),
            RemoteData::Failure("3 is odd".to_string())
        );
        assert_eq!(RemoteData::NotAsked.bind(halve), RemoteData::NotAsked);
    }

    #[test]
    fn value_or_falls_back() {
        assert_eq!(RemoteData::Success(vec![1]).value_or(vec![]), vec![1]);
        assert_eq!(RemoteData::<Vec<u8>>::Loading.value_or(vec![]), Vec::<u8>::new());
    }

    #[test]
    fn remote_follows_the_lifecycle() {
        let mut field: Remote<Vec<u8>> = Remote::new();
        assert!(field.data().is_not_asked());

        let ticket = field.begin();
        assert!(field.data().is_loading());

        assert!(field.resolve(ticket, Ok(vec![1, 2])));
        assert_eq!(field.value(), Some(&vec![1, 2]));
    }

    #[test]
    fn stale_completions_are_discarded() {
        let mut field: Remote<&str> = Remote::new();
        let first = field.begin();
        let second = field.begin();

        assert!(field.resolve(second, Ok("new")));
        assert!(!field.resolve(first, Ok("old")));
        assert_eq!(field.value(), Some(&"new"));
    }

    #[test]
    fn set_invalidates_outstanding_tickets() {
        let mut field: Remote<u8> = Remote::new();
        let ticket = field.begin();
        field.set(RemoteData::Success(1));
        assert!(!field.resolve(ticket, Err("late".to_string())));
        assert_eq!(field.value(), Some(&1));
    }
}
