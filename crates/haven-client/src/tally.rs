//! Per-operation reply reducer.
//!
//! Replies are classified into buckets by [`ReplyContents::error_class`] and
//! counted incrementally as they are appended:
//!
//! - the operation completes successfully the moment the cumulative success
//!   count reaches the quorum threshold, choosing the reply that pushed it
//!   over;
//! - when the caller declares that no more replies will come (full expected
//!   count, or deadline fired), the fallback picks the most frequent failure
//!   bucket, breaking ties in favour of the bucket that reached the winning
//!   count first.

use std::collections::HashMap;

use haven_wire::replies::{ErrorClass, ReplyContents};

/// Incremental success-quorum / most-frequent-error reducer.
///
/// Memory is bounded by the number of appended replies, which the registry
/// caps at the operation's expected reply count.
#[derive(Debug)]
pub struct ResponseTally<R> {
    successes_required: usize,
    success_count: usize,
    received: usize,
    counts: HashMap<ErrorClass, usize>,
    responses: Vec<R>,
    // Leading failure bucket: winning count and the index of the stored
    // reply that first reached it.
    leading_count: usize,
    leading_index: Option<usize>,
}

impl<R: ReplyContents> ResponseTally<R> {
    /// Create a reducer requiring `successes_required` successful replies.
    pub fn new(successes_required: usize) -> Self {
        Self {
            successes_required: successes_required.max(1),
            success_count: 0,
            received: 0,
            counts: HashMap::new(),
            responses: Vec::new(),
            leading_count: 0,
            leading_index: None,
        }
    }

    /// Append a reply.
    ///
    /// Returns `Some(reply)` when this reply completes the success quorum;
    /// the quorum-completing reply is handed back rather than stored.
    pub fn append(&mut self, reply: R) -> Option<R> {
        self.received += 1;
        let class = reply.error_class();
        *self.counts.entry(class).or_insert(0) += 1;

        if reply.is_success() {
            self.success_count += 1;
            if self.success_count >= self.successes_required {
                return Some(reply);
            }
        } else {
            let count = self.counts[&class];
            if count > self.leading_count {
                self.leading_count = count;
                self.leading_index = Some(self.responses.len());
            }
        }
        self.responses.push(reply);
        None
    }

    /// Number of replies appended so far.
    pub fn received(&self) -> usize {
        self.received
    }

    /// Consume the tally and return the most-frequent-error reply, if any
    /// failure reply arrived. Ties go to the bucket that reached the winning
    /// frequency first.
    pub fn into_most_frequent_error(self) -> Option<R> {
        let index = self.leading_index?;
        self.responses.into_iter().nth(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use haven_wire::replies::{RemoteError, ReturnCode};

    fn ok() -> ReturnCode {
        ReturnCode::success()
    }

    fn err(code: RemoteError) -> ReturnCode {
        ReturnCode::failure(code)
    }

    #[test]
    fn test_single_success_quorum() {
        let mut tally = ResponseTally::new(1);
        let reply = tally.append(ok());
        assert!(reply.is_some_and(|r| r.is_success()));
    }

    #[test]
    fn test_quorum_of_three() {
        let mut tally = ResponseTally::new(3);
        assert!(tally.append(ok()).is_none());
        assert!(tally.append(err(RemoteError::NoSuchElement)).is_none());
        assert!(tally.append(ok()).is_none());
        // Third success pushes the count to threshold.
        assert!(tally.append(ok()).is_some());
    }

    #[test]
    fn test_fallback_picks_most_frequent_error() {
        let mut tally = ResponseTally::new(1);
        // 3 NoSuchElement / 5 InvalidParameter, no success.
        for code in [
            RemoteError::NoSuchElement,
            RemoteError::InvalidParameter,
            RemoteError::NoSuchElement,
            RemoteError::InvalidParameter,
            RemoteError::NoSuchElement,
            RemoteError::InvalidParameter,
            RemoteError::InvalidParameter,
            RemoteError::InvalidParameter,
        ] {
            assert!(tally.append(err(code)).is_none());
        }
        assert_eq!(tally.received(), 8);
        let chosen = tally.into_most_frequent_error().expect("has failures");
        assert_eq!(chosen.code, RemoteError::InvalidParameter);
    }

    #[test]
    fn test_tie_break_is_first_to_reach_count() {
        let mut tally = ResponseTally::new(1);
        for code in [
            RemoteError::NoSuchElement,
            RemoteError::InvalidParameter,
            RemoteError::NoSuchElement,
            RemoteError::InvalidParameter,
        ] {
            assert!(tally.append(err(code)).is_none());
        }
        // Both buckets sit at 2; NoSuchElement reached 2 first.
        let chosen = tally.into_most_frequent_error().expect("has failures");
        assert_eq!(chosen.code, RemoteError::NoSuchElement);
    }

    #[test]
    fn test_fallback_without_failures_is_none() {
        let mut tally: ResponseTally<ReturnCode> = ResponseTally::new(2);
        assert!(tally.append(ok()).is_none());
        assert!(tally.into_most_frequent_error().is_none());
    }

    #[test]
    fn test_successes_do_not_win_fallback() {
        let mut tally = ResponseTally::new(3);
        assert!(tally.append(ok()).is_none());
        assert!(tally.append(ok()).is_none());
        assert!(tally.append(err(RemoteError::NoSuchElement)).is_none());
        // Two successes, one failure, quorum never reached: the fallback is
        // the failure, not the more frequent ok bucket.
        let chosen = tally.into_most_frequent_error().expect("has a failure");
        assert_eq!(chosen.code, RemoteError::NoSuchElement);
    }

    #[test]
    fn test_unknown_codes_bucket_separately() {
        let mut tally = ResponseTally::new(1);
        assert!(tally.append(err(RemoteError::Unknown(7))).is_none());
        assert!(tally.append(err(RemoteError::Unknown(8))).is_none());
        assert!(tally.append(err(RemoteError::Unknown(7))).is_none());
        let chosen = tally.into_most_frequent_error().expect("has failures");
        assert_eq!(chosen.code, RemoteError::Unknown(7));
    }

    #[test]
    fn test_zero_quorum_clamped_to_one() {
        let mut tally = ResponseTally::new(0);
        // A quorum of zero is meaningless; the first success still completes.
        assert!(tally.append(ok()).is_some());
    }
}
