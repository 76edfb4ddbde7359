//! Response Aggregator (C7): composes the `CommandBatchResult` of a turn
//! into exactly one `(response_text, phrase_category, phrase_id?)`.

pub mod aggregate;
pub mod canned;

pub use aggregate::{aggregate, canned_phrase, AggregatedResponse, PhraseCategory};
