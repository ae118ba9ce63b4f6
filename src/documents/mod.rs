//! Documents and the shared document store.
//!
//! A [`Document`] is an opaque, immutable record flowing between modules.
//! Documents are passed by reference (`Arc`) and never interpreted by the
//! engine itself; the unit flowing through a module chain is a
//! [`DocumentSeq`], an ordered immutable sequence.

mod content;
mod document;
mod factory;
mod store;

pub use content::{ContentProvider, FileContent, NullContent, StringContent};
pub use document::Document;
pub use factory::DocumentFactory;
pub use store::DocumentStore;

use std::sync::Arc;

/// An ordered, immutable sequence of documents.
pub type DocumentSeq = Arc<[Arc<Document>]>;

/// Returns an empty document sequence.
#[must_use]
pub fn empty_seq() -> DocumentSeq {
    Vec::new().into()
}

/// Builds a document sequence from a vector of documents.
#[must_use]
pub fn seq_from(documents: Vec<Arc<Document>>) -> DocumentSeq {
    documents.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_seq() {
        let seq = empty_seq();
        assert!(seq.is_empty());
    }

    #[test]
    fn test_seq_from_preserves_order() {
        let factory = DocumentFactory::new();
        let a = factory.create(None, None, Default::default(), Arc::new(NullContent));
        let b = factory.create(None, None, Default::default(), Arc::new(NullContent));

        let seq = seq_from(vec![a.clone(), b.clone()]);
        assert_eq!(seq.len(), 2);
        assert_eq!(seq[0].id, a.id);
        assert_eq!(seq[1].id, b.id);
    }
}
