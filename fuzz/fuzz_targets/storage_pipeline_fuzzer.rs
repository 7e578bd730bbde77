//! Fuzz target for the document service under storage failures
//!
//! Drives create/read/share/resolve against ChaoticStorage and checks the
//! destructive-read contract against a model of what should still be stored.
//!
//! # Invariants
//!
//! - The service NEVER panics on storage errors
//! - A document is read successfully at most once
//! - An injected failure never consumes a document or share
//! - Every successful read returns the plaintext that was stored

#![no_main]

use std::collections::HashMap;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use pasteburn_core::{
    ChaoticStorage, DocumentError, DocumentService, MemoryStorage, SecretKey, SecretStore,
    StorageError,
};
use uuid::Uuid;

#[derive(Debug, Clone, Arbitrary)]
struct Scenario {
    /// Seed for ChaoticStorage RNG
    chaos_seed: u64,
    /// Failure rate 0-9 maps to 0%-90%
    failure_rate_tenth: u8,
    key: [u8; 32],
    operations: Vec<Operation>,
}

#[derive(Debug, Clone, Arbitrary)]
enum Operation {
    Create { plaintext: Vec<u8> },
    Read { slot: u8 },
    Share { plaintext: Vec<u8>, recipients: u8 },
    Resolve { slot: u8, index: u8 },
}

struct Group {
    plaintext: Vec<u8>,
    keys: Vec<SecretKey>,
    unread: Vec<bool>,
}

fn is_injected(error: &DocumentError) -> bool {
    matches!(error, DocumentError::Storage(StorageError::Io(_)))
}

fuzz_target!(|scenario: Scenario| {
    let failure_rate = f64::from(scenario.failure_rate_tenth % 10) / 10.0;
    let storage =
        ChaoticStorage::with_seed(MemoryStorage::new(), failure_rate, scenario.chaos_seed);
    let service = DocumentService::new(storage);

    let mut documents: Vec<(Uuid, Vec<u8>, bool)> = Vec::new();
    let mut groups: Vec<(Uuid, Group)> = Vec::new();

    for operation in scenario.operations.into_iter().take(64) {
        match operation {
            Operation::Create { plaintext } => match service.create_document(&plaintext, &scenario.key) {
                Ok(document) => documents.push((document.id(), plaintext, true)),
                Err(e) => assert!(is_injected(&e), "unexpected create error: {e:?}"),
            },
            Operation::Read { slot } => {
                if documents.is_empty() {
                    continue;
                }
                let slot = usize::from(slot) % documents.len();
                let (id, plaintext, unread) = &mut documents[slot];

                match service.read_document(*id, &scenario.key) {
                    Ok(document) => {
                        assert!(*unread, "document read twice");
                        assert_eq!(document.contents(), plaintext.as_slice());
                        *unread = false;
                    },
                    Err(e) if e.is_not_found() => assert!(!*unread, "unread document lost"),
                    Err(e) => assert!(is_injected(&e), "unexpected read error: {e:?}"),
                }
            },
            Operation::Share { plaintext, recipients } => {
                let recipients = recipients % 8;
                match service.create_multi_document(&plaintext, recipients) {
                    Ok((group_id, shares)) => {
                        assert_eq!(shares.len(), usize::from(recipients));
                        let keys = shares.into_iter().map(|share| share.key).collect();
                        let unread = vec![true; usize::from(recipients)];
                        groups.push((group_id, Group { plaintext, keys, unread }));
                    },
                    Err(DocumentError::InvalidRecipientCount { .. }) => assert_eq!(recipients, 0),
                    Err(e) => assert!(is_injected(&e), "unexpected share error: {e:?}"),
                }
            },
            Operation::Resolve { slot, index } => {
                if groups.is_empty() {
                    continue;
                }
                let slot = usize::from(slot) % groups.len();
                let (group_id, group) = &mut groups[slot];
                let index = index % (group.keys.len() as u8);
                let i = usize::from(index);

                match service.read_multi_document(*group_id, index, group.keys[i].as_bytes()) {
                    Ok(plaintext) => {
                        assert!(group.unread[i], "share read twice");
                        assert_eq!(plaintext, group.plaintext);
                        group.unread[i] = false;
                    },
                    Err(e) if e.is_not_found() => assert!(!group.unread[i], "unread share lost"),
                    Err(e) => assert!(is_injected(&e), "unexpected resolve error: {e:?}"),
                }
            },
        }
    }

    let expected: usize = documents.iter().filter(|(_, _, unread)| *unread).count();
    assert_eq!(service.storage().inner().document_count().ok(), Some(expected));
});
