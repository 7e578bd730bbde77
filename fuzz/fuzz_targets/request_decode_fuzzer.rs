//! Fuzz target for request body decoding
//!
//! # Invariants
//!
//! - NEVER panic on arbitrary JSON input
//! - A request that decodes and validates runs without panicking
//! - Validation rejects short keys and zero recipients before storage

#![no_main]

use libfuzzer_sys::fuzz_target;
use pasteburn_core::{
    DocumentService, MemoryStorage,
    api::{
        CreateDocumentRequest, CreateMultiDocumentRequest, ReadDocumentRequest,
        ReadMultiDocumentRequest,
    },
};

fuzz_target!(|data: &[u8]| {
    let service = DocumentService::new(MemoryStorage::new());

    if let Ok(request) = serde_json::from_slice::<CreateDocumentRequest>(data) {
        let valid = request.validate().is_ok();
        assert_eq!(valid, request.key.len() == 32);
        assert_eq!(request.execute(&service).is_ok(), valid);
    }

    if let Ok(request) = serde_json::from_slice::<ReadDocumentRequest>(data) {
        let _ = request.execute(&service);
    }

    if let Ok(request) = serde_json::from_slice::<CreateMultiDocumentRequest>(data) {
        if request.recipients <= 8 {
            assert_eq!(request.execute(&service).is_ok(), request.recipients > 0);
        }
    }

    if let Ok(request) = serde_json::from_slice::<ReadMultiDocumentRequest>(data) {
        let _ = request.execute(&service);
    }
});
