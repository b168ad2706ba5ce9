//! Core data types for the compatibility and matching engine.
//!
//! This module provides the fundamental types used throughout the library:
//!
//! - [`hla::HlaCode`], [`hla::HlaType`], [`hla::HlaAntibody`]: the HLA code
//!   model at broad/split/high-resolution specificity
//! - [`patient::Donor`], [`patient::Recipient`], [`patient::PatientPool`]:
//!   the patient pool supplied per solve invocation
//! - [`config::Configuration`]: solver and scoring knobs
//! - [`types::BloodGroup`], [`types::DonorType`]: supporting value types
//!
//! ## HLA Specificity
//!
//! HLA codes are partially specified at up to three nomenclature levels:
//!
//! | Level     | Example   | Meaning                          |
//! |-----------|-----------|----------------------------------|
//! | broad     | A9        | Serological antigen family       |
//! | split     | A24       | Serological subtype              |
//! | high-res  | A*24:02   | Exact allele (molecular typing)  |
//!
//! Matching always proceeds at descending specificity; ambiguity below the
//! high-resolution level is handled by the crossmatch resolver via assumed
//! expansions from the nomenclature table.

pub mod config;
pub mod hla;
pub mod patient;
pub mod types;
