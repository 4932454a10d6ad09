//! The library code for the `plinth` blog content pipeline. The
//! architecture can be generally broken down into three distinct steps,
//! composed linearly:
//!
//! 1. Loading raw documents from source files on disk ([`crate::source`])
//! 2. Validating and normalizing their front matter ([`crate::document`])
//! 3. Assembling the collection and its render plan ([`crate::site`] and
//!    [`crate::plan`])
//!
//! Of the three, the third is the more involved. Assembly orders the
//! documents chronologically (with identifier tie-breaks so the order is
//! total), derives the by-tag and by-category indexes, and then emits a
//! render plan: a group of listing pages for each tag and each category
//! plus another group for the whole collection, each group paginated into
//! pages based on a configurable number of documents per page, alongside
//! one page per document.
//!
//! The pipeline stops there. Applying templates, writing HTML, and
//! anything else that turns the plan into files on disk is the job of an
//! external renderer; document bodies pass through this crate as opaque
//! text. Everything runs in a single build pass over the source tree, and
//! a failure at any stage aborts the whole build rather than publishing
//! partial output.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod build;
pub mod config;
pub mod document;
pub mod plan;
pub mod site;
pub mod source;
