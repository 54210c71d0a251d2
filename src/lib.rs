//! # comment-roundtrip
//!
//! Checks that the EXIF comment tags (ImageDescription, UserComment and the
//! UCS-2 encoded XPComment) survive being embedded into a PNG and a JPEG and
//! read back out again.
//!
//! ## Quick Start
//!
//! The simplest way to use the library is through the pipeline module, which
//! runs the PNG and JPEG scenarios in order and stops at the first failure:
//!
//! ```rust,no_run
//! use comment_roundtrip::config::Config;
//! use comment_roundtrip::pipeline::run_all;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = Config::load(Some("config.json".as_ref()))?;
//!     let summary = run_all(&config);
//!
//!     for report in &summary.scenarios {
//!         match report.error {
//!             Some(ref err) => eprintln!("{:?} failed: {err}", report.format),
//!             None => println!("{:?} passed", report.format),
//!         }
//!     }
//!     std::process::exit(i32::from(summary.exit_code()));
//! }
//! ```
//!
//! ## Lower-Level Usage
//!
//! ```rust
//! use comment_roundtrip::exif::{dump, insert, load, ExifRecord};
//! use comment_roundtrip::{png, ucs2};
//!
//! # fn main() -> comment_roundtrip::Result<()> {
//! let mut record = ExifRecord::default();
//! record.zeroth.image_description = Some("A red pixel".into());
//! record.zeroth.xp_comment = Some(ucs2::encode("Tiny"));
//!
//! let image = insert(&dump(&record)?, &png::build_minimal_png())?;
//! let loaded = load(&image)?;
//! assert_eq!(loaded, record);
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`checksum`] — CRC-32 with a compile-time lookup table
//! - [`pack`] — struct-style fixed-width integer packing
//! - [`ucs2`] — null-terminated UCS-2 text codec
//! - [`png`] — minimal PNG synthesis and chunk validation
//! - [`exif`] — EXIF `dump` / `insert` / `load` for PNG and JPEG
//! - [`config`] — configuration types and loading/saving
//! - [`pipeline`] — round-trip scenarios and pass/fail aggregation

pub mod checksum;
pub mod config;
pub mod error;
pub mod exif;
pub mod pack;
pub mod pipeline;
pub mod png;
pub mod ucs2;

pub use error::{Error, Result};
