//! IDE features: a file-oriented host over compilations.
//!
//! Callers push file contents into an [`AnalysisHost`] and query an
//! [`Analysis`] snapshot by dotted type names, without touching ids.
//!
//! ```ignore
//! use typegraph::ide::AnalysisHost;
//!
//! let mut host = AnalysisHost::new();
//! host.set_file_content("a.cs", "interface I {} class A : I {}");
//!
//! let analysis = host.analysis();
//! assert_eq!(analysis.interface_names("A"), vec!["I"]);
//! ```

mod analysis;

pub use analysis::{Analysis, AnalysisHost};
