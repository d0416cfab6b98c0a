pub mod bilan;
pub mod classifier;
pub mod evolution;
pub mod stats;
pub mod stock;
pub mod temporal;

pub use bilan::{aggregate, summarize, BucketResult, PeriodReport, Totals};
pub use classifier::{classify, ClassifiedFine, FineStatus};
pub use evolution::{compute_evolution, Evolution};
pub use stock::{build_encours, fine_detail, list_fines, EncoursOverview, FineView};
pub use temporal::{resolve_range, DateRange, ReportingPeriod};
